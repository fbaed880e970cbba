// html comment stripping

const COMMENT_OPEN: &str = "<!--";
const COMMENT_CLOSE: &str = "-->";

/// strips `<!-- ... -->` comments from lines, tracking comments that span lines
///
/// nesting is not supported: the first `-->` closes the comment
#[derive(Debug, Clone, Default)]
pub struct CommentSanitizer {
    active_block_comment: bool,
}

impl CommentSanitizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// true while inside a comment that was opened on an earlier line
    pub fn in_block_comment(&self) -> bool {
        self.active_block_comment
    }

    pub fn sanitize(&mut self, line: &str) -> String {
        let mut rest = line;

        if self.active_block_comment {
            match rest.find(COMMENT_CLOSE) {
                Some(pos) => {
                    rest = &rest[pos + COMMENT_CLOSE.len()..];
                    self.active_block_comment = false;
                }
                None => return String::new(),
            }
        }

        let mut output = String::with_capacity(rest.len());
        while let Some(open) = rest.find(COMMENT_OPEN) {
            output.push_str(&rest[..open]);
            let after_open = &rest[open + COMMENT_OPEN.len()..];
            match after_open.find(COMMENT_CLOSE) {
                Some(close) => {
                    rest = &after_open[close + COMMENT_CLOSE.len()..];
                }
                None => {
                    self.active_block_comment = true;
                    return output;
                }
            }
        }
        output.push_str(rest);
        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_line_untouched() {
        let mut sanitizer = CommentSanitizer::new();
        assert_eq!(sanitizer.sanitize("- Added stuff"), "- Added stuff");
        assert!(!sanitizer.in_block_comment());
    }

    #[test]
    fn test_single_line_comments_removed() {
        let mut sanitizer = CommentSanitizer::new();
        assert_eq!(
            sanitizer.sanitize("a <!-- one --> b <!-- two -->c"),
            "a  b c"
        );
        assert!(!sanitizer.in_block_comment());
    }

    #[test]
    fn test_block_comment_spanning_lines() {
        let mut sanitizer = CommentSanitizer::new();
        assert_eq!(sanitizer.sanitize("keep <!-- start"), "keep ");
        assert!(sanitizer.in_block_comment());
        assert_eq!(sanitizer.sanitize("## [0.0.9] - 2000-01-01"), "");
        assert!(sanitizer.in_block_comment());
        assert_eq!(sanitizer.sanitize("end --> tail <!-- x -->"), " tail ");
        assert!(!sanitizer.in_block_comment());
    }

    #[test]
    fn test_block_comment_reopened_on_closing_line() {
        let mut sanitizer = CommentSanitizer::new();
        sanitizer.sanitize("<!--");
        assert_eq!(sanitizer.sanitize("--> a <!-- b"), " a ");
        assert!(sanitizer.in_block_comment());
    }

    #[test]
    fn test_nested_markers_close_at_first_terminator() {
        let mut sanitizer = CommentSanitizer::new();
        assert_eq!(sanitizer.sanitize("<!-- a <!-- b --> c -->"), " c -->");
        assert!(!sanitizer.in_block_comment());
    }
}
