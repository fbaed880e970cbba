// chunked changelog reading

use super::changelog::{ChangelogParser, ParserConfig};
use super::config::LintConfig;
use crate::error::{Error, Result};
use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::Path;
use tracing::{debug, trace};

pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

/// re-joins lines that were split across chunk boundaries
///
/// lines are split on `\n` with an optional preceding `\r`. the trailing fragment
/// of each chunk is held back until the next chunk (or [`finish`](Self::finish)).
#[derive(Debug, Default)]
pub struct LineAssembler {
    pending: String,
}

impl LineAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// complete lines made available by `chunk`
    pub fn push(&mut self, chunk: &str) -> Vec<String> {
        let mut text = std::mem::take(&mut self.pending);
        text.push_str(chunk);

        let mut pieces: Vec<&str> = text.split('\n').collect();
        // the last piece has not seen its newline yet
        let last = pieces.pop().unwrap_or_default();
        let lines = pieces.into_iter().map(strip_cr).collect();
        self.pending = last.to_string();
        lines
    }

    /// the unterminated last line, if any
    pub fn finish(self) -> Option<String> {
        let line = strip_cr(&self.pending);
        (!line.is_empty()).then_some(line)
    }
}

fn strip_cr(line: &str) -> String {
    line.strip_suffix('\r').unwrap_or(line).to_string()
}

/// decode `bytes` up to an incomplete trailing sequence, which stays in `bytes`
///
/// invalid sequences become U+FFFD the same way `String::from_utf8_lossy` does,
/// so the result does not depend on where chunks were cut.
fn take_utf8(bytes: &mut Vec<u8>) -> String {
    let mut text = String::new();
    let mut rest: &[u8] = bytes.as_slice();

    loop {
        match std::str::from_utf8(rest) {
            Ok(valid) => {
                text.push_str(valid);
                rest = &[];
                break;
            }
            Err(err) => {
                let (valid, after) = rest.split_at(err.valid_up_to());
                text.push_str(&String::from_utf8_lossy(valid));
                match err.error_len() {
                    Some(len) => {
                        text.push(char::REPLACEMENT_CHARACTER);
                        rest = &after[len..];
                    }
                    None => {
                        rest = after;
                        break;
                    }
                }
            }
        }
    }

    let consumed = bytes.len() - rest.len();
    bytes.drain(..consumed);
    text
}

/// stream `reader` through a new parser in chunks of `chunk_size` bytes
///
/// the parser is returned before validation so callers decide when to validate.
pub fn parse_reader<R: Read>(
    mut reader: R,
    config: ParserConfig,
    chunk_size: usize,
) -> Result<ChangelogParser> {
    let mut parser = ChangelogParser::new(config);
    let mut assembler = LineAssembler::new();
    let mut buffer = vec![0u8; chunk_size.max(1)];
    let mut undecoded: Vec<u8> = Vec::new();

    loop {
        let read = match reader.read(&mut buffer) {
            Ok(0) => break,
            Ok(read) => read,
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => return Err(err.into()),
        };
        trace!(bytes = read, "chunk read");

        undecoded.extend_from_slice(&buffer[..read]);
        let chunk = take_utf8(&mut undecoded);
        parser.process(assembler.push(&chunk));
    }

    if !undecoded.is_empty() {
        let rest = String::from_utf8_lossy(&undecoded).into_owned();
        parser.process(assembler.push(&rest));
    }
    if let Some(line) = assembler.finish() {
        parser.handle(&line);
    }

    debug!(lines = parser.line_number(), "changelog read");
    Ok(parser)
}

/// read and validate the changelog at `path`
pub fn check_file<P: AsRef<Path>>(path: P, config: &LintConfig) -> Result<ChangelogParser> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| Error::FileReadError {
        path: path.to_path_buf(),
        source: e,
    })?;

    let mut parser =
        parse_reader(file, config.parser.clone(), config.chunk_size).map_err(|e| match e {
            Error::IoError(source) => Error::FileReadError {
                path: path.to_path_buf(),
                source,
            },
            other => other,
        })?;

    parser.validate();
    Ok(parser)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assembler_joins_split_lines() {
        let mut assembler = LineAssembler::new();
        assert_eq!(assembler.push("## [1.0"), Vec::<String>::new());
        assert_eq!(
            assembler.push(".0] - 2017-06-20\n### Add"),
            vec!["## [1.0.0] - 2017-06-20".to_string()]
        );
        assert_eq!(
            assembler.push("ed\n- a\n"),
            vec!["### Added".to_string(), "- a".to_string()]
        );
        assert_eq!(assembler.finish(), None);
    }

    #[test]
    fn test_assembler_handles_crlf_across_chunks() {
        let mut assembler = LineAssembler::new();
        assert_eq!(assembler.push("first\r"), Vec::<String>::new());
        assert_eq!(
            assembler.push("\nsecond\r\n\r\nthird"),
            vec!["first".to_string(), "second".to_string(), String::new()]
        );
        assert_eq!(assembler.finish(), Some("third".to_string()));
    }

    #[test]
    fn test_take_utf8_keeps_incomplete_sequence() {
        let encoded = "é".as_bytes();
        let mut bytes = vec![b'a', b'b', encoded[0]];
        assert_eq!(take_utf8(&mut bytes), "ab");
        assert_eq!(bytes.len(), 1);
        bytes.push(encoded[1]);
        assert_eq!(take_utf8(&mut bytes), "é");
        assert!(bytes.is_empty());
    }

    #[test]
    fn test_take_utf8_replaces_invalid_and_keeps_tail() {
        let encoded = "é".as_bytes();
        let mut bytes = vec![b'a', 0xff, b'b', encoded[0]];
        assert_eq!(take_utf8(&mut bytes), "a\u{FFFD}b");
        assert_eq!(bytes, vec![encoded[0]]);
        bytes.push(encoded[1]);
        assert_eq!(take_utf8(&mut bytes), "é");
        assert!(bytes.is_empty());
    }

    #[test]
    fn test_parse_reader_invalid_bytes_any_chunk_size() {
        let mut content = b"## [Unreleased]\n## [1.0.0] - 2017-06-20\n### Fixed\n- bad ".to_vec();
        content.extend_from_slice(&[0xff, 0xc3, 0xa9, 0xfe, 0xe2, 0x82, 0xac]);
        content.extend_from_slice(b" byte\n");

        let reference = parse_reader(content.as_slice(), ParserConfig::default(), 4096).unwrap();
        let expected = reference.latest_changes();
        assert!(expected.contains("- bad \u{FFFD}é\u{FFFD}€ byte"));

        for chunk_size in 1..=16 {
            let parser = parse_reader(content.as_slice(), ParserConfig::default(), chunk_size).unwrap();
            assert_eq!(parser.latest_changes(), expected, "chunk size {}", chunk_size);
        }
    }

    #[test]
    fn test_parse_reader_counts_lines_once() {
        let text = "## [Unreleased]\n## [1.0.0] - 2017-06-20\n### Added\n- a\n";
        let parser = parse_reader(text.as_bytes(), ParserConfig::default(), 3).unwrap();
        assert_eq!(parser.line_number(), 4);
        assert_eq!(parser.latest_release().unwrap().version, "1.0.0");
        assert!(parser.errors().is_empty());
    }

    #[test]
    fn test_parse_reader_small_chunks_match_single_chunk() {
        let text = "## [Unreleased]\n## [1.0.0] - 2017-06-20\n### Fixed\n- ünïcödé [x]\n### Nope\n";
        let mut small = parse_reader(text.as_bytes(), ParserConfig::default(), 1).unwrap();
        let mut large = parse_reader(text.as_bytes(), ParserConfig::default(), 4096).unwrap();
        small.validate();
        large.validate();
        assert_eq!(small.errors(), large.errors());
        assert_eq!(small.latest_changes(), large.latest_changes());
    }
}
