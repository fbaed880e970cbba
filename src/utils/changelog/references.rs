// reference link extraction

use regex::Regex;
use std::sync::LazyLock;

// the character after `]` is consumed, so `[a][b]` only yields `a`
static REFERENCE_KEY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([^\[\]]+)\]([^(]|$)").expect("valid reference pattern"));

static REFERENCE_DEFINITION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[[^\[\]]+\]:\s*\S*").expect("valid reference definition pattern")
});

/// a bracketed key found in a line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReferenceToken {
    /// `[key]` not followed by `(` or `:`
    Usage(String),
    /// `[key]: target`
    Definition { key: String, target: String },
}

/// scan a line for reference usages and definitions, left to right
///
/// `[text](url)` is an inline link and yields nothing.
pub fn extract_references(line: &str) -> Vec<ReferenceToken> {
    let mut tokens = Vec::new();

    for captures in REFERENCE_KEY.captures_iter(line) {
        let (Some(whole), Some(key), Some(next)) = (captures.get(0), captures.get(1), captures.get(2))
        else {
            continue;
        };

        if next.as_str() == ":" {
            let target = line[whole.end()..]
                .split_whitespace()
                .next()
                .unwrap_or_default()
                .to_string();
            tokens.push(ReferenceToken::Definition {
                key: key.as_str().to_string(),
                target,
            });
        } else {
            tokens.push(ReferenceToken::Usage(key.as_str().to_string()));
        }
    }

    tokens
}

/// remove `[key]: target` fragments from a line
pub fn strip_definitions(line: &str) -> String {
    REFERENCE_DEFINITION.replace_all(line, "").into_owned()
}
