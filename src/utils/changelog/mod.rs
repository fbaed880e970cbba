// changelog parsing and validation

pub mod config;
pub mod diagnostics;
pub mod parser;
pub mod references;
pub mod render;
pub mod sanitizer;
pub mod types;

pub use config::ParserConfig;
pub use diagnostics::ChangelogError;
pub use parser::{ChangelogParser, is_version_regression};
pub use references::{ReferenceToken, extract_references, strip_definitions};
pub use render::render_latest_changes;
pub use sanitizer::CommentSanitizer;
pub use types::{ChangeGroup, ChangeType, Release};
