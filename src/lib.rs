pub mod error;
pub mod utils;

pub use error::*;
pub use utils::changelog::{
    ChangeGroup, ChangeType, ChangelogError, ChangelogParser, ParserConfig, Release,
    render_latest_changes,
};
pub use utils::config::LintConfig;
pub use utils::reader::{DEFAULT_CHUNK_SIZE, LineAssembler, check_file, parse_reader};
