use std::fmt;
use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

/// failures of the surrounding tooling; changelog violations are never reported here
#[derive(Debug)]
pub enum Error {
    FileReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    ConfigParseError {
        path: PathBuf,
        source: toml::de::Error,
    },
    IoError(std::io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::FileReadError { path, source } => {
                write!(f, "failed to read file: {} ({})", path.display(), source)
            }
            Error::ConfigParseError { path, source } => {
                write!(
                    f,
                    "failed to parse config file: {} ({})",
                    path.display(),
                    source
                )
            }
            Error::IoError(err) => {
                write!(f, "io error: {}", err)
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::FileReadError { source, .. } => Some(source),
            Error::ConfigParseError { source, .. } => Some(source),
            Error::IoError(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::IoError(err)
    }
}
