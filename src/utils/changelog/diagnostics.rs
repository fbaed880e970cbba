// structural violations reported by the parser

use super::types::{ChangeType, Release};
use serde::{Deserialize, Serialize};
use std::fmt;

/// a single changelog violation
///
/// violations are collected while parsing and never abort it. equality compares
/// the variant and its fields, so tests can assert on exact errors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChangelogError {
    /// `## [...]` header that is neither a dated release nor `Unreleased`
    InvalidRelease { version: String, line: usize },
    /// version is not lower than the release above it
    InvalidReleaseVersion {
        version: String,
        line: usize,
        previous_version: String,
        previous_date: String,
    },
    InvalidReleaseDate {
        version: String,
        date: String,
        line: usize,
    },
    /// latest release is not dated today (only when requested)
    OutdatedReleaseDate {
        version: String,
        date: String,
        line: usize,
    },
    EmptyRelease { version: String, line: usize },
    InvalidType { change_type: String, line: usize },
    /// type reopened after another type within the same release
    UngroupedType {
        version: String,
        change_type: ChangeType,
        line: usize,
    },
    /// content with no `###` type above it
    MissingType { version: String, line: usize },
    EmptyType {
        version: String,
        change_type: ChangeType,
        line: usize,
    },
    /// `is_missing` is false when the section exists but is not topmost
    UnreleasedSection { is_missing: bool },
    NoRelease,
    UndefinedReference { key: String },
    UnusedReference { key: String },
}

impl ChangelogError {
    pub fn invalid_release_version(release: &Release, previous: &Release) -> Self {
        ChangelogError::InvalidReleaseVersion {
            version: release.version.clone(),
            line: release.line,
            previous_version: previous.version.clone(),
            previous_date: previous.date.clone(),
        }
    }

    pub fn invalid_release_date(release: &Release) -> Self {
        ChangelogError::InvalidReleaseDate {
            version: release.version.clone(),
            date: release.date.clone(),
            line: release.line,
        }
    }

    pub fn outdated_release_date(release: &Release) -> Self {
        ChangelogError::OutdatedReleaseDate {
            version: release.version.clone(),
            date: release.date.clone(),
            line: release.line,
        }
    }

    pub fn empty_release(release: &Release) -> Self {
        ChangelogError::EmptyRelease {
            version: release.version.clone(),
            line: release.line,
        }
    }

    pub fn ungrouped_type(release: &Release, change_type: ChangeType, line: usize) -> Self {
        ChangelogError::UngroupedType {
            version: release.version.clone(),
            change_type,
            line,
        }
    }

    pub fn missing_type(release: &Release, line: usize) -> Self {
        ChangelogError::MissingType {
            version: release.version.clone(),
            line,
        }
    }

    pub fn empty_type(release: &Release, change_type: ChangeType, line: usize) -> Self {
        ChangelogError::EmptyType {
            version: release.version.clone(),
            change_type,
            line,
        }
    }

    /// source line the violation points at, if any
    pub fn line(&self) -> Option<usize> {
        match self {
            ChangelogError::InvalidRelease { line, .. }
            | ChangelogError::InvalidReleaseVersion { line, .. }
            | ChangelogError::InvalidReleaseDate { line, .. }
            | ChangelogError::OutdatedReleaseDate { line, .. }
            | ChangelogError::EmptyRelease { line, .. }
            | ChangelogError::InvalidType { line, .. }
            | ChangelogError::UngroupedType { line, .. }
            | ChangelogError::MissingType { line, .. }
            | ChangelogError::EmptyType { line, .. } => Some(*line),
            ChangelogError::UnreleasedSection { .. }
            | ChangelogError::NoRelease
            | ChangelogError::UndefinedReference { .. }
            | ChangelogError::UnusedReference { .. } => None,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ChangelogError::InvalidRelease { .. } => "InvalidReleaseError",
            ChangelogError::InvalidReleaseVersion { .. } => "InvalidReleaseVersionError",
            ChangelogError::InvalidReleaseDate { .. } => "InvalidReleaseDateError",
            ChangelogError::OutdatedReleaseDate { .. } => "OutdatedReleaseDateError",
            ChangelogError::EmptyRelease { .. } => "EmptyReleaseError",
            ChangelogError::InvalidType { .. } => "InvalidTypeError",
            ChangelogError::UngroupedType { .. } => "UngroupedTypeError",
            ChangelogError::MissingType { .. } => "MissingTypeError",
            ChangelogError::EmptyType { .. } => "EmptyTypeError",
            ChangelogError::UnreleasedSection { .. } => "UnreleasedSectionError",
            ChangelogError::NoRelease => "NoReleaseError",
            ChangelogError::UndefinedReference { .. } => "UndefinedReferenceError",
            ChangelogError::UnusedReference { .. } => "UnusedReferenceError",
        }
    }

    /// the message without the line suffix
    pub fn message(&self) -> String {
        match self {
            ChangelogError::InvalidRelease { version, .. } => format!(
                "Invalid release entry for version '{}'. Use the format: '## [x.x.x] - YYYY-MM-DD'",
                version
            ),
            ChangelogError::InvalidReleaseVersion {
                version,
                previous_version,
                previous_date,
                ..
            } => format!(
                "Invalid release version '{}' compared to {} released on {}.",
                version, previous_version, previous_date
            ),
            ChangelogError::InvalidReleaseDate { version, date, .. } => {
                format!("Release {} has an invalid date '{}'.", version, date)
            }
            ChangelogError::OutdatedReleaseDate { version, date, .. } => {
                format!("Release date '{}' of {} is not today.", date, version)
            }
            ChangelogError::EmptyRelease { version, .. } => {
                format!("Release {} does not list any changes.", version)
            }
            ChangelogError::InvalidType { change_type, .. } => {
                format!("Invalid type of change '{}'.", change_type)
            }
            ChangelogError::UngroupedType {
                version,
                change_type,
                ..
            } => format!(
                "Changes of type '{}' in release {} must be grouped under a single header.",
                change_type, version
            ),
            ChangelogError::MissingType { version, .. } => format!(
                "Change in release {} has no type. Add a '### <Type>' header above it.",
                version
            ),
            ChangelogError::EmptyType {
                version,
                change_type,
                ..
            } => format!(
                "Type of change '{}' in release {} has no entries.",
                change_type, version
            ),
            ChangelogError::UnreleasedSection { is_missing: true } => {
                "There is no 'Unreleased' section. Add '## [Unreleased]' as first release."
                    .to_string()
            }
            ChangelogError::UnreleasedSection { is_missing: false } => {
                "The 'Unreleased' section must be the top most release.".to_string()
            }
            ChangelogError::NoRelease => {
                "There are no releases specified (format: '## [x.x.x] - YYYY-MM-DD').".to_string()
            }
            ChangelogError::UndefinedReference { key } => {
                format!("Reference '{}' is not defined.", key)
            }
            ChangelogError::UnusedReference { key } => {
                format!("Reference '{}' is defined but never used.", key)
            }
        }
    }
}

impl fmt::Display for ChangelogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line() {
            Some(line) => write!(f, "{} (line {})", self.message(), line),
            None => f.write_str(&self.message()),
        }
    }
}

impl std::error::Error for ChangelogError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_with_line() {
        let error = ChangelogError::InvalidType {
            change_type: "Invalid".to_string(),
            line: 18,
        };
        assert_eq!(error.to_string(), "Invalid type of change 'Invalid'. (line 18)");
        assert_eq!(error.line(), Some(18));
        assert_eq!(error.kind(), "InvalidTypeError");
    }

    #[test]
    fn test_display_without_line() {
        let error = ChangelogError::UndefinedReference {
            key: "0.0.5".to_string(),
        };
        assert_eq!(error.to_string(), "Reference '0.0.5' is not defined.");
        assert_eq!(error.line(), None);
    }

    #[test]
    fn test_version_error_carries_both_releases() {
        let newer = Release::new("0.1.0", "2014-05-31", 17);
        let older = Release::new("0.0.2", "2014-05-01", 23);
        let error = ChangelogError::invalid_release_version(&older, &newer);
        assert_eq!(
            error,
            ChangelogError::InvalidReleaseVersion {
                version: "0.0.2".to_string(),
                line: 23,
                previous_version: "0.1.0".to_string(),
                previous_date: "2014-05-31".to_string(),
            }
        );
        assert_eq!(
            error.to_string(),
            "Invalid release version '0.0.2' compared to 0.1.0 released on 2014-05-31. (line 23)"
        );
    }

    #[test]
    fn test_serializes_with_kind_tag() {
        let error = ChangelogError::UnreleasedSection { is_missing: true };
        let json = serde_json::to_value(&error).unwrap();
        assert_eq!(json["kind"], "unreleased_section");
        assert_eq!(json["is_missing"], true);
    }
}
