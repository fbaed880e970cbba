// changelog data structures

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// canonical type of change, as used in `### <Type>` headers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChangeType {
    /// new features
    Added,
    /// changes in existing functionality
    Changed,
    /// soon-to-be removed features
    Deprecated,
    /// now removed features
    Removed,
    /// bug fixes
    Fixed,
    /// vulnerabilities
    Security,
}

impl ChangeType {
    pub const ALL: [ChangeType; 6] = [
        ChangeType::Added,
        ChangeType::Changed,
        ChangeType::Deprecated,
        ChangeType::Removed,
        ChangeType::Fixed,
        ChangeType::Security,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeType::Added => "Added",
            ChangeType::Changed => "Changed",
            ChangeType::Deprecated => "Deprecated",
            ChangeType::Removed => "Removed",
            ChangeType::Fixed => "Fixed",
            ChangeType::Security => "Security",
        }
    }
}

impl fmt::Display for ChangeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChangeType {
    type Err = String;

    // exact, case-sensitive match: `### added` is not a valid header
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ChangeType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("invalid type of change: {}", s))
    }
}

/// entries of one change type within a release
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeGroup {
    pub change_type: ChangeType,
    /// line of the `###` header that opened the group
    pub line: usize,
    pub entries: Vec<String>,
}

impl ChangeGroup {
    pub fn new(change_type: ChangeType, line: usize) -> Self {
        Self {
            change_type,
            line,
            entries: Vec::new(),
        }
    }
}

/// represents a `## [X.Y.Z] - YYYY-MM-DD` section of the changelog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Release {
    pub version: String,
    pub date: String,
    pub line: usize,
    /// groups in order of first appearance
    pub changes: Vec<ChangeGroup>,
    /// reference keys used inside typed groups of this release
    pub references: Vec<String>,
    /// type cursor, advanced by `###` headers
    #[serde(rename = "type")]
    pub active_type: Option<ChangeType>,
}

impl Release {
    pub fn new(version: impl Into<String>, date: impl Into<String>, line: usize) -> Self {
        Self {
            version: version.into(),
            date: date.into(),
            line,
            changes: Vec::new(),
            references: Vec::new(),
            active_type: None,
        }
    }

    pub fn has_type(&self, change_type: ChangeType) -> bool {
        self.group(change_type).is_some()
    }

    pub fn group(&self, change_type: ChangeType) -> Option<&ChangeGroup> {
        self.changes.iter().find(|g| g.change_type == change_type)
    }

    /// move the type cursor, opening the group on first use
    pub fn set_type(&mut self, change_type: ChangeType, line: usize) {
        if !self.has_type(change_type) {
            self.changes.push(ChangeGroup::new(change_type, line));
        }
        self.active_type = Some(change_type);
    }

    /// append an entry to the group under the type cursor
    ///
    /// returns false when no type is active
    pub fn add(&mut self, entry: impl Into<String>) -> bool {
        let Some(active) = self.active_type else {
            return false;
        };
        match self.changes.iter_mut().find(|g| g.change_type == active) {
            Some(group) => {
                group.entries.push(entry.into());
                true
            }
            None => false,
        }
    }

    pub fn add_reference(&mut self, key: impl Into<String>) {
        self.references.push(key.into());
    }

    /// calendar date of the release, if the date string is a real day
    pub fn parsed_date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(&self.date, "%Y-%m-%d").ok()
    }

    pub fn entry_count(&self) -> usize {
        self.changes.iter().map(|g| g.entries.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_change_type_from_str() {
        assert_eq!("Added".parse::<ChangeType>(), Ok(ChangeType::Added));
        assert_eq!("Security".parse::<ChangeType>(), Ok(ChangeType::Security));
        assert!("added".parse::<ChangeType>().is_err());
        assert!("Invalid".parse::<ChangeType>().is_err());
    }

    #[test]
    fn test_release_groups_keep_insertion_order() {
        let mut release = Release::new("1.0.0", "2017-06-20", 9);
        release.set_type(ChangeType::Fixed, 10);
        assert!(release.add("- a fix"));
        release.set_type(ChangeType::Added, 12);
        assert!(release.add("- a feature"));

        let order: Vec<_> = release.changes.iter().map(|g| g.change_type).collect();
        assert_eq!(order, vec![ChangeType::Fixed, ChangeType::Added]);
        assert_eq!(release.entry_count(), 2);
    }

    #[test]
    fn test_release_set_type_reuses_group() {
        let mut release = Release::new("1.0.0", "2017-06-20", 1);
        release.set_type(ChangeType::Added, 2);
        release.set_type(ChangeType::Changed, 4);
        release.set_type(ChangeType::Added, 6);
        assert!(release.add("- late entry"));

        assert_eq!(release.changes.len(), 2);
        let added = release.group(ChangeType::Added).unwrap();
        assert_eq!(added.line, 2);
        assert_eq!(added.entries, vec!["- late entry".to_string()]);
    }

    #[test]
    fn test_release_add_without_type() {
        let mut release = Release::new("1.0.0", "2017-06-20", 1);
        assert!(!release.add("- orphan"));
        assert!(release.changes.is_empty());
    }

    #[test]
    fn test_parsed_date() {
        assert!(Release::new("1.0.0", "2014-02-28", 1).parsed_date().is_some());
        assert!(Release::new("1.0.0", "2014-13-01", 1).parsed_date().is_none());
        assert!(Release::new("1.0.0", "2014-02-30", 1).parsed_date().is_none());
    }
}
