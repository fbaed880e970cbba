// streaming changelog parser

use super::config::ParserConfig;
use super::diagnostics::ChangelogError;
use super::references::{ReferenceToken, extract_references};
use super::render::render_latest_changes;
use super::sanitizer::CommentSanitizer;
use super::types::{ChangeType, Release};
use chrono::{Local, NaiveDate};
use regex::Regex;
use std::cmp::Ordering;
use std::sync::LazyLock;
use tracing::{debug, trace, warn};

static RELEASE_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    // ascii digits only, `\d` would also accept other scripts
    Regex::new(r"^## \[([0-9]+\.[0-9]+\.[0-9]+)\] - ([0-9]{4}-[0-9]{2}-[0-9]{2})")
        .expect("valid release pattern")
});

static SECTION_HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^## \[([^\[\]]+)\]").expect("valid section pattern"));

static TYPE_HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^### (.+)$").expect("valid type pattern"));

const UNRELEASED: &str = "Unreleased";

/// a classifier reports whether it consumed the line
type LineClassifier = fn(&mut ChangelogParser, &str) -> bool;

/// single-pass parser and validator for one changelog document
///
/// feed it lines in document order with [`handle`](Self::handle) or
/// [`process`](Self::process), then call [`validate`](Self::validate) once.
#[derive(Debug, Clone)]
pub struct ChangelogParser {
    config: ParserConfig,
    line_number: usize,
    sanitizer: CommentSanitizer,
    current_release: Option<Release>,
    latest_release: Option<Release>,
    references: Vec<String>,
    references_available: Vec<(String, String)>,
    has_unreleased_section: bool,
    errors: Vec<ChangelogError>,
    is_valid: bool,
    validated: bool,
}

impl ChangelogParser {
    const CLASSIFIERS: [LineClassifier; 3] = [
        ChangelogParser::handle_release,
        ChangelogParser::handle_type,
        ChangelogParser::handle_content,
    ];

    pub fn new(config: ParserConfig) -> Self {
        Self {
            config,
            line_number: 0,
            sanitizer: CommentSanitizer::new(),
            current_release: None,
            latest_release: None,
            references: Vec::new(),
            references_available: Vec::new(),
            has_unreleased_section: false,
            errors: Vec::new(),
            is_valid: false,
            validated: false,
        }
    }

    /// feed a sequence of lines
    pub fn process<I>(&mut self, lines: I)
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        for line in lines {
            self.handle(line.as_ref());
        }
    }

    /// feed a single newline-stripped line
    pub fn handle(&mut self, line: &str) {
        self.line_number += 1;
        let line = self.sanitizer.sanitize(line);

        if !line.trim().is_empty() {
            for classify in Self::CLASSIFIERS {
                if classify(self, &line) {
                    break;
                }
            }
        }

        self.handle_references(&line);
    }

    fn handle_release(&mut self, line: &str) -> bool {
        if let Some(captures) = RELEASE_HEADER.captures(line) {
            let release = Release::new(&captures[1], &captures[2], self.line_number);
            if release.parsed_date().is_none() {
                self.errors
                    .push(ChangelogError::invalid_release_date(&release));
            }
            self.open_release(release);
            return true;
        }

        let Some(captures) = SECTION_HEADER.captures(line) else {
            return false;
        };

        let version = &captures[1];
        if version == UNRELEASED {
            self.has_unreleased_section = true;
            if self.current_release.is_some() {
                self.errors
                    .push(ChangelogError::UnreleasedSection { is_missing: false });
            }
        } else {
            self.errors.push(ChangelogError::InvalidRelease {
                version: version.to_string(),
                line: self.line_number,
            });
        }
        true
    }

    fn handle_type(&mut self, line: &str) -> bool {
        let Some(captures) = TYPE_HEADER.captures(line) else {
            return false;
        };

        let name = captures[1].trim_end();
        let line_number = self.line_number;

        match name.parse::<ChangeType>() {
            Ok(change_type) => {
                // types are only tracked inside a release
                if let Some(release) = self.current_release.as_mut() {
                    if release.has_type(change_type) {
                        self.errors.push(ChangelogError::ungrouped_type(
                            release,
                            change_type,
                            line_number,
                        ));
                    }
                    release.set_type(change_type, line_number);
                }
            }
            Err(_) => self.errors.push(ChangelogError::InvalidType {
                change_type: name.to_string(),
                line: line_number,
            }),
        }
        true
    }

    fn handle_content(&mut self, line: &str) -> bool {
        if let Some(release) = self.current_release.as_mut()
            && !release.add(line)
        {
            self.errors
                .push(ChangelogError::missing_type(release, self.line_number));
        }
        true
    }

    fn handle_references(&mut self, line: &str) {
        for token in extract_references(line) {
            match token {
                ReferenceToken::Usage(key) => {
                    if let Some(release) = self.current_release.as_mut()
                        && release.active_type.is_some()
                    {
                        release.add_reference(key.clone());
                    }
                    self.references.push(key);
                }
                ReferenceToken::Definition { key, target } => {
                    trace!(line = self.line_number, %key, %target, "reference defined");
                    match self.references_available.iter_mut().find(|(k, _)| *k == key) {
                        Some(entry) => entry.1 = target,
                        None => self.references_available.push((key, target)),
                    }
                }
            }
        }
    }

    /// finalize the current release and make `release` the current one
    fn open_release(&mut self, release: Release) {
        debug!(
            version = %release.version,
            date = %release.date,
            line = release.line,
            "release opened"
        );

        if let Some(previous) = self.current_release.take() {
            if is_version_regression(&release.version, &previous.version) {
                self.errors
                    .push(ChangelogError::invalid_release_version(&release, &previous));
            }
            self.errors.extend(completeness_errors(&previous));

            // the first release of the document is the newest one
            if self.latest_release.is_none() {
                self.latest_release = Some(previous);
            }
        }

        self.current_release = Some(release);
    }

    /// run the whole-document checks against the local calendar date
    pub fn validate(&mut self) -> bool {
        self.validate_at(Local::now().date_naive())
    }

    /// run the whole-document checks, using `today` for the release date check
    pub fn validate_at(&mut self, today: NaiveDate) -> bool {
        if self.validated {
            warn!("changelog was already validated, keeping the first verdict");
            return self.is_valid;
        }
        self.validated = true;

        if let Some(current) = self.current_release.as_ref() {
            let errors = completeness_errors(current);
            self.errors.extend(errors);
        }

        if !self.has_unreleased_section {
            self.errors
                .push(ChangelogError::UnreleasedSection { is_missing: true });
        }

        let Some(latest) = self.latest_release() else {
            self.errors.push(ChangelogError::NoRelease);
            return self.finish();
        };

        let outdated = (self.config.release_today && latest.parsed_date() != Some(today))
            .then(|| ChangelogError::outdated_release_date(latest));
        self.errors.extend(outdated);

        let reference_errors = self.reference_errors();
        self.errors.extend(reference_errors);

        self.finish()
    }

    fn finish(&mut self) -> bool {
        self.is_valid = self.errors.is_empty();
        debug!(
            lines = self.line_number,
            errors = self.errors.len(),
            valid = self.is_valid,
            "changelog validated"
        );
        self.is_valid
    }

    fn reference_errors(&self) -> Vec<ChangelogError> {
        let undefined = self
            .references
            .iter()
            .filter(|key| self.reference_target(key).is_none())
            .map(|key| ChangelogError::UndefinedReference { key: key.clone() });

        let unused = self
            .references_available
            .iter()
            .filter(|(key, _)| !self.references.contains(key))
            .map(|(key, _)| ChangelogError::UnusedReference { key: key.clone() });

        undefined.chain(unused).collect()
    }

    /// verdict of [`validate`](Self::validate); false until it ran
    pub fn is_valid(&self) -> bool {
        self.is_valid
    }

    pub fn is_validated(&self) -> bool {
        self.validated
    }

    pub fn errors(&self) -> &[ChangelogError] {
        &self.errors
    }

    /// the topmost dated release of the document
    pub fn latest_release(&self) -> Option<&Release> {
        self.latest_release
            .as_ref()
            .or(self.current_release.as_ref())
    }

    /// markdown summary of the changes in the latest release
    pub fn latest_changes(&self) -> String {
        match self.latest_release() {
            Some(release) => render_latest_changes(release, &self.references_available),
            None => String::new(),
        }
    }

    pub fn line_number(&self) -> usize {
        self.line_number
    }

    pub fn has_unreleased_section(&self) -> bool {
        self.has_unreleased_section
    }

    /// every reference usage in document order, duplicates included
    pub fn references(&self) -> &[String] {
        &self.references
    }

    /// defined references in order of first definition
    pub fn references_available(&self) -> &[(String, String)] {
        &self.references_available
    }

    pub fn reference_target(&self, key: &str) -> Option<&str> {
        self.references_available
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, target)| target.as_str())
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }
}

impl Default for ChangelogParser {
    fn default() -> Self {
        Self::new(ParserConfig::default())
    }
}

/// errors for a release that will not receive more changes
fn completeness_errors(release: &Release) -> Vec<ChangelogError> {
    if release.changes.is_empty() {
        return vec![ChangelogError::empty_release(release)];
    }

    release
        .changes
        .iter()
        .filter(|group| group.entries.is_empty())
        .map(|group| ChangelogError::empty_type(release, group.change_type, group.line))
        .collect()
}

fn compare_component(a: &str, b: &str) -> Ordering {
    let a = a.trim_start_matches('0');
    let b = b.trim_start_matches('0');
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

/// true when `older`, listed below `newer`, does not have a lower version
///
/// the first differing component decides. a component present on one side only
/// counts as a difference but never as a regression; equal versions regress.
pub fn is_version_regression(older: &str, newer: &str) -> bool {
    let older: Vec<&str> = older.split('.').collect();
    let newer: Vec<&str> = newer.split('.').collect();

    for i in 0..older.len().max(newer.len()) {
        match (older.get(i), newer.get(i)) {
            (Some(a), Some(b)) => match compare_component(a, b) {
                Ordering::Equal => continue,
                Ordering::Greater => return true,
                Ordering::Less => return false,
            },
            _ => return false,
        }
    }

    true
}
