// latest changes rendering

use super::references::strip_definitions;
use super::types::Release;

/// render the change groups of `release` followed by the references they use
///
/// reference definitions that ended up inside entries are dropped, and only
/// references with a known target are listed.
pub fn render_latest_changes(release: &Release, definitions: &[(String, String)]) -> String {
    let mut lines = Vec::new();

    for group in &release.changes {
        lines.push(format!("### {}", group.change_type));
        for entry in &group.entries {
            let entry = strip_definitions(entry);
            let entry = entry.trim_end();
            if !entry.is_empty() {
                lines.push(entry.to_string());
            }
        }
        lines.push(String::new());
    }

    let mut listed: Vec<&str> = Vec::new();
    for key in &release.references {
        if listed.contains(&key.as_str()) {
            continue;
        }
        listed.push(key);
        if let Some((_, target)) = definitions.iter().find(|(k, _)| k == key) {
            lines.push(format!("[{}]: {}", key, target));
        }
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::changelog::types::ChangeType;

    #[test]
    fn test_render_groups_in_order() {
        let mut release = Release::new("1.0.0", "2017-06-20", 9);
        release.set_type(ChangeType::Added, 10);
        release.add("- Stuff added");
        release.add("- Other stuff added");

        assert_eq!(
            render_latest_changes(&release, &[]),
            "### Added\n- Stuff added\n- Other stuff added\n"
        );
    }

    #[test]
    fn test_render_strips_definitions_and_lists_used_references() {
        let mut release = Release::new("1.0.0", "2017-06-20", 1);
        release.set_type(ChangeType::Fixed, 2);
        release.add("- Fixed [#1] twice [#1]   ");
        release.add_reference("#1");
        release.add_reference("#1");
        release.set_type(ChangeType::Security, 4);
        release.add("- Patched [cve]");
        release.add_reference("cve");
        release.add("[#1]: https://example.com/1");

        let definitions = vec![
            ("#1".to_string(), "https://example.com/1".to_string()),
            ("other".to_string(), "https://example.com/other".to_string()),
        ];

        assert_eq!(
            render_latest_changes(&release, &definitions),
            "### Fixed\n- Fixed [#1] twice [#1]\n\n### Security\n- Patched [cve]\n\n[#1]: https://example.com/1"
        );
    }
}
