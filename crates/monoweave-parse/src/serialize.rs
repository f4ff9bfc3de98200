use monoweave_core::DeferredVersionRecord;
use sha2::{Digest, Sha256};

use crate::parse::FRONT_MATTER_DELIMITER;

const HASH_LENGTH: usize = 8;

/// Renders a deferred version file, listing strategies sorted by package name.
///
/// Missing strategies are written as an empty value so that they round-trip.
#[must_use]
pub fn serialize_deferred_version(record: &DeferredVersionRecord) -> String {
    let mut entries: Vec<_> = record.strategies.iter().collect();
    entries.sort_by(|(a, _), (b, _)| a.cmp(b));

    let mut lines = Vec::with_capacity(entries.len() + 3);
    lines.push(FRONT_MATTER_DELIMITER.to_string());
    for (name, strategy) in entries {
        match strategy {
            Some(strategy) => lines.push(format!("\"{name}\": {strategy}")),
            None => lines.push(format!("\"{name}\":")),
        }
    }
    lines.push(FRONT_MATTER_DELIMITER.to_string());
    lines.push(record.changelog.clone());

    lines.join("\n")
}

/// Lowercase hex SHA-256 digest of `content`.
#[must_use]
pub fn content_hash(content: &str) -> String {
    hex::encode(Sha256::digest(content.as_bytes()))
}

/// File name for a deferred version file: the first eight hex characters of
/// the content hash plus `.md`.
#[must_use]
pub fn deferred_version_file_name(content: &str) -> String {
    let hash = content_hash(content);
    format!("{}.md", &hash[..HASH_LENGTH])
}

#[cfg(test)]
mod tests {
    use indexmap::IndexMap;

    use super::*;
    use crate::parse::parse_deferred_version;

    fn record(strategies: &[(&str, Option<&str>)], changelog: &str) -> DeferredVersionRecord {
        DeferredVersionRecord {
            strategies: strategies
                .iter()
                .map(|(name, strategy)| ((*name).to_string(), strategy.map(str::to_string)))
                .collect::<IndexMap<_, _>>(),
            changelog: changelog.to_string(),
        }
    }

    #[test]
    fn sorts_strategies_by_name() {
        let output = serialize_deferred_version(&record(
            &[("pkg-b", Some("major")), ("pkg-a", Some("patch"))],
            "Changes.",
        ));

        assert_eq!(
            output,
            "---\n\"pkg-a\": patch\n\"pkg-b\": major\n---\nChanges."
        );
    }

    #[test]
    fn roundtrip() {
        let cases = [
            record(&[("pkg-1", Some("minor"))], "A feature.\n\nWith details.\n"),
            record(
                &[("@scope/b", Some("major")), ("a", None), ("c", Some("patch"))],
                "",
            ),
            record(&[], "---\nbody with a delimiter"),
        ];

        for original in cases {
            let parsed =
                parse_deferred_version(&serialize_deferred_version(&original)).expect("parses");
            assert_eq!(parsed, original);
        }
    }

    #[test]
    fn roundtrip_keeps_crlf_changelog() {
        let original = record(&[("pkg", Some("patch"))], "a\r\nb\r\n");

        let parsed =
            parse_deferred_version(&serialize_deferred_version(&original)).expect("parses");

        assert_eq!(parsed.changelog, "a\r\nb\r\n");
        assert_eq!(parsed, original);
    }

    #[test]
    fn file_name_is_short_content_hash() {
        let name = deferred_version_file_name("---\n\"pkg\": patch\n---\n");

        assert_eq!(name.len(), HASH_LENGTH + 3);
        assert!(name.ends_with(".md"));
        assert!(name[..HASH_LENGTH].chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(name, deferred_version_file_name("---\n\"pkg\": patch\n---\n"));
        assert_ne!(name, deferred_version_file_name("---\n\"pkg\": minor\n---\n"));
    }
}
