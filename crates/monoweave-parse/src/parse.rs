use indexmap::IndexMap;
use serde::Deserialize;
use serde_with::{MapPreventDuplicates, serde_as};

use monoweave_core::DeferredVersionRecord;

use crate::error::{FormatError, FrontMatterError, ValidationError};

pub(crate) const FRONT_MATTER_DELIMITER: &str = "---";

const MAX_INPUT_SIZE: usize = 10 * 1024 * 1024;

#[serde_as]
#[derive(Deserialize)]
struct StrategiesMap {
    #[serde(flatten)]
    #[serde_as(as = "MapPreventDuplicates<_, _>")]
    strategies: IndexMap<String, Option<serde_yml::Value>>,
}

fn scalar_token(value: Option<serde_yml::Value>) -> Option<String> {
    match value? {
        serde_yml::Value::Null => None,
        serde_yml::Value::String(s) => Some(s),
        serde_yml::Value::Bool(b) => Some(b.to_string()),
        serde_yml::Value::Number(n) => Some(n.to_string()),
        // Non-scalar values are kept in a form that fails strategy validation.
        other => Some(format!("{other:?}")),
    }
}

fn without_cr(line: &str) -> &str {
    line.strip_suffix('\r').unwrap_or(line)
}

/// Parses a deferred version file.
///
/// The first line must be `---`. Lines up to the next `---` line form a YAML
/// mapping of package name to strategy token; every line after it is the
/// changelog body, kept verbatim. Delimiter and front matter lines may end
/// in `\r\n`.
///
/// # Errors
///
/// Returns [`FormatError`] when a delimiter is missing, the front matter is not
/// a mapping, a package is listed twice, or the input is too large.
#[must_use = "parsing result should be handled"]
pub fn parse_deferred_version(content: &str) -> Result<DeferredVersionRecord, FormatError> {
    if content.len() > MAX_INPUT_SIZE {
        return Err(ValidationError::InputTooLarge {
            max_bytes: MAX_INPUT_SIZE,
        }
        .into());
    }

    let mut lines = content.split('\n');

    if lines.next().map(without_cr) != Some(FRONT_MATTER_DELIMITER) {
        return Err(FrontMatterError::MissingOpeningDelimiter.into());
    }

    let mut front_matter = Vec::new();
    let mut sealed = false;
    for line in lines.by_ref().map(without_cr) {
        if line == FRONT_MATTER_DELIMITER {
            sealed = true;
            break;
        }
        front_matter.push(line);
    }

    if !sealed {
        return Err(FrontMatterError::MissingClosingDelimiter.into());
    }

    let changelog = lines.collect::<Vec<_>>().join("\n");
    let yaml = front_matter.join("\n");

    let strategies = if yaml.trim().is_empty() {
        IndexMap::new()
    } else {
        let value: serde_yml::Value = serde_yml::from_str(&yaml)?;
        if !value.is_mapping() {
            return Err(ValidationError::NotAMapping.into());
        }
        let parsed: StrategiesMap = serde_yml::from_str(&yaml)?;
        parsed
            .strategies
            .into_iter()
            .map(|(name, value)| (name, scalar_token(value)))
            .collect()
    };

    Ok(DeferredVersionRecord {
        strategies,
        changelog,
    })
}
