use std::sync::LazyLock;

use indexmap::IndexMap;
use regex::Regex;

use monoweave_core::{CommitMessage, StrategyType};

use crate::config::ConventionalRules;
use crate::writer::TemplateContext;

static HEADER: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^(\w+)(?:\([^)]*\))?(!)?: ").ok());

const BREAKING_TOKEN: &str = "BREAKING CHANGE";

/// Built-in classifier used when no conventional config is set.
///
/// `BREAKING CHANGE` anywhere or a `!` after the type is major, `feat` is
/// minor, `fix` and `perf` are patch, anything else bumps nothing.
#[must_use]
pub fn classify_default(body: &str) -> StrategyType {
    if body.contains(BREAKING_TOKEN) {
        return StrategyType::Major;
    }

    let header = body.lines().next().unwrap_or_default();
    let Some(captures) = HEADER.as_ref().and_then(|re| re.captures(header)) else {
        return StrategyType::None;
    };
    if captures.get(2).is_some() {
        return StrategyType::Major;
    }

    match captures[1].to_ascii_lowercase().as_str() {
        "feat" => StrategyType::Minor,
        "fix" | "perf" => StrategyType::Patch,
        _ => StrategyType::None,
    }
}

pub(crate) fn classify_conventional(rules: &ConventionalRules, body: &str) -> StrategyType {
    let Ok(commit) = git_conventional::Commit::parse(body.trim()) else {
        return StrategyType::None;
    };

    let by_type = rules
        .types
        .get(commit.type_().as_str())
        .copied()
        .unwrap_or_default();

    if commit.breaking() {
        by_type.merge(rules.breaking)
    } else {
        by_type
    }
}

struct Item {
    scope: Option<String>,
    text: String,
    sha: String,
}

/// Renders commits into sections keyed by commit type, plus a breaking
/// changes section. Returns `None` when no commit lands in any section.
#[must_use]
pub fn write_conventional(
    commits: &[CommitMessage],
    context: &TemplateContext,
    rules: &ConventionalRules,
) -> Option<String> {
    let mut sections: IndexMap<&str, Vec<Item>> = IndexMap::new();
    let mut breaking = Vec::new();

    for message in commits {
        let Ok(commit) = git_conventional::Commit::parse(message.body.trim()) else {
            continue;
        };
        let scope = commit.scope().map(|s| s.to_string());

        if commit.breaking() {
            let note = commit
                .breaking_description()
                .unwrap_or_else(|| commit.description());
            breaking.push(Item {
                scope: scope.clone(),
                text: note.to_string(),
                sha: message.sha.clone(),
            });
        }

        if let Some((key, _)) = rules.sections.get_key_value(commit.type_().as_str()) {
            sections.entry(key.as_str()).or_default().push(Item {
                scope,
                text: commit.description().to_string(),
                sha: message.sha.clone(),
            });
        }
    }

    if sections.is_empty() && breaking.is_empty() {
        return None;
    }

    let commits_url = context.link_base().map(|base| format!("{base}/commits"));
    let mut lines = vec![context.heading(), String::new()];

    for (ty, title) in &rules.sections {
        let Some(items) = sections.get(ty.as_str()) else {
            continue;
        };
        lines.push(format!("### {title}"));
        lines.push(String::new());
        lines.extend(items.iter().map(|item| render_item(item, commits_url.as_deref())));
        lines.push(String::new());
    }

    if !breaking.is_empty() {
        lines.push("### BREAKING CHANGES".to_string());
        lines.push(String::new());
        lines.extend(breaking.iter().map(|item| render_item(item, None)));
        lines.push(String::new());
    }

    Some(lines.join("\n").trim_end().to_string())
}

fn render_item(item: &Item, commits_url: Option<&str>) -> String {
    let mut line = String::from("* ");
    if let Some(scope) = &item.scope {
        line.push_str(&format!("**{scope}:** "));
    }
    line.push_str(&item.text);

    if let Some(url) = commits_url {
        let short: String = item.sha.chars().take(7).collect();
        line.push_str(&format!(" ([{short}]({url}/{}))", item.sha));
    }
    line
}
