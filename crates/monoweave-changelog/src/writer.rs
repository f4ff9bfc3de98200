use std::sync::LazyLock;

use chrono::{Local, NaiveDate};
use regex::Regex;

use monoweave_core::CommitMessage;

use crate::config::ChangelogMode;
use crate::conventional::write_conventional;
use crate::forge::RepositoryInfo;

static COMMIT_HEADER: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^(\w*)(?:\((.*)\))?: (.*)$").ok());

static NOTE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?i)^(revert|note|breaking change):\s").ok());

/// Values available to changelog writers for one package release.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateContext {
    pub version: String,
    pub title: String,
    pub host: String,
    pub owner: String,
    pub repository: String,
    pub repo_url: String,
    pub current_tag: String,
    pub previous_tag: Option<String>,
    pub date: NaiveDate,
}

impl TemplateContext {
    /// Builds the context for `package_name` moving to `version`. The owner
    /// falls back to the manifest author when the repository is unknown.
    #[must_use]
    pub fn new(
        package_name: &str,
        version: &str,
        previous_version: Option<&str>,
        repository: Option<&RepositoryInfo>,
        author: Option<&str>,
    ) -> Self {
        Self {
            version: version.to_string(),
            title: package_name.to_string(),
            host: repository.map(|r| r.host.clone()).unwrap_or_default(),
            owner: repository
                .map(|r| r.owner.clone())
                .or_else(|| author.map(str::to_string))
                .unwrap_or_default(),
            repository: repository.map(|r| r.repository.clone()).unwrap_or_default(),
            repo_url: repository.map(RepositoryInfo::repo_url).unwrap_or_default(),
            current_tag: format!("{package_name}@{version}"),
            previous_tag: previous_version.map(|prev| format!("{package_name}@{prev}")),
            date: Local::now().date_naive(),
        }
    }

    #[must_use]
    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = date;
        self
    }

    /// Base URL for commit and comparison links, if the repository is known.
    pub(crate) fn link_base(&self) -> Option<String> {
        if !self.repo_url.is_empty() {
            Some(self.repo_url.clone())
        } else if !self.repository.is_empty() {
            Some(self.repository.clone())
        } else if !self.host.is_empty() && !self.owner.is_empty() {
            Some(format!("{}/{}", self.host, self.owner))
        } else {
            None
        }
    }

    /// `## [version](compare) "title" (date) <a name="version"></a>`; the
    /// compare link is only present with a known repository and previous tag.
    pub(crate) fn heading(&self) -> String {
        let version = &self.version;
        let link = match (self.link_base(), &self.previous_tag) {
            (Some(base), Some(previous)) => {
                format!("[{version}]({base}/compare/{previous}...{})", self.current_tag)
            }
            _ => format!("[{version}]"),
        };
        format!(
            "## {link} \"{}\" ({}) <a name=\"{version}\"></a>",
            self.title,
            self.date.format("%Y-%m-%d")
        )
    }
}

/// Plain writer used without a conventional config. Every commit line that
/// looks like `type(scope): subject` goes under "Changes" (except `wip`),
/// lines starting with `revert:`, `note:` or `breaking change:` go under
/// "Notes". Returns `None` when neither section has content.
#[must_use]
pub fn write_default(commits: &[CommitMessage], context: &TemplateContext) -> Option<String> {
    let base = context.link_base();
    let mut changes = Vec::new();
    let mut notes = Vec::new();

    for commit in commits {
        let short_sha: String = commit.sha.chars().take(8).collect();
        let sha_link = match &base {
            Some(url) => format!("[{short_sha}]({url}/commits/{short_sha})"),
            None => format!("[{short_sha}]"),
        };

        for line in commit.body.split('\n') {
            if let Some(captures) = COMMIT_HEADER.as_ref().and_then(|re| re.captures(line)) {
                let commit_type = captures.get(1).map_or("", |m| m.as_str());
                if commit_type.is_empty() || commit_type.eq_ignore_ascii_case("wip") {
                    continue;
                }
                changes.push(format!("* {line} ({sha_link})"));
                continue;
            }

            if NOTE.as_ref().is_some_and(|re| re.is_match(line)) {
                notes.push(format!("* {line} ({sha_link})"));
            }
        }
    }

    let mut lines = Vec::new();
    if !changes.is_empty() {
        lines.push("### Changes".to_string());
        lines.push(String::new());
        lines.append(&mut changes);
        if !notes.is_empty() {
            lines.push(String::new());
        }
    }
    if !notes.is_empty() {
        lines.push("### Notes".to_string());
        lines.push(String::new());
        lines.append(&mut notes);
    }

    if lines.is_empty() {
        return None;
    }

    let mut entry = vec![context.heading(), String::new()];
    entry.append(&mut lines);
    Some(entry.join("\n"))
}

/// Entry for a manually authored changelog.
#[must_use]
pub fn manual_entry(package_name: &str, version: &str, text: &str) -> String {
    format!("## {package_name} (v{version}) <a name=\"{version}\"></a>\n\n{text}\n")
}

/// Generates the changelog entry for one package from its commits. Returns
/// `None` for an empty commit list or when nothing notable happened.
#[must_use]
pub fn generate_entry(
    mode: &ChangelogMode,
    commits: &[CommitMessage],
    context: &TemplateContext,
) -> Option<String> {
    if commits.is_empty() {
        return None;
    }

    match mode {
        ChangelogMode::Conventional(rules) => write_conventional(commits, context, rules),
        ChangelogMode::Default | ChangelogMode::Manual => write_default(commits, context),
    }
}
