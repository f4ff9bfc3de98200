use url::Url;

use crate::error::ChangelogError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Forge {
    GitHub,
    GitLab,
    Bitbucket,
    Gitea,
}

/// Hosting coordinates parsed from a manifest `repository` field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryInfo {
    pub forge: Forge,
    /// Scheme and host, e.g. `https://github.com`.
    pub host: String,
    pub owner: String,
    pub repository: String,
}

impl RepositoryInfo {
    /// Parses the forms npm accepts in `repository`: scp-like
    /// `git@host:owner/repo.git`, `git+ssh://`, `git+https://`, plain
    /// `https://` URLs and the `github:owner/repo` / `owner/repo` shorthands.
    ///
    /// # Errors
    ///
    /// Returns `ChangelogError::InvalidRepository` if no host and owner/repo
    /// pair can be extracted.
    pub fn parse(value: &str) -> Result<Self, ChangelogError> {
        let invalid = || ChangelogError::InvalidRepository {
            value: value.to_string(),
        };
        let trimmed = value.trim();

        if let Some((host, path)) = split_scp_like(trimmed) {
            let (owner, repository) = extract_owner_repo(path).ok_or_else(invalid)?;
            return Ok(Self::new(host, owner, repository));
        }

        if let Some(rest) = trimmed.strip_prefix("github:") {
            let (owner, repository) = extract_owner_repo(rest).ok_or_else(invalid)?;
            return Ok(Self::new("github.com", owner, repository));
        }

        if !trimmed.contains(':') {
            let (owner, repository) = extract_owner_repo(trimmed).ok_or_else(invalid)?;
            return Ok(Self::new("github.com", owner, repository));
        }

        let without_plus = trimmed.strip_prefix("git+").unwrap_or(trimmed);
        let url = Url::parse(without_plus).map_err(|_| invalid())?;
        let host = url.host_str().ok_or_else(invalid)?;
        let (owner, repository) = extract_owner_repo(url.path()).ok_or_else(invalid)?;

        Ok(Self::new(host, owner, repository))
    }

    fn new(host: &str, owner: String, repository: String) -> Self {
        Self {
            forge: detect_forge(host),
            host: format!("https://{host}"),
            owner,
            repository,
        }
    }

    #[must_use]
    pub fn repo_url(&self) -> String {
        format!("{}/{}/{}", self.host, self.owner, self.repository)
    }

    #[must_use]
    pub fn comparison_url(&self, base_tag: &str, target_tag: &str) -> String {
        let repo_url = self.repo_url();
        match self.forge {
            Forge::GitHub | Forge::Gitea => format!("{repo_url}/compare/{base_tag}...{target_tag}"),
            Forge::GitLab => format!("{repo_url}/-/compare/{base_tag}...{target_tag}"),
            Forge::Bitbucket => {
                format!("{repo_url}/branches/compare/{target_tag}..{base_tag}")
            }
        }
    }
}

fn split_scp_like(value: &str) -> Option<(&str, &str)> {
    if value.contains("://") {
        return None;
    }
    let (user_host, path) = value.split_once(':')?;
    let (_, host) = user_host.split_once('@')?;
    Some((host, path))
}

fn detect_forge(host: &str) -> Forge {
    let host_lower = host.to_lowercase();

    if host_lower == "gitlab.com"
        || host_lower.starts_with("gitlab.")
        || host_lower.contains(".gitlab.")
    {
        Forge::GitLab
    } else if host_lower == "bitbucket.org" || host_lower.ends_with(".bitbucket.org") {
        Forge::Bitbucket
    } else if host_lower == "codeberg.org" || host_lower.starts_with("gitea.") {
        Forge::Gitea
    } else {
        Forge::GitHub
    }
}

fn extract_owner_repo(path: &str) -> Option<(String, String)> {
    let path = path.trim_start_matches('/').trim_end_matches('/');
    let path = path.strip_suffix(".git").unwrap_or(path);

    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    match segments.as_slice() {
        [owner, repository, ..] => Some(((*owner).to_string(), (*repository).to_string())),
        _ => None,
    }
}
