#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagInfo {
    pub name: String,
    pub target_sha: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitInfo {
    pub sha: String,
    pub message: String,
}

/// Most recent release-tagged commit reachable from `HEAD`.
///
/// `tag` is `None` when no release tag exists, in which case `sha` is `HEAD`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaggedCommit {
    pub sha: String,
    pub tag: Option<String>,
}
