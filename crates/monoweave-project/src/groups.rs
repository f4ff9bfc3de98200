use std::collections::{BTreeMap, BTreeSet};

use monoweave_core::Workspace;

use crate::graph::WorkspaceGraph;

/// Group key of a workspace: its group manifest field, or its own name.
#[must_use]
pub fn group_key(workspace: &Workspace) -> Option<&str> {
    workspace.group.as_deref().or(workspace.name.as_deref())
}

/// Publishable workspaces keyed by group. Ungrouped packages form a group of
/// one under their own name.
#[must_use]
pub fn workspace_groups(graph: &dyn WorkspaceGraph) -> BTreeMap<String, BTreeSet<String>> {
    let mut groups: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();

    for workspace in graph.workspaces() {
        if !workspace.is_publishable() {
            continue;
        }
        let (Some(key), Some(name)) = (group_key(workspace), &workspace.name) else {
            continue;
        };
        groups.entry(key.to_string()).or_default().insert(name.clone());
    }

    groups
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::graph::InMemoryWorkspaceGraph;

    fn workspace(name: &str, group: Option<&str>, private: bool) -> Workspace {
        Workspace {
            name: Some(name.to_string()),
            group: group.map(str::to_string),
            private,
            path: PathBuf::from(format!("/repo/packages/{name}")),
            ..Workspace::default()
        }
    }

    #[test]
    fn groups_by_field_or_name() {
        let graph = InMemoryWorkspaceGraph::new(
            PathBuf::from("/repo"),
            vec![
                Workspace {
                    path: PathBuf::from("/repo"),
                    private: true,
                    ..Workspace::default()
                },
                workspace("pkg-a", Some("core"), false),
                workspace("pkg-b", Some("core"), false),
                workspace("pkg-c", None, false),
                workspace("pkg-d", Some("core"), true),
            ],
        );

        let groups = workspace_groups(&graph);

        assert_eq!(groups.len(), 2);
        assert_eq!(
            groups["core"].iter().map(String::as_str).collect::<Vec<_>>(),
            vec!["pkg-a", "pkg-b"]
        );
        assert!(groups["pkg-c"].contains("pkg-c"));
    }
}
