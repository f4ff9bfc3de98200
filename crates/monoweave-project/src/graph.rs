use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};

use monoweave_core::{DependencyKind, Workspace};

use crate::project::MonorepoProject;

/// Read-only snapshot of the monorepo workspaces and the edges between them.
pub trait WorkspaceGraph: Send + Sync {
    fn root(&self) -> &Path;

    /// All workspaces, top-level first.
    fn workspaces(&self) -> &[Workspace];

    fn top_level(&self) -> &Workspace;

    fn workspace_by_name(&self, name: &str) -> Option<&Workspace>;

    /// Direct dependents of `name` through regular or peer edges, and dev
    /// edges when `include_dev` is set.
    fn dependents_of(&self, name: &str, include_dev: bool) -> Vec<&Workspace>;

    /// Workspace whose directory most closely encloses `path`. Relative paths
    /// are taken from the project root.
    fn resolve_by_path(&self, path: &Path) -> Option<&Workspace>;
}

#[derive(Debug, Clone, Copy)]
struct Edge {
    dependent: usize,
    kind: DependencyKind,
}

/// Adjacency built once from a discovered project.
#[derive(Debug, Clone)]
pub struct InMemoryWorkspaceGraph {
    root: PathBuf,
    workspaces: Vec<Workspace>,
    by_name: HashMap<String, usize>,
    dependents: HashMap<String, Vec<Edge>>,
}

impl InMemoryWorkspaceGraph {
    /// An empty workspace list is padded with an anonymous private root.
    #[must_use]
    pub fn new(root: PathBuf, mut workspaces: Vec<Workspace>) -> Self {
        if workspaces.is_empty() {
            workspaces.push(Workspace {
                path: root.clone(),
                private: true,
                ..Workspace::default()
            });
        }

        let by_name: HashMap<String, usize> = workspaces
            .iter()
            .enumerate()
            .filter_map(|(index, ws)| ws.name.clone().map(|name| (name, index)))
            .collect();

        let mut dependents: HashMap<String, Vec<Edge>> = HashMap::new();
        for (index, ws) in workspaces.iter().enumerate() {
            for kind in [DependencyKind::Regular, DependencyKind::Peer, DependencyKind::Dev] {
                for dependency in ws.dependencies_of_kind(kind).keys() {
                    if by_name.contains_key(dependency) {
                        dependents.entry(dependency.clone()).or_default().push(Edge {
                            dependent: index,
                            kind,
                        });
                    }
                }
            }
        }

        Self {
            root,
            workspaces,
            by_name,
            dependents,
        }
    }
}

impl From<MonorepoProject> for InMemoryWorkspaceGraph {
    fn from(project: MonorepoProject) -> Self {
        Self::new(project.root, project.workspaces)
    }
}

impl WorkspaceGraph for InMemoryWorkspaceGraph {
    fn root(&self) -> &Path {
        &self.root
    }

    fn workspaces(&self) -> &[Workspace] {
        &self.workspaces
    }

    fn top_level(&self) -> &Workspace {
        &self.workspaces[0]
    }

    fn workspace_by_name(&self, name: &str) -> Option<&Workspace> {
        self.by_name.get(name).map(|&index| &self.workspaces[index])
    }

    fn dependents_of(&self, name: &str, include_dev: bool) -> Vec<&Workspace> {
        let Some(edges) = self.dependents.get(name) else {
            return Vec::new();
        };

        let indices: BTreeSet<usize> = edges
            .iter()
            .filter(|edge| include_dev || edge.kind != DependencyKind::Dev)
            .map(|edge| edge.dependent)
            .collect();

        indices.into_iter().map(|index| &self.workspaces[index]).collect()
    }

    fn resolve_by_path(&self, path: &Path) -> Option<&Workspace> {
        let absolute = if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        };

        self.workspaces
            .iter()
            .filter(|ws| absolute.starts_with(&ws.path))
            .max_by_key(|ws| ws.path.components().count())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn workspace(name: &str, path: &str) -> Workspace {
        Workspace {
            name: Some(name.to_string()),
            path: PathBuf::from(path),
            ..Workspace::default()
        }
    }

    fn graph() -> InMemoryWorkspaceGraph {
        let root = Workspace {
            path: PathBuf::from("/repo"),
            private: true,
            ..Workspace::default()
        };
        let a = workspace("pkg-a", "/repo/packages/a");
        let mut b = workspace("pkg-b", "/repo/packages/b");
        b.dependencies.insert("pkg-a".to_string(), "^1.0.0".to_string());
        let mut c = workspace("pkg-c", "/repo/packages/c");
        c.dev_dependencies.insert("pkg-a".to_string(), "^1.0.0".to_string());
        c.dependencies.insert("left-pad".to_string(), "^1.0.0".to_string());

        InMemoryWorkspaceGraph::new(PathBuf::from("/repo"), vec![root, a, b, c])
    }

    fn names(workspaces: &[&Workspace]) -> Vec<String> {
        workspaces.iter().filter_map(|ws| ws.name.clone()).collect()
    }

    #[test]
    fn dependents_respect_dev_flag() {
        let graph = graph();
        assert_eq!(names(&graph.dependents_of("pkg-a", false)), vec!["pkg-b"]);
        assert_eq!(
            names(&graph.dependents_of("pkg-a", true)),
            vec!["pkg-b", "pkg-c"]
        );
        assert!(graph.dependents_of("left-pad", true).is_empty());
    }

    #[test]
    fn resolve_by_path_picks_deepest_workspace() {
        let graph = graph();

        let ws = graph
            .resolve_by_path(Path::new("packages/b/src/index.js"))
            .expect("resolved");
        assert_eq!(ws.name.as_deref(), Some("pkg-b"));

        let ws = graph.resolve_by_path(Path::new("README.md")).expect("resolved");
        assert!(ws.name.is_none());

        assert!(graph.resolve_by_path(Path::new("/elsewhere/file")).is_none());
    }

    #[test]
    fn lookup_by_name() {
        let graph = graph();
        assert!(graph.workspace_by_name("pkg-c").is_some());
        assert!(graph.workspace_by_name("missing").is_none());
        assert!(graph.top_level().name.is_none());
    }
}
