use std::collections::{BTreeSet, VecDeque};

use monoweave_core::{StrategyMap, VersionStrategy};
use monoweave_project::WorkspaceGraph;

/// Patch strategies for every publishable transitive dependent of an
/// explicitly bumped package that is not itself explicit.
///
/// Private dependents are neither bumped nor traversed through.
#[must_use]
pub fn implicit_strategies(
    graph: &dyn WorkspaceGraph,
    explicit: &StrategyMap,
    include_dev: bool,
) -> StrategyMap {
    let mut visited: BTreeSet<String> = explicit.keys().cloned().collect();
    let mut queue: VecDeque<String> = explicit.keys().cloned().collect();
    let mut implicit = StrategyMap::new();

    while let Some(name) = queue.pop_front() {
        for dependent in graph.dependents_of(&name, include_dev) {
            if dependent.private {
                continue;
            }
            let Some(dependent_name) = &dependent.name else {
                continue;
            };
            if !visited.insert(dependent_name.clone()) {
                continue;
            }

            implicit.insert(dependent_name.clone(), VersionStrategy::implicit());
            queue.push_back(dependent_name.clone());
        }
    }

    implicit
}
