use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use monoweave_core::Changeset;
use monoweave_project::{MonoweaveConfig, WorkspaceGraph};
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::Result;
use crate::error::OperationError;
use crate::traits::{ScriptJob, ScriptRunner};

/// Scripts of one package and the released packages it must wait for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageJobs {
    pub jobs: Vec<ScriptJob>,
    pub depends_on: BTreeSet<String>,
}

/// Script jobs for every released package, in `scripts` order. Packages only
/// wait on each other when topological ordering is enabled.
#[must_use]
pub fn lifecycle_jobs(
    graph: &dyn WorkspaceGraph,
    config: &MonoweaveConfig,
    changeset: &Changeset,
    scripts: &[String],
) -> BTreeMap<String, PackageJobs> {
    let mut plan = BTreeMap::new();

    for name in changeset.keys() {
        let Some(workspace) = graph.workspace_by_name(name) else {
            continue;
        };
        if !workspace.is_publishable() {
            continue;
        }

        let jobs = scripts
            .iter()
            .filter_map(|script| {
                let command = workspace.scripts.get(script)?;
                Some(ScriptJob {
                    package: name.clone(),
                    directory: workspace.path.clone(),
                    script: script.clone(),
                    command: command.clone(),
                })
            })
            .collect();

        let depends_on = if config.topological {
            changeset
                .keys()
                .filter(|other| *other != name)
                .filter(|other| workspace.depends_on(other, config.topological_dev))
                .cloned()
                .collect()
        } else {
            BTreeSet::new()
        };

        plan.insert(name.clone(), PackageJobs { jobs, depends_on });
    }

    plan
}

async fn run_package<R: ScriptRunner + ?Sized>(runner: Arc<R>, jobs: Vec<ScriptJob>) -> Result<()> {
    for job in jobs {
        debug!("[Lifecycle] {} {}", job.package, job.script);
        runner.run(job).await?;
    }
    Ok(())
}

/// Runs the plan with at most `jobs` packages in flight (0 is unbounded). A
/// package starts once every package it depends on has finished. On a cycle
/// the lowest-named waiting package is released. The first failure stops
/// scheduling; packages already running are awaited.
///
/// # Errors
///
/// Returns the first script failure.
pub async fn run_jobs<R: ScriptRunner + ?Sized + 'static>(
    runner: Arc<R>,
    mut pending: BTreeMap<String, PackageJobs>,
    jobs: usize,
) -> Result<()> {
    let limit = if jobs == 0 { usize::MAX } else { jobs };
    let mut completed: BTreeSet<String> = BTreeSet::new();
    let mut running: JoinSet<(String, Result<()>)> = JoinSet::new();
    let mut failure: Option<OperationError> = None;

    loop {
        while failure.is_none() && running.len() < limit && !pending.is_empty() {
            let ready = pending
                .iter()
                .find(|(_, package)| package.depends_on.is_subset(&completed))
                .map(|(name, _)| name.clone());

            let next = match ready {
                Some(name) => name,
                None if running.is_empty() => {
                    let Some(name) = pending.keys().next().cloned() else {
                        break;
                    };
                    warn!("[Lifecycle] Dependency cycle detected, releasing {name}");
                    name
                }
                None => break,
            };

            let Some(package) = pending.remove(&next) else {
                break;
            };
            let runner = Arc::clone(&runner);
            running.spawn(async move {
                let result = run_package(runner, package.jobs).await;
                (next, result)
            });
        }

        let Some(joined) = running.join_next().await else {
            break;
        };
        let (name, result) = joined?;
        match result {
            Ok(()) => {
                completed.insert(name);
            }
            Err(err) => {
                if failure.is_none() {
                    warn!("[Lifecycle] {name} failed, not starting further packages");
                    failure = Some(err);
                }
            }
        }
    }

    match failure {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

/// Runs `scripts` for every released package. Skipped in dry run.
///
/// # Errors
///
/// Returns the first script failure.
pub async fn run_lifecycle_scripts<R: ScriptRunner + ?Sized + 'static>(
    runner: Arc<R>,
    graph: &dyn WorkspaceGraph,
    config: &MonoweaveConfig,
    changeset: &Changeset,
    scripts: &[String],
) -> Result<()> {
    if config.dry_run {
        info!("[Dry Run] [Lifecycle] Skipping {}", scripts.join(", "));
        return Ok(());
    }

    let plan = lifecycle_jobs(graph, config, changeset, scripts);
    run_jobs(runner, plan, config.jobs).await
}
