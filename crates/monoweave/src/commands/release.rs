use std::path::Path;
use std::sync::Arc;

use monoweave_operations::operations::{
    ReleaseInput, ReleaseOperation, ReleaseOutcome, ReleaseOutput, highest_strategy,
};
use monoweave_operations::providers::{
    FileSystemChangelogWriter, FileSystemManifestWriter, FileSystemProjectProvider, Git2Provider,
    ProcessScriptRunner,
};
use monoweave_registry::{HttpRegistryClient, RegistryClient};
use tracing::info;

use super::{GlobalArgs, ReleaseArgs, load_config, runtime};
use crate::error::Result;

pub(crate) fn run(args: &ReleaseArgs, global: &GlobalArgs, start_path: &Path) -> Result<()> {
    let config = load_config(global, &args.config, start_path)?;
    let registry: Arc<dyn RegistryClient> = Arc::new(HttpRegistryClient::new()?);

    let operation = ReleaseOperation::new(
        FileSystemProjectProvider::new(),
        Git2Provider::new(),
        FileSystemManifestWriter::new(),
        FileSystemChangelogWriter::new(),
        ProcessScriptRunner::new(),
        registry,
    );
    let input = ReleaseInput {
        refresh_changelogs: args.refresh_changelogs,
    };

    let mut stdout = std::io::stdout();
    let outcome = runtime()?.block_on(operation.execute(&config, &input, &mut stdout))?;

    report(&outcome);
    Ok(())
}

fn report(outcome: &ReleaseOutcome) {
    match outcome {
        ReleaseOutcome::NothingToRelease => info!("Nothing to release."),
        ReleaseOutcome::DryRun(output) => {
            info!("[Dry Run] No files were changed.");
            report_output(output);
        }
        ReleaseOutcome::Executed(output) => {
            report_output(output);
            info!("Release complete.");
        }
    }
}

fn report_output(output: &ReleaseOutput) {
    info!(
        "{} package(s), highest strategy {}",
        output.changeset.len(),
        highest_strategy(&output.changeset)
    );
    for (name, record) in &output.changeset {
        info!(
            "  {name} {} -> {}",
            record.previous_version.as_deref().unwrap_or("(none)"),
            record.version
        );
    }
    if let Some(commit) = &output.commit {
        info!("Committed {}", commit.sha);
    }
    if !output.tags.is_empty() {
        info!("Tagged {} release(s)", output.tags.len());
    }
}
