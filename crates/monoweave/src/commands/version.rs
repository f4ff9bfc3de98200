use std::path::Path;
use std::sync::Arc;

use indexmap::IndexMap;
use monoweave_core::{DeferredVersionRecord, StrategyType};
use monoweave_operations::operations::{
    ManualCandidates, ensure_manual_mode, manual_candidates, write_version_file,
};
use monoweave_operations::providers::{FileSystemProjectProvider, Git2Provider};
use monoweave_operations::traits::ProjectProvider;
use monoweave_registry::{HttpRegistryClient, RegistryClient};
use tracing::{debug, info};

use super::{GlobalArgs, VersionArgs, load_config, runtime};
use crate::environment::non_interactive_reason;
use crate::error::{CliError, Result};
use crate::interaction;

pub(crate) fn run(args: &VersionArgs, global: &GlobalArgs, start_path: &Path) -> Result<()> {
    let config = load_config(global, &args.config, start_path)?;
    ensure_manual_mode(&config)?;

    let graph = FileSystemProjectProvider::new().discover(
        &config.cwd,
        config.package_group_manifest_field.as_deref(),
    )?;
    let registry: Arc<dyn RegistryClient> = Arc::new(HttpRegistryClient::new()?);
    let candidates = runtime()?.block_on(manual_candidates(
        &Git2Provider::new(),
        registry,
        graph.as_ref(),
        &config,
    ))?;

    let prompted = args.strategies.is_empty();
    let strategies = if prompted {
        prompt_strategies(&candidates)?
    } else {
        parse_assignments(&args.strategies, &candidates)?
    };
    if strategies.is_empty() {
        return Err(CliError::NothingSelected);
    }

    let changelog = match &args.message {
        Some(message) => message.clone(),
        None if prompted => interaction::input_changelog()?,
        None => String::new(),
    };
    let record = DeferredVersionRecord {
        strategies: strategies
            .into_iter()
            .map(|(name, strategy)| (name, Some(strategy.to_string())))
            .collect(),
        changelog,
    };

    if config.skip_writes() {
        info!(
            "[Dry Run] [Version] Would write {} package(s) to {}",
            record.strategies.len(),
            candidates.version_folder.display()
        );
        return Ok(());
    }

    let path = write_version_file(&config, &record)?;
    println!("{}", path.display());
    Ok(())
}

fn prompt_strategies(candidates: &ManualCandidates) -> Result<IndexMap<String, StrategyType>> {
    if let Some(reason) = non_interactive_reason() {
        debug!("Not prompting: {reason}");
        return Err(CliError::NotATty);
    }

    let mut strategies = IndexMap::new();
    for name in interaction::select_packages(candidates)? {
        let strategy = interaction::select_strategy(&name)?;
        strategies.insert(name, strategy);
    }
    Ok(strategies)
}

/// Parses `<package>=<strategy>` pairs, rejecting packages that cannot be
/// released. The last assignment for a package wins.
fn parse_assignments(
    assignments: &[String],
    candidates: &ManualCandidates,
) -> Result<IndexMap<String, StrategyType>> {
    let mut strategies = IndexMap::new();

    for assignment in assignments {
        let invalid = || CliError::StrategyAssignment(assignment.clone());
        let (name, token) = assignment.rsplit_once('=').ok_or_else(invalid)?;
        let strategy: StrategyType = token.parse().map_err(|_| invalid())?;
        if strategy == StrategyType::None {
            return Err(invalid());
        }

        let known = candidates
            .suggested
            .iter()
            .chain(&candidates.remaining)
            .any(|candidate| candidate.name == name);
        if !known {
            return Err(CliError::UnknownPackage(name.to_string()));
        }
        strategies.insert(name.to_string(), strategy);
    }

    Ok(strategies)
}
