use dialoguer::{Input, MultiSelect, Select};
use monoweave_core::StrategyType;
use monoweave_operations::operations::{ManualCandidates, PackageCandidate};

use crate::error::{CliError, Result};

const STRATEGIES: [StrategyType; 3] = [
    StrategyType::Patch,
    StrategyType::Minor,
    StrategyType::Major,
];

fn label(candidate: &PackageCandidate) -> String {
    match &candidate.current_version {
        Some(version) => format!("{} ({version})", candidate.name),
        None => format!("{} (unpublished)", candidate.name),
    }
}

/// Multi-select over every candidate with the touched packages pre-checked.
///
/// # Errors
///
/// Returns `CliError::Cancelled` when the prompt is dismissed.
pub fn select_packages(candidates: &ManualCandidates) -> Result<Vec<String>> {
    let all: Vec<&PackageCandidate> = candidates
        .suggested
        .iter()
        .chain(&candidates.remaining)
        .collect();
    let items: Vec<String> = all.iter().map(|candidate| label(candidate)).collect();
    let defaults: Vec<bool> = (0..all.len())
        .map(|i| i < candidates.suggested.len())
        .collect();

    let selection = MultiSelect::new()
        .with_prompt("Select packages to version")
        .items(&items)
        .defaults(&defaults)
        .interact_opt()?
        .ok_or(CliError::Cancelled)?;

    Ok(selection
        .into_iter()
        .filter_map(|i| all.get(i).map(|candidate| candidate.name.clone()))
        .collect())
}

/// # Errors
///
/// Returns `CliError::Cancelled` when the prompt is dismissed.
pub fn select_strategy(package_name: &str) -> Result<StrategyType> {
    let items = [
        "patch - Bug fixes (backwards compatible)",
        "minor - New features (backwards compatible)",
        "major - Breaking changes",
    ];

    let selection = Select::new()
        .with_prompt(format!("Select strategy for '{package_name}'"))
        .items(items)
        .default(0)
        .interact_opt()?
        .ok_or(CliError::Cancelled)?;

    STRATEGIES
        .get(selection)
        .copied()
        .ok_or(CliError::Cancelled)
}

/// # Errors
///
/// Returns an error if the terminal cannot be read.
pub fn input_changelog() -> Result<String> {
    let text: String = Input::new()
        .with_prompt("Changelog entry")
        .allow_empty(true)
        .interact_text()?;
    Ok(text)
}
