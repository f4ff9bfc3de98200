mod changelog_files;
mod changeset;
mod changeset_file;
mod git_release;
mod hooks;
mod lifecycle;
mod manifests;
mod registry_tags;
mod release;
mod version_files;

pub use changelog_files::{
    PACKAGE_DIR_TOKEN, changelog_targets, refresh_changelogs, write_changelogs,
};
pub use changeset::{ChangesetBuilder, highest_strategy};
pub use changeset_file::{STDOUT_FILENAME, serialize_changeset, write_changeset_file};
pub use git_release::{commit_release, create_release_tags, push_release, release_tags};
pub use hooks::run_release_hooks;
pub use lifecycle::{PackageJobs, lifecycle_jobs, run_jobs, run_lifecycle_scripts};
pub use manifests::{PatchedManifests, manifest_patches, patch_manifests, restore_manifests};
pub use registry_tags::{latest_tags, tag_requests};
pub use release::{ReleaseInput, ReleaseOperation, ReleaseOutcome, ReleaseOutput};
pub use version_files::{
    ManualCandidates, PackageCandidate, ensure_manual_mode, manual_candidates, write_version_file,
};
