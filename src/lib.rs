// Convpatch - one-shot patcher for the takeControl ownership check
// Reads the conversation controller, splices the channel-permission
// access filter into the ownership query, writes the file back.

pub mod error;
pub mod patch;
pub mod utils;

use std::path::Path;

use anyhow::Result;
use similar::{ChangeTag, TextDiff};
use tracing::{debug, info};

use crate::patch::PatchOutcome;

pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

/// Initialize logging for CLI usage
pub fn init_logging() {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    fmt::Subscriber::builder()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    info!("Initializing convpatch v{}", version());
}

/// Run one read-transform-write cycle against `path`.
///
/// The file is always written back, even when nothing matched; a no-op
/// run rewrites it with byte-identical content. IO failures propagate
/// to the caller untouched.
pub fn run(path: impl AsRef<Path>) -> Result<PatchOutcome> {
    let path = path.as_ref();

    let original = utils::fs::read_file_to_string(path)?;
    let result = patch::apply(&original);

    if result.changes_made() {
        log_diff(&original, &result.content);
    }

    utils::fs::write_file_sync(path, &result.content)?;

    Ok(result.outcome)
}

/// Trace the applied change line by line
fn log_diff(old: &str, new: &str) {
    let diff = TextDiff::from_lines(old, new);

    for change in diff.iter_all_changes() {
        let sign = match change.tag() {
            ChangeTag::Delete => '-',
            ChangeTag::Insert => '+',
            ChangeTag::Equal => continue,
        };
        debug!("{}{}", sign, change.value().trim_end_matches('\n'));
    }
}
