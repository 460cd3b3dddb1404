//! Interactive prompts using dialoguer

use anyhow::Result;
use dialoguer::Confirm;
use std::path::Path;

/// Prompt user to confirm proceeding with an action
pub fn confirm_step(message: &str) -> Result<bool> {
    let confirmed = Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()?;
    Ok(confirmed)
}

/// Ask before replacing an existing output file.
///
/// Returns true straight away when the file does not exist or `no_confirm`
/// is set.
pub fn confirm_overwrite(path: &Path, no_confirm: bool) -> Result<bool> {
    if no_confirm || !path.exists() {
        return Ok(true);
    }
    confirm_step(&format!("{} already exists. Overwrite?", path.display()))
}
