pub mod hierarchy;
pub mod import;
pub mod list;
pub mod sync;

use anyhow::Result;
use catalog_sync::SessionOutcome;

/// Turn a session outcome into the command's exit status.
pub fn finish<T>(outcome: SessionOutcome<T>) -> Result<T> {
    match outcome {
        SessionOutcome::Completed(value) => Ok(value),
        SessionOutcome::Failed(error) => Err(error.into()),
        SessionOutcome::AlreadyRunning => anyhow::bail!("a session is already running"),
        SessionOutcome::Rejected(reason) => anyhow::bail!(reason),
    }
}
