//! Downstream command execution.

use crate::commands::ListCommand;
use crate::errors::Result;

/// Applies list commands to the actual list instances
///
/// Implementations sit behind a [`CommandFilter`](crate::CommandFilter), which
/// guarantees the command's `from` version matches the list, so index validity
/// does not need to be re-checked here.
pub trait ListCommandExecutor {
    /// Apply `command`
    fn execute(&mut self, command: ListCommand) -> Result<()>;
}

impl<E: ListCommandExecutor + ?Sized> ListCommandExecutor for Box<E> {
    fn execute(&mut self, command: ListCommand) -> Result<()> {
        (**self).execute(command)
    }
}
