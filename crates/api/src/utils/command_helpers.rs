//! Command execution helpers
//!
//! Every route delegates to a core service through [`execute_command`] so
//! that timing and outcome logging look the same across the API.

use std::future::Future;
use std::time::Instant;

use showup_domain::Result as DomainResult;

use crate::utils::logging::log_command_execution;

/// Run a command future, logging its outcome and elapsed time.
///
/// # Example
///
/// ```rust,ignore
/// let summary = execute_command("settlement::settle", ctx.settlement.settle(&id)).await?;
/// ```
pub async fn execute_command<Fut, T>(command_name: &str, command: Fut) -> DomainResult<T>
where
    Fut: Future<Output = DomainResult<T>>,
{
    let start = Instant::now();
    let result = command.await;

    log_command_execution(command_name, start.elapsed(), result.as_ref().err());
    result
}
