//! Command dispatch: bridges CLI args -> client calls -> output formatting.

pub mod auth;
pub mod cloud;
pub mod config_cmd;
pub mod device;
pub mod init;
pub mod logout;

use fhsync_core::{Client, CoreError};
use tracing::warn;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a client-bound command to the appropriate handler.
pub async fn dispatch(cmd: Command, client: &Client, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        Command::Init(args) => init::handle(client, args, global).await,
        Command::Auth(args) => auth::handle(client, args, global).await,
        Command::Cloud(args) => cloud::handle(client, args, global).await,
        Command::Device => device::handle(client, global),
        Command::Logout => logout::handle(client, global),
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => unreachable!(),
    }
}

/// Init for request commands. A failed reachability registration leaves a
/// usable session, so it is only reported.
pub(crate) fn ensure_session(client: &Client) -> Result<(), CliError> {
    match client.init("") {
        Err(CoreError::InitRegistration { reason }) => {
            warn!(%reason, "connectivity tracking unavailable");
            Ok(())
        }
        other => Ok(other?),
    }
}
