//! Default prompt construction.

use nix::unistd::{gethostname, getuid, User};

use crate::error::InteractionError;
use crate::Result;

/// Format a prompt as `<user>@<host>> `.
pub fn format_prompt(user: &str, host: &str) -> String {
    format!("{}@{}> ", user, host)
}

/// Build the default prompt for the current user and host.
pub fn default_prompt() -> Result<String> {
    let user = User::from_uid(getuid())
        .map_err(|e| InteractionError::CurrentUser(e.to_string()))?
        .ok_or_else(|| {
            InteractionError::CurrentUser(format!("no passwd entry for uid {}", getuid()))
        })?;

    let host = gethostname().map_err(|e| InteractionError::Hostname(e.to_string()))?;
    let host = host
        .into_string()
        .map_err(|h| InteractionError::Hostname(format!("not valid UTF-8: {:?}", h)))?;

    Ok(format_prompt(&user.name, &host))
}
