//! cli::commands::auth
//!
//! Store, inspect or remove the token for a lock service host.
//!
//! Tokens are never printed. `--status` only says whether one exists.
//!
//! # Example
//!
//! ```bash
//! # Interactive (prompts for token)
//! locksmith auth --host lfs.example.com
//!
//! # Non-interactive
//! locksmith auth --host lfs.example.com --token xxxx
//!
//! # Host taken from the current repository's lock service
//! locksmith auth --status
//! ```

use std::path::Path;

use anyhow::{bail, Context as _, Result};

use crate::core::config::Config;
use crate::engine::Context;
use crate::git::Git;
use crate::lockservice::{endpoint, LockTarget};
use crate::secrets::{self, SecretStore};
use crate::ui::output;
use crate::ui::prompts::{self, PromptError};

/// Run the auth command.
pub fn auth(
    ctx: &Context,
    host: Option<&str>,
    token: Option<&str>,
    status: bool,
    logout: bool,
) -> Result<()> {
    let host = match host {
        Some(h) => h.to_ascii_lowercase(),
        None => host_from_repo(ctx)?,
    };

    let config = Config::load(None).context("Failed to load configuration")?;
    let store = secrets::create_store(config.secrets_provider())
        .context("Failed to initialize secret store")?;

    if status {
        return show_status(store.as_ref(), &host, ctx.quiet);
    }

    if logout {
        if !store.exists(&secrets::secret_key(&host))? {
            output::warn(format!("No token stored for {}.", host), ctx.verbosity());
            return Ok(());
        }
        store
            .delete(&secrets::secret_key(&host))
            .context("Failed to remove stored token")?;
        output::print(format!("Logged out from {}.", host), ctx.verbosity());
        return Ok(());
    }

    let token_value = match token {
        Some(t) => t.to_string(),
        None => match prompts::password(&format!("Token for {}", host), ctx.interactive) {
            Ok(t) => t,
            Err(PromptError::NotInteractive) => {
                bail!("Token required. Use --token <TOKEN> or run interactively.")
            }
            Err(e) => return Err(e).context("Failed to read token"),
        },
    };
    validate_token(&token_value)?;

    store
        .set(&secrets::secret_key(&host), &token_value)
        .context("Failed to store token")?;
    output::print(
        format!("Authentication configured for {}.", host),
        ctx.verbosity(),
    );
    Ok(())
}

/// Host of the lock service the current repository would use.
fn host_from_repo(ctx: &Context) -> Result<String> {
    let start = ctx.cwd.as_deref().unwrap_or_else(|| Path::new("."));
    let git = Git::open(start).context("No --host given and not in a git repository")?;
    let config = Config::load(Some(git.git_dir())).context("Failed to load configuration")?;
    let target =
        LockTarget::resolve(&git, &config, None).context("Failed to determine lock service")?;

    endpoint::endpoint_host(&target.endpoint)
        .with_context(|| format!("Lock service endpoint '{}' has no host", target.endpoint))
}

fn show_status(store: &dyn SecretStore, host: &str, quiet: bool) -> Result<()> {
    let exists = store.exists(&secrets::secret_key(host))?;

    if quiet {
        // Machine-readable output
        println!("{}", if exists { "authenticated" } else { "not_authenticated" });
    } else if exists {
        println!("Authenticated with {}.", host);
    } else {
        println!("Not authenticated with {}.", host);
        println!("Run 'locksmith auth --host {}' to authenticate.", host);
    }

    Ok(())
}

/// Basic format checks; the token is not verified against the service.
fn validate_token(token: &str) -> Result<()> {
    if token.is_empty() {
        bail!("Token cannot be empty.");
    }
    if token.chars().any(char::is_whitespace) {
        bail!("Token should not contain whitespace.");
    }
    Ok(())
}
