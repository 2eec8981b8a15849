//! cli::commands::lock
//!
//! Lock command: resolve paths, then run one batch through the orchestrator.
//!
//! # Ordering
//!
//! Every path is resolved before the lock service is contacted. The first
//! path that cannot be resolved aborts the command with exit code 1 and
//! nothing is locked.

use std::io;
use std::path::Path;

use anyhow::{Context as _, Result};

use crate::core::config::Config;
use crate::core::paths::{PathResolver, ResolutionError};
use crate::engine::{Context, LockOrchestrator};
use crate::git::{Git, GitError};
use crate::lockservice::{LfsClientFactory, LockClientFactory, LockTarget};
use crate::secrets;
use crate::ui::output::{self, LockRenderer, OutputMode};

/// Printed when `lock` is run without paths.
pub const USAGE: &str = "Usage: locksmith lock <path>...";

/// Run the lock command against the real repository and lock service.
pub fn lock(ctx: &Context, paths: &[String], remote: Option<&str>, json: bool) -> Result<()> {
    if paths.is_empty() {
        println!("{}", USAGE);
        return Ok(());
    }

    let start = ctx.cwd.as_deref().unwrap_or_else(|| Path::new("."));
    let git = Git::open(start).map_err(|e: GitError| ResolutionError::NoRepository {
        message: e.to_string(),
    })?;

    let config = Config::load(Some(git.git_dir())).context("Failed to load configuration")?;
    for path in [config.global_config_loaded_from(), config.repo_config_loaded_from()]
        .into_iter()
        .flatten()
    {
        output::debug(format!("loaded config {}", path.display()), ctx.verbosity());
    }

    let store = secrets::create_store(config.secrets_provider())
        .context("Failed to initialize secret store")?;
    let factory = LfsClientFactory::new(store);

    let mode = OutputMode::from_json_flag(json || config.json());
    run(ctx, &git, &config, &factory, paths, remote, mode, io::stdout().lock())
}

/// Resolve `paths`, pick the target and lock, rendering into `sink`.
///
/// Split from [`lock`] so the workflow can run against any repository
/// context, client factory and sink.
#[allow(clippy::too_many_arguments)]
pub fn run<W: io::Write>(
    ctx: &Context,
    repo: &dyn crate::git::RepositoryContext,
    config: &Config,
    factory: &dyn LockClientFactory,
    paths: &[String],
    remote: Option<&str>,
    mode: OutputMode,
    sink: W,
) -> Result<()> {
    let verbosity = ctx.verbosity();

    let resolver = PathResolver::new(repo, ctx.cwd.as_deref())?;
    output::debug(
        format!(
            "repository root {}, working directory {}",
            resolver.root().display(),
            resolver.working_dir().display()
        ),
        verbosity,
    );

    let canonical = resolver.resolve_all(paths)?;
    for (input, path) in paths.iter().zip(&canonical) {
        output::debug(format!("{} -> {}", input, path), verbosity);
    }

    let target = LockTarget::resolve(repo, config, remote)
        .context("Failed to determine lock service")?;
    let orchestrator = LockOrchestrator::new(target, factory).with_verbosity(verbosity);
    let target = orchestrator.target();
    output::debug(
        format!("remote '{}', endpoint {}", target.remote, target.endpoint),
        verbosity,
    );

    let runtime = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;
    let mut renderer = LockRenderer::new(sink, mode);

    runtime.block_on(orchestrator.run(&canonical, &mut renderer))?;
    Ok(())
}
