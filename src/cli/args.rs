//! cli::args
//!
//! Command-line argument definitions using clap derive.
//!
//! # Global Flags
//!
//! These flags are available on all commands:
//! - `--help` / `-h`: Show help
//! - `--version`: Show version
//! - `--cwd <path>`: Run as if in that directory
//! - `--debug`: Enable debug logging
//! - `--interactive` / `--no-interactive`: Control prompts
//! - `--quiet` / `-q`: Minimal output

use std::io::IsTerminal;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

use super::exit_codes;

/// locksmith - exclusive locks for large files tracked outside Git history
#[derive(Parser, Debug)]
#[command(name = "locksmith")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Run as if locksmith was started in this directory
    #[arg(long, global = true)]
    pub cwd: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Minimal output; implies --no-interactive
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable interactive prompts
    #[arg(long = "interactive", global = true, conflicts_with = "no_interactive")]
    pub interactive_flag: bool,

    /// Disable interactive prompts
    #[arg(long, global = true)]
    pub no_interactive: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Parse command-line arguments.
    ///
    /// Usage errors exit with the local-error code rather than clap's
    /// default of 2, which is reserved for lock service failures.
    pub fn parse_args() -> Self {
        match Self::try_parse() {
            Ok(cli) => cli,
            Err(err) => {
                let code = if err.use_stderr() {
                    exit_codes::LOCAL_ERROR
                } else {
                    exit_codes::SUCCESS
                };
                let _ = err.print();
                std::process::exit(code);
            }
        }
    }

    /// Determine if interactive mode is enabled.
    ///
    /// Returns true if:
    /// - `--interactive` was explicitly set, OR
    /// - Neither `--no-interactive` nor `--quiet` was set AND stdin is a TTY
    pub fn interactive(&self) -> bool {
        if self.interactive_flag {
            true
        } else if self.no_interactive || self.quiet {
            false
        } else {
            std::io::stdin().is_terminal()
        }
    }
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Lock files on the remote lock service
    #[command(
        name = "lock",
        long_about = "Lock one or more files on the remote lock service.\n\n\
            Paths may be relative to the current directory, absolute, or use \
            backslash separators; they are resolved to repository-relative paths \
            before anything is sent. Directories and paths outside the repository \
            are rejected.\n\n\
            Locks granted before an error are still printed. If the lock service \
            reports any error the command exits with status 2.",
        after_help = "\
EXAMPLES:
    # Lock a single file
    locksmith lock art/hero.psd

    # Lock several files against a specific remote
    locksmith lock --remote upstream a.bin b.bin

    # Machine-readable output, one JSON object per line
    locksmith lock --json art/*.psd"
    )]
    Lock {
        /// Files to lock
        paths: Vec<String>,

        /// Remote whose lock service should be used
        #[arg(short, long)]
        remote: Option<String>,

        /// Print lock records as JSON
        #[arg(long)]
        json: bool,
    },

    /// Store credentials for a lock service host
    #[command(
        name = "auth",
        after_help = "\
EXAMPLES:
    # Store a token (prompts with hidden input)
    locksmith auth --host lfs.example.com

    # Non-interactive
    locksmith auth --host lfs.example.com --token <TOKEN>

    # Check status or remove the token
    locksmith auth --host lfs.example.com --status
    locksmith auth --host lfs.example.com --logout"
    )]
    Auth {
        /// Lock service host; defaults to the current repository's endpoint host
        #[arg(long)]
        host: Option<String>,

        /// Token to store (prompted for if omitted)
        #[arg(long, conflicts_with_all = ["status", "logout"])]
        token: Option<String>,

        /// Show current authentication status
        #[arg(long, conflicts_with = "logout")]
        status: bool,

        /// Remove the stored token
        #[arg(long)]
        logout: bool,
    },

    /// Generate shell completion scripts
    #[command(
        name = "completion",
        after_help = "\
EXAMPLES:
    # Bash
    locksmith completion bash > ~/.local/share/bash-completion/completions/locksmith

    # Zsh
    locksmith completion zsh > ~/.zfunc/_locksmith"
    )]
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Supported shells for completion
#[derive(clap::ValueEnum, Debug, Clone, Copy)]
#[allow(clippy::enum_variant_names)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_debug_assert() {
        Cli::command().debug_assert();
    }

    mod lock {
        use super::*;

        #[test]
        fn paths_and_flags() {
            let cli =
                Cli::try_parse_from(["locksmith", "lock", "-r", "upstream", "--json", "a", "b"])
                    .unwrap();
            match cli.command {
                Command::Lock {
                    paths,
                    remote,
                    json,
                } => {
                    assert_eq!(paths, vec!["a", "b"]);
                    assert_eq!(remote.as_deref(), Some("upstream"));
                    assert!(json);
                }
                other => panic!("unexpected command: {:?}", other),
            }
        }

        #[test]
        fn no_paths_parses() {
            let cli = Cli::try_parse_from(["locksmith", "lock"]).unwrap();
            assert!(matches!(cli.command, Command::Lock { paths, .. } if paths.is_empty()));
        }

        #[test]
        fn global_flags_after_subcommand() {
            let cli = Cli::try_parse_from(["locksmith", "lock", "a", "--cwd", "/tmp", "--debug"])
                .unwrap();
            assert_eq!(cli.cwd, Some(PathBuf::from("/tmp")));
            assert!(cli.debug);
        }
    }

    mod auth {
        use super::*;

        #[test]
        fn token_conflicts_with_status() {
            let result = Cli::try_parse_from(["locksmith", "auth", "--token", "t", "--status"]);
            assert!(result.is_err());
        }

        #[test]
        fn host_is_optional() {
            let cli = Cli::try_parse_from(["locksmith", "auth", "--status"]).unwrap();
            assert!(matches!(cli.command, Command::Auth { host: None, status: true, .. }));
        }
    }

    #[test]
    fn quiet_disables_interactive() {
        let cli = Cli::try_parse_from(["locksmith", "-q", "lock"]).unwrap();
        assert!(!cli.interactive());

        let cli = Cli::try_parse_from(["locksmith", "--interactive", "lock"]).unwrap();
        assert!(cli.interactive());
    }
}
