// RKSOK — CLI Module
//
// Command-line interface using clap derive macros.
// Subcommands: serve, send.

mod commands;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::config::StorageBackend;
use crate::gateway::Verb;

pub use commands::{execute, open_store, resolve_config};

/// RKSOK: a phonebook that asks permission first.
#[derive(Parser, Debug)]
#[command(name = "rksok")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the RKSOK gateway.
    Serve(ServeArgs),

    /// Send one request to a running gateway and print the raw response.
    Send {
        /// Gateway address.
        #[arg(long, default_value = crate::config::DEFAULT_LISTEN)]
        addr: String,

        /// Operation to perform.
        verb: VerbArg,

        /// Record name (at most 30 characters).
        name: String,

        /// Payload for `write`.
        #[arg(default_value = "")]
        payload: String,
    },
}

/// Flags for `serve`. Each overrides the config file when given.
#[derive(Args, Debug, Default)]
pub struct ServeArgs {
    /// JSON config file.
    #[arg(long, env = "RKSOK_CONFIG")]
    pub config: Option<PathBuf>,

    /// Address to listen on (host:port).
    #[arg(long, env = "RKSOK_LISTEN")]
    pub listen: Option<String>,

    /// Regulatory authority address (host:port).
    #[arg(long, env = "RKSOK_AUTHORITY")]
    pub authority: Option<String>,

    /// Storage backend.
    #[arg(long, value_enum, env = "RKSOK_STORAGE")]
    pub storage: Option<StorageBackend>,

    /// Database file (sql) or phonebook directory (files).
    #[arg(long, env = "RKSOK_STORAGE_PATH")]
    pub storage_path: Option<PathBuf>,

    /// Reject write and delete requests.
    #[arg(long)]
    pub read_only: bool,

    /// Seconds a client has to send a complete request.
    #[arg(long, env = "RKSOK_FRAME_TIMEOUT")]
    pub frame_timeout: Option<u64>,

    /// Seconds to wait for the authority's verdict.
    #[arg(long, env = "RKSOK_AUTHORITY_TIMEOUT")]
    pub authority_timeout: Option<u64>,
}

/// Verb names accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum VerbArg {
    Fetch,
    Write,
    Delete,
}

impl From<VerbArg> for Verb {
    fn from(arg: VerbArg) -> Self {
        match arg {
            VerbArg::Fetch => Verb::Fetch,
            VerbArg::Write => Verb::Write,
            VerbArg::Delete => Verb::Delete,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_serve_flags() {
        let cli = Cli::try_parse_from([
            "rksok",
            "serve",
            "--listen",
            "0.0.0.0:7777",
            "--storage",
            "files",
            "--read-only",
        ])
        .unwrap();

        match cli.command {
            Commands::Serve(args) => {
                assert_eq!(args.listen.as_deref(), Some("0.0.0.0:7777"));
                assert_eq!(args.storage, Some(StorageBackend::Files));
                assert!(args.read_only);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_send() {
        let cli = Cli::try_parse_from(["rksok", "send", "write", "ivan", "+1-555-0100"]).unwrap();

        match cli.command {
            Commands::Send {
                addr,
                verb,
                name,
                payload,
            } => {
                assert_eq!(addr, crate::config::DEFAULT_LISTEN);
                assert_eq!(Verb::from(verb), Verb::Write);
                assert_eq!(name, "ivan");
                assert_eq!(payload, "+1-555-0100");
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
