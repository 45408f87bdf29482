//! Command-line interface definitions and parsing

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::session::Role;

#[derive(Parser, Debug)]
#[command(author, version, about = "BlackBox: secure peer-to-peer terminal chat", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Listen port [default: 4001]
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Comma-separated relay multiaddrs, each ending in /p2p/<peer-id>
    #[arg(short, long)]
    pub relays: Option<String>,

    /// Display name used in chat (prompted for when omitted)
    #[arg(short, long)]
    pub name: Option<String>,

    /// Directory holding the node identity keys
    #[arg(short, long)]
    pub data_dir: Option<PathBuf>,

    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Disable coloured output
    #[arg(long)]
    pub no_color: bool,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Host a new lobby and print the addresses to share
    Host,
    /// Join an existing peer by address
    Join {
        /// Connection address, e.g. /ip4/192.168.1.20/tcp/4001/p2p/12D3KooW...
        address: Option<String>,
    },
}

impl Cli {
    /// Role chosen on the command line, if any
    pub fn role(&self) -> Option<Role> {
        self.command.as_ref().map(|command| match command {
            Commands::Host => Role::Host,
            Commands::Join { .. } => Role::Join,
        })
    }

    /// Join address given on the command line, if any
    pub fn join_address(&self) -> Option<&str> {
        match &self.command {
            Some(Commands::Join { address }) => address.as_deref(),
            _ => None,
        }
    }
}
