//! Application orchestration
//!
//! Resolves the role, join target and display name, loads the identity,
//! starts the node, runs the role-specific startup and hands over to the
//! chat session.

use std::future::Future;
use std::sync::Arc;

use tokio::io::{AsyncBufRead, BufReader, Stdin};
use tracing::{info, warn};

use blackbox_core::{
    ensure_identity, key_path, parse_peer_address, parse_relays, PeerAddress, Subscription,
};
use blackbox_p2p::{bootstrap, Libp2pNode, NodeSettings};

use crate::cli::Cli;
use crate::config::AppConfig;
use crate::console::{Console, Palette};
use crate::error::Result;
use crate::prompt::{self, validate_name, Prompter};
use crate::reporter;
use crate::session::{join, ChatSession, JoinOutcome, Role, SessionEnd, SHUTDOWN_NOTICE};

/// The interactive chat application
pub struct BlackboxApp<R> {
    config: AppConfig,
    console: Console,
    prompter: Prompter<R>,
}

/// Where startup left off
enum Startup {
    Ready {
        node: Libp2pNode,
        subscription: Subscription,
        name: String,
    },
    AlreadyHosting,
}

impl BlackboxApp<BufReader<Stdin>> {
    /// Application reading the terminal's standard input
    pub fn new(config: AppConfig) -> Self {
        let console = Console::stdout(Palette::new(config.chat.color), config.chat.prompt.clone());
        Self::with_io(config, console, prompt::stdin())
    }
}

impl<R: AsyncBufRead + Unpin> BlackboxApp<R> {
    /// Application with its own output and input, e.g. scripted in tests
    pub fn with_io(config: AppConfig, console: Console, prompter: Prompter<R>) -> Self {
        Self {
            config,
            console,
            prompter,
        }
    }

    /// Run startup and the chat session.
    ///
    /// `shutdown` is watched from the first prompt on, so a signal during
    /// startup ends the run as cleanly as one during the chat. Every error
    /// returned here is fatal; the session itself only recovers from failed
    /// publishes.
    pub async fn run<S>(mut self, cli: &Cli, shutdown: S) -> Result<SessionEnd>
    where
        S: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        let startup = tokio::select! {
            _ = &mut shutdown => {
                self.console.blank();
                self.console.line(SHUTDOWN_NOTICE);
                return Ok(SessionEnd::Interrupted);
            }
            startup = self.start(cli) => startup?,
        };
        let (node, subscription, name) = match startup {
            Startup::Ready {
                node,
                subscription,
                name,
            } => (node, subscription, name),
            Startup::AlreadyHosting => return Ok(SessionEnd::AlreadyHosting),
        };

        let session = ChatSession::new(Arc::new(node), self.console.clone(), name);
        session
            .run(subscription, self.prompter.into_lines(), shutdown)
            .await
    }

    async fn start(&mut self, cli: &Cli) -> Result<Startup> {
        let relay_csv = self.config.relay_csv();
        let relays = parse_relays(&relay_csv)?;
        if relays.is_empty() && !relay_csv.trim().is_empty() {
            warn!("relay list contained no entries, relay assistance disabled");
        }

        let role = match cli.role() {
            Some(role) => role,
            None => self.prompter.role(&self.console).await?,
        };
        let target = match role {
            Role::Host => None,
            Role::Join => Some(self.resolve_target(cli).await?),
        };
        let name = match &cli.name {
            Some(name) => validate_name(name)?,
            None => self.prompter.display_name(&self.console).await?,
        };

        let port = self.config.node.port;
        let identity = ensure_identity(&key_path(&self.config.data_dir(), port))?;
        let settings = NodeSettings::new(port)
            .with_relays(relays)
            .with_topic(self.config.chat.topic.clone())
            .with_dial_timeout(self.config.timeouts.dial());
        let (node, subscription) = bootstrap(identity, &settings).await?;
        info!(%port, role = ?role, "node ready");

        let console = &self.console;
        console.line(format!(
            "{} {}",
            console.palette().label("You are known as"),
            console.palette().own_name(&name)
        ));

        match &target {
            None => {
                reporter::report_own_addresses(&node, console).await?;
                if settings.relay_assist() {
                    reporter::wait_for_relay_address(
                        &node,
                        console,
                        self.config.timeouts.relay_wait(),
                        self.config.timeouts.relay_poll(),
                    )
                    .await?;
                } else {
                    reporter::print_relay_tip(console);
                }
                console.hint("Waiting for peers. Type /help to see available commands.");
            }
            Some(target) => {
                let outcome = join(&node, console, target, self.config.timeouts.probe()).await?;
                if outcome == JoinOutcome::AlreadyHosting {
                    return Ok(Startup::AlreadyHosting);
                }
            }
        }

        Ok(Startup::Ready {
            node,
            subscription,
            name,
        })
    }

    async fn resolve_target(&mut self, cli: &Cli) -> Result<PeerAddress> {
        match cli.join_address() {
            Some(address) => Ok(parse_peer_address(address)?),
            None => self.prompter.join_address(&self.console).await,
        }
    }
}

/// Resolves on SIGINT, or SIGTERM on unix
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
