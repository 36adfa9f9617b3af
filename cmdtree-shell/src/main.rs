//! # cmdtree-shell
//!
//! Line-oriented shell over a [`cmdtree`] dispatcher. Reads commands from
//! stdin, runs them and prints completions on request.
//!
//! ## Usage
//!
//! ```bash
//! # Interactive
//! cmdtree-shell --permission admin.kick
//!
//! # Completions for a partial line, then exit
//! cmdtree-shell --complete "give 1"
//!
//! # Scripted, with bound values echoed as JSON
//! printf 'give 10 alex\n?ro\n' | cmdtree-shell --json
//! ```
//!
//! Lines starting with `?` print completions for the rest of the line.

mod commands;
mod config;

use std::io::{IsTerminal, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use cmdtree::{BasicSender, CommandDispatcher, DispatchError, ParseError};
use colored::Colorize;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::oneshot;
use tracing::{debug, info, warn};

use crate::commands::SettingStore;
use crate::config::ShellConfig;

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "cmdtree-shell")]
#[command(about = "Run and complete cmdtree commands from stdin")]
#[command(version)]
struct Args {
    /// Path to a TOML config file
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn")]
    log_level: String,

    /// Permission granted to the shell's sender (repeatable)
    #[arg(long = "permission", value_name = "NAME")]
    permissions: Vec<String>,

    /// Print completions for LINE, one per line, and exit
    #[arg(long, value_name = "LINE")]
    complete: Option<String>,

    /// Print bound values of each successful command as JSON
    #[arg(long)]
    json: bool,
}

// ============================================================================
// Shell
// ============================================================================

struct Shell {
    dispatcher: Arc<CommandDispatcher<BasicSender>>,
    sender: Arc<BasicSender>,
    config: ShellConfig,
    json: bool,
}

impl Shell {
    fn new(config: ShellConfig, sender: BasicSender, json: bool) -> Result<Self> {
        let dispatcher = Arc::new(CommandDispatcher::with_config(config.dispatcher.clone()));
        commands::register(&dispatcher, SettingStore::default())
            .context("failed to register demo commands")?;
        Ok(Self {
            dispatcher,
            sender: Arc::new(sender),
            config,
            json,
        })
    }

    fn complete(&self, line: &str) {
        for suggestion in self.dispatcher.suggest(&self.sender, line) {
            println!("{suggestion}");
        }
    }

    /// Parse and run one line on a blocking task. Only the handler is bounded
    /// by the timeout; the clock starts once the line has parsed.
    async fn run_line(&self, line: String) -> Result<()> {
        let dispatcher = Arc::clone(&self.dispatcher);
        let sender = Arc::clone(&self.sender);
        let json = self.json;
        let (parsed_tx, parsed_rx) = oneshot::channel::<Result<(), DispatchError>>();

        let task = tokio::task::spawn_blocking(move || -> anyhow::Result<()> {
            let invocation = match dispatcher.parse(&sender, &line) {
                Ok(invocation) => invocation,
                Err(err) => {
                    let _ = parsed_tx.send(Err(err));
                    return Ok(());
                }
            };
            let _ = parsed_tx.send(Ok(()));
            invocation.execute()?;
            if json {
                println!("{}", invocation.context().to_json());
            }
            Ok(())
        });

        match parsed_rx.await {
            Ok(Ok(())) => {}
            Ok(Err(err)) => {
                self.report(&err);
                return Ok(());
            }
            // The task ended without reporting a parse result.
            Err(_) => {
                task.await.context("command task failed")??;
                return Ok(());
            }
        }

        let timeout = self.config.shell.handler_timeout();
        match tokio::time::timeout(timeout, task).await {
            Ok(joined) => {
                if let Err(err) = joined.context("command task failed")? {
                    self.report(&DispatchError::Execution(err));
                }
            }
            Err(_) => {
                warn!(timeout_ms = self.config.shell.handler_timeout_ms, "handler timed out");
                eprintln!(
                    "{} command timed out after {}ms",
                    "error:".red().bold(),
                    self.config.shell.handler_timeout_ms
                );
            }
        }
        Ok(())
    }

    fn report(&self, err: &DispatchError) {
        eprintln!("{} {err}", "error:".red().bold());
        let Some(parse) = err.as_parse() else {
            return;
        };
        match parse {
            ParseError::InvalidSyntax { chain }
            | ParseError::NoInputProvided { chain, .. }
            | ParseError::ArgumentParseFailure { chain, .. }
                if !chain.is_empty() =>
            {
                eprintln!("{} {}", "usage:".yellow(), self.dispatcher.render(chain));
            }
            _ => {}
        }
    }

    async fn repl(&self) -> Result<()> {
        let interactive = std::io::stdin().is_terminal();
        let mut lines = BufReader::new(tokio::io::stdin()).lines();

        loop {
            if interactive {
                print!("{}", self.config.shell.prompt);
                std::io::stdout().flush().context("failed to flush prompt")?;
            }
            let Some(line) = lines.next_line().await.context("failed to read stdin")? else {
                break;
            };

            if line.trim().is_empty() {
                continue;
            }
            // Trailing whitespace is significant for completion
            if let Some(partial) = line.trim_start().strip_prefix('?') {
                self.complete(partial);
                continue;
            }
            let line = line.trim();
            debug!(%line, "running command");
            self.run_line(line.to_string()).await?;
        }
        Ok(())
    }
}

async fn run() -> Result<()> {
    let args = Args::parse();

    // Logs go to stderr, stdout carries command output
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| args.log_level.parse().unwrap_or_default()),
        )
        .init();

    info!("Starting cmdtree-shell v{}", env!("CARGO_PKG_VERSION"));

    let config = args
        .config
        .as_deref()
        .map(ShellConfig::load_from_path)
        .unwrap_or_default();

    let sender = args
        .permissions
        .iter()
        .fold(BasicSender::new("shell"), |sender, permission| {
            sender.grant(permission.as_str())
        });

    let shell = Shell::new(config, sender, args.json)?;

    if let Some(line) = args.complete.as_deref() {
        shell.complete(line);
        return Ok(());
    }

    shell.repl().await
}

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("[cmdtree-shell] Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
