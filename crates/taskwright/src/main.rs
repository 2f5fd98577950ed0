// SPDX-FileCopyrightText: 2026 Taskwright Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Taskwright - a todo backend with a conversational task agent.
//!
//! This is the binary entry point: the HTTP gateway, the MCP stdio server,
//! the chat shell and direct task management all start here.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod serve;
mod shell;
mod tasks;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use colored::Colorize;
use taskwright_config::TaskwrightConfig;

use crate::tasks::TaskArgs;

/// Owner used when no `--user` is given.
pub const DEFAULT_USER: &str = "demo-user";

/// Taskwright - a todo backend with a conversational task agent.
#[derive(Parser, Debug)]
#[command(name = "taskwright", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the XDG hierarchy.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the HTTP gateway.
    Serve,
    /// Serve the task tools over MCP on stdin/stdout.
    Mcp,
    /// Chat with the agent interactively.
    Shell {
        #[arg(long, default_value = DEFAULT_USER)]
        user: String,
    },
    /// Send one message to the agent and print the reply envelope as JSON.
    Chat {
        #[arg(long, default_value = DEFAULT_USER)]
        user: String,
        /// Continue this conversation.
        #[arg(long)]
        conversation: Option<i64>,
        message: String,
    },
    /// Manage tasks directly, without the agent.
    Task(TaskArgs),
    /// Mint a bearer token for the gateway.
    Token {
        #[arg(long)]
        user: String,
        #[arg(long)]
        email: Option<String>,
    },
    /// Open the database, apply migrations and check connectivity.
    InitDb,
}

fn load_config(path: Option<&std::path::Path>) -> Result<TaskwrightConfig, Vec<taskwright_config::ConfigError>> {
    match path {
        Some(path) => taskwright_config::load_and_validate_path(path),
        None => taskwright_config::load_and_validate(),
    }
}

/// Installs the global subscriber. Output goes to stderr so stdout stays
/// free for command output and MCP frames.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("taskwright={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(errors) => {
            taskwright_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    let Some(command) = cli.command else {
        println!("taskwright: use --help for available commands");
        return;
    };

    init_tracing(&config.agent.log_level);

    let result = match command {
        Commands::Serve => serve::run_serve(&config).await,
        Commands::Mcp => serve::run_mcp(&config).await,
        Commands::Shell { user } => shell::run_shell(&config, &user).await,
        Commands::Chat {
            user,
            conversation,
            message,
        } => shell::run_chat(&config, &user, conversation, &message).await,
        Commands::Task(args) => tasks::run_task(&config, args).await,
        Commands::Token { user, email } => serve::run_token(&config, &user, email.as_deref()),
        Commands::InitDb => serve::run_init_db(&config).await,
    };

    if let Err(e) = result {
        eprintln!("{}: {e}", "error".red());
        std::process::exit(1);
    }
}
