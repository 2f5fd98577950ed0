// SPDX-FileCopyrightText: 2026 Taskwright Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `taskwright serve`, `mcp`, `init-db` and `token`.
//!
//! Also holds the shared startup helpers: opening storage and wiring the
//! OpenAI oracle into a [`TaskAgent`].

use std::sync::Arc;

use colored::Colorize;
use taskwright_agent::{AgentSettings, TaskAgent};
use taskwright_auth_jwt::JwtAuth;
use taskwright_config::TaskwrightConfig;
use taskwright_core::{
    HealthStatus, OracleAdapter, PluginAdapter, StorageAdapter, TaskwrightError,
};
use taskwright_gateway::{GatewayState, ServerConfig, start_server};
use taskwright_mcp_server::{McpServer, serve_stdio};
use taskwright_openai::OpenAiOracle;
use taskwright_storage::SqliteStorage;
use tracing::{info, warn};

/// Opens the configured database and runs pending migrations.
pub async fn open_storage(config: &TaskwrightConfig) -> Result<Arc<SqliteStorage>, TaskwrightError> {
    let storage = SqliteStorage::new(config.storage.clone());
    storage.initialize().await?;
    Ok(Arc::new(storage))
}

/// Builds the agent on top of `storage` with the OpenAI oracle.
pub fn build_agent(
    config: &TaskwrightConfig,
    storage: Arc<dyn StorageAdapter>,
) -> Result<(Arc<TaskAgent>, Arc<dyn OracleAdapter>), TaskwrightError> {
    let oracle: Arc<dyn OracleAdapter> =
        Arc::new(OpenAiOracle::new(&config.openai).inspect_err(|_| {
            eprintln!(
                "error: OpenAI API key required. Set openai.api_key, TASKWRIGHT_OPENAI_API_KEY or OPENAI_API_KEY"
            );
        })?);
    let agent = TaskAgent::new(storage, oracle.clone(), AgentSettings::from_config(config));
    Ok((Arc::new(agent), oracle))
}

async fn close_storage(storage: &SqliteStorage) {
    if let Err(e) = storage.close().await {
        warn!(error = %e, "failed to close storage cleanly");
    }
}

/// Runs the HTTP gateway until Ctrl-C.
///
/// Refuses to start without a JWT secret.
pub async fn run_serve(config: &TaskwrightConfig) -> Result<(), TaskwrightError> {
    info!("starting taskwright serve");

    let auth = Arc::new(JwtAuth::from_config(&config.auth).inspect_err(|_| {
        eprintln!(
            "error: a JWT secret is required to serve. Set auth.jwt_secret or {}",
            taskwright_auth_jwt::SECRET_ENV
        );
    })?);

    let storage = open_storage(config).await?;
    let (agent, oracle) = build_agent(config, storage.clone())?;

    let state = GatewayState {
        agent,
        storage: storage.clone(),
        oracle,
        auth,
    };
    let result = start_server(&ServerConfig::from(&config.gateway), state).await;

    close_storage(&storage).await;
    result
}

/// Serves the task tools over MCP on stdio until the client disconnects.
pub async fn run_mcp(config: &TaskwrightConfig) -> Result<(), TaskwrightError> {
    let storage = open_storage(config).await?;
    let server = McpServer::new(storage.clone(), config.agent.name.clone())?;
    let result = serve_stdio(server).await;
    close_storage(&storage).await;
    result
}

/// Creates or migrates the database and reports its health.
pub async fn run_init_db(config: &TaskwrightConfig) -> Result<(), TaskwrightError> {
    let storage = open_storage(config).await?;
    let health = storage.health_check().await?;
    close_storage(&storage).await;

    match health {
        HealthStatus::Healthy => {
            println!(
                "{} database ready at {}",
                "ok".green(),
                config.storage.database_path
            );
            Ok(())
        }
        HealthStatus::Degraded(reason) | HealthStatus::Unhealthy(reason) => Err(
            TaskwrightError::Storage {
                source: format!("database check failed: {reason}").into(),
            },
        ),
    }
}

/// Prints a freshly signed bearer token.
pub fn run_token(
    config: &TaskwrightConfig,
    user: &str,
    email: Option<&str>,
) -> Result<(), TaskwrightError> {
    let auth = JwtAuth::from_config(&config.auth)?;
    println!("{}", auth.issue(user, email)?);
    Ok(())
}
