use todo_server::{connect, telemetry, ServerConfig, TodoRepository};
use tokio::net::TcpListener;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), String> {
    let config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            telemetry::init_tracing(false);
            error!(event = "startup", status = "error", error = %err);
            return Err(err.to_string());
        }
    };
    telemetry::init_tracing(config.log_json);

    // Store failures at startup are fatal; after this point they are per-request.
    let store = connect(&config.database_url).map_err(|err| err.to_string())?;
    let repo = TodoRepository::new(store, config.store_timeout);

    let addr = config.bind_addr();
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|err| format!("failed to bind {addr}: {err}"))?;
    info!(event = "startup", status = "ok", addr = %addr, backend = repo.backend_tag());

    todo_server::run(listener, repo)
        .await
        .map_err(|err| err.to_string())
}
