use grocer_server::{Config, Server, ServerState, init_logger_with_file, print_banner};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. .env, then config (logger settings come from it)
    dotenv::dotenv().ok();
    let config = Config::from_env();

    init_logger_with_file(&config.log_level, config.log_json, config.log_dir.as_deref())?;
    print_banner();

    tracing::info!(
        environment = %config.environment,
        work_dir = %config.work_dir,
        "Grocer server starting..."
    );

    // 2. State: database, migrations, admin bootstrap
    let state = ServerState::initialize(&config).await?;

    // 3. Serve until ctrl-c
    let server = Server::with_state(config, state);
    if let Err(e) = server.run().await {
        tracing::error!("Server error: {}", e);
        return Err(e.into());
    }

    Ok(())
}
