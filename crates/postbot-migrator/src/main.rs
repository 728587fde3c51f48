use postbot_common::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    pretty_env_logger::init();

    let config = Config::new()?;

    postbot_common::observability::tracing::init_tracer(
        env!("CARGO_PKG_NAME").to_string(),
        env!("CARGO_PKG_VERSION").to_string(),
        &config,
    );

    let dir = std::env::current_dir()?;
    let migrated = postbot_migrator::migrate_directory(&dir, &config).await?;

    log::info!("Migrated {} database files", migrated.len());

    Ok(())
}
