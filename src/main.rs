use clap::Parser;
use dotenvy::dotenv;
use meal_planner::{
    cli::{self, Cli, CliContext},
    config::{database, settings, users::DefaultIdentity},
    errors::Result,
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    // 2. Load .env file; env vars can also be set externally
    dotenv().ok();

    let cli = Cli::parse();

    // 3. Load config.toml, falling back to defaults when absent
    let settings = settings::load_default_settings()
        .inspect_err(|e| error!("Failed to load settings: {}", e))?;

    // 4. Connect and make sure the schema exists
    let db = database::create_connection()
        .await
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;
    database::create_tables(&db)
        .await
        .inspect(|()| info!("Database initialized successfully."))
        .inspect_err(|e| error!("Failed to create tables: {}", e))?;

    // 5. Resolve the identity every command acts on behalf of
    let identity = DefaultIdentity::from_env(&settings);
    let user = identity.resolve(&db, &settings).await?;
    info!(user = %user.username, "resolved default identity");

    // 6. Run the command
    let ctx = CliContext::new(db, settings, user);
    let output = cli::run(&ctx, cli.command)
        .await
        .inspect_err(|e| error!("Command failed: {}", e))?;
    println!("{}", output.trim_end());

    Ok(())
}
