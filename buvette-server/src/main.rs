use std::{net::SocketAddr, path::PathBuf, sync::Arc};

use anyhow::{Context, bail};
use buvette_core::{
    database::{PostgresDatabase, UnitOfWork, postgres::PoolSettings},
    domain::naming::duplicate_groups,
    import::{collect_sheet_paths, import_sheet, parse_sheet_file},
    seed::{self, SeedPasswords},
};
use buvette_server::{
    AppState, create_app,
    auth::PasswordCrypto,
    infra::config::{Config, ConfigLoad, ConfigLoader},
};
use clap::{Args as ClapArgs, Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// CLI entry point
#[derive(Parser, Debug)]
#[command(name = "buvette-server")]
#[command(about = "Staffing, timesheets, inventory and checklists for event concession stands")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    #[command(flatten)]
    serve: ServeArgs,
}

#[derive(ClapArgs, Debug, Clone)]
struct ServeArgs {
    /// Path to a TOML configuration file
    #[arg(long, env = "BUVETTE_CONFIG")]
    config: Option<PathBuf>,

    /// Dotenv file to load instead of `./.env`
    #[arg(long, env = "BUVETTE_ENV_FILE")]
    env_file: Option<PathBuf>,

    /// Server port (overrides config)
    #[arg(short, long, env = "SERVER_PORT")]
    port: Option<u16>,

    /// Server host (overrides config)
    #[arg(long, env = "SERVER_HOST")]
    host: Option<String>,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(subcommand)]
    Db(DbCommand),
    #[command(subcommand)]
    Import(ImportCommand),
    #[command(subcommand)]
    Buvettes(BuvettesCommand),
}

#[derive(Debug, Subcommand)]
enum DbCommand {
    /// Apply database migrations and exit
    Migrate,
    /// Insert the demo accounts, buvettes, event and staff (idempotent)
    Seed,
    /// Insert randomly generated staff members
    SeedStaff {
        #[arg(long, default_value_t = 20)]
        count: usize,
    },
}

#[derive(Debug, Subcommand)]
enum ImportCommand {
    /// Import a CSV sheet or an `.xlsx` workbook, or every such file in a directory
    Inventory { path: PathBuf },
}

#[derive(Debug, Subcommand)]
enum BuvettesCommand {
    /// List buvettes whose names collide once normalised
    Duplicates,
    /// Delete buvettes together with their product links
    Cleanup {
        #[arg(required = true)]
        ids: Vec<i64>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=warn,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = load_runtime_config(&cli.serve)?;

    match cli.command {
        None => run_server(config).await,
        Some(Command::Db(DbCommand::Migrate)) => {
            let pg = connect(&config).await?;
            pg.migrate().await.context("database migration failed")?;
            info!("Database migrations applied successfully");
            Ok(())
        }
        Some(Command::Db(DbCommand::Seed)) => run_seed(&config).await,
        Some(Command::Db(DbCommand::SeedStaff { count })) => run_seed_staff(&config, count).await,
        Some(Command::Import(ImportCommand::Inventory { path })) => {
            run_import(&config, &path).await
        }
        Some(Command::Buvettes(BuvettesCommand::Duplicates)) => run_duplicates(&config).await,
        Some(Command::Buvettes(BuvettesCommand::Cleanup { ids })) => {
            run_cleanup(&config, &ids).await
        }
    }
}

fn load_runtime_config(args: &ServeArgs) -> anyhow::Result<Arc<Config>> {
    let mut loader = ConfigLoader::new();
    if let Some(path) = &args.config {
        loader = loader.with_config_path(path);
    }
    if let Some(path) = &args.env_file {
        loader = loader.with_env_file(path);
    }
    let ConfigLoad {
        mut config,
        warnings,
    } = loader.load().context("failed to load configuration")?;

    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(host) = args.host.clone() {
        config.server.host = host;
    }

    if config.metadata.env_file_loaded {
        match &args.env_file {
            Some(path) => info!("loaded environment from {}", path.display()),
            None => info!("loaded .env file"),
        }
    }
    if let Some(path) = &config.metadata.config_path {
        info!("loaded configuration from {}", path.display());
    }
    for warning in &warnings.items {
        match &warning.hint {
            Some(hint) => warn!("{} ({hint})", warning.message),
            None => warn!("{}", warning.message),
        }
    }

    Ok(Arc::new(config))
}

async fn connect(config: &Config) -> anyhow::Result<PostgresDatabase> {
    let Some(url) = config.database.primary_url.as_deref() else {
        bail!("no database configured: set DATABASE_URL or the [database] section");
    };
    let settings = PoolSettings {
        max_connections: config.database.max_connections,
        ..PoolSettings::default()
    };
    PostgresDatabase::connect(url, settings)
        .await
        .context("failed to connect to PostgreSQL")
}

async fn run_server(config: Arc<Config>) -> anyhow::Result<()> {
    let pg = connect(&config).await?;
    pg.migrate().await.context("database migration failed")?;

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .with_context(|| {
            format!(
                "invalid listen address {}:{}",
                config.server.host, config.server.port
            )
        })?;

    let state = AppState::new(config, pg);
    let app = create_app(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("Buvette Ops listening on http://{addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;
    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!("failed to listen for shutdown signal: {err}");
        std::future::pending::<()>().await;
    }
}

async fn run_seed(config: &Config) -> anyhow::Result<()> {
    let pg = connect(config).await?;
    pg.migrate().await.context("database migration failed")?;
    let uow = UnitOfWork::from_postgres(&pg);

    let crypto = PasswordCrypto::new();
    let passwords = SeedPasswords {
        demo_hash: crypto
            .hash_password(seed::DEMO_PASSWORD)
            .context("failed to hash demo password")?,
        admin_hash: crypto
            .hash_password(seed::ADMIN_PASSWORD)
            .context("failed to hash admin password")?,
    };

    let report = seed::seed_demo(&uow, &passwords, &config.arrival_schedules())
        .await
        .context("seeding failed")?;
    info!(
        users = report.users,
        buvettes_created = report.buvettes_created,
        products_created = report.products_created,
        event_id = report.event_id,
        staff_created = report.staff_created,
        assignments_created = report.assignments_created,
        "demo data seeded"
    );
    Ok(())
}

async fn run_seed_staff(config: &Config, count: usize) -> anyhow::Result<()> {
    if count == 0 {
        bail!("--count must be at least 1");
    }
    let members = {
        let mut rng = rand::rng();
        seed::staff::random_staff(&mut rng, count)
    };

    let pg = connect(config).await?;
    let uow = UnitOfWork::from_postgres(&pg);
    let inserted = uow
        .staff
        .create_staff_batch(&members)
        .await
        .context("failed to insert staff members")?;
    info!("inserted {inserted} staff members");
    Ok(())
}

async fn run_import(config: &Config, path: &std::path::Path) -> anyhow::Result<()> {
    let paths = collect_sheet_paths(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    if paths.is_empty() {
        bail!("no CSV or workbook sheets found at {}", path.display());
    }

    let pg = connect(config).await?;
    let uow = UnitOfWork::from_postgres(&pg);

    for sheet_path in paths {
        let sheets = parse_sheet_file(&sheet_path)
            .with_context(|| format!("failed to parse {}", sheet_path.display()))?;
        if sheets.is_empty() {
            warn!("{}: no inventory sheet found, skipped", sheet_path.display());
            continue;
        }
        for sheet in sheets {
            let report = import_sheet(&uow, &sheet).await.with_context(|| {
                format!("failed to import {} from {}", sheet.buvette_name, sheet_path.display())
            })?;
            info!(
                buvette_id = report.buvette_id,
                created_buvette = report.created_buvette,
                products_linked = report.products_linked,
                products_created = report.products_created,
                "imported {}",
                report.buvette_name
            );
        }
    }
    Ok(())
}

async fn run_duplicates(config: &Config) -> anyhow::Result<()> {
    let pg = connect(config).await?;
    let uow = UnitOfWork::from_postgres(&pg);
    let usage = uow
        .catalog
        .buvette_usage()
        .await
        .context("failed to list buvettes")?;

    let groups = duplicate_groups(&usage);
    if groups.is_empty() {
        println!("No duplicate buvettes.");
        return Ok(());
    }
    for group in groups {
        println!("{}:", group.normalized_name);
        for buvette in group.buvettes {
            println!(
                "  #{:<5} {:<30} {:<8} {} products",
                buvette.id, buvette.name, buvette.sport, buvette.product_count
            );
        }
    }
    Ok(())
}

async fn run_cleanup(config: &Config, ids: &[i64]) -> anyhow::Result<()> {
    let pg = connect(config).await?;
    let uow = UnitOfWork::from_postgres(&pg);
    let removals = uow
        .catalog
        .remove_buvettes(ids)
        .await
        .context("failed to remove buvettes")?;
    for removal in removals {
        if removal.deleted {
            info!(
                "removed buvette {} and {} product links",
                removal.buvette_id, removal.links_removed
            );
        } else {
            warn!("buvette {} not found", removal.buvette_id);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_invocation_serves() {
        let cli = Cli::try_parse_from(["buvette-server", "--port", "8088"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.serve.port, Some(8088));
    }

    #[test]
    fn env_file_is_read_before_subcommand() {
        let cli = Cli::try_parse_from([
            "buvette-server",
            "--env-file",
            "deploy/stade.env",
            "db",
            "migrate",
        ])
        .unwrap();
        assert_eq!(cli.serve.env_file, Some(PathBuf::from("deploy/stade.env")));
        assert!(matches!(cli.command, Some(Command::Db(DbCommand::Migrate))));
    }

    #[test]
    fn seed_staff_count_is_parsed() {
        let cli =
            Cli::try_parse_from(["buvette-server", "db", "seed-staff", "--count", "5"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Command::Db(DbCommand::SeedStaff { count: 5 }))
        ));
    }

    #[test]
    fn cleanup_requires_ids() {
        assert!(Cli::try_parse_from(["buvette-server", "buvettes", "cleanup"]).is_err());
        let cli =
            Cli::try_parse_from(["buvette-server", "buvettes", "cleanup", "4", "9"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Command::Buvettes(BuvettesCommand::Cleanup { ref ids })) if ids == &[4, 9]
        ));
    }
}
