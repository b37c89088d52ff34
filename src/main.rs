use anyhow::{Context, Result};
use bookshelf_server::config::{AppConfig, CliConfig, FileConfig};
use bookshelf_server::ingestion::{HttpImageFetcher, ImageIngestor, ImageStorage};
use bookshelf_server::library::{BookService, SqliteLibraryStore};
use bookshelf_server::server::{run_server, RequestsLoggingLevel, ServerConfig};
use bookshelf_server::sqlite_persistence::open_database;
use bookshelf_server::user::{SqliteUserStore, UserManager, UserStore};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn parse_path(s: &str) -> Result<PathBuf> {
    let path_buf = PathBuf::from(s);
    let original_path = match path_buf.canonicalize() {
        Ok(path) => path,
        Err(msg) => {
            if msg.kind() == std::io::ErrorKind::NotFound {
                path_buf
            } else {
                return Err(msg).with_context(|| format!("Error resolving path: {}", s));
            }
        }
    };
    if original_path.is_absolute() {
        return Ok(original_path);
    }
    let cwd = std::env::current_dir()?;
    Ok(cwd.join(original_path))
}

#[derive(Parser, Debug)]
struct CliArgs {
    /// Path to the SQLite database file.
    #[clap(value_parser = parse_path)]
    pub db_path: Option<PathBuf>,

    /// Directory for ingested image files. Defaults to an `images` directory
    /// next to the database file.
    #[clap(long, value_parser = parse_path)]
    pub images_dir: Option<PathBuf>,

    /// The port to listen on.
    #[clap(short, long, default_value_t = 8080)]
    pub port: u16,

    /// Public base URL prepended to image references in responses.
    #[clap(long)]
    pub base_url: Option<String>,

    /// The level of logging to perform on each request.
    #[clap(long, default_value = "path")]
    pub logging_level: RequestsLoggingLevel,

    /// Timeout in seconds for fetching a source image.
    #[clap(long, default_value_t = 30)]
    pub fetch_timeout_sec: u64,

    /// Who may create and read book images: "open" or "owner-only".
    #[clap(long, default_value = "open")]
    pub image_write_policy: String,

    /// Path to an optional TOML config file; its values override the CLI.
    #[clap(long, value_parser = parse_path)]
    pub config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .unwrap();

    let file_config = cli_args.config.as_deref().map(FileConfig::load).transpose()?;
    let cli_config = CliConfig {
        db_path: cli_args.db_path,
        images_dir: cli_args.images_dir,
        port: cli_args.port,
        base_url: cli_args.base_url,
        logging_level: cli_args.logging_level,
        fetch_timeout_sec: cli_args.fetch_timeout_sec,
        image_write_policy: cli_args.image_write_policy,
    };
    let config = AppConfig::resolve(&cli_config, file_config)?;

    info!("Opening SQLite database at {:?}...", config.db_path);
    let conn = open_database(&config.db_path)?;

    // The user table must exist before the library schema declares foreign
    // keys against it.
    let user_store: Arc<dyn UserStore> = Arc::new(SqliteUserStore::new(conn.clone())?);
    let library_store = Arc::new(SqliteLibraryStore::new(conn)?);

    let user_manager = Arc::new(UserManager::new(user_store.clone()));
    user_manager.seed_default_users()?;

    let ingestor = ImageIngestor::new(
        Box::new(HttpImageFetcher::new(config.fetch_timeout_sec)),
        ImageStorage::new(config.images_dir.clone()),
    );
    let book_service = Arc::new(BookService::new(
        user_store,
        library_store.clone(),
        library_store,
        ingestor,
        config.image_write_policy,
    ));

    let server_config = ServerConfig {
        requests_logging_level: config.logging_level.clone(),
        port: config.port,
        base_url: config.base_url.clone(),
    };

    info!("Serving on port {}...", config.port);
    run_server(server_config, book_service, user_manager).await
}
