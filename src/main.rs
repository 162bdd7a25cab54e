use clap::{Parser, ValueEnum};
use grocer::application::storefront::Storefront;
use grocer::config::Config;
use grocer::domain::credentials::Argon2Hasher;
use grocer::domain::ports::{OrderStore, StorageHandle};
use grocer::infrastructure::in_memory::InMemoryStore;
#[cfg(feature = "storage-rocksdb")]
use grocer::infrastructure::rocksdb::RocksDBStore;
use grocer::infrastructure::uploads::UploadDir;
use grocer::interfaces::csv::order_writer::OrderWriter;
use grocer::interfaces::csv::request_reader::RequestReader;
use grocer::interfaces::json;
use grocer::interfaces::script::ScriptRunner;
use miette::{IntoDiagnostic, Result};
use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Report {
    /// Every placed order as CSV
    Orders,
    /// The product listing as JSON
    Products,
    /// The category listing as JSON
    Categories,
    /// Products matching --query as JSON
    Search,
}

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Input request script CSV file
    input: PathBuf,

    /// Path to persistent database (optional). If provided, uses RocksDB.
    #[arg(long)]
    db_path: Option<PathBuf>,

    /// What to print on stdout once the script has run
    #[arg(long, value_enum, default_value_t = Report::Orders)]
    report: Report,

    /// Search text for the search report
    #[arg(long, default_value = "")]
    query: String,
}

fn open_storage(db_path: Option<PathBuf>) -> Result<StorageHandle> {
    #[cfg(feature = "storage-rocksdb")]
    if let Some(path) = db_path {
        let store = RocksDBStore::open(&path).into_diagnostic()?;
        info!(path = %path.display(), "using RocksDB storage");
        return Ok(Arc::new(store));
    }

    #[cfg(not(feature = "storage-rocksdb"))]
    if db_path.is_some() {
        tracing::warn!(
            "Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not enabled. Falling back to In-Memory storage."
        );
    }

    Ok(Arc::new(InMemoryStore::new()))
}

#[tokio::main]
async fn main() -> Result<()> {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let cli = Cli::parse();
    let config = Config::load().into_diagnostic()?;

    let storage = open_storage(cli.db_path)?;
    let hasher = Argon2Hasher::new(config.hash_cost).into_diagnostic()?;
    let storefront = Storefront::new(
        Arc::clone(&storage),
        Arc::new(hasher),
        UploadDir::new(&config.upload_dir),
    );
    storefront
        .accounts
        .ensure_default_admin(&config.admin_username, &config.admin_password)
        .await
        .into_diagnostic()?;

    let file = File::open(&cli.input).into_diagnostic()?;
    let mut runner = ScriptRunner::new(storefront.clone());
    let summary = runner.run(RequestReader::new(file)).await;
    info!(
        succeeded = summary.succeeded,
        failed = summary.failed,
        "script finished"
    );

    let stdout = io::stdout();
    match cli.report {
        Report::Orders => {
            let orders = storage.orders().await.into_diagnostic()?;
            let mut writer = OrderWriter::new(stdout.lock());
            writer.write_orders(&orders).into_diagnostic()?;
        }
        Report::Products => {
            let products = storefront.catalog.products().await.into_diagnostic()?;
            json::write_products(stdout.lock(), &products).into_diagnostic()?;
        }
        Report::Categories => {
            let categories = storefront.catalog.categories().await.into_diagnostic()?;
            json::write_categories(stdout.lock(), &categories).into_diagnostic()?;
        }
        Report::Search => {
            let products = storefront.catalog.search(&cli.query).await.into_diagnostic()?;
            json::write_products(stdout.lock(), &products).into_diagnostic()?;
        }
    }

    Ok(())
}
