mod browse;
mod db;
mod discover;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use localmart_core::{CatalogFilters, SortOrder};
use localmart_discovery::DiscoveryConfig;
use rust_decimal::Decimal;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "localmart-cli")]
#[command(about = "LocalMart catalog discovery command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Database administration
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },
    /// Find serviceable areas matching a pincode or city fragment
    Locate {
        /// At least three characters of a pincode or city name
        query: String,
    },
    /// Check whether approved vendors exist at a pincode
    Verify {
        /// Six-digit pincode
        pincode: String,
    },
    /// Print the catalog once, optionally for a verified pincode
    Catalog {
        /// Pincode to verify and browse; omitted means no location
        #[arg(long)]
        pincode: Option<String>,
        #[command(flatten)]
        filters: FilterArgs,
    },
    /// Interactive catalog: type filter edits, see debounced results
    Browse {
        /// Pincode to verify before the first query
        #[arg(long)]
        pincode: Option<String>,
    },
}

#[derive(Debug, Subcommand)]
enum DbCommands {
    /// Check database connectivity
    Ping,
    /// Apply pending migrations
    Migrate,
    /// Load pincodes, categories, vendors and products from a YAML file
    Seed {
        /// Seed file; defaults to `LOCALMART_SEED_PATH`
        #[arg(long)]
        path: Option<PathBuf>,
    },
}

#[derive(Debug, Default, clap::Args)]
struct FilterArgs {
    /// Case-insensitive substring of the product name
    #[arg(long)]
    search: Option<String>,
    #[arg(long)]
    category_id: Option<i64>,
    #[arg(long)]
    sub_category_id: Option<i64>,
    #[arg(long)]
    business_type: Option<String>,
    /// Inclusive lower price bound
    #[arg(long)]
    min_price: Option<Decimal>,
    /// Inclusive upper price bound
    #[arg(long)]
    max_price: Option<Decimal>,
    /// price_asc, price_desc or newest
    #[arg(long, default_value_t = SortOrder::Newest)]
    sort: SortOrder,
}

impl From<FilterArgs> for CatalogFilters {
    fn from(args: FilterArgs) -> Self {
        Self {
            search_text: args.search,
            category_id: args.category_id,
            sub_category_id: args.sub_category_id,
            business_type: args.business_type,
            price_floor: args.min_price,
            price_ceiling: args.max_price,
            sort_order: args.sort,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let Some(command) = cli.command else {
        println!("localmart-cli ready; run with --help to list commands");
        return Ok(());
    };

    let config = localmart_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let pool_config = localmart_db::PoolConfig::from_app_config(&config);
    let pool = localmart_db::connect_pool(&config.database_url, pool_config).await?;
    let discovery = DiscoveryConfig::from_app_config(&config);

    match command {
        Commands::Db { command } => match command {
            DbCommands::Ping => db::run_db_ping(&pool).await,
            DbCommands::Migrate => db::run_db_migrate(&pool).await,
            DbCommands::Seed { path } => {
                let path = path.unwrap_or_else(|| config.seed_path.clone());
                db::run_db_seed(&pool, &path).await
            }
        },
        Commands::Locate { query } => discover::run_locate(&pool, &query).await,
        Commands::Verify { pincode } => discover::run_verify(&pool, &pincode).await,
        Commands::Catalog { pincode, filters } => {
            discover::run_catalog(&pool, &discovery, pincode.as_deref(), &filters.into()).await
        }
        Commands::Browse { pincode } => {
            browse::run_browse(&pool, discovery, pincode.as_deref()).await
        }
    }
}

#[cfg(test)]
mod tests;
