use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use storefront::{
    catalog::InMemoryCatalog,
    config::StoreConfig,
    fixtures::Fixture,
    pricing::PricingRules,
    storage::{FileStore, KeyValueStore},
};
use tracing::debug;

mod account;
mod cart;
mod checkout;
mod products;

#[derive(Debug, Parser)]
#[command(name = "storefront", about = "Storefront CLI", long_about = None)]
pub(crate) struct Cli {
    /// Store configuration file (YAML); embedded defaults when omitted
    #[arg(short, long, env = "STOREFRONT_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Directory holding the persisted cart and session
    #[arg(
        short,
        long,
        env = "STOREFRONT_DATA_DIR",
        default_value = ".storefront",
        global = true
    )]
    data_dir: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "RUST_LOG", default_value = "warn", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// List products, filtered and sorted
    Products(products::ListArgs),
    /// Show one product
    Product(products::ShowArgs),
    /// List the brands, sizes and colors on offer
    Facets,
    /// Inspect and change the cart
    Cart(cart::CartCommand),
    /// Place an order for the cart
    Checkout(checkout::CheckoutArgs),
    /// Sign in with email and password
    SignIn(account::SignInArgs),
    /// Create an account and sign in
    SignUp(account::SignUpArgs),
    /// Sign out
    SignOut,
    /// Show the signed-in user
    Whoami,
}

/// Everything a command needs.
#[derive(Debug)]
pub(crate) struct Context {
    pub(crate) config: StoreConfig,
    pub(crate) rules: PricingRules,
    pub(crate) storage: Arc<dyn KeyValueStore>,
    pub(crate) catalog: InMemoryCatalog,
}

impl Cli {
    pub(crate) fn log_level(&self) -> &str {
        &self.log_level
    }

    pub(crate) async fn run(self) -> anyhow::Result<()> {
        let ctx = self.context()?;

        match self.command {
            Commands::Products(args) => products::list(&ctx, args).await,
            Commands::Product(args) => products::show(&ctx, args).await,
            Commands::Facets => products::facets(&ctx).await,
            Commands::Cart(command) => cart::run(&ctx, command).await,
            Commands::Checkout(args) => checkout::run(&ctx, args),
            Commands::SignIn(args) => account::sign_in(&ctx, args).await,
            Commands::SignUp(args) => account::sign_up(&ctx, args).await,
            Commands::SignOut => account::sign_out(&ctx),
            Commands::Whoami => account::whoami(&ctx),
        }
    }

    fn context(&self) -> anyhow::Result<Context> {
        let config = match &self.config {
            Some(path) => StoreConfig::load(path)
                .with_context(|| format!("failed to load config {}", path.display()))?,
            None => StoreConfig::embedded()?,
        };

        let rules = config.pricing_rules()?;

        let storage = FileStore::open(&self.data_dir)
            .with_context(|| format!("failed to open data dir {}", self.data_dir.display()))?;

        let catalog = Fixture::seed()?.catalog();

        debug!(products = catalog.len(), data_dir = %self.data_dir.display(), "context ready");

        Ok(Context {
            catalog: InMemoryCatalog::with_latency(catalog, config.catalog_latency()),
            rules,
            storage: Arc::new(storage),
            config,
        })
    }
}
