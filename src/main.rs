//! # Mastro CLI (`mastro`)
//!
//! Browse the catalogue, feature store, metric store and Kafka services
//! from the terminal.
//!
//! ## Usage
//!
//! ```bash
//! mastro --config ./config/mastro.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `mastro services` | Show each logical service and the URL it resolves to |
//! | `mastro search "<query>"` | Search assets by name, tags or free text |
//! | `mastro asset <name>` | Asset detail with its lineage |
//! | `mastro featuresets <asset>` | Featuresets recorded for an asset |
//! | `mastro metricsets <asset>` | Data quality metricsets recorded for an asset |
//! | `mastro connectors [name]` | Kafka Connect connectors and task states |
//! | `mastro connector restart <name>` | Restart a connector's failed tasks |
//! | `mastro schemas [subject]` | Latest Schema Registry subject versions |
//!
//! ## Examples
//!
//! ```bash
//! # Exact name lookup
//! mastro search orders
//!
//! # Tag search, second page of five
//! mastro search "#sales, #daily" --limit 5 --page 2
//!
//! # Expand one metricset
//! mastro metricsets orders --select orders-quality@3
//!
//! # Point the catalogue somewhere else for one run
//! MASTRO_CATALOGUE_URL=http://localhost:8085 mastro search orders
//! ```

use clap::{Args, Parser, Subcommand};
use std::io::IsTerminal;
use std::path::PathBuf;

use mastro_dashboard::commands::{self, ListArgs, Report};
use mastro_dashboard::config;
use mastro_dashboard::dashboard::Dashboard;
use mastro_dashboard::logging::{self, LogConfig, LogFormat};

/// Mastro dashboard: browse data assets, featuresets, metricsets and Kafka
/// services.
///
/// Service URLs come from `MASTRO_{NAME}_URL` environment variables, then the
/// `[services]` table of the config file, then the bare logical name.
#[derive(Parser)]
#[command(name = "mastro", version)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Defaults to `./config/mastro.toml`. A missing file at this path means
    /// built-in defaults.
    #[arg(long, global = true, default_value = "./config/mastro.toml")]
    config: PathBuf,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Log record format on stderr.
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Compact)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List logical services and the URL each one resolves to.
    Services,

    /// Search catalogue assets.
    ///
    /// A single word is an exact name lookup, a comma separated list whose
    /// first element starts with `#` is a tag search, anything else is a
    /// free text search.
    Search {
        query: String,
        #[command(flatten)]
        paging: PagingArgs,
    },

    /// Show one asset with its dependency lineage.
    Asset { name: String },

    /// List featuresets recorded for an asset.
    Featuresets {
        asset: String,
        #[command(flatten)]
        paging: PagingArgs,
        /// Expand the featureset with this `name@version` key.
        #[arg(long)]
        select: Option<String>,
    },

    /// List data quality metricsets recorded for an asset.
    Metricsets {
        asset: String,
        #[command(flatten)]
        paging: PagingArgs,
        /// Expand the metricset with this `name@version` key.
        #[arg(long)]
        select: Option<String>,
    },

    /// List Kafka Connect connectors, or one connector by name.
    Connectors {
        name: Option<String>,
        #[command(flatten)]
        paging: PagingArgs,
    },

    /// Act on a single connector.
    Connector {
        #[command(subcommand)]
        action: ConnectorAction,
    },

    /// List the latest version of Schema Registry subjects, or one subject.
    Schemas {
        subject: Option<String>,
        #[command(flatten)]
        paging: PagingArgs,
    },
}

#[derive(Subcommand)]
enum ConnectorAction {
    /// Restart a connector together with its failed tasks.
    Restart { name: String },
}

#[derive(Args)]
struct PagingArgs {
    /// Page size; defaults to the `[paging]` value for this list.
    #[arg(long)]
    limit: Option<usize>,

    /// Page number, starting at 1.
    #[arg(long)]
    page: Option<usize>,
}

impl PagingArgs {
    fn into_list_args(self, select: Option<String>) -> ListArgs {
        ListArgs {
            limit: self.limit,
            page: self.page,
            select,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    logging::init_logging(
        &LogConfig::from_verbosity(cli.verbose)
            .with_format(cli.log_format)
            .with_ansi(std::io::stderr().is_terminal()),
    );

    let cfg = config::load_config_or_default(&cli.config)?;
    let dashboard = Dashboard::connect(&cfg)?;

    let report = match cli.command {
        Commands::Services => commands::run_services(&dashboard),
        Commands::Search { query, paging } => {
            commands::run_search(&dashboard, &query, &paging.into_list_args(None)).await?
        }
        Commands::Asset { name } => commands::run_asset(&dashboard, &name).await?,
        Commands::Featuresets {
            asset,
            paging,
            select,
        } => commands::run_featuresets(&dashboard, &asset, &paging.into_list_args(select)).await?,
        Commands::Metricsets {
            asset,
            paging,
            select,
        } => commands::run_metricsets(&dashboard, &asset, &paging.into_list_args(select)).await?,
        Commands::Connectors { name, paging } => {
            commands::run_connectors(&dashboard, name.as_deref(), &paging.into_list_args(None))
                .await?
        }
        Commands::Connector { action } => match action {
            ConnectorAction::Restart { name } => commands::run_restart(&dashboard, &name).await?,
        },
        Commands::Schemas { subject, paging } => {
            commands::run_schemas(&dashboard, subject.as_deref(), &paging.into_list_args(None))
                .await?
        }
    };

    finish(report)
}

fn finish(report: Report) -> anyhow::Result<()> {
    if !report.text.is_empty() {
        println!("{}", report.text);
    }
    if !report.ok {
        std::process::exit(1);
    }
    Ok(())
}
