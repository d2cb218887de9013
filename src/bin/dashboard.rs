use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

use polymarket_analytics::DEFAULT_ACCOUNT;
use polymarket_analytics::cache::ResponseCache;
use polymarket_analytics::client::Subgraphs;
use polymarket_analytics::config::{AppConfig, CONFIG_PATH};
use polymarket_analytics::pages::{
    AccountPage, DisplayZone, MatchedColumn, OrdersMatchedPage, Page, PositionsPage,
    RedemptionColumn, RedemptionsPage, TradesPage,
};
use polymarket_analytics::pipeline::{self, PageState};
use polymarket_analytics::{render, reporter};

#[derive(Parser)]
#[command(name = "dashboard", about = "Polymarket subgraph analytics in the terminal")]
struct Cli {
    /// Path to the dashboard config file
    #[arg(long, default_value = CONFIG_PATH)]
    config: PathBuf,

    /// Print each page as one JSON line instead of tables
    #[arg(long, conflicts_with = "pretty")]
    json: bool,

    /// Print each page as pretty-printed JSON
    #[arg(long)]
    pretty: bool,

    /// Render timestamps in UTC instead of the local time zone
    #[arg(long)]
    utc: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    #[command(flatten)]
    Page(PageCommand),
    /// Write a config file with the built-in defaults
    InitConfig {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Subcommand)]
enum PageCommand {
    /// Latest order fills
    Trades,
    /// Matched orders, sortable
    Matched {
        /// Column header to click; repeat to replay several clicks
        #[arg(long = "sort", value_name = "COLUMN")]
        sort: Vec<MatchedColumn>,
    },
    /// Largest user positions with a top-5 breakdown
    Positions,
    /// Payout redemptions, sortable
    Redemptions {
        /// Column header to click; repeat to replay several clicks
        #[arg(long = "sort", value_name = "COLUMN")]
        sort: Vec<RedemptionColumn>,
    },
    /// Profit and loss of one account
    Account {
        /// Account address
        #[arg(default_value = DEFAULT_ACCOUNT)]
        address: String,

        /// After the first lookup, read one address per line from stdin and look each up
        #[arg(long)]
        interactive: bool,
    },
}

#[derive(Clone, Copy)]
enum Output {
    Table,
    JsonLine,
    JsonPretty,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let command = match cli.command {
        Command::InitConfig { force } => {
            init_config(&cli.config, force)?;
            return Ok(ExitCode::SUCCESS);
        }
        Command::Page(command) => command,
    };

    let config = AppConfig::load_or_default(&cli.config)?;
    let cache = Arc::new(ResponseCache::new(config.cache.capacity));
    let http = reqwest::Client::builder()
        .build()
        .context("failed to build HTTP client")?;
    let subgraphs = Subgraphs::try_new(http, cache, config.settings.fetch_policy, |s| {
        config.endpoint_url(s)
    })?;

    let output = if cli.json {
        Output::JsonLine
    } else if cli.pretty {
        Output::JsonPretty
    } else {
        Output::Table
    };
    let zone = if cli.utc {
        DisplayZone::Utc
    } else {
        DisplayZone::Local
    };

    let ok = match command {
        PageCommand::Trades => show(&subgraphs, &TradesPage { zone }, output).await,
        PageCommand::Matched { sort } => {
            let mut page = OrdersMatchedPage {
                zone,
                ..OrdersMatchedPage::default()
            };
            for column in sort {
                page.sort.select(column);
            }
            show(&subgraphs, &page, output).await
        }
        PageCommand::Positions => show(&subgraphs, &PositionsPage, output).await,
        PageCommand::Redemptions { sort } => {
            let mut page = RedemptionsPage::default();
            for column in sort {
                page.sort.select(column);
            }
            show(&subgraphs, &page, output).await
        }
        PageCommand::Account {
            address,
            interactive,
        } => {
            let mut ok = show_account(&subgraphs, &address, zone, output).await;
            if interactive {
                ok &= account_prompt(&subgraphs, zone, output).await?;
            }
            ok
        }
    };

    Ok(if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

fn init_config(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!("{} already exists (use --force to overwrite)", path.display());
    }
    AppConfig::default().save(path)?;
    info!("Wrote default config to {}", path.display());
    Ok(())
}

/// Fetch, transform, and print one page. Returns whether it loaded.
async fn show<P: Page>(subgraphs: &Subgraphs, page: &P, output: Output) -> bool {
    if let Output::Table = output {
        eprint!("{}", render::page(&PageState::<P::Row>::loading::<P>()));
    }
    let state = pipeline::run(subgraphs, page).await;
    match output {
        Output::Table => print!("{}", render::page(&state)),
        Output::JsonLine => reporter::report_page(&state),
        Output::JsonPretty => reporter::report_page_pretty(&state),
    }
    state.is_ready()
}

async fn show_account(
    subgraphs: &Subgraphs,
    address: &str,
    zone: DisplayZone,
    output: Output,
) -> bool {
    let page = AccountPage::new(address).with_zone(zone);
    show(subgraphs, &page, output).await
}

/// Each stdin line is one submitted address; every submit re-fetches.
async fn account_prompt(
    subgraphs: &Subgraphs,
    zone: DisplayZone,
    output: Output,
) -> Result<bool> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut all_ok = true;
    eprintln!("Enter a Polymarket account address (Ctrl+D to quit):");
    while let Some(line) = lines.next_line().await.context("failed to read stdin")? {
        let address = line.trim();
        if address.is_empty() {
            continue;
        }
        all_ok &= show_account(subgraphs, address, zone, output).await;
    }
    Ok(all_ok)
}
