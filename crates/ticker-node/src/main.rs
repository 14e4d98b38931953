use anyhow::{Context, Result};
use clap::Parser;
use coin_ticker::common::config::TickerConfig;
use coin_ticker::common::{CryptoCurrency, CurrencyPair, FiatCurrency};
use coin_ticker::{
    registry, ControllerSettings, HttpFetcher, LoggingSink, RefreshController, RefreshOutcome,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "coin-ticker")]
#[command(about = "Cryptocurrency price ticker aggregating several price APIs")]
struct Cli {
    /// TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Cryptocurrency to show, e.g. BTC
    #[arg(long)]
    crypto: Option<CryptoCurrency>,

    /// Fiat currency to quote in, e.g. USD
    #[arg(long)]
    fiat: Option<FiatCurrency>,

    /// Seconds between refreshes
    #[arg(long)]
    interval_secs: Option<u64>,

    /// Refresh once, print the results and exit
    #[arg(long)]
    once: bool,

    /// With --once, print the results as JSON
    #[arg(long, requires = "once")]
    json: bool,

    /// Print the registered providers and their currencies, then exit
    #[arg(long)]
    list_providers: bool,
}

fn load_config(cli: &Cli) -> Result<TickerConfig> {
    let mut config = match &cli.config {
        Some(path) => TickerConfig::load(path)?,
        None => TickerConfig::default(),
    };

    if let Some(crypto) = cli.crypto {
        config.default_crypto = crypto;
    }
    if let Some(fiat) = cli.fiat {
        config.default_fiat = fiat;
    }
    if let Some(secs) = cli.interval_secs {
        config.refresh_interval_secs = secs;
    }
    config.validate().context("Invalid configuration")?;

    Ok(config)
}

fn codes<T: ToString>(items: &[T]) -> String {
    items
        .iter()
        .map(|c| c.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

async fn refresh_once(controller: Arc<RefreshController>, pair: CurrencyPair, json: bool) -> Result<()> {
    let results = controller.refresh().await.join().await;

    if json {
        let rendered =
            serde_json::to_string_pretty(&results).context("Failed to serialize results")?;
        println!("{rendered}");
        return Ok(());
    }

    println!("{pair}");
    for result in results {
        let line = match result.outcome {
            RefreshOutcome::Updated { price } => format!("{price:.2}"),
            RefreshOutcome::Failed { reason } => format!("failed ({reason})"),
            RefreshOutcome::InFlight => "still refreshing".to_string(),
            RefreshOutcome::Excluded => continue,
        };
        println!("  {:<16} {}", result.provider, line);
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;

    info!("Coin Ticker v{}", env!("CARGO_PKG_VERSION"));

    let providers =
        registry::build_providers(&config).context("Failed to register price providers")?;

    if cli.list_providers {
        for provider in &providers {
            println!("{}", provider.name());
            println!("  crypto: {}", codes(provider.accepted_cryptos()));
            println!("  fiat:   {}", codes(provider.accepted_fiats()));
        }
        return Ok(());
    }

    let pair = config.default_pair();
    let fetcher = HttpFetcher::from_config(&config).context("Failed to create HTTP client")?;
    let controller = Arc::new(RefreshController::new(
        providers,
        pair,
        Arc::new(LoggingSink),
        Arc::new(fetcher),
        ControllerSettings::from(&config),
    ));

    let active = controller.active_providers().await;
    if active.is_empty() {
        warn!("No registered provider quotes {}", pair);
    } else {
        info!("Active providers for {}: {}", pair, active.join(", "));
    }

    if cli.once {
        return refresh_once(controller, pair, cli.json).await;
    }

    let every = Duration::from_secs(config.refresh_interval_secs);
    info!("Refreshing every {}s, press Ctrl-C to stop", config.refresh_interval_secs);
    controller
        .run(every, async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!("Failed to listen for Ctrl-C: {}", e);
                std::future::pending::<()>().await;
            }
        })
        .await;

    Ok(())
}
