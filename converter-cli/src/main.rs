//! Converter CLI
//!
//! Command-line front end for the currency converter:
//! - Load configuration from environment
//! - Build the rate table, document store and identity provider
//! - Sign in when credentials are given
//! - Run the requested command

mod config;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use converter_hex::{ConversionEngine, ConversionRecorder, ConverterService};
use converter_repo::{MemoryIdentityProvider, build_store};
use converter_types::{ConversionRequest, CurrencyInfo, RateRow};
use rate_table::{Currency, RateTableHandle};

#[derive(Parser)]
#[command(name = "converter")]
#[command(author, version, about = "Currency converter CLI", long_about = None)]
struct Cli {
    /// Email to sign in with
    #[arg(long, env = "CONVERTER_EMAIL", requires = "password")]
    email: Option<String>,

    /// Password to sign in with
    #[arg(long, env = "CONVERTER_PASSWORD", hide_env_values = true, requires = "email")]
    password: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert an amount and record it for the signed-in user
    Convert {
        /// Amount, digits with an optional decimal point
        amount: String,
        /// Source currency code
        #[arg(long, default_value = "USD")]
        from: String,
        /// Target currency code
        #[arg(long, default_value = "EUR")]
        to: String,
    },
    /// Show the rate table
    Rates {
        /// Only show rates from this currency
        #[arg(long)]
        base: Option<String>,
        /// Report stored inverse pairs that disagree beyond the configured tolerance
        #[arg(long, conflicts_with = "base")]
        check: bool,
    },
    /// List the signed-in user's recorded conversions
    History,
    /// List supported currencies
    Currencies,
}

fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "warn,converter_cli=info".into());
    let registry = tracing_subscriber::registry().with(filter);

    // Logs go to stderr so command output stays pipeable.
    if json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn parse_currency(s: &str) -> Result<Currency> {
    s.parse().map_err(|e| {
        let supported: Vec<&str> = Currency::ALL.iter().map(|c| c.code()).collect();
        anyhow::anyhow!("{}. Supported: {}", e, supported.join(", "))
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Load configuration
    let config = config::Config::from_env()?;
    init_tracing(config.log_json);

    let table = config.rate_table()?;
    for deviation in table.inverse_inconsistencies(config.inverse_tolerance) {
        tracing::warn!("Inconsistent inverse rates: {}", deviation);
    }
    let rates = RateTableHandle::new(table);

    let store = build_store(config.database_url.as_deref()).await?;
    tracing::info!("Using {} document store", store.kind());

    let identity = MemoryIdentityProvider::with_users(
        config
            .users
            .iter()
            .map(|(email, password)| (email.as_str(), password.as_str())),
    );

    let service = ConverterService::new(
        identity,
        ConversionEngine::with_system_clock(rates),
        ConversionRecorder::new(store).with_retry(config.retry),
    );

    if let (Some(email), Some(password)) = (&cli.email, &cli.password) {
        if let Err(e) = service.sign_in(email, password).await {
            eprintln!("✗ {}", e);
            std::process::exit(1);
        }
    }

    match cli.command {
        Commands::Convert { amount, from, to } => {
            let outcome = match service
                .convert(ConversionRequest::new(amount, from, to))
                .await
            {
                Ok(outcome) => outcome,
                Err(e) => {
                    eprintln!("✗ {}", e);
                    std::process::exit(1);
                }
            };

            println!("{}", outcome.result.display_line());

            // The result above stands whatever happens to the record.
            let (_, record) = outcome.record_outcome().await;
            match record {
                Ok(id) => eprintln!("✓ Conversion saved ({})", id),
                Err(e) => eprintln!("! {}", e),
            }
        }

        Commands::Rates { base, check } => {
            let table = service.rates();
            let base = base.as_deref().map(parse_currency).transpose()?;

            if check {
                let deviations = table.inverse_inconsistencies(config.inverse_tolerance);
                if deviations.is_empty() {
                    println!(
                        "✓ All stored inverse pairs within {:.1}%",
                        config.inverse_tolerance * 100.0
                    );
                }
                for deviation in deviations {
                    println!("✗ {}", deviation);
                }
            } else {
                for row in RateRow::from_table(&table, base) {
                    println!("{} -> {}  {}", row.from, row.to, row.rate);
                }
            }
        }

        Commands::History => {
            let records = service.history().await?;
            println!("{}", serde_json::to_string_pretty(&records)?);
        }

        Commands::Currencies => {
            let currencies: Vec<CurrencyInfo> =
                service.rates().currencies().map(CurrencyInfo::from).collect();
            println!("{}", serde_json::to_string_pretty(&currencies)?);
        }
    }

    service.sign_out();
    Ok(())
}
