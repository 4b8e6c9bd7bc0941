use citescan::application::orchestrator::Orchestrator;
use citescan::config::AppConfig;
use citescan::domain::lookup::{LookupRequest, SearchScope};
use citescan::domain::payment::{PaymentInstrument, PaymentOutcome, PaymentRequest};
use citescan::domain::violation::{Amount, Jurisdiction, Plate};
use citescan::infrastructure::build_registry;
use citescan::interfaces::csv::violation_writer::ViolationWriter;
use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result, bail};
use rust_decimal::Decimal;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the portal configuration file
    #[arg(long, default_value = "citescan.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Search registered portals for citations against a plate
    Lookup {
        /// License plate number
        plate: String,

        /// Jurisdiction the plate is registered in
        #[arg(long)]
        registered_in: String,

        /// Jurisdiction to search; repeatable. Defaults to every
        /// registered source.
        #[arg(long = "state")]
        states: Vec<String>,
    },
    /// Pay one citation through the jurisdiction that issued it
    Pay {
        /// Citation number as reported by the source
        citation: String,

        /// Jurisdiction that issued the citation
        #[arg(long)]
        state: String,

        /// Amount to charge
        #[arg(long)]
        amount: Decimal,

        /// Stored payment instrument token
        #[arg(long)]
        card: Option<String>,

        /// Billing postal code for the instrument
        #[arg(long)]
        postal_code: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let config = AppConfig::load(&cli.config).into_diagnostic()?;
    let registry = Arc::new(build_registry(&config).into_diagnostic()?);
    let orchestrator = Orchestrator::new(registry)
        .with_deadline(Duration::from_millis(config.lookup.deadline_ms));

    match cli.command {
        Command::Lookup {
            plate,
            registered_in,
            states,
        } => {
            let registered_in: Jurisdiction = registered_in.parse().into_diagnostic()?;
            let plate = Plate::new(&plate, registered_in).into_diagnostic()?;
            let scope = if states.is_empty() {
                SearchScope::AllRegistered
            } else {
                let jurisdictions = states
                    .iter()
                    .map(|state| state.parse())
                    .collect::<Result<Vec<Jurisdiction>, _>>()
                    .into_diagnostic()?;
                SearchScope::only(jurisdictions)
            };

            let report = orchestrator
                .lookup(&LookupRequest::new(plate, scope))
                .await
                .into_diagnostic()?;

            for failure in &report.failures {
                eprintln!(
                    "warning: {} ({}) failed: {}",
                    failure.source, failure.jurisdiction, failure.cause
                );
            }
            if report.violations.is_empty() {
                eprintln!("no violations found");
            } else {
                let stdout = io::stdout();
                let mut writer = ViolationWriter::new(stdout.lock());
                writer.write_report(&report).into_diagnostic()?;
            }
        }
        Command::Pay {
            citation,
            state,
            amount,
            card,
            postal_code,
        } => {
            let jurisdiction: Jurisdiction = state.parse().into_diagnostic()?;
            let amount = Amount::new(amount).into_diagnostic()?;
            let instrument = card.map(|token| PaymentInstrument { token, postal_code });
            let request = PaymentRequest {
                jurisdiction,
                citation,
                amount,
                instrument,
            };

            match orchestrator.pay(&request).await.into_diagnostic()? {
                PaymentOutcome::Completed { confirmation } => match confirmation {
                    Some(confirmation) => println!("paid, confirmation {confirmation}"),
                    None => println!("paid"),
                },
                PaymentOutcome::CitationNotFound => {
                    bail!("citation {} has no outstanding case", request.citation)
                }
                PaymentOutcome::ChargeRejected { reason } => {
                    bail!("charge rejected: {reason}")
                }
                PaymentOutcome::SourceUnavailable(cause) => {
                    bail!("payment source unavailable: {cause}")
                }
            }
        }
    }

    Ok(())
}
