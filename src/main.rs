use std::cmp::Ordering;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde_json::Value;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod aggregate;
mod engine;
mod models;
mod report;
mod resolve;
mod risk;
mod summary;
mod translate;
mod upstream;

use engine::Engine;
use upstream::HttpUpstream;

const DEFAULT_API_URL: &str = "http://localhost:8080/api";
const FEATURE_OFFLINE: &str =
    "API indisponível: este recurso só funciona quando o status for ONLINE.";

#[derive(Parser)]
#[command(name = "churninsight")]
#[command(about = "Customer churn dashboard over the ChurnInsight prediction API", long_about = None)]
struct Cli {
    /// Base URL of the prediction API (CHURNINSIGHT_API_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,
    /// Authorization header value, e.g. "Bearer <token>" (CHURNINSIGHT_API_AUTH)
    #[arg(long, global = true)]
    api_auth: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Probe the API health endpoint and print the connectivity badge
    Status,
    /// Run a full refresh cycle and print the dashboard
    Refresh {
        #[arg(long)]
        json: bool,
    },
    /// Generate a markdown report
    Report {
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
        #[arg(long)]
        factor: Option<String>,
    },
    /// Score customer rows from a CSV file without touching the API
    Score {
        #[arg(long)]
        csv: PathBuf,
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
    /// Send a customer profile to the prediction endpoint
    Predict {
        #[arg(long)]
        profile: PathBuf,
    },
    /// Print the diagnosis block for one classified customer
    Explain {
        #[arg(long)]
        client_id: Option<String>,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let api_url = cli
        .api_url
        .or_else(|| std::env::var("CHURNINSIGHT_API_URL").ok())
        .unwrap_or_else(|| DEFAULT_API_URL.to_string());
    let api_auth = cli
        .api_auth
        .or_else(|| std::env::var("CHURNINSIGHT_API_AUTH").ok());

    let mut engine = Engine::new(HttpUpstream::new(api_url, api_auth));

    match cli.command {
        Commands::Status => {
            let state = engine.probe();
            println!("{}", state.badge());
        }
        Commands::Refresh { json } => {
            engine.refresh();
            if json {
                println!("{}", serde_json::to_string_pretty(engine.snapshot())?);
            } else {
                print!("{}", report::build_report(engine.snapshot(), None));
            }
        }
        Commands::Report { out, factor } => {
            engine.refresh();
            if engine.state().is_online() {
                engine.select_factor(factor);
            }
            let report = report::build_report(engine.snapshot(), engine.selected_factor());
            std::fs::write(&out, report)?;
            println!("Report written to {}.", out.display());
        }
        Commands::Score { csv, limit } => {
            let records = read_csv_records(&csv)?;
            if records.is_empty() {
                println!("No customer rows found in {}.", csv.display());
                return Ok(());
            }

            let mut customers: Vec<_> = records.iter().map(risk::classify_customer).collect();
            customers.sort_by(|a, b| {
                b.probability
                    .partial_cmp(&a.probability)
                    .unwrap_or(Ordering::Equal)
            });

            println!("Top customers by churn probability:");
            for customer in customers.iter().take(limit) {
                println!(
                    "- {} {:.1}% [{}] {}",
                    customer.client_id,
                    customer.probability * 100.0,
                    customer.band.badge(),
                    customer.risk_factor
                );
            }

            let stats = aggregate::aggregate(&[], &customers);
            if !stats.is_empty() {
                println!();
                println!("Principais Fatores de Risco:");
                for stat in stats.iter() {
                    println!(
                        "- {}: {} usuários ({:.1}%)",
                        stat.display_name,
                        stat.count,
                        stat.share()
                    );
                }
            }
        }
        Commands::Predict { profile } => {
            let raw = std::fs::read_to_string(&profile)
                .with_context(|| format!("failed to read {}", profile.display()))?;
            let profile_json: Value = serde_json::from_str(&raw)
                .with_context(|| format!("{} is not valid JSON", profile.display()))?;

            if !engine.probe().is_online() {
                println!("{}", engine.state().badge());
                println!("{}", FEATURE_OFFLINE);
                return Ok(());
            }

            let result = engine
                .predict(&profile_json)
                .context("prediction request failed")?;
            let prediction = risk::classify_prediction(&result, Some(&profile_json));
            let label = resolve::resolve_client_id(&profile_json)
                .unwrap_or_else(|| "Cliente Anônimo".to_string());
            print!("{}", report::build_prediction_block(&prediction, &label));
        }
        Commands::Explain { client_id } => {
            engine.refresh();
            if !engine.state().is_online() {
                println!("{}", engine.state().badge());
                println!("{}", FEATURE_OFFLINE);
                return Ok(());
            }

            engine.select_client(client_id);
            match engine.selected_customer() {
                Some(customer) => print!("{}", report::build_diagnosis_block(customer)),
                None => println!("No classified customers available."),
            }
        }
    }

    Ok(())
}

/// Reads loose CSV rows as JSON objects so the classifier sees the same
/// shape the API returns. Every cell stays a string, the resolver coerces.
fn read_csv_records(path: &Path) -> anyhow::Result<Vec<Value>> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut records = Vec::new();

    for result in reader.deserialize::<HashMap<String, String>>() {
        let row = result?;
        let fields: serde_json::Map<String, Value> = row
            .into_iter()
            .map(|(key, value)| (key, Value::String(value)))
            .collect();
        records.push(Value::Object(fields));
    }

    Ok(records)
}
