//! Operator CLI for the kiosk relay.
//!
//! Uses the same environment configuration as the server. The name store is locked by
//! whichever process opens it, so commands that touch names (`queue`, `patient`,
//! `call-next`, `names`) cannot run while the server is using the same
//! `KIOSK_NAME_STORE_DIR`.

use clap::{Parser, Subcommand};
use kiosk_core::api_shared::EnrichedEntry;
use kiosk_core::{CoreConfig, HttpQueueAssigner, PatientId, QueueAssigner, QueueRelay};

#[derive(Parser)]
#[command(name = "kiosk")]
#[command(about = "Kiosk check-in relay CLI")]
struct Cli {
    /// Print JSON instead of a table
    #[arg(long, global = true)]
    json: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Probe the external queue-assigner
    Health,
    /// Show the queue with stored names
    Queue,
    /// Show one queued patient
    Patient {
        /// Patient id assigned by the queue-assigner
        id: String,
    },
    /// Call the next patient and forget their name
    CallNext,
    /// Ask the queue-assigner to recompute priorities now
    RefreshPriorities,
    /// List locally stored names
    Names,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let cfg = CoreConfig::from_env()?;

    match cli.command {
        Commands::Health => {
            let assigner = HttpQueueAssigner::new(&cfg)?;
            match assigner.probe().await {
                Ok(status) => println!("up ({}): {}", status, assigner.base_url()),
                Err(e) => {
                    eprintln!("down: {}: {}", assigner.base_url(), e);
                    std::process::exit(1);
                }
            }
        }
        Commands::RefreshPriorities => {
            HttpQueueAssigner::new(&cfg)?.update_priorities().await?;
            println!("Priority update triggered.");
        }
        Commands::Queue => {
            let relay = QueueRelay::connect(&cfg)?;
            let queue = relay.list_queue().await?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&queue)?);
            } else if queue.is_empty() {
                println!("Queue is empty.");
            } else {
                for entry in &queue {
                    print_entry(entry);
                }
            }
        }
        Commands::Patient { id } => {
            let relay = QueueRelay::connect(&cfg)?;
            let patient = relay.get_patient(&PatientId::parse(&id)?).await?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&patient)?);
            } else {
                print_entry(&patient);
            }
        }
        Commands::CallNext => {
            let relay = QueueRelay::connect(&cfg)?;
            let called = relay.call_next().await?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&called)?);
            } else {
                print!("Called: ");
                print_entry(&called);
            }
        }
        Commands::Names => {
            let relay = QueueRelay::connect(&cfg)?;
            let records = relay.stored_names()?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&records)?);
            } else if records.is_empty() {
                println!("No names stored.");
            } else {
                for record in records {
                    println!(
                        "ID: {}, Name: {}, Registered: {}",
                        record.patient_id,
                        record.full_name,
                        record.registered_at.to_rfc3339()
                    );
                }
            }
        }
    }

    Ok(())
}

fn print_entry(entry: &EnrichedEntry) {
    let fmt_opt = |value: Option<String>| value.unwrap_or_else(|| "-".into());
    println!(
        "#{} ID: {}, Name: {}, Priority: {}, Wait: {} min",
        fmt_opt(entry.entry.number("queue_position").map(|p| format!("{p:.0}"))),
        entry.entry.patient_id,
        entry.name,
        fmt_opt(entry.entry.number("priority_score").map(|s| format!("{s:.2}"))),
        fmt_opt(entry.entry.number("estimated_wait_time").map(|w| format!("{w:.0}"))),
    );
}
