use clap::{Parser, Subcommand};
use rand::Rng;
use reqwest::StatusCode;
use serde_json::{json, Value};
use std::path::PathBuf;
use std::time::{Duration, Instant};

#[derive(Parser)]
#[command(name = "pooling-cli")]
#[command(about = "Client for the car pooling service", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:9091")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check that the service is up
    Status,
    /// Replace the fleet with the cars in a JSON file
    Cars { file: PathBuf },
    /// Request a journey for a group
    Journey {
        #[arg(long)]
        id: u64,
        #[arg(long)]
        people: u8,
    },
    /// Drop off a group
    Dropoff { id: u64 },
    /// Find the car a group rides in
    Locate { id: u64 },
    /// Load a random fleet and time journey, locate and dropoff phases
    Stress {
        #[arg(long, default_value_t = 100_000)]
        cars: u64,
        #[arg(long, default_value_t = 150_000)]
        groups: u64,
        /// Pause between phases, in milliseconds
        #[arg(long, default_value_t = 2000)]
        pause_ms: u64,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = cli.url.trim_end_matches('/').to_string();

    match cli.command {
        Commands::Status => {
            let res = client.get(format!("{base}/status")).send().await?;
            print_response(res).await?;
        }
        Commands::Cars { file } => {
            let cars: Value = serde_json::from_str(&std::fs::read_to_string(file)?)?;
            let res = client.put(format!("{base}/cars")).json(&cars).send().await?;
            print_response(res).await?;
        }
        Commands::Journey { id, people } => {
            let res = client
                .post(format!("{base}/journey"))
                .json(&json!({ "id": id, "people": people }))
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Dropoff { id } => {
            let res = client
                .post(format!("{base}/dropoff"))
                .form(&[("ID", id.to_string())])
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Locate { id } => {
            let res = client
                .post(format!("{base}/locate"))
                .form(&[("ID", id.to_string())])
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Stress {
            cars,
            groups,
            pause_ms,
        } => {
            stress(&client, &base, cars, groups, Duration::from_millis(pause_ms)).await?;
        }
    }

    Ok(())
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let text = res.text().await?;
    println!("{status}");
    if text.is_empty() {
        return Ok(());
    }
    match serde_json::from_str::<Value>(&text) {
        Ok(json) => println!("{}", serde_json::to_string_pretty(&json)?),
        Err(_) => println!("{text}"),
    }
    Ok(())
}

async fn stress(
    client: &reqwest::Client,
    base: &str,
    cars: u64,
    groups: u64,
    pause: Duration,
) -> Result<(), Box<dyn std::error::Error>> {
    let (fleet, journeys, lookups) = {
        let mut rng = rand::thread_rng();
        let fleet: Vec<Value> = (1..=cars)
            .map(|id| json!({ "id": id, "seats": rng.gen_range(4..=6u8) }))
            .collect();
        let journeys: Vec<(u64, u8)> = (1..=groups)
            .map(|id| (id, rng.gen_range(1..=6u8)))
            .collect();
        let lookups: Vec<u64> = (0..groups).map(|_| rng.gen_range(1..=groups)).collect();
        (fleet, journeys, lookups)
    };

    let start = Instant::now();
    let res = client.put(format!("{base}/cars")).json(&fleet).send().await?;
    report(&format!("{cars} cars"), start, &[res.status()]);
    tokio::time::sleep(pause).await;

    let start = Instant::now();
    let mut statuses = Vec::with_capacity(journeys.len());
    for (id, people) in &journeys {
        let res = client
            .post(format!("{base}/journey"))
            .json(&json!({ "id": id, "people": people }))
            .send()
            .await?;
        statuses.push(res.status());
    }
    report(&format!("{groups} journeys"), start, &statuses);
    tokio::time::sleep(pause).await;

    let start = Instant::now();
    let mut statuses = Vec::with_capacity(lookups.len());
    for id in &lookups {
        let res = client
            .post(format!("{base}/locate"))
            .form(&[("ID", id.to_string())])
            .send()
            .await?;
        statuses.push(res.status());
    }
    report(&format!("{groups} locates"), start, &statuses);
    tokio::time::sleep(pause).await;

    let start = Instant::now();
    let mut statuses = Vec::with_capacity(journeys.len());
    for (id, _) in &journeys {
        let res = client
            .post(format!("{base}/dropoff"))
            .form(&[("ID", id.to_string())])
            .send()
            .await?;
        statuses.push(res.status());
    }
    report(&format!("{groups} dropoffs"), start, &statuses);

    Ok(())
}

fn report(phase: &str, start: Instant, statuses: &[StatusCode]) {
    let elapsed = start.elapsed();
    let mut counts: Vec<(StatusCode, usize)> = Vec::new();
    for status in statuses {
        match counts.iter_mut().find(|(s, _)| s == status) {
            Some((_, n)) => *n += 1,
            None => counts.push((*status, 1)),
        }
    }
    counts.sort_by_key(|(s, _)| s.as_u16());

    let summary: Vec<String> = counts
        .iter()
        .map(|(s, n)| format!("{}={n}", s.as_u16()))
        .collect();
    println!(
        "{phase:<20} {:>10.3}s  [{}]",
        elapsed.as_secs_f64(),
        summary.join(" ")
    );
}
