use chrono::{Duration as ChronoDuration, Utc};
use colored::*;
use governor::{Quota, RateLimiter};
use hdrhistogram::Histogram;
use reqwest::Client;
use serde_json::Value;
use std::env;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

const DURATION_SECS: u64 = 20;

struct Target {
    name: &'static str,
    url: String,
}

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    let base_url = env::var("BENCH_URL").unwrap_or_else(|_| "http://localhost:3000".to_string());

    println!("{}", "Starting Benchmark Suite".bold().green());
    println!("Target URL: {}", base_url);

    let client = Client::builder()
        .pool_max_idle_per_host(1000)
        .timeout(Duration::from_secs(10))
        .build()
        .expect("Failed to build HTTP client");

    if client.get(format!("{}/health", base_url)).send().await.is_err() {
        eprintln!("{}", format!("Server is NOT reachable at {}. Please start it first.", base_url).red().bold());
        return;
    }

    let Some((facility_id, sport)) = pick_facility(&client, &base_url).await else {
        eprintln!("{}", "No approved facility found. Register and approve one, or set BENCH_FACILITY_ID.".red().bold());
        return;
    };
    let date = (Utc::now() + ChronoDuration::days(1)).format("%Y-%m-%d").to_string();

    println!("   Facility: {}", facility_id);
    println!("   Sport:    {}", sport);
    println!("   Date:     {}", date);

    let targets = vec![
        Target {
            name: "Health Check",
            url: format!("{}/health", base_url),
        },
        Target {
            name: "Browse Facilities",
            url: format!("{}/api/v1/facilities", base_url),
        },
        Target {
            name: "Facility Details",
            url: format!("{}/api/v1/facilities/{}", base_url, facility_id),
        },
        Target {
            name: "Slot Generation",
            url: format!("{}/api/v1/facilities/{}/slots?sport={}&date={}", base_url, facility_id, sport, date),
        },
    ];

    let rps_stages = vec![10, 50, 200, 1000];

    for target in targets {
        println!("\n{}", "=".repeat(60));
        println!("Benchmarking Endpoint: {}", target.name.cyan().bold());
        println!("URL: {}", target.url);
        println!("{}", "=".repeat(60));

        println!("{:<10} | {:<15} | {:<15} | {:<15}", "RPS", "Mean (ms)", "P99 (ms)", "Success Rate");
        println!("{:-<10}-+-{:-<15}-+-{:-<15}-+-{:-<15}", "", "", "", "");

        for &rps in &rps_stages {
            run_stage(&client, &target, rps).await;
        }
    }
}

/// Facility under test and the English name of its first sport.
async fn pick_facility(client: &Client, base_url: &str) -> Option<(String, String)> {
    let facility: Value = match env::var("BENCH_FACILITY_ID") {
        Ok(id) => client.get(format!("{}/api/v1/facilities/{}", base_url, id))
            .send().await.ok()?
            .json().await.ok()?,
        Err(_) => {
            let list: Value = client.get(format!("{}/api/v1/facilities", base_url))
                .send().await.ok()?
                .json().await.ok()?;
            list.as_array()?.first()?.clone()
        }
    };

    let id = facility["id"].as_str()?.to_string();
    let sport = facility["sport_types"][0]["name_en"].as_str()?.to_string();
    Some((id, sport))
}

async fn run_stage(client: &Client, target: &Target, rps: u32) {
    let Some(rate) = NonZeroU32::new(rps) else {
        return;
    };
    let limiter = Arc::new(RateLimiter::direct(Quota::per_second(rate)));

    let (tx, mut rx) = mpsc::channel(50000);
    let start_time = Instant::now();
    let duration = Duration::from_secs(DURATION_SECS);

    loop {
        if start_time.elapsed() > duration {
            break;
        }

        if limiter.check().is_ok() {
            let client = client.clone();
            let url = target.url.clone();
            let tx = tx.clone();

            tokio::spawn(async move {
                let req_start = Instant::now();
                let res = client.get(&url).send().await;
                let latency = req_start.elapsed();

                let success = match res {
                    Ok(r) => r.status().is_success(),
                    Err(_) => false,
                };

                let _ = tx.send((latency, success)).await;
            });
        } else {
            tokio::task::yield_now().await;
        }
    }

    drop(tx);

    let mut histogram = Histogram::<u64>::new(3).expect("valid histogram precision");
    let mut successes = 0;
    let mut total = 0;

    while let Some((latency, success)) = rx.recv().await {
        total += 1;
        if success { successes += 1; }
        let _ = histogram.record(latency.as_micros() as u64);
    }

    let mean_ms = histogram.mean() / 1000.0;
    let p99_ms = histogram.value_at_quantile(0.99) as f64 / 1000.0;
    let success_rate = if total > 0 { (successes as f64 / total as f64) * 100.0 } else { 0.0 };

    println!(
        "{:<10} | {:<15.2} | {:<15.2} | {:<14.1}%",
        rps,
        mean_ms,
        p99_ms,
        success_rate
    );

    tokio::time::sleep(Duration::from_millis(500)).await;
}
