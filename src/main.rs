// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::env;
use std::time::{Duration, Instant};

use anyhow::{anyhow, bail, Context, Result};
use event_processor::config::load_and_validate_config;
use event_processor::engine::{EventProcessor, StatusCode};
use event_processor::observability::messages::config::ConfigurationLoaded;
use event_processor::observability::messages::StructuredLog;
use event_processor::services::ServiceToken;
use tracing_subscriber::EnvFilter;

/// How the job's events are driven.
enum Mode {
    Foreground,
    /// Background run joined with this wait budget per attempt.
    Background(Duration),
}

fn parse_args(args: &[String]) -> Result<(String, Mode)> {
    match args {
        [_, config] => Ok((config.clone(), Mode::Foreground)),
        [_, config, flag, timeout] if flag == "--async" => {
            let millis: u64 = timeout
                .parse()
                .with_context(|| format!("invalid timeout '{}'", timeout))?;
            Ok((config.clone(), Mode::Background(Duration::from_millis(millis))))
        }
        _ => bail!(
            "Usage: {} <config.yaml|config.toml> [--async <timeout_ms>]",
            args.first().map(String::as_str).unwrap_or("event-processor")
        ),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args: Vec<String> = env::args().collect();
    let (config_file, mode) = parse_args(&args)?;
    let start_time = Instant::now();

    let config = load_and_validate_config(&config_file).map_err(|errors| {
        let rendered: Vec<String> = errors.iter().map(ToString::to_string).collect();
        anyhow!("invalid configuration:\n  {}", rendered.join("\n  "))
    })?;
    ConfigurationLoaded {
        path: &config_file,
        process: &config.process,
        module_count: config.modules.len(),
    }
    .log();

    let mut processor = EventProcessor::new(&config, ServiceToken::default())?;

    let status = match mode {
        Mode::Foreground => processor.run().await?,
        Mode::Background(timeout) => {
            processor.run_async()?;
            loop {
                match processor.wait_till_done_async(timeout).await? {
                    StatusCode::TimedOut => {
                        println!("… still running ({} events so far)", processor.total_events());
                    }
                    status => break status,
                }
            }
        }
    };

    processor.end_job().await?;
    let report = processor.trigger_report().await?;

    println!("{}", serde_json::to_string_pretty(&report)?);
    println!("status: {} | total time: {:?}", status, start_time.elapsed());
    Ok(())
}
