mod cases;

use futures::future::join_all;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use ta_common::client::{TaClient, TaClientConfig};

use cases::{check_shape, ProbeCase, CASES};

/// Smoke test for a running virtual TA: `ta-probe [BASE_URL]`.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    let mut config = TaClientConfig::from_env();
    if let Some(base_url) = std::env::args().nth(1) {
        config = config.with_base_url(&base_url);
    }
    info!(
        base_url = %config.base_url,
        timeout_ms = config.timeout.as_millis() as u64,
        max_retries = config.max_retries,
        retry_ask = config.retry_ask,
        "probing virtual TA"
    );
    let client = TaClient::new(config)?;

    let mut failures = 0usize;

    match client.health().await {
        Ok(health) => println!("health: {} ({})", health.status, health.version),
        Err(e) => {
            error!(error = %e, "health check failed");
            failures += 1;
        }
    }

    // Requests run concurrently; results come back in case order.
    let requests: Vec<_> = CASES.iter().map(ProbeCase::request).collect();
    let outcomes = join_all(requests.iter().map(|request| client.ask(request))).await;

    for (i, (case, outcome)) in CASES.iter().zip(outcomes).enumerate() {
        println!("\ncase {}: {}", i + 1, case.name);
        println!("question: {}", case.question);
        match outcome {
            Ok(response) => {
                println!("answer: {}", response.answer);
                println!("links: {}", response.links.len());
                let problems = check_shape(&response);
                if problems.is_empty() {
                    println!("shape: ok");
                } else {
                    println!("shape: {}", problems.join("; "));
                    failures += 1;
                }
            }
            Err(e) => {
                error!(case = case.name, error = %e, "request failed");
                failures += 1;
            }
        }
    }

    if failures > 0 {
        anyhow::bail!("{failures} probe check(s) failed");
    }
    info!("all probe checks passed");
    Ok(())
}
