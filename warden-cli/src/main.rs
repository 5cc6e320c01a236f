//! Warden CLI
//!
//! Runs the Warden API server and exercises the rate limiter and cache
//! from the command line.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use warden_api::{ApiConfig, ApiServer};
use warden_cache::TtlCache;
use warden_core::{ttl_from_secs, LimiterConfig};
use warden_limiter::SlidingWindowLimiter;

/// Warden - in-process rate limiting and TTL caching
#[derive(Parser)]
#[command(name = "warden")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the API server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "3001", env = "WARDEN_PORT")]
        port: u16,
        /// Bind address
        #[arg(short, long, default_value = "0.0.0.0")]
        bind: String,
    },

    /// Run a burst of calls through a limiter and show each decision
    Check {
        /// Key to rate limit
        key: String,
        /// Calls admitted per window
        #[arg(short, long, default_value = "5")]
        max_calls: usize,
        /// Window length in seconds
        #[arg(short, long, default_value = "60")]
        period: f64,
        /// Number of calls to attempt
        #[arg(short, long, default_value = "10")]
        attempts: usize,
        /// Pause between attempts in milliseconds
        #[arg(short, long, default_value = "0")]
        interval_ms: u64,
    },

    /// Measure limiter and cache throughput under concurrent load
    Bench {
        /// Total number of calls
        #[arg(short, long, default_value = "100000")]
        calls: u64,
        /// Number of distinct keys
        #[arg(short, long, default_value = "1000")]
        keys: u64,
        /// Concurrent tasks
        #[arg(short, long, default_value = "8")]
        tasks: u64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        "warden=debug,warden_api=debug,warden_cache=debug,warden_limiter=debug,info"
    } else {
        "warden=info,warden_api=info,warn"
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    match cli.command {
        Commands::Serve { port, bind } => cmd_serve(port, &bind).await,
        Commands::Check {
            key,
            max_calls,
            period,
            attempts,
            interval_ms,
        } => cmd_check(&key, max_calls, period, attempts, interval_ms).await,
        Commands::Bench { calls, keys, tasks } => cmd_bench(calls, keys, tasks).await,
    }
}

/// Run the API server
async fn cmd_serve(port: u16, bind: &str) -> Result<()> {
    let addr: SocketAddr = format!("{}:{}", bind, port)
        .parse()
        .context("Invalid bind address")?;

    let config = ApiConfig::from_env().context("Failed to load configuration")?;
    if config.testing {
        println!("{}", "⚠️  Testing mode: rate limiting is disabled".yellow().bold());
    }

    println!("{} {}", "🛡️  Starting Warden API server on".cyan().bold(), addr);
    println!("   {} {}", "Health:".dimmed(), format!("http://{}/health", addr));
    println!(
        "   {} {} calls / {}s per client",
        "Limit:".dimmed(),
        config.limiter.max_calls,
        config.limiter.period_secs
    );
    if config.trust_forwarded_for {
        println!("   {} keyed by x-forwarded-for", "Clients:".dimmed());
    }
    if config.admin_token.is_none() {
        println!("   {} disabled (set WARDEN_ADMIN_TOKEN)", "Admin:".dimmed());
    }

    let server = ApiServer::new(config).context("Failed to build server state")?;
    server.run(addr).await.context("Server error")?;

    Ok(())
}

/// Show admission decisions for a burst of calls
async fn cmd_check(
    key: &str,
    max_calls: usize,
    period: f64,
    attempts: usize,
    interval_ms: u64,
) -> Result<()> {
    let config = LimiterConfig {
        max_calls,
        period_secs: period,
    };
    let limiter = SlidingWindowLimiter::from_config(&config).context("Invalid limiter settings")?;

    println!(
        "{} {} ({} calls / {}s)",
        "🔍 Checking key:".cyan().bold(),
        key,
        max_calls,
        period
    );

    let mut admitted = 0;
    for attempt in 1..=attempts {
        if limiter.is_allowed(key).await {
            admitted += 1;
            let left = limiter.remaining(key).await;
            println!("   #{:<4} {} ({} left)", attempt, "admitted".green(), left);
        } else {
            println!("   #{:<4} {}", attempt, "rejected".red());
        }

        if interval_ms > 0 && attempt < attempts {
            tokio::time::sleep(Duration::from_millis(interval_ms)).await;
        }
    }

    println!(
        "\n{} {}/{} admitted",
        "✅ Done:".green().bold(),
        admitted,
        attempts
    );

    Ok(())
}

/// Measure throughput of the limiter and cache
async fn cmd_bench(calls: u64, keys: u64, tasks: u64) -> Result<()> {
    anyhow::ensure!(keys > 0, "--keys must be at least 1");
    anyhow::ensure!(tasks > 0, "--tasks must be at least 1");

    println!(
        "{} {} calls across {} keys with {} tasks",
        "⚡ Benchmarking".cyan().bold(),
        calls,
        keys,
        tasks
    );

    let limiter = Arc::new(SlidingWindowLimiter::new(10, Duration::from_secs(1))?);
    let cache: Arc<TtlCache<u64>> = Arc::new(TtlCache::new());
    let admitted = Arc::new(AtomicU64::new(0));

    let pb = ProgressBar::new(calls);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({per_sec})")
            .context("Invalid progress template")?
            .progress_chars("#>-"),
    );

    let start = Instant::now();
    let per_task = calls / tasks;
    let mut handles = Vec::with_capacity(tasks as usize);

    for task in 0..tasks {
        let share = if task == tasks - 1 {
            calls - per_task * (tasks - 1)
        } else {
            per_task
        };
        let limiter = limiter.clone();
        let cache = cache.clone();
        let admitted = admitted.clone();
        let pb = pb.clone();

        handles.push(tokio::spawn(async move {
            for i in 0..share {
                let key = format!("client:{}", (task * per_task + i) % keys);
                if limiter.is_allowed(&key).await {
                    admitted.fetch_add(1, Ordering::Relaxed);
                    cache.set_with_ttl(&key, i, ttl_from_secs(1.0)).await;
                } else {
                    let _ = cache.get(&key).await;
                }
                if i % 256 == 0 {
                    pb.inc(256.min(share - i));
                }
            }
        }));
    }

    for handle in handles {
        handle.await.context("Benchmark task panicked")?;
    }
    pb.finish_and_clear();

    let elapsed = start.elapsed();
    let admitted = admitted.load(Ordering::Relaxed);
    let throughput = calls as f64 / elapsed.as_secs_f64().max(f64::EPSILON);

    info!(calls, admitted, elapsed_ms = elapsed.as_millis() as u64, "Benchmark finished");

    println!("\n{}", "📊 Results".yellow().bold());
    println!("   {} {:.2?}", "Elapsed:".dimmed(), elapsed);
    println!("   {} {:.0} calls/s", "Throughput:".dimmed(), throughput);
    println!("   {} {}", "Admitted:".dimmed(), admitted.to_string().green());
    println!("   {} {}", "Rejected:".dimmed(), (calls - admitted).to_string().red());
    println!("   {} {}", "Cached keys:".dimmed(), cache.len().await);

    Ok(())
}
