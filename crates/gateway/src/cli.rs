//! Command-line interface: `serve` (default), `doctor`, `version`.

use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};

use sr_containers::{ContainerDriver, DockerDriver};
use sr_domain::config::{Config, ConfigSeverity};
use sr_store::ControlStore;

/// ScribeRelay — meeting bots and transcript collection.
#[derive(Debug, Parser)]
#[command(name = "scriberelay", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Start the gateway server (default when no subcommand is given).
    Serve,
    /// Run connectivity checks against Redis, the database, and the
    /// container control plane.
    Doctor,
    /// Print version information.
    Version,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// doctor
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Run all diagnostic checks and print a summary.
///
/// Returns `Ok(true)` when every check passes, `Ok(false)` when at least
/// one check failed.
pub async fn doctor(config: &Config) -> anyhow::Result<bool> {
    println!("scriberelay doctor");
    println!("==================\n");

    let mut all_passed = true;

    // 1. Config validation
    let issues = config.validate();
    let error_count = issues
        .iter()
        .filter(|i| i.severity == ConfigSeverity::Error)
        .count();
    print_check(
        "Config validation",
        error_count == 0,
        if issues.is_empty() {
            "no issues".into()
        } else {
            format!("{} issue(s) ({} error(s))", issues.len(), error_count)
        },
    );
    for issue in &issues {
        println!("      {issue}");
    }
    if error_count > 0 {
        all_passed = false;
    }

    // 2. Redis
    let redis_url = config.redis.url();
    let redis_ok = match ControlStore::connect(&redis_url, Duration::from_secs(5)).await {
        Ok(store) => store.ping().await.is_ok(),
        Err(_) => false,
    };
    print_check(
        "Redis reachable",
        redis_ok,
        if redis_ok {
            redis_url
        } else {
            format!("{redis_url} (unreachable)")
        },
    );
    if !redis_ok {
        all_passed = false;
    }

    // 3. Database
    let db_ok = if config.database.url.is_empty() {
        false
    } else {
        match sqlx::postgres::PgPoolOptions::new()
            .max_connections(1)
            .acquire_timeout(Duration::from_secs(5))
            .connect(&config.database.url)
            .await
        {
            Ok(pool) => sqlx::query("SELECT 1").execute(&pool).await.is_ok(),
            Err(_) => false,
        }
    };
    print_check(
        "Database reachable",
        db_ok,
        if db_ok {
            "SELECT 1 ok".into()
        } else {
            "connection or probe failed".into()
        },
    );
    if !db_ok {
        all_passed = false;
    }

    // 4. Container control plane
    let driver: Arc<dyn ContainerDriver> = Arc::new(DockerDriver::new(&config.containers));
    let plane_ok = driver.ping().await.is_ok();
    print_check(
        "Control plane reachable",
        plane_ok,
        if plane_ok {
            config.containers.socket_path.clone()
        } else {
            format!("{} (unreachable)", config.containers.socket_path)
        },
    );
    if !plane_ok {
        all_passed = false;
    }

    println!();
    if all_passed {
        println!("All checks passed.");
    } else {
        println!("Some checks failed. Review the output above.");
    }

    Ok(all_passed)
}

fn print_check(name: &str, passed: bool, detail: String) {
    let mark = if passed { "✓" } else { "✗" };
    println!("  {mark} {name:<28} {detail}");
}
