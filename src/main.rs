// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Set up logging (tracing, on stderr)
// 2. Parse command-line arguments using clap
// 3. Dispatch to the scan / add / verify handler
// 4. Print results and exit with the proper code
//    (0 = all good, 1 = broken links or failed pins, 2 = could not run)
//
// Rust concepts used:
// - #[tokio::main]: Turns async main into a normal main with a runtime
// - anyhow::Result: One error type for "anything that can go wrong" at the top
// - match on Option<Commands>: None means no subcommand, i.e. scan
// =============================================================================

use anyhow::Result;
use clap::Parser;
use std::path::Path;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use link_lock::checker::{HttpClient, IgnoreRules, TokioSleeper};
use link_lock::cli::{Cli, Commands};
use link_lock::config::Config;
use link_lock::files::list_tracked_files;
use link_lock::lock::{add_to_lock_file, verify_lock_file, Change};
use link_lock::scan::{RunReport, Scanner, UrlReport, UrlStatus};

#[tokio::main]
async fn main() {
    init_tracing();

    let exit_code = match run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            2
        }
    };

    std::process::exit(exit_code);
}

// RUST_LOG overrides the default "info" level
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run() -> Result<i32> {
    let cli = Cli::parse();

    match cli.command {
        None => handle_scan(&cli.config, cli.json).await,
        Some(Commands::Add { url, update }) => handle_add(&cli.lock_file, &url, update).await,
        Some(Commands::Verify) => handle_verify(&cli.lock_file).await,
    }
}

// Scans every tracked text file for dead links
async fn handle_scan(config_path: &Path, json: bool) -> Result<i32> {
    let config = Config::load(config_path)?;
    let rules = IgnoreRules::new(config.ignores.clone(), config.prefix_ignores.clone());
    let client = HttpClient::new()?;

    let paths = list_tracked_files().await?;
    info!(files = paths.len(), "scanning tracked files");

    let scanner = Scanner::new(&rules, config.attempts(), &client, &TokioSleeper)
        .with_concurrency(config.concurrency);
    let report = scanner.scan_paths(&paths, &config.text_file_extensions).await;
    info!(distinct_urls = scanner.seen().len(), "scan finished");

    print_report(&report, json)?;

    if report.is_success() {
        Ok(0)
    } else {
        Ok(1)
    }
}

// Pins one URL in the lock file
async fn handle_add(lock_path: &Path, url: &str, update: bool) -> Result<i32> {
    let client = HttpClient::new()?;

    match add_to_lock_file(lock_path, url, update, &client).await {
        Ok(Change::Added) => println!("✅ Added {} to {}", url, lock_path.display()),
        Ok(Change::Updated) => println!("🔄 Updated hash of {} in {}", url, lock_path.display()),
        Ok(Change::Unchanged) => println!("✅ {url} is unchanged"),
        Err(e) => {
            error!("error adding lock entry: {e}");
            return Ok(1);
        }
    }
    Ok(0)
}

// Re-downloads every pinned URL and compares hashes
async fn handle_verify(lock_path: &Path) -> Result<i32> {
    let client = HttpClient::new()?;
    let (checked, errors) = verify_lock_file(lock_path, &client).await?;

    for e in &errors {
        error!("{e}");
    }

    println!("📊 Verified {} pinned URL(s)", checked);
    println!("   ✅ OK: {}", checked - errors.len());
    println!("   ❌ Failed: {}", errors.len());

    if errors.is_empty() {
        Ok(0)
    } else {
        Ok(1)
    }
}

// Prints the scan results either as a table or JSON
fn print_report(report: &RunReport, json: bool) -> Result<()> {
    if json {
        let json_output = serde_json::to_string_pretty(&report.files)?;
        println!("{}", json_output);
    } else {
        print_table(report);
    }
    Ok(())
}

fn print_table(report: &RunReport) {
    println!("{:<60} {:<18} {:<30}", "URL", "STATUS", "MESSAGE");
    println!("{}", "=".repeat(108));

    for url in report.urls() {
        print_row(url);
    }

    println!();

    let count = |status: UrlStatus| report.urls().filter(|u| u.status == status).count();
    let ignored = count(UrlStatus::PrefixIgnored)
        + count(UrlStatus::Excepted)
        + count(UrlStatus::TlsTolerated);

    println!("📊 Summary:");
    println!("   📄 Files: {}", report.files.len());
    println!("   ✅ OK: {}", count(UrlStatus::Ok));
    println!("   🙈 Ignored: {}", ignored);
    println!("   ♻️  Duplicates: {}", count(UrlStatus::Duplicate));
    println!("   ❌ Broken: {}", count(UrlStatus::Broken));
    println!("   ⚠️  File errors: {}", report.errors.len());
}

fn print_row(url: &UrlReport) {
    let message = url.message.as_deref().unwrap_or("");

    // Truncate URL if too long for display
    let url_display = match url.url.char_indices().nth(57) {
        Some((cut, _)) => format!("{}...", &url.url[..cut]),
        None => url.url.clone(),
    };

    println!("{:<60} {:<18} {:<30}", url_display, format_status(url.status), message);
}

fn format_status(status: UrlStatus) -> &'static str {
    match status {
        UrlStatus::Ok => "✅ OK",
        UrlStatus::Excepted => "🙈 EXCEPTED",
        UrlStatus::TlsTolerated => "🔒 TLS TOLERATED",
        UrlStatus::Unchecked => "⏭️  UNCHECKED",
        UrlStatus::Duplicate => "♻️  DUPLICATE",
        UrlStatus::PrefixIgnored => "🙈 PREFIX IGNORED",
        UrlStatus::Broken => "❌ BROKEN",
    }
}
