// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use credaudit::config::{
    apply_env_overrides, AppConfig, ConfigLoader, OutputFormat, ProfileLoader,
};
use credaudit::reporting;
use credaudit::ScanEngine;

/// credaudit - default credential auditing for web-managed devices
#[derive(Parser)]
#[command(name = "credaudit")]
#[command(author = "Bountyy Oy <info@bountyy.fi>")]
#[command(version)]
#[command(about = "Fingerprints HTTP services and tries their default credentials", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,

    /// Quiet mode - only errors and findings
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Configuration file path (toml, yaml or json)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Fingerprint targets and try default credentials
    Scan(ScanArgs),

    /// List the credential profiles that would be used
    Profiles(ProfileArgs),
}

#[derive(Args)]
struct ProfileArgs {
    /// Directory searched recursively for *.yml profiles
    #[arg(long = "profiles-dir")]
    dir: Option<PathBuf>,

    /// Only profiles whose name contains this text
    #[arg(short, long)]
    name: Option<String>,

    /// Only profiles in this category
    #[arg(long)]
    category: Option<String>,
}

#[derive(Args)]
struct ScanArgs {
    /// CIDR block to scan (e.g. 192.168.1.0/24)
    #[arg(long)]
    subnet: Option<String>,

    /// File with one target per line
    #[arg(long)]
    targets: Option<PathBuf>,

    /// Single target (host or host:port)
    #[arg(long)]
    target: Option<String>,

    /// Shodan search query
    #[arg(long)]
    shodan_query: Option<String>,

    /// Shodan API key
    #[arg(long, env = "SHODAN_API_KEY", hide_env_values = true)]
    shodan_key: Option<String>,

    /// Nmap XML report (-oX)
    #[arg(long)]
    nmap: Option<PathBuf>,

    /// Request timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Upstream proxy URL (http://, https:// or socks5://)
    #[arg(long)]
    proxy: Option<String>,

    /// Maximum concurrent requests
    #[arg(long)]
    concurrency: Option<usize>,

    /// Maximum redirects followed per request
    #[arg(long)]
    max_redirects: Option<usize>,

    /// Custom user agent
    #[arg(long)]
    user_agent: Option<String>,

    #[command(flatten)]
    profiles: ProfileArgs,

    /// Report file path
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Report format (json, csv)
    #[arg(short, long)]
    format: Option<OutputFormat>,

    /// Match fingerprints and list attempts without sending credentials
    #[arg(long)]
    fingerprint_only: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level(&cli)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_writer(std::io::stderr)
        .init();

    // Create async runtime
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(num_cpus::get())
        .thread_name("credaudit-worker")
        .enable_all()
        .build()?;

    runtime.block_on(async_main(cli))
}

/// `RUST_LOG` overrides whatever the flags select
fn log_level(cli: &Cli) -> &'static str {
    if cli.debug {
        "debug"
    } else if cli.verbose {
        "info"
    } else if cli.quiet {
        "error"
    } else {
        "warn"
    }
}

async fn async_main(cli: Cli) -> Result<()> {
    let mut config = load_config(cli.config.as_ref())?;

    match cli.command {
        Commands::Scan(args) => {
            apply_scan_args(&mut config, args);
            run_scan(config).await
        }
        Commands::Profiles(args) => {
            apply_profile_args(&mut config, args);
            list_profiles(&config)
        }
    }
}

fn load_config(path: Option<&PathBuf>) -> Result<AppConfig> {
    match path {
        Some(path) => {
            let loader = ConfigLoader::new(path)?;
            loader.load_config()
        }
        None => {
            let mut config = AppConfig::default();
            apply_env_overrides(&mut config)?;
            Ok(config)
        }
    }
}

fn apply_profile_args(config: &mut AppConfig, args: ProfileArgs) {
    if let Some(dir) = args.dir {
        config.profiles.dir = dir;
    }
    if args.name.is_some() {
        config.profiles.name = args.name;
    }
    if args.category.is_some() {
        config.profiles.category = args.category;
    }
}

/// Command-line flags override file and environment values
fn apply_scan_args(config: &mut AppConfig, args: ScanArgs) {
    let targets = &mut config.targets;
    if args.subnet.is_some() {
        targets.subnet = args.subnet;
    }
    if args.targets.is_some() {
        targets.targets = args.targets;
    }
    if args.target.is_some() {
        targets.target = args.target;
    }
    if args.shodan_query.is_some() {
        targets.shodan_query = args.shodan_query;
    }
    if args.shodan_key.is_some() {
        targets.shodan_key = args.shodan_key;
    }
    if args.nmap.is_some() {
        targets.nmap = args.nmap;
    }

    let scanner = &mut config.scanner;
    if let Some(timeout) = args.timeout {
        scanner.request_timeout_secs = timeout;
    }
    if args.proxy.is_some() {
        scanner.proxy = args.proxy;
    }
    if let Some(concurrency) = args.concurrency {
        scanner.max_concurrency = concurrency;
    }
    if let Some(max_redirects) = args.max_redirects {
        scanner.max_redirects = max_redirects;
    }
    if args.user_agent.is_some() {
        scanner.user_agent = args.user_agent;
    }
    if args.fingerprint_only {
        scanner.fingerprint_only = true;
    }

    if args.output.is_some() {
        config.output.path = args.output;
    }
    if let Some(format) = args.format {
        config.output.format = format;
    }

    apply_profile_args(config, args.profiles);
}

async fn run_scan(config: AppConfig) -> Result<()> {
    let profiles = ProfileLoader::from_selection(&config.profiles)
        .load()
        .context("Failed to load credential profiles")?;

    let fingerprint_only = config.scanner.fingerprint_only;
    let output = config.output.clone();

    let engine = ScanEngine::new(config, profiles)?;
    let summary = match engine.run().await {
        Ok(summary) => summary,
        Err(e) => {
            error!("[Engine] Scan aborted: {}", e);
            return Err(e.into());
        }
    };

    print!("{}", reporting::format_summary(&summary, fingerprint_only));

    if let Some(ref path) = output.path {
        reporting::write_report(&summary.results, output.format, path)?;
    } else if !summary.results.is_empty() {
        info!("No --output given, results printed above only");
    }

    Ok(())
}

fn list_profiles(config: &AppConfig) -> Result<()> {
    let profiles = ProfileLoader::from_selection(&config.profiles)
        .load()
        .context("Failed to load credential profiles")?;

    for profile in &profiles {
        println!(
            "{:<40} {:<12} {:<6} {} credential(s)",
            profile.name,
            profile.category,
            profile.auth.method.as_str(),
            profile.credentials.len()
        );
    }
    println!("{} profiles", profiles.len());
    Ok(())
}
