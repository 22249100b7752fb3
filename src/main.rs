use chrono::Utc;
use clap::Parser;
use geoip_resolver::geoip::{GeoIpSettings, Pending, ResultPair};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// GeoIP resolver: guess this machine's timezone from a lookup service.
///
/// Settings come from a JSON file (by default in the user's config directory)
/// and can be overridden per flag.
///
/// Examples:
///   geoip --style json --url https://geoip.kde.org/v1/calamares --selector time_zone
///   geoip --style json --url https://ipapi.co/json/ --selector country,timezone
///   geoip --style xml --url https://geoip.ubuntu.com/lookup --selector TimeZone
///   geoip --config ./geoip.json --raw
#[derive(Parser)]
#[command(name = "geoip", version, about, long_about = None)]
struct Cli {
    /// Settings file with "style", "url" and "selector" keys.
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    /// Response style: none, json or xml.
    #[arg(long)]
    style: Option<String>,

    /// Lookup service URL.
    #[arg(long)]
    url: Option<String>,

    /// Field selector: a timezone locator, or "region,zone" locators.
    #[arg(long)]
    selector: Option<String>,

    /// Print the unparsed response body instead of the region/zone pair.
    #[arg(long)]
    raw: bool,

    /// Run the lookup on a background worker and await it.
    #[arg(long)]
    background: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    // ── Load settings ───────────────────────────────────────────

    let loaded = match &cli.config {
        Some(path) => GeoIpSettings::load_from(path).map(Some),
        None => GeoIpSettings::load_default(),
    };
    let base = loaded.unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    });
    let settings = base
        .unwrap_or_default()
        .merge(cli.style.clone(), cli.url.clone(), cli.selector.clone());

    let resolver = settings.resolver();
    if !resolver.is_valid() {
        eprintln!("  GeoIP lookup disabled (style '{}').", settings.style);
    }

    // ── Raw mode ────────────────────────────────────────────────

    if cli.raw {
        let body = if cli.background {
            run_background(|| resolver.query_raw())
        } else {
            resolver.get_raw()
        };
        println!("{}", body);
        return;
    }

    // ── Resolve ─────────────────────────────────────────────────

    let pair = if cli.background {
        run_background(|| resolver.query())
    } else {
        resolver.get()
    };

    print_banner(&pair);

    match serde_json::to_string_pretty(&pair) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

fn run_background<T: Default>(start: impl FnOnce() -> Pending<T>) -> T {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .unwrap_or_else(|e| {
            eprintln!("Error: cannot start runtime: {}", e);
            std::process::exit(1);
        });
    // Start inside the runtime so the lookup lands on its blocking pool.
    runtime.block_on(async { start().await })
}

fn print_banner(pair: &ResultPair) {
    if pair.is_unknown() {
        eprintln!("  \u{1F30D} Location unknown");
        return;
    }
    eprintln!("  \u{1F30D} {}", pair);
    if let Some(tz) = pair.tz() {
        let local = Utc::now().with_timezone(&tz);
        eprintln!("  \u{1F552} {} ({} local time)", local.format("%H:%M"), tz.name());
    }
}
