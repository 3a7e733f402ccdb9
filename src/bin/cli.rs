//! Option Stats CLI
//!
//! Runs the analytics pipeline on a snapshot file, or on synthetic data
//! when no file is given.
//!
//! Usage: `option-stats [SNAPSHOT] [--config CONFIG] [--json]`
//! Set `RUST_LOG=option_stats=debug` for pipeline logs.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use clap::Parser;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, StandardNormal};
use tracing_subscriber::EnvFilter;

use option_stats::prelude::*;

/// Option analytics over a market snapshot
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Snapshot JSON file; a synthetic market is used when omitted
    snapshot: Option<PathBuf>,

    /// Analytics configuration JSON; quick defaults when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print the full report as JSON
    #[arg(long)]
    json: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli.snapshot.as_deref(), cli.config.as_deref(), cli.json) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

fn run(snapshot_path: Option<&Path>, config_path: Option<&Path>, as_json: bool) -> StatsResult<()> {
    let config = match config_path {
        Some(path) => AnalyticsConfig::from_json_file(path)?,
        None => AnalyticsConfig::quick(),
    };
    let analyzer = OptionAnalyzer::with_config(config);

    let report = match snapshot_path {
        Some(path) => {
            let json = std::fs::read_to_string(path)?;
            analyzer.analyze_snapshot(&MarketSnapshot::from_json_str(&json)?)?
        }
        None => {
            let now = Utc::now();
            let (series, chain) = synthetic_market(now);
            analyzer.analyze(&series, chain.underlying_price, &chain, now)?
        }
    };

    if as_json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }
    Ok(())
}

fn print_report(report: &AnalyticsReport) {
    println!("Option Stats: {}", report.symbol);
    println!("==========================\n");
    println!("  As of: {}", report.as_of.format("%Y-%m-%d %H:%M UTC"));
    println!("  Spot: ${:.2}", report.spot);
    println!("  Volatility ({}): {:.2}%", report.estimator, report.volatility * 100.0);

    println!("\nProbability Cone:");
    for point in report.cone.iter().step_by(5) {
        println!(
            "  {:>3}d  {:>9.2} - {:<9.2}",
            point.horizon_days, point.lower_bound, point.upper_bound
        );
    }

    println!("\nMarket Pressure:");
    for p in &report.pressure {
        let fmt = |x: Option<f64>| x.map_or_else(|| "-".to_string(), |v| format!("{:.2}", v));
        println!(
            "  {} ({:>2}d)  OI {:>8}  Vol {:>8}  OI-strike {:>8}  Vol-strike {:>8}",
            p.date,
            p.day_diff,
            p.total_open_interest,
            p.total_volume,
            fmt(p.oi_weighted_strike),
            fmt(p.volume_weighted_strike)
        );
    }

    match &report.skew {
        Some(skew) => println!(
            "\nSkew: {:?} ratio {:.3}, liquidity {:?} (expiry {})",
            skew.category,
            skew.ratio,
            skew.liquidity,
            skew.expiration.date_naive()
        ),
        None => println!("\nSkew: unavailable"),
    }

    let mut table = report.screened.clone();
    table.sort_by(&[SortKey::desc(MetricColumn::Roi)]);
    println!("\nTop contracts by ROI ({} of {} pass the filter):", table.len(), report.metrics.len());
    for row in table.page(0, 10) {
        println!(
            "  {:>4} {:>8.2} {:>3}d  premium {:>8.2}  roi {:>6.2}%  lev {:>7.3}  pop {:>5.1}%",
            row.option_type().label(),
            row.strike(),
            row.day_diff,
            row.premium,
            row.roi,
            row.leverage,
            row.probability_of_profit * 100.0
        );
    }

    let peak = report
        .distribution
        .bins
        .iter()
        .max_by(|a, b| a.probability_pct.total_cmp(&b.probability_pct));
    if let Some(bin) = peak {
        println!(
            "\nSimulated distribution: mean {:.2}, mode bin {:.0} ({:.1}%) over {} paths",
            report.distribution.mean, bin.center, bin.probability_pct, report.distribution.paths
        );
    }
}

/// One year of GBM daily bars and a chain with weekly expirations
fn synthetic_market(now: DateTime<Utc>) -> (PriceSeries, OptionChain) {
    let mut rng = ChaCha8Rng::seed_from_u64(42);
    let vol = 0.25_f64;
    let dt = 1.0 / 252.0;

    let mut close = 100.0_f64;
    let mut bars = Vec::with_capacity(252);
    for i in 0..252 {
        let open = close;
        let z: f64 = StandardNormal.sample(&mut rng);
        close = open * ((-0.5 * vol * vol) * dt + vol * dt.sqrt() * z).exp();
        let swing = open.max(close) * 0.004;
        let timestamp = now - Duration::days(252 - i);
        bars.push(PriceBar::new(timestamp, open, open.max(close) + swing, open.min(close) - swing, close, 1e6));
    }
    let spot = close;
    let series = PriceSeries::new(bars).unwrap_or_default();

    let mut chain = OptionChain::new("SYNTH", spot);
    for week in 1..=6 {
        let days = 7 * week;
        let expiration = now + Duration::days(days) + Duration::hours(4);
        let t = days as f64 / 252.0;
        let atm = (spot / 5.0).round() * 5.0;
        for k in (-8..=8).map(|i| atm + 5.0 * i as f64) {
            let d = (spot / k).ln() / (vol * t.sqrt());
            let call_delta = norm_cdf(d);
            let time_value = spot * vol * t.sqrt() * 0.4 * (-0.5 * d * d).exp();
            let call_mid = (spot - k).max(0.0) + time_value;
            let put_mid = (k - spot).max(0.0) + time_value;
            let oi = (2_000.0 * (-0.5 * d * d).exp()) as u64;
            for (option_type, mid, delta) in [
                (OptionType::Call, call_mid, call_delta),
                (OptionType::Put, put_mid, call_delta - 1.0),
            ] {
                let contract = OptionContractSnapshot::new(option_type, k, expiration, mid * 0.95, mid * 1.05)
                    .with_delta(delta)
                    .with_activity(oi / 4, oi);
                chain.add_contract(contract);
            }
        }
    }
    (series, chain)
}
