//! End-to-end tests: provider-shaped JSON in, analytics report out.

use chrono::{DateTime, Duration, TimeZone, Utc};
use serde_json::{json, Value};

use option_stats::prelude::*;

fn captured_at() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 21, 0, 0).unwrap()
}

fn candles(n: usize) -> Value {
    let start = captured_at() - Duration::days(n as i64);
    let rows: Vec<Value> = (0..n)
        .map(|i| {
            let close = 50.0 + 2.0 * ((i as f64) / 3.0).sin();
            let open = close - 0.3 * ((i as f64) / 2.0).cos();
            json!({
                "open": open,
                "high": open.max(close) + 0.4,
                "low": open.min(close) - 0.4,
                "close": close,
                "volume": 250_000,
                "datetime": (start + Duration::days(i as i64)).timestamp_millis(),
            })
        })
        .collect();
    json!({ "candles": rows })
}

/// Chain at spot 50: 5-wide strikes 35..=65 over three expirations.
/// Puts are priced richer than calls at the same distance from spot.
fn exp_date_map(put_call: &str) -> Value {
    let mut map = serde_json::Map::new();
    for days in [9_i64, 30, 58] {
        let expiry = captured_at() + Duration::days(days) + Duration::hours(2);
        let mut strikes = serde_json::Map::new();
        for k in (35..=65).step_by(5) {
            let k = k as f64;
            let distance = (k - 50.0).abs();
            let otm = if put_call == "CALL" { k >= 50.0 } else { k <= 50.0 };
            let base = if otm { 2.5 - distance / 10.0 } else { distance + 2.5 - distance / 10.0 };
            let mid = if put_call == "PUT" { base * 1.4 } else { base };
            let delta: Value = if k == 65.0 { json!("NaN") } else if put_call == "CALL" { json!(0.5 - (k - 50.0) / 40.0) } else { json!(-0.5 - (k - 50.0) / 40.0) };
            strikes.insert(
                format!("{:.1}", k),
                json!([{
                    "putCall": put_call,
                    "strikePrice": k,
                    "expirationDate": expiry.timestamp_millis(),
                    "bid": mid * 0.96,
                    "ask": mid * 1.04,
                    "bidSize": 20,
                    "askSize": 25,
                    "delta": delta,
                    "volume": (100.0 * (6.0 - distance / 5.0)) as u64,
                    "openInterest": (1000.0 * (6.0 - distance / 5.0)) as u64,
                    "multiplier": 100,
                }]),
            );
        }
        map.insert(format!("{}:{}", expiry.format("%Y-%m-%d"), days), Value::Object(strikes));
    }
    Value::Object(map)
}

fn snapshot_json() -> String {
    json!({
        "symbol": "ACME",
        "captured_at": captured_at().timestamp_millis(),
        "history": candles(90),
        "quotes": { "ACME": { "lastPrice": 50.0, "bidPrice": 49.98, "askPrice": 50.02 } },
        "chain": {
            "underlyingPrice": 50.0,
            "callExpDateMap": exp_date_map("CALL"),
            "putExpDateMap": exp_date_map("PUT"),
        },
    })
    .to_string()
}

fn quick_analyzer() -> OptionAnalyzer {
    let mut config = AnalyticsConfig::quick();
    config.simulation.paths = 5_000;
    config.simulation.seed = Some(11);
    OptionAnalyzer::with_config(config)
}

#[test]
fn snapshot_to_report() {
    let snapshot = MarketSnapshot::from_json_str(&snapshot_json()).unwrap();
    let report = quick_analyzer().analyze_snapshot(&snapshot).unwrap();

    assert_eq!(report.symbol, "ACME");
    assert_eq!(report.spot, 50.0);
    assert_eq!(report.volatility_history.len(), 60);
    assert!(report.volatility > 0.0);

    // 9 and 30 day expirations, 7 strikes, calls and puts
    assert_eq!(report.metrics.len(), 28);
    let days = expiration_days(report.metrics.rows());
    assert_eq!(days, vec![9, 30]);

    // NaN deltas are dropped by the default table filter
    assert_eq!(report.screened.len(), 24);
    assert!(report.screened.rows().iter().all(|r| r.delta().is_some()));

    for row in report.metrics.rows() {
        let c = &row.contract;
        assert!((row.premium - (c.bid * 100.0 * 100.0).round() / 100.0).abs() < 1e-9);
        assert!(row.lower_bound <= 50.0 && row.upper_bound >= 50.0);
        assert!((0.0..=1.0).contains(&row.probability_of_profit));
    }

    assert_eq!(report.pressure.len(), 2);
    for p in &report.pressure {
        let oi = p.oi_weighted_strike.unwrap();
        // activity is symmetric around the money
        assert!((oi - 50.0).abs() < 1e-9);
    }

    let skew = report.skew.expect("30 day expiration is in the band");
    assert_eq!(skew.category, SkewCategory::PutSkew);
    assert_eq!(skew.ratio, 1.4);
    assert_eq!(skew.liquidity, Liquidity::Passed);

    let strikes = strike_activity(report.metrics.rows(), 30);
    assert_eq!(strikes.len(), 14);
    assert_eq!(strikes[0].option_type, OptionType::Call);
    assert_eq!(strikes[0].strike, 35.0);
}

#[test]
fn estimators_agree_in_scale() {
    let snapshot = MarketSnapshot::from_json_str(&snapshot_json()).unwrap();
    let series = snapshot.series().unwrap();
    let all = estimate_all(&series, 20, 252).unwrap();
    assert_eq!(all.len(), 6);
    for est in &all {
        assert_eq!(est.len(), 70);
        let latest = est.latest().unwrap();
        assert!(latest > 0.0 && latest < 5.0, "{} gave {}", est.kind(), latest);
    }
}

#[test]
fn table_filter_sort_and_page() {
    let snapshot = MarketSnapshot::from_json_str(&snapshot_json()).unwrap();
    let report = quick_analyzer().analyze_snapshot(&snapshot).unwrap();

    let mut table = report.metrics.filter(&TableFilter {
        min_roi: 0.5,
        max_abs_delta: 0.45,
        beyond_cone: false,
    });
    assert!(!table.is_empty());
    table.sort_by(&[SortKey::desc(MetricColumn::Roi), SortKey::asc(MetricColumn::Strike)]);
    let rois: Vec<f64> = table.rows().iter().map(|r| r.roi).collect();
    assert!(rois.windows(2).all(|w| w[0] >= w[1]));
    assert!(table.rows().iter().all(|r| r.roi >= 0.5 && r.delta().unwrap().abs() <= 0.45));

    assert_eq!(table.page(0, 3).len(), table.len().min(3));
    assert!(table.page(100, 3).is_empty());
}

#[test]
fn cached_file_source_round_trip() {
    let source_dir = tempfile::tempdir().unwrap();
    let cache_dir = tempfile::tempdir().unwrap();
    std::fs::write(source_dir.path().join("ACME.json"), snapshot_json()).unwrap();

    let cached = CachedSource::new(
        CacheConfig {
            cache_dir: cache_dir.path().to_path_buf(),
            max_age_hours: 1,
            enabled: true,
        },
        JsonFileSource::new(source_dir.path()),
    )
    .unwrap();

    let first = cached.snapshot("ACME").unwrap();
    // the source file is gone; the second read must come from the cache
    std::fs::remove_file(source_dir.path().join("ACME.json")).unwrap();
    let second = cached.snapshot("ACME").unwrap();
    assert_eq!(first, second);

    assert!(matches!(cached.refresh("ACME"), Err(StatsError::Io(_))));
}
