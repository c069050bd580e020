//! Soil-Water-Index Hazard Monitoring - Run Driver
//!
//! Decodes a soil-water-index analysis feed and a rainfall-guidance feed,
//! simulates every registered mesh on a thread pool, classifies hazard
//! levels up the geographic hierarchy, and writes the result tree as JSON.
//!
//! Usage:
//!   cargo run --release -- soil.bin guidance.bin
//!   cargo run --release -- soil.bin guidance.bin --meshes meshes.toml \
//!       --out result.json --workers 8
//!
//! Environment:
//!   RUST_LOG - log filter (e.g. info, swimon_service=debug)

use std::env;
use std::fs;
use std::sync::Arc;
use std::time::{Duration, Instant};

use swimon_service::decode::{decode_rainfall_feed, decode_soil_feed};
use swimon_service::geometry::GeometryCache;
use swimon_service::report::RunReport;
use swimon_service::{risk, simulation};

/// Default registry TTL; a long-running caller would refresh explicitly.
const GEOMETRY_TTL: Duration = Duration::from_secs(300);

struct Args {
    soil_path: String,
    guidance_path: String,
    meshes_path: String,
    out_path: Option<String>,
    workers: usize,
}

fn parse_args() -> Result<Args, String> {
    let argv: Vec<String> = env::args().collect();
    let mut positional = Vec::new();
    let mut meshes_path = "meshes.toml".to_string();
    let mut out_path = None;
    let mut workers = 4usize;

    let mut i = 1;
    while i < argv.len() {
        match argv[i].as_str() {
            "--meshes" => {
                meshes_path = argv.get(i + 1).ok_or("--meshes requires a path")?.clone();
                i += 2;
            }
            "--out" => {
                out_path = Some(argv.get(i + 1).ok_or("--out requires a path")?.clone());
                i += 2;
            }
            "--workers" => {
                workers = argv
                    .get(i + 1)
                    .and_then(|v| v.parse().ok())
                    .ok_or("--workers requires a number")?;
                i += 2;
            }
            flag if flag.starts_with("--") => {
                return Err(format!("unknown argument: {}", flag));
            }
            _ => {
                positional.push(argv[i].clone());
                i += 1;
            }
        }
    }

    if positional.len() != 2 {
        return Err("expected exactly two feed paths: <soil.bin> <guidance.bin>".to_string());
    }
    let mut positional = positional.into_iter();
    Ok(Args {
        soil_path: positional.next().expect("checked length"),
        guidance_path: positional.next().expect("checked length"),
        meshes_path,
        out_path,
        workers,
    })
}

fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let start = Instant::now();

    log::info!("decoding feeds");
    let soil_bytes = fs::read(&args.soil_path)?;
    let guidance_bytes = fs::read(&args.guidance_path)?;
    let soil = Arc::new(decode_soil_feed(&soil_bytes)?);
    let forecast = Arc::new(decode_rainfall_feed(&guidance_bytes)?);
    log::info!(
        "soil feed {} ({} cells), guidance feed {} ({} three-hourly steps)",
        soil.info.initial_time,
        soil.info.grid_count,
        forecast.info.initial_time,
        forecast.three_hourly.len()
    );

    log::info!("loading mesh registry from {}", args.meshes_path);
    let mut cache = GeometryCache::new(&args.meshes_path, GEOMETRY_TTL);
    let mut prefectures = cache.get()?.clone();

    simulation::simulate_prefectures(&mut prefectures, &soil, &forecast, args.workers);
    risk::evaluate(&mut prefectures);

    let report = RunReport::new(
        soil.info.initial_time,
        forecast.info.initial_time,
        &prefectures,
    );
    log::info!(
        "run complete in {:.2}s, cache key {}",
        start.elapsed().as_secs_f64(),
        report.cache_key()
    );

    let json = serde_json::to_string_pretty(&report)?;
    match &args.out_path {
        Some(path) => fs::write(path, json)?,
        None => println!("{}", json),
    }
    Ok(())
}

fn main() {
    env_logger::init();

    let args = match parse_args() {
        Ok(args) => args,
        Err(message) => {
            eprintln!("Error: {}", message);
            eprintln!(
                "Usage: swimon_service <soil.bin> <guidance.bin> \
                 [--meshes PATH] [--out PATH] [--workers N]"
            );
            std::process::exit(1);
        }
    };

    if let Err(e) = run(args) {
        eprintln!("Run failed: {}", e);
        std::process::exit(1);
    }
}
