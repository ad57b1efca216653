use std::path::PathBuf;
use std::process;

use clap::Parser;
use serde_json::Value;

use transit_geojson::zones::catalog::ZoneCatalog;
use transit_geojson::zones::error::Error;
use transit_geojson::zones::extractor;
use transit_geojson::zones::stations::StationIndex;

/// Generate the reduced-speed-zone overlay from curated segment lists.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Zone catalog JSON: lines with from/to/direction segments
    #[arg(long)]
    catalog: PathBuf,

    /// Station reference GeoJSON (see gtfs2lines --stations-out)
    #[arg(long)]
    stations: PathBuf,

    /// Directory holding the per-line GeoJSON files
    #[arg(long, default_value = "lines")]
    lines_dir: PathBuf,

    /// Output file for the aggregated zone collection
    #[arg(long, default_value = "speed_zones.geojson")]
    output: PathBuf,
}

fn main() {
    env_logger::init();
    let args = Args::parse();
    if let Err(e) = run(&args) {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run(args: &Args) -> Result<(), Error> {
    let catalog = ZoneCatalog::from_path(&args.catalog)?;
    println!("Loaded zone catalog with {} lines", catalog.lines.len());

    let stations = StationIndex::from_path(&args.stations)?;
    println!("Loaded {} station locations", stations.len());

    let collection = extractor::generate(&catalog, &args.lines_dir, &stations);
    let count = collection
        .get("features")
        .and_then(Value::as_array)
        .map_or(0, Vec::len);

    std::fs::write(&args.output, serde_json::to_string_pretty(&collection)?)?;
    println!("Wrote {} zone features to {}", count, args.output.display());
    Ok(())
}
