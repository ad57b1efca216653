use std::path::PathBuf;
use std::process;

use clap::Parser;

use transit_geojson::lines::aggregator;
use transit_geojson::lines::error::Error;
use transit_geojson::lines::feed::FeedSource;
use transit_geojson::lines::geojson;

/// Convert a GTFS feed to per-route GeoJSON line files.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// URL of the GTFS zip (e.g. the MTA subway feed)
    #[arg(long, conflicts_with = "gtfs_zip", required_unless_present = "gtfs_zip")]
    gtfs_url: Option<String>,

    /// Local path to a GTFS zip or an extracted feed directory
    #[arg(long)]
    gtfs_zip: Option<PathBuf>,

    /// Output directory for the per-route GeoJSON files
    #[arg(long, default_value = "../lines")]
    out_dir: PathBuf,

    /// Network id recorded in the file metadata
    #[arg(long, default_value = "nyc")]
    network: String,

    /// Source attribution recorded in the file metadata
    #[arg(long, default_value = "MTA GTFS")]
    attribution: String,

    /// Also export a station reference GeoJSON for the rsz tool
    #[arg(long)]
    stations_out: Option<PathBuf>,
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
    let source = match (&args.gtfs_url, &args.gtfs_zip) {
        (Some(url), None) => {
            let source = FeedSource::from_url(url)?;
            println!("Downloading GTFS from {url} ...");
            source
        }
        (None, Some(path)) => FeedSource::Path(path.clone()),
        _ => unreachable!("clap enforces exactly one feed source"),
    };

    let dataset = source.load()?;
    dataset.print_stats();

    let routes = dataset.routes?;
    let trips = dataset.trips?;
    let shapes = dataset.shapes?;

    let written = aggregator::write_route_files(
        &routes,
        &trips,
        &shapes,
        &args.out_dir,
        &args.network,
        &args.attribution,
    )?;
    println!(
        "Done. Wrote {} route files to {}",
        written,
        args.out_dir.display()
    );

    if let Some(stations_out) = &args.stations_out {
        let stops = dataset
            .stops
            .ok_or_else(|| Error::Error("stops.txt is required for --stations-out".to_string()))??;
        let collection = geojson::station_feature_collection(&stops);
        std::fs::write(stations_out, serde_json::to_string(&collection)?)?;
        println!("Wrote station reference to {}", stations_out.display());
    }

    Ok(())
}
