#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI entry point for the shelter map analytics engine.
//!
//! Every subcommand reads features from a GeoJSON file or from a backend
//! dataset (`dataset:<id>`) and prints the derived view, as text or as JSON
//! with `--json`.

mod input;

use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Parser, Subcommand};
use serde::Serialize;
use shelter_map_analytics::difficulty::grade_zones;
use shelter_map_analytics::hotspots::{SpeciesLegend, label_clusters, sick_animals};
use shelter_map_analytics::nearest::nearest_shelter;
use shelter_map_analytics::radar::{self, RADIUS_KM};
use shelter_map_analytics::{RecordResolver, TemporalIndex};
use shelter_map_analytics_models::{BucketView, ClusterSite, LegendEntry, SickAnimal};
use shelter_map_animal_models::SpeciesKey;
use shelter_map_playback::{
    PlaybackConfig, PlaybackController, PlaybackEvent, StartMode, TimelineView, ViewStatus,
};
use shelter_map_source::datasets::all_datasets;
use shelter_map_source::fields::FieldTable;
use shelter_map_source::shelters::load_shelters_from_path;
use shelter_map_source_models::LatLon;

use crate::input::{SourceSpec, fetch_features};

type CliResult<T = ()> = Result<T, Box<dyn std::error::Error>>;

#[derive(Parser)]
#[command(name = "shelter_map", about = "Shelter map analytics")]
struct Cli {
    /// TOML file overriding the property candidate keys
    #[arg(long, global = true)]
    fields: Option<PathBuf>,
    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the backend datasets
    Datasets,
    /// Compare owner-surrender and wildlife density around a point
    Radar {
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        #[arg(long, allow_hyphen_values = true)]
        lon: f64,
        /// Category A source
        #[arg(long, default_value = "dataset:owner_surrender")]
        domestic: SourceSpec,
        /// Category B source
        #[arg(long, default_value = "dataset:wildlife")]
        wildlife: SourceSpec,
    },
    /// Show intake records bucketed by month
    Timeline {
        #[arg(default_value = "dataset:stray_intakes")]
        source: SourceSpec,
    },
    /// Reveal the timeline month by month
    Play {
        #[arg(default_value = "dataset:stray_intakes")]
        source: SourceSpec,
        /// Milliseconds between months (default: `SHELTER_MAP_PLAYBACK_MS` or 800)
        #[arg(long)]
        interval_ms: Option<u64>,
    },
    /// Disease hotspots and the sick animals around them
    Hotspots {
        #[arg(default_value = "dataset:sick_animals")]
        animals: SourceSpec,
        /// Red-zone cluster source
        #[arg(long)]
        zones: Option<SourceSpec>,
        /// Species to hide, comma separated (e.g. `cat,bird`)
        #[arg(long, value_delimiter = ',')]
        hide: Vec<SpeciesKey>,
    },
    /// Grade areas by mean days before adoption
    Difficulty {
        #[arg(default_value = "dataset:adoption_difficulty")]
        source: SourceSpec,
    },
    /// Find the shelter closest to a point
    Nearest {
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        #[arg(long, allow_hyphen_values = true)]
        lon: f64,
        /// Shelter CSV (`Latitude, Longitude, Shelter_Name, Address, City`)
        #[arg(long)]
        shelters: PathBuf,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct HotspotReport<'a> {
    clusters: Vec<ClusterSite>,
    legend: Vec<LegendEntry>,
    animals: Vec<&'a SickAnimal>,
}

#[tokio::main]
async fn main() -> CliResult {
    pretty_env_logger::init();
    let cli = Cli::parse();
    let fields = load_fields(cli.fields.as_deref())?;

    match cli.command {
        Commands::Datasets => {
            println!("{:<20} {:<24} PATH", "ID", "NAME");
            println!("{}", "-".repeat(70));
            for dataset in all_datasets() {
                println!("{:<20} {:<24} {}", dataset.id, dataset.name, dataset.path);
            }
        }
        Commands::Radar {
            lat,
            lon,
            domestic,
            wildlife,
        } => {
            let center = point(lat, lon)?;
            let (domestic, wildlife) =
                tokio::try_join!(fetch_features(&domestic), fetch_features(&wildlife))?;
            let reading = radar::analyze(center, &domestic, &wildlife);
            if cli.json {
                print_json(&reading)?;
            } else {
                println!("Radar {RADIUS_KM} km around {center}");
                println!("  owner surrender: {}", reading.count_a);
                println!("  wildlife:        {}", reading.count_b);
                println!("  {}", reading.verdict.label_it());
            }
        }
        Commands::Timeline { source } => {
            let timeline = load_timeline(&source, fields).await?;
            let views: Vec<BucketView> = (0..timeline.len())
                .filter_map(|i| timeline.view_at(i))
                .collect();
            if cli.json {
                print_json(&views)?;
            } else {
                for view in &views {
                    println!("{:<20} {:>5}  {}", view.label, view.records.len(), species_summary(view));
                }
            }
        }
        Commands::Play {
            source,
            interval_ms,
        } => {
            let interval =
                interval_ms.map_or_else(|| PlaybackConfig::from_env().interval, Duration::from_millis);
            let timeline = load_timeline(&source, fields).await?;
            play(timeline, interval, cli.json).await?;
        }
        Commands::Hotspots {
            animals,
            zones,
            hide,
        } => {
            let features = fetch_features(&animals).await?;
            let animals = sick_animals(&features, &fields);
            let clusters = match &zones {
                Some(zones) => label_clusters(&fetch_features(zones).await?, &fields),
                None => Vec::new(),
            };

            let mut legend = SpeciesLegend::from_keys(animals.iter().map(|a| a.species_key));
            for key in hide {
                if legend.is_visible(key) {
                    legend.toggle(key);
                }
            }
            let report = HotspotReport {
                clusters,
                legend: legend.entries(),
                animals: legend.visible(&animals),
            };

            if cli.json {
                print_json(&report)?;
            } else {
                for cluster in &report.clusters {
                    println!("{:<20} {}", cluster.label, cluster.location);
                }
                for entry in &report.legend {
                    let mark = if entry.visible { "x" } else { " " };
                    println!("[{mark}] {:<10} {:>5}", entry.label, entry.count);
                }
                for animal in &report.animals {
                    println!(
                        "{:<16} {:<10} {:<16} {:<12} {}",
                        animal.name,
                        animal.display_label,
                        animal.condition,
                        animal.color,
                        animal.location
                    );
                }
            }
        }
        Commands::Difficulty { source } => {
            let zones = grade_zones(&fetch_features(&source).await?, &fields);
            if cli.json {
                print_json(&zones)?;
            } else {
                for zone in &zones {
                    println!(
                        "{:<24} {:>4} days  {}",
                        zone.name,
                        zone.days,
                        zone.difficulty.label_it()
                    );
                }
            }
        }
        Commands::Nearest { lat, lon, shelters } => {
            let origin = point(lat, lon)?;
            let sites = load_shelters_from_path(&shelters)?;
            let Some(nearest) = nearest_shelter(origin, &sites) else {
                return Err(format!("no shelters in {}", shelters.display()).into());
            };
            if cli.json {
                print_json(&nearest)?;
            } else {
                println!(
                    "{} ({}, {}) - {} km",
                    nearest.site.name, nearest.site.address, nearest.site.city, nearest.distance_km
                );
            }
        }
    }

    Ok(())
}

fn load_fields(path: Option<&Path>) -> CliResult<FieldTable> {
    let Some(path) = path else {
        return Ok(FieldTable::default());
    };
    let fields = FieldTable::from_file(path)?;
    log::info!("Loaded field table from {}", path.display());
    Ok(fields)
}

fn point(lat: f64, lon: f64) -> CliResult<LatLon> {
    LatLon::new(lat, lon).ok_or_else(|| format!("invalid coordinates {lat}, {lon}").into())
}

async fn load_timeline(source: &SourceSpec, fields: FieldTable) -> CliResult<TemporalIndex> {
    let mut view = TimelineView::new(RecordResolver::new(fields));
    match view.load(source.open()?).await {
        ViewStatus::Ready { .. } => {}
        ViewStatus::NoData => return Err("source returned no features".into()),
        ViewStatus::Failed { message } => return Err(message.into()),
        ViewStatus::Stale => return Err("load was superseded".into()),
    }
    view.timeline()
        .cloned()
        .ok_or_else(|| "no timeline loaded".into())
}

async fn play(timeline: TemporalIndex, interval: Duration, json: bool) -> CliResult {
    let (controller, mut events) = PlaybackController::spawn(timeline, interval)?;
    controller.start(StartMode::Fresh)?;

    while let Some(event) = events.recv().await {
        match event {
            PlaybackEvent::BucketRevealed(reveal) => {
                if json {
                    println!("{}", serde_json::to_string(&reveal)?);
                } else {
                    println!(
                        "{:<20} +{:<4} total {}",
                        reveal.label,
                        reveal.new_records.len(),
                        reveal.accumulated_total
                    );
                }
            }
            PlaybackEvent::EndOfData => break,
            PlaybackEvent::Rejected(e) => return Err(e.into()),
            PlaybackEvent::BucketShown(_) | PlaybackEvent::SessionReset => {}
        }
    }

    Ok(())
}

fn species_summary(view: &BucketView) -> String {
    view.species
        .iter()
        .filter(|(_, count)| *count > 0)
        .map(|(key, count)| format!("{} {count}", key.label_it()))
        .collect::<Vec<_>>()
        .join(", ")
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> CliResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
