//! envtracker CLI - Command-line demo
//!
//! Runs the tracker against a simulated platform for a fixed duration,
//! printing readings as they arrive. Halfway through it applies a
//! configuration update so the receiver diff can be watched live.

mod sim;

use std::path::PathBuf;
use std::process;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing::info;

use envtracker::config::{ConfigFileError, Configuration, WifiParams};
use envtracker::listener::CellScanListener;
use envtracker::logging;
use envtracker::platform::{
    ApScanEntry, ApiLevel, BtScanEntry, CellInfo, LocationFix, NeighborCellInfo, PlatformVersion,
};
use envtracker::reading::Reading;
use envtracker::tracker::EnvTracker;

use sim::SimPlatform;

#[derive(Parser)]
#[command(name = "envtracker")]
#[command(version = envtracker::VERSION)]
#[command(about = "Track environmental sources on a simulated platform", long_about = None)]
struct Args {
    /// How long to run before stopping, in seconds
    #[arg(long, default_value = "20")]
    duration_secs: u64,

    /// Simulated platform API level
    #[arg(long, default_value = "23")]
    api_level: u32,

    /// Deny a capability on the simulated platform (repeatable)
    #[arg(long = "deny", value_name = "CAPABILITY")]
    denied: Vec<String>,

    /// Read configuration from this INI file instead of the default location
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Enable bluetooth discovery on top of the loaded configuration
    #[arg(long)]
    bluetooth: bool,

    /// Seed for the simulated data (0 picks one at random)
    #[arg(long, default_value = "0")]
    seed: u64,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Logging comes up first so everything after is captured.
    let _logging =
        match logging::init_logging(logging::default_log_dir(), logging::default_log_file()) {
            Ok(guard) => guard,
            Err(e) => {
                eprintln!("Error initializing logging: {}", e);
                process::exit(1);
            }
        };

    let configuration = match load_configuration(&args) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error loading configuration: {}", e);
            process::exit(1);
        }
    };

    println!("Tracking for {}s with:", args.duration_secs);
    println!("  API level: {}", args.api_level);
    println!(
        "  Sources: wifi={} cell={} gps={} bluetooth={}",
        configuration.using_wifi(),
        configuration.using_cell(),
        configuration.using_gps(),
        configuration.using_bluetooth()
    );
    if !args.denied.is_empty() {
        println!("  Denied capabilities: {}", args.denied.join(", "));
    }
    println!();

    let platform = Arc::new(SimPlatform::new(&args.denied, args.seed));
    let tracker = match EnvTracker::builder()
        .capability_source(platform.clone())
        .platform_version(PlatformVersion::new(ApiLevel(args.api_level)))
        .wifi_source(platform.clone())
        .cell_source(platform.clone())
        .location_source(platform.clone())
        .bluetooth_source(platform)
        .configuration(configuration.clone())
        .build()
    {
        Ok(t) => t,
        Err(e) => {
            eprintln!("Error building tracker: {}", e);
            process::exit(1);
        }
    };

    let counts = attach_listeners(&tracker);

    tracker.start().await;
    if !tracker.is_running() {
        eprintln!("Error: tracker did not start, a required capability is denied");
        process::exit(1);
    }

    let half = Duration::from_secs(args.duration_secs.max(2)) / 2;

    let interrupted = tokio::select! {
        _ = tokio::signal::ctrl_c() => true,
        _ = tokio::time::sleep(half) => false,
    };

    if !interrupted {
        // Halfway through, rework the running configuration: wifi scans
        // twice as often, gps toggled the other way.
        let update = configuration
            .to_builder()
            .wifi(WifiParams::new(
                (configuration.wifi_params().scan_interval_ms / 2).max(1_000),
            ))
            .use_gps(!configuration.using_gps())
            .build();
        info!("Applying mid-run configuration update");
        tracker.update_configuration(update).await;

        tokio::select! {
            _ = tokio::signal::ctrl_c() => {}
            _ = tokio::time::sleep(half) => {}
        }
    }

    tracker.stop().await;

    println!();
    println!("Readings received:");
    println!("  wifi:      {}", counts.wifi.load(Ordering::Relaxed));
    println!("  cell:      {}", counts.cell.load(Ordering::Relaxed));
    println!("  gps:       {}", counts.gps.load(Ordering::Relaxed));
    println!("  bluetooth: {}", counts.bluetooth.load(Ordering::Relaxed));
}

fn load_configuration(args: &Args) -> Result<Configuration, ConfigFileError> {
    let configuration = match &args.config {
        Some(path) => Configuration::load_from(path)?,
        None => Configuration::load()?,
    };
    if args.bluetooth {
        Ok(configuration.to_builder().use_bluetooth(true).build())
    } else {
        Ok(configuration)
    }
}

struct ReadingCounts {
    wifi: Arc<AtomicUsize>,
    cell: Arc<AtomicUsize>,
    gps: Arc<AtomicUsize>,
    bluetooth: Arc<AtomicUsize>,
}

fn attach_listeners(tracker: &EnvTracker) -> ReadingCounts {
    let counts = ReadingCounts {
        wifi: Arc::new(AtomicUsize::new(0)),
        cell: Arc::new(AtomicUsize::new(0)),
        gps: Arc::new(AtomicUsize::new(0)),
        bluetooth: Arc::new(AtomicUsize::new(0)),
    };

    tracker.add_permission_listener(Arc::new(|capabilities: &[&str]| {
        info!(?capabilities, "Capabilities needed before tracking can start");
    }));
    tracker.set_configuration_change_listener(Arc::new(|configuration: &Configuration| {
        info!(
            wifi = configuration.using_wifi(),
            cell = configuration.using_cell(),
            gps = configuration.using_gps(),
            bluetooth = configuration.using_bluetooth(),
            "Configuration committed"
        );
    }));

    let wifi = counts.wifi.clone();
    tracker.set_wifi_scan_listener(Arc::new(move |reading: Reading<Vec<ApScanEntry>>| {
        wifi.fetch_add(1, Ordering::Relaxed);
        let strongest = reading.payload.iter().map(|ap| ap.rssi_dbm).max();
        info!(
            access_points = reading.payload.len(),
            strongest_dbm = strongest,
            "Wifi scan"
        );
    }));

    tracker.set_cell_scan_listener(Arc::new(CellObserver {
        count: counts.cell.clone(),
    }));

    let gps = counts.gps.clone();
    tracker.set_gps_location_listener(Arc::new(move |reading: Reading<LocationFix>| {
        gps.fetch_add(1, Ordering::Relaxed);
        info!(
            latitude = reading.payload.latitude,
            longitude = reading.payload.longitude,
            accuracy_m = reading.payload.accuracy_m,
            "Location fix"
        );
    }));

    let bluetooth = counts.bluetooth.clone();
    tracker.set_bluetooth_scan_listener(Arc::new(move |reading: Reading<Vec<BtScanEntry>>| {
        bluetooth.fetch_add(1, Ordering::Relaxed);
        info!(devices = reading.payload.len(), "Bluetooth discovery round");
    }));

    counts
}

struct CellObserver {
    count: Arc<AtomicUsize>,
}

impl CellScanListener for CellObserver {
    fn on_cell_info(&self, reading: Reading<Vec<CellInfo>>) {
        self.count.fetch_add(1, Ordering::Relaxed);
        info!(cells = reading.payload.len(), "Cell reading");
    }

    fn on_neighbor_cells(&self, reading: Reading<Vec<NeighborCellInfo>>) {
        self.count.fetch_add(1, Ordering::Relaxed);
        info!(cells = reading.payload.len(), "Neighbor cell reading");
    }
}
