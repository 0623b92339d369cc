use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use deltav_sim::config::{load_settings, SimSettings};
use deltav_sim::io::csv;
use deltav_sim::io::json::{self, BurnSummary};
use deltav_sim::io::{velocity_string, Readout};
use deltav_sim::sim::{self, BurnReport, Equalizer, KeepThrottle};
use deltav_sim::vehicle::{presets, VehicleSnapshot};

/// Estimate the delta-V left in a vehicle's propellant.
#[derive(Debug, Parser)]
#[command(name = "deltav", version)]
struct Cli {
    /// Vehicle snapshot (JSON)
    #[arg(long, conflicts_with = "preset")]
    vehicle: Option<PathBuf>,

    /// Built-in vehicle (single-engine, ion-probe, booster-lander)
    #[arg(long)]
    preset: Option<String>,

    /// Settings file (JSON); flags below override it
    #[arg(long)]
    settings: Option<PathBuf>,

    #[arg(long)]
    isp_multiplier: Option<f64>,

    #[arg(long)]
    dry_mass_multiplier: Option<f64>,

    /// Let the thrust normal's length scale engine thrust
    #[arg(long)]
    unrestricted: bool,

    /// Fly the snapshot throttles instead of equalizing them
    #[arg(long)]
    keep_throttle: bool,

    /// Print the per-phase table
    #[arg(long)]
    phases: bool,

    /// Write the per-phase table as CSV
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Write a JSON summary
    #[arg(long)]
    json: Option<PathBuf>,

    /// More log output (-v debug, -vv trace); RUST_LOG wins when set
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_vehicle(cli: &Cli) -> Result<VehicleSnapshot> {
    if let Some(path) = &cli.vehicle {
        return VehicleSnapshot::load(path)
            .with_context(|| format!("loading vehicle snapshot {}", path.display()));
    }
    let name = cli.preset.as_deref().unwrap_or("single-engine");
    presets::by_name(name).ok_or_else(|| {
        anyhow!("unknown preset '{name}' (known: {})", presets::NAMES.join(", "))
    })
}

fn load_sim_settings(cli: &Cli) -> Result<SimSettings> {
    let mut settings = match &cli.settings {
        Some(path) => load_settings(path)
            .with_context(|| format!("loading settings {}", path.display()))?,
        None => SimSettings::default(),
    };
    if let Some(v) = cli.isp_multiplier {
        settings.isp_multiplier = v;
    }
    if let Some(v) = cli.dry_mass_multiplier {
        settings.dry_mass_multiplier = v;
    }
    settings.unrestricted_thrust |= cli.unrestricted;
    settings.validate()?;
    Ok(settings)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let vehicle = load_vehicle(&cli)?;
    let settings = load_sim_settings(&cli)?;

    if let Some(marker) = Readout::marker(Some(&vehicle)) {
        println!("  ΔV: {marker}");
        return Ok(());
    }

    let report = if cli.keep_throttle {
        sim::analyze_with(&vehicle, &settings, KeepThrottle)
    } else {
        sim::analyze_with(&vehicle, &settings, Equalizer::new())
    };

    print_report(&vehicle, &settings, &report, cli.phases);

    if let Some(path) = &cli.csv {
        csv::write_phases_file(path, &report)
            .with_context(|| format!("writing {}", path.display()))?;
        println!("  Exported: {}", path.display());
    }
    if let Some(path) = &cli.json {
        let summary = BurnSummary::new(&vehicle, &report);
        json::write_summary_file(path, &summary)
            .with_context(|| format!("writing {}", path.display()))?;
        println!("  Exported: {}", path.display());
    }

    Ok(())
}

fn print_report(vehicle: &VehicleSnapshot, settings: &SimSettings, report: &BurnReport, phases: bool) {
    println!();
    println!("====================================================================");
    println!("  DELTA-V ESTIMATE — {}", vehicle.name);
    println!("====================================================================");
    println!();
    println!("  Vehicle");
    println!("  ──────────────────────────────────────────────────────────────────");
    println!(
        "  Mass:          {:>10.3}     Pooled propellant: {:>10.3}",
        vehicle.mass,
        vehicle.pooled_propellant()
    );
    println!(
        "  Engines:       {:>10}     Boosters:          {:>10}",
        vehicle.engines.len(),
        vehicle.boosters.len()
    );
    println!(
        "  Isp x{:<6.2} Dry mass x{:<6.2} Unrestricted thrust: {}",
        settings.isp_multiplier, settings.dry_mass_multiplier, settings.unrestricted_thrust
    );
    println!();

    println!("  Result");
    println!("  ──────────────────────────────────────────────────────────────────");
    println!("  ΔV:            {:>14}", velocity_string(report.magnitude()));
    println!("  ΔV (aligned):  {:>14}", velocity_string(report.scalar_delta_v()));
    println!(
        "  Burn time:     {:>12.1} s     Propellant used: {:>10.3}",
        report.burn_time(),
        report.propellant_used()
    );
    if report.truncated() {
        println!("  (phase budget exhausted; estimate truncated)");
    }
    println!();

    if phases {
        println!("  Phases");
        println!("  ──────────────────────────────────────────────────────────────────");
        println!(
            "  {:>5}  {:>9}  {:>9}  {:>10}  {:>9}  {:>9}  {:>5}",
            "#", "t (s)", "dt (s)", "isp", "align", "ΔV", "units"
        );
        println!("  {}", "─".repeat(66));
        for p in &report.phases {
            println!(
                "  {:>5}  {:>9.2}  {:>9.2}  {:>10.1}  {:>9.3}  {:>9.1}  {:>5}",
                p.index,
                p.start_time,
                p.duration,
                p.global_isp,
                p.direction.norm(),
                p.delta_v,
                p.active_units
            );
        }
        println!();
    }

    println!("====================================================================");
    println!();
}
