use std::io::{self, Write};
use std::path::Path;

use serde::Serialize;

use crate::sim::{BurnPhase, BurnReport};
use crate::vehicle::VehicleSnapshot;

/// Summary statistics of one delta-V estimate.
#[derive(Debug, Clone, Serialize)]
pub struct BurnSummary {
    pub vehicle: String,
    pub delta_v: f64,
    pub scalar_delta_v: f64,
    pub burn_time_s: f64,
    pub initial_mass: f64,
    pub final_mass: f64,
    pub phases: Vec<PhaseSummary>,
    pub truncated: bool,
    pub stalled: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct PhaseSummary {
    pub duration_s: f64,
    pub isp: f64,
    pub consumption: f64,
    pub direction: [f64; 2],
    pub delta_v: f64,
}

impl From<&BurnPhase> for PhaseSummary {
    fn from(p: &BurnPhase) -> Self {
        Self {
            duration_s: p.duration,
            isp: p.global_isp,
            consumption: p.global_consumption,
            direction: [p.direction.x, p.direction.y],
            delta_v: p.delta_v,
        }
    }
}

impl BurnSummary {
    pub fn new(vehicle: &VehicleSnapshot, report: &BurnReport) -> Self {
        Self {
            vehicle: vehicle.name.clone(),
            delta_v: report.magnitude(),
            scalar_delta_v: report.scalar_delta_v(),
            burn_time_s: report.burn_time(),
            initial_mass: report.initial_mass,
            final_mass: report.final_mass,
            phases: report.phases.iter().map(PhaseSummary::from).collect(),
            truncated: report.truncated(),
            stalled: report.stalled(),
        }
    }
}

/// Write a burn summary as pretty JSON to a writer.
pub fn write_summary<W: Write>(writer: &mut W, summary: &BurnSummary) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut *writer, summary)?;
    writeln!(writer)
}

/// Write a burn summary JSON to a file.
pub fn write_summary_file<P: AsRef<Path>>(path: P, summary: &BurnSummary) -> io::Result<()> {
    let mut file = std::fs::File::create(path)?;
    write_summary(&mut file, summary)
}
