use std::io::{self, Write};
use std::path::Path;

use crate::sim::BurnReport;

/// Write the per-phase burn table in CSV format.
///
/// Columns: phase, start_s, duration_s, isp, consumption, thrust,
///          dir_x, dir_y, alignment, mass_before, mass_after, delta_v,
///          units, pools
pub fn write_phases<W: Write>(writer: &mut W, report: &BurnReport) -> io::Result<()> {
    writeln!(
        writer,
        "phase,start_s,duration_s,isp,consumption,thrust,\
         dir_x,dir_y,alignment,mass_before,mass_after,delta_v,\
         units,pools"
    )?;

    for p in &report.phases {
        writeln!(
            writer,
            "{},{:.4},{:.4},{:.3},{:.6},{:.3},\
             {:.6},{:.6},{:.6},{:.4},{:.4},{:.4},\
             {},{}",
            p.index,
            p.start_time,
            p.duration,
            p.global_isp,
            p.global_consumption,
            p.global_thrust,
            p.direction.x,
            p.direction.y,
            p.direction.norm(),
            p.mass_before,
            p.mass_after,
            p.delta_v,
            p.active_units,
            p.active_pools,
        )?;
    }

    Ok(())
}

/// Write the phase table to a CSV file at the given path.
pub fn write_phases_file<P: AsRef<Path>>(path: P, report: &BurnReport) -> io::Result<()> {
    let mut file = std::fs::File::create(path)?;
    write_phases(&mut file, report)
}
