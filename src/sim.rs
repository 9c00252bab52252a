use std::io::Write;

use color_eyre::eyre;
use itertools::Itertools;
use keplerpos::{
    bodies::{BodyId, ElementsTable},
    kepler::Propagator,
    time::{Chrono, SimTime},
    vector::Vec3,
};
use rayon::prelude::*;
use tracing::{debug, warn};

use crate::config::SimConfig;

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Sample {
    pub id: BodyId,
    pub position: Vec3,
    pub converged: bool,
}

/// Positions of `bodies` at `t` seconds, in the order given.
pub fn propagate(
    table: &ElementsTable,
    propagator: &Propagator,
    bodies: &[BodyId],
    t: f64,
) -> Vec<Sample> {
    bodies
        .par_iter()
        .map(|&id| match &table.get(id).elements {
            Some(k) => {
                let state = propagator.compute_state(k, t);
                Sample {
                    id,
                    position: state.position,
                    converged: state.converged,
                }
            }
            None => Sample {
                id,
                position: Vec3::ZERO,
                converged: true,
            },
        })
        .collect()
}

/// Tick `chrono` through the scenario and write one line per tick.
///
/// The chrono is only written between ticks; each tick's propagation reads
/// a snapshot of it.
pub fn run(
    config: &SimConfig,
    table: &ElementsTable,
    chrono: &Chrono,
    mut out: impl Write,
) -> eyre::Result<()> {
    let step = config.step_duration()?;
    config.propagator.validate()?;
    chrono.set(config.start_time()?.as_seconds())?;
    debug!(ticks = config.ticks, ?step, "starting run");
    for tick in 0..config.ticks {
        let t = if tick == 0 {
            chrono.current()
        } else {
            chrono.advance(step)?
        };
        let now = SimTime::try_from_seconds(t)?;
        let samples = propagate(table, &config.propagator, &config.bodies, t);
        for sample in samples.iter().filter(|s| !s.converged) {
            warn!(body = %sample.id, %now, "position from an unconverged solve");
        }
        writeln!(
            out,
            "{now}\t{}",
            samples
                .iter()
                .map(|s| format!("{}: {}", s.id, s.position))
                .join("\t")
        )?;
    }
    Ok(())
}
