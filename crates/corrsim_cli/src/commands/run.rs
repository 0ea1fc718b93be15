//! Run command implementation
//!
//! Accumulates the scenario's path ensemble and prints its percentile summary.

use std::io::BufWriter;

use tracing::info;

use crate::config::ScenarioConfig;
use crate::output::{write_summary, write_trajectories};
use crate::pipeline::Scenario;
use crate::Result;

use super::create_file;

/// Run the run command
pub fn run(config: ScenarioConfig) -> Result<()> {
    let format = config.output.format;
    let trajectories = config.output.trajectories.clone();
    let trajectory_paths = config.output.trajectory_paths;

    let scenario = Scenario::new(config)?;
    let result = scenario.run()?;

    write_summary(std::io::stdout().lock(), &result, format)?;

    if let Some(path) = trajectories {
        let file = BufWriter::new(create_file(&path)?);
        write_trajectories(file, &result.ensemble, &result.dates, trajectory_paths)?;
        info!(
            path = %path.display(),
            paths = trajectory_paths.min(result.ensemble.paths()),
            "Wrote trajectories"
        );
    }

    Ok(())
}
