//! Sample command implementation
//!
//! Draws one batch of correlated rows and reports how well the realised
//! dependence and marginals match the scenario.

use std::io::BufWriter;

use tracing::{info, warn};

use crate::config::ScenarioConfig;
use crate::output::{write_densities, write_sample_report};
use crate::pipeline::{Scenario, KS_ALPHA};
use crate::Result;

use super::create_file;

/// Run the sample command
pub fn run(config: ScenarioConfig) -> Result<()> {
    let format = config.output.format;
    let densities = config.output.densities.clone();

    let scenario = Scenario::new(config)?;
    let report = scenario.sample()?;

    for j in report.rejected_coordinates() {
        warn!(
            coordinate = j,
            statistic = report.ks_statistics[j],
            alpha = KS_ALPHA,
            "Uniformity rejected"
        );
    }

    write_sample_report(std::io::stdout().lock(), &report, format)?;

    if let Some(path) = densities {
        let grids = scenario.density_grids()?;
        write_densities(BufWriter::new(create_file(&path)?), &grids)?;
        info!(path = %path.display(), columns = grids.len(), "Wrote density grids");
    }

    Ok(())
}
