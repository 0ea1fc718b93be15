//! Check command implementation
//!
//! Validates a scenario without simulating it.

use tracing::info;

use corrsim_engine::accumulate::{AccumulationConfig, ContributionSpec};

use crate::config::ScenarioConfig;
use crate::pipeline::{build_growth, Scenario};
use crate::Result;

/// Run the check command
pub fn run(config: ScenarioConfig) -> Result<()> {
    let scenario = Scenario::new(config)?;
    let config = scenario.config();

    // Contributions are not sampled; their shape is checked at run time.
    AccumulationConfig::builder()
        .time_steps(config.simulation.steps)
        .path_count(config.simulation.paths)
        .growth(build_growth(&config.growth))
        .contribution(ContributionSpec::None)
        .build()?;
    scenario.discount()?;

    let structure = scenario.structure();
    info!(
        dimension = structure.dim(),
        singular = structure.is_singular(),
        columns = config.columns.len(),
        "Scenario is valid"
    );

    println!("Scenario OK");
    println!("  Paths:       {}", config.simulation.paths);
    println!("  Steps:       {}", config.simulation.steps);
    println!("  Start date:  {}", config.simulation.start_date);
    println!(
        "  Correlation: {}x{}{}",
        structure.dim(),
        structure.dim(),
        if structure.is_singular() { " (singular)" } else { "" }
    );
    for (i, column) in config.columns.iter().enumerate() {
        println!("  Column {}:    {:?}", i, column);
    }
    Ok(())
}
