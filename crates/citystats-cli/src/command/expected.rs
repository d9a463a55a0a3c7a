//! Expected guesses command
//!
//! Prints the expected guess count of the population model for each given
//! population, under both calibrations.

use citystats_analysis::expected::{EUROPE, USA};
use clap::Args;

use crate::command::table::Table;

#[derive(Debug, Clone, Args)]
pub(crate) struct ExpectedArg {
    /// Populations to evaluate
    #[arg(required = true)]
    pub populations: Vec<u64>,
}

pub(crate) fn run(arg: &ExpectedArg) -> anyhow::Result<()> {
    print!("{}", expected_table(&arg.populations));
    Ok(())
}

#[expect(clippy::cast_precision_loss)]
fn expected_table(populations: &[u64]) -> Table {
    let cell = |guesses: Option<f64>| guesses.map_or_else(|| "-".to_owned(), |g| format!("{g:.1}"));
    let mut table = Table::new(["population", "europe", "usa"]);
    for &population in populations {
        table.push_row([
            population.to_string(),
            cell(EUROPE.expected_guesses(population as f64)),
            cell(USA.expected_guesses(population as f64)),
        ]);
    }
    table
}
