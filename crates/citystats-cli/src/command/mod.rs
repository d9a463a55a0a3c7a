use clap::{Parser, Subcommand};

use self::{expected::ExpectedArg, report::ReportArg};

mod expected;
mod report;
mod table;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    /// What to run; defaults to the full report
    #[command(subcommand)]
    mode: Option<Mode>,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Compute every view and print the report
    Report(#[clap(flatten)] ReportArg),
    /// Print expected guess counts for populations
    Expected(#[clap(flatten)] ExpectedArg),
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    match args.mode.unwrap_or(Mode::Report(ReportArg::default())) {
        Mode::Report(arg) => report::run(&arg)?,
        Mode::Expected(arg) => expected::run(&arg)?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition() {
        CommandArgs::command().debug_assert();
    }

    #[test]
    fn test_force_accepts_view_names() {
        let args = CommandArgs::try_parse_from([
            "citystats",
            "report",
            "--force",
            "percentiles,forgotten_countries",
        ])
        .unwrap();
        let Some(Mode::Report(arg)) = args.mode else {
            panic!("expected the report mode");
        };
        assert_eq!(arg.force.len(), 2);

        assert!(
            CommandArgs::try_parse_from(["citystats", "report", "--force", "nope"]).is_err()
        );
    }
}
