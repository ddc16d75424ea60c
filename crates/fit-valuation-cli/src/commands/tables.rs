use clap::Subcommand;
use serde_json::Value;

use crate::context;
use crate::GlobalOpts;

#[derive(Subcommand)]
pub enum TablesCommand {
    /// Check every rate card for band gaps, overlaps and missing scheme years
    Validate {
        /// Exit with an error when any finding is reported
        #[arg(long)]
        strict: bool,
    },
    /// List technologies, scheme years and bands
    List,
}

pub fn run_tables(cmd: TablesCommand, global: &GlobalOpts) -> Result<Value, Box<dyn std::error::Error>> {
    let engine = context::build_engine(global)?;
    match cmd {
        TablesCommand::Validate { strict } => {
            let report = engine.validate_tables();
            if strict && !report.result.clean {
                return Err(format!(
                    "{} data-quality finding(s) in tables '{}':\n  {}",
                    report.result.findings.len(),
                    report.result.version,
                    report.warnings.join("\n  ")
                )
                .into());
            }
            Ok(serde_json::to_value(report)?)
        }
        TablesCommand::List => Ok(serde_json::to_value(engine.table_catalogue())?),
    }
}
