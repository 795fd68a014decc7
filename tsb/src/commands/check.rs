use std::path::PathBuf;

use clap::Args;
use eyre::Result;
use tsb_config::ConfigPipeline;
use tsb_core::Command;

use super::UnwrapOrExit;
use crate::{
    ops,
    reports::{Report, TerminalOutput},
};

#[derive(Args)]
pub struct CheckCommand {
    /// Path to the config script (defaults to ./tsb.config.lua)
    #[arg(short, long, default_value = tsb_core::CONFIG_FILE_NAME)]
    pub config: PathBuf,

    /// Command to resolve the config for
    #[arg(long, default_value = "build")]
    pub command: Command,
}

impl CheckCommand {
    /// Run the check command
    pub fn run(&self) -> Result<()> {
        let pipeline = ConfigPipeline::new(self.command).config(&self.config);
        let resolved = pipeline.run().unwrap_or_exit();

        let report = ops::check(&resolved);
        report.render(&mut TerminalOutput::new());

        Ok(())
    }
}
