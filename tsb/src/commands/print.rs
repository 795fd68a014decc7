use std::path::PathBuf;

use clap::Args;
use eyre::{Context, Result};
use tsb_config::ConfigPipeline;
use tsb_core::Command;

use super::UnwrapOrExit;

#[derive(Args)]
pub struct PrintCommand {
    /// Command to resolve the config for
    pub command: Command,

    /// Path to the config script (defaults to ./tsb.config.lua)
    #[arg(short, long, default_value = tsb_core::CONFIG_FILE_NAME)]
    pub config: PathBuf,
}

impl PrintCommand {
    pub fn run(&self) -> Result<()> {
        let resolved = ConfigPipeline::new(self.command)
            .config(&self.config)
            .run()
            .unwrap_or_exit();

        let json =
            serde_json::to_string_pretty(&resolved).wrap_err("Failed to serialize config")?;
        println!("{json}");

        Ok(())
    }
}
