//! stackclip
//!
//! Downloads two videos, cuts them into matching segments and stacks every
//! pair into a composite clip for phones and messengers.
//!
//! # Usage
//!
//! ```bash
//! stackclip stack --primary "https://youtu.be/..." --secondary "https://youtu.be/..." --segments 5
//! stackclip stack --primary main.mp4 --secondary-playlist "https://youtube.com/playlist?list=..." --layout portrait
//! stackclip stack --channel "https://youtube.com/@someone/videos" --channel-count 2 --channel-skip 1 --secondary filler.mp4
//! stackclip plan --duration 02:10 --segment-length 60
//! stackclip convert --input "https://youtu.be/..." --output clip.mp4
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use stackclip::app::container::DefaultAppContainer;
use stackclip::cli::{commands, Cli, Commands};
use stackclip::config_initialization::initialize_settings;
use stackclip::utils::logging::{init_logging, LogFormat, LoggingConfig};

/// Main entry point for the stackclip CLI
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(&LoggingConfig {
        level: cli.log_level.clone(),
        format: LogFormat::parse(&cli.log_format)?,
        target: false,
    })?;

    info!("Starting stackclip");

    let settings = initialize_settings(&cli).context("Failed to load configuration")?;
    let container = DefaultAppContainer::new(&settings);

    match &cli.command {
        Commands::Stack(_) => {
            info!("Executing stack command");
            commands::stack(&container, &settings).await?;
        }
        Commands::Plan(args) => {
            info!("Executing plan command");
            commands::plan(&container, &settings, args).await?;
        }
        Commands::Convert(args) => {
            info!("Executing convert command");
            commands::convert(&container, &settings, args).await?;
        }
    }

    info!("stackclip completed successfully");
    Ok(())
}
