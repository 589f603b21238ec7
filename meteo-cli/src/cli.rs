use anyhow::Context;
use clap::{Parser, Subcommand};
use meteo_core::{Config, WidgetController};

use crate::{render, session};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "meteo", version, about = "Weather widgets for coordinates")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Restore saved widgets and manage them interactively (default).
    Session,

    /// Restore saved widgets and print them with the map.
    Show,

    /// Add a widget for the given coordinates.
    Add {
        /// Latitude, e.g. "55.7558" or "55,7558".
        #[arg(allow_hyphen_values = true)]
        latitude: String,

        /// Longitude, e.g. "37.6173".
        #[arg(allow_hyphen_values = true)]
        longitude: String,
    },

    /// Forget all saved widgets.
    Reset,

    /// Show the configuration file location and effective settings.
    Config {
        /// Write the effective settings to the config file.
        #[arg(long)]
        init: bool,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let config = Config::load()?;

        match self.command.unwrap_or(Command::Session) {
            Command::Session => {
                let controller = WidgetController::from_config(&config)?;
                session::run(&controller, &config).await?;
            }
            Command::Show => {
                let controller = WidgetController::from_config(&config)?;
                let report = controller.restore().await;
                render::print_restore_report(&report);
                render::print_view(&controller.view(), &config);
            }
            Command::Add {
                latitude,
                longitude,
            } => {
                let controller = WidgetController::from_config(&config)?;
                let report = controller.restore().await;
                render::print_restore_report(&report);

                if let Err(e) = controller.add(&latitude, &longitude).await {
                    // The banner carries the user-facing text; nothing else to add.
                    tracing::debug!(error = %e, "add failed");
                }
                render::print_view(&controller.view(), &config);
            }
            Command::Reset => {
                let controller = WidgetController::from_config(&config)?;
                controller.reset().context("Failed to clear saved widgets")?;
                println!("Сохранённые виджеты удалены.");
            }
            Command::Config { init } => {
                let path = Config::config_file_path()?;
                if init {
                    config.save()?;
                    println!("Wrote {}", path.display());
                } else {
                    println!("# {}", path.display());
                }
                println!("# widgets stored in {}", config.data_dir()?.display());
                print!(
                    "{}",
                    toml::to_string_pretty(&config).context("Failed to serialize configuration")?
                );
            }
        }

        Ok(())
    }
}
