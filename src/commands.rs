//! Command dispatch: turns parsed CLI arguments into calls on the library.

use tracing::{debug, info};

use crate::backup::{TerminalPrompt, run_backup};
use crate::cli::{Cli, Commands, ImmichCommands};
use crate::command_runner::SystemRunner;
use crate::config::Settings;
use crate::convert::convert_directory;
use crate::error::Result;
use crate::immich::{ImmichClient, RetryPolicy, run_check, run_upload};
use crate::sanity;
use crate::tracks::{self, TrackOptions};

/// Configuration is only loaded for commands that read it.
fn load_settings(cli: &Cli) -> Result<Settings> {
    let settings = Settings::load(cli.config.as_deref())?;
    debug!("settings: {:?}", settings);
    Ok(settings)
}

/// Run the selected command to completion.
pub fn run(cli: Cli) -> Result<()> {
    match &cli.command {
        Commands::Backup { source, repository } => {
            let settings = load_settings(&cli)?;
            let restic = sanity::require_binary(&settings.tools.restic)?;
            info!("backing up {} to {}", source.display(), repository);
            run_backup(
                source,
                repository,
                sanity::is_running_as_root(),
                &TerminalPrompt,
                SystemRunner,
                &restic.to_string_lossy(),
            )?;
        }
        Commands::Convert { mode, directory } => {
            let settings = load_settings(&cli)?;
            let ffmpeg = sanity::require_binary(&settings.tools.ffmpeg)?;
            info!("converting {} in {}", mode, directory.display());
            convert_directory(&SystemRunner, &ffmpeg.to_string_lossy(), directory, *mode)?;
        }
        Commands::Gpx {
            directory,
            recursive,
            fix,
            count_points,
        } => {
            let options = TrackOptions {
                recursive: *recursive,
                fix: *fix,
                count_points: *count_points,
                verbose: cli.verbose > 0,
            };
            tracks::run(directory, options)?;
        }
        Commands::Immich { action } => {
            let credentials = load_settings(&cli)?.immich.credentials()?;
            let client = ImmichClient::new(&credentials)?;
            match action {
                ImmichCommands::Upload { folder, album } => {
                    run_upload(
                        &client,
                        folder,
                        album.as_deref(),
                        &credentials.device_id,
                        RetryPolicy::default(),
                    )?;
                }
                ImmichCommands::Check { folder, delete } => {
                    run_check(&client, folder, *delete)?;
                }
            }
        }
    }

    Ok(())
}
