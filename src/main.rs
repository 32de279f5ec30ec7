//! CLI entrypoint for `wsreset`.
//!
//! The reset/view logic lives in the `wsreset` library crate; this binary
//! wires it to an interactive menu (the default) or to the direct-run
//! `reset` / `show` subcommands.

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::io::Write;
use std::path::PathBuf;
use wsreset::error::ResetError;
use wsreset::ui::{ConsoleUi, Notice, TerminalUi};
use wsreset::workflow::{self, BackupChoice, ResetParams};

const APP_TITLE: &str = "Windsurf Reset Tool";
const APP_BLURB: &str =
    "This tool resets your Windsurf device IDs and can back up the existing configuration first.";

#[derive(Parser)]
#[command(
    name = "wsreset",
    version,
    about = "Reset the Windsurf device identifiers",
    long_about = "Reset the Windsurf device identifiers.\n\n\
Without a subcommand, an interactive menu offers the reset, a read-only view of the current \
configuration, and exit. The `reset` and `show` subcommands run the same operations directly \
for scripted use.\n\n\
The storage file lives at the OS-specific Windsurf location \
(`%APPDATA%` on Windows, `~/Library/Application Support` on macOS, `~/.config` on Linux); \
`--storage-file` overrides the resolution entirely."
)]
struct Cli {
    /// Storage file to operate on (overrides OS path resolution).
    #[arg(
        long,
        global = true,
        env = "WSRESET_STORAGE_FILE",
        value_name = "PATH"
    )]
    storage_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Reset the device identifiers without the interactive menu.
    Reset {
        /// Skip the confirmation prompt.
        #[arg(long)]
        yes: bool,
        /// Create a backup without asking.
        #[arg(long, conflicts_with = "no_backup")]
        backup: bool,
        /// Skip the backup without asking.
        #[arg(long)]
        no_backup: bool,
        /// Print the outcome as JSON on stdout.
        #[arg(long)]
        json: bool,
    },
    /// Show the current identifier configuration.
    Show {
        /// Print the telemetry entries as JSON on stdout.
        #[arg(long)]
        json: bool,
    },
}

fn main() {
    let cli = Cli::parse();
    let mut ui = TerminalUi::new();
    if let Err(err) = run(&cli, &mut ui) {
        report_failure(&mut ui, &err);
        std::process::exit(1);
    }
}

fn run(cli: &Cli, ui: &mut TerminalUi) -> anyhow::Result<()> {
    match cli.command {
        Some(Commands::Reset {
            yes,
            backup,
            no_backup,
            json,
        }) => run_reset_once(ui, cli, yes, backup_choice(backup, no_backup), json),
        Some(Commands::Show { json }) => run_show(ui, cli, json),
        None => run_menu(ui, cli),
    }
}

fn report_failure(ui: &mut TerminalUi, err: &anyhow::Error) {
    ui.finish();
    if matches!(err.downcast_ref::<ResetError>(), Some(ResetError::Cancelled)) {
        let _ = ui.notice(Notice::Warning, "Operation cancelled by user");
    } else {
        let _ = ui.notice(Notice::Error, &format!("{err:#}"));
    }
}

const fn backup_choice(backup: bool, no_backup: bool) -> BackupChoice {
    if backup {
        BackupChoice::Always
    } else if no_backup {
        BackupChoice::Never
    } else {
        BackupChoice::Ask
    }
}

fn run_reset_once(
    ui: &mut TerminalUi,
    cli: &Cli,
    yes: bool,
    backup: BackupChoice,
    json: bool,
) -> anyhow::Result<()> {
    if !yes {
        match ui
            .confirm("Are you sure you want to reset your device IDs?")
            .context("read confirmation")?
        {
            Some(true) => {}
            Some(false) => return Ok(()),
            None => return Err(ResetError::Cancelled.into()),
        }
    }

    let outcome = workflow::run_reset(
        ui,
        ResetParams {
            storage_file: cli.storage_file.clone(),
            backup,
        },
    )?;
    if json {
        write_json(&outcome)?;
    }
    Ok(())
}

fn run_show(ui: &mut TerminalUi, cli: &Cli, json: bool) -> anyhow::Result<()> {
    if json {
        let storage_file = workflow::resolve_storage_file(cli.storage_file.clone())?;
        let loaded = wsreset::config::load(&storage_file)?;
        write_json(&workflow::telemetry_entries(&loaded.document))?;
        return Ok(());
    }
    workflow::view_config(ui, cli.storage_file.clone())?;
    Ok(())
}

fn run_menu(ui: &mut TerminalUi, cli: &Cli) -> anyhow::Result<()> {
    ui.prepare_screen(APP_TITLE).context("prepare terminal")?;
    loop {
        ui.header(APP_TITLE, APP_BLURB).context("draw header")?;
        let choice = ui
            .select(
                "Main Menu",
                &[
                    "Reset Device IDs",
                    "View Current Configuration",
                    "Exit",
                ],
            )
            .context("read menu choice")?;

        match choice {
            Some(0) => {
                match ui
                    .confirm("Are you sure you want to reset your device IDs?")
                    .context("read confirmation")?
                {
                    Some(true) => {
                        let params = ResetParams {
                            storage_file: cli.storage_file.clone(),
                            backup: BackupChoice::Ask,
                        };
                        if let Err(err) = workflow::run_reset(ui, params) {
                            if matches!(err, ResetError::Cancelled) {
                                return Err(err.into());
                            }
                            // Reset errors return to the menu.
                            let err = anyhow::Error::from(err);
                            ui.notice(Notice::Error, &format!("Reset failed: {err:#}"))?;
                        }
                    }
                    Some(false) => {}
                    None => return Err(ResetError::Cancelled.into()),
                }
            }
            Some(1) => {
                if let Err(err) = workflow::view_config(ui, cli.storage_file.clone()) {
                    let err = anyhow::Error::from(err);
                    ui.notice(
                        Notice::Error,
                        &format!("Failed to read configuration: {err:#}"),
                    )?;
                }
            }
            None => return Err(ResetError::Cancelled.into()),
            _ => break,
        }

        match ui
            .confirm("Would you like to perform another operation?")
            .context("read continue choice")?
        {
            Some(true) => {}
            Some(false) => break,
            None => return Err(ResetError::Cancelled.into()),
        }
    }
    ui.notice(Notice::Info, "Thank you for using the Windsurf Reset Tool!")?;
    Ok(())
}

fn write_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let mut stdout = std::io::stdout();
    let raw = serde_json::to_string_pretty(value).context("serialize JSON")?;
    stdout.write_all(raw.as_bytes()).context("write stdout")?;
    stdout.write_all(b"\n").context("write stdout newline")?;
    Ok(())
}
