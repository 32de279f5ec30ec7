//! Terminal presentation collaborator.
//!
//! The workflows talk to the user only through [`ConsoleUi`]; everything
//! terminal-specific (styling, raw-mode keypresses, the spinner) lives in
//! [`TerminalUi`]. Prompts and notices go to stderr so stdout stays clean
//! for machine-readable output.

use console::{style, Term};
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, Select};
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::time::Duration;

const TICK_DURATION_MS: u64 = 60;
const TICKS: &[&str; 10] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Visual category for a notice line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    /// Neutral information.
    Info,
    /// Something was skipped or discarded but the operation continues.
    Warning,
    /// An operation completed.
    Success,
    /// An operation failed.
    Error,
}

/// Minimal presentation surface consumed by the workflows.
///
/// Implementations present text and collect a single yes/no decision; they
/// never mutate anything beyond the terminal.
pub trait ConsoleUi {
    /// Display a one-line notice.
    ///
    /// # Errors
    /// Returns the underlying terminal I/O error.
    fn notice(&mut self, kind: Notice, text: &str) -> io::Result<()>;

    /// Ask a yes/no question. `Ok(None)` means the user cancelled.
    ///
    /// # Errors
    /// Returns the underlying terminal I/O error.
    fn confirm(&mut self, prompt: &str) -> io::Result<Option<bool>>;

    /// Display a titled key/value panel.
    ///
    /// # Errors
    /// Returns the underlying terminal I/O error.
    fn panel(&mut self, title: &str, rows: &[(String, String)]) -> io::Result<()>;

    /// Narrate a workflow step. Cosmetic only; implementations may animate
    /// while the workflow keeps executing sequentially on this thread.
    ///
    /// # Errors
    /// Returns the underlying terminal I/O error.
    fn step(&mut self, text: &str) -> io::Result<()>;
}

/// Interactive implementation backed by dialoguer/console/indicatif.
pub struct TerminalUi {
    term: Term,
    theme: ColorfulTheme,
    spinner: Option<ProgressBar>,
}

impl TerminalUi {
    /// Construct the collaborator once per process; pass it down from there.
    #[must_use]
    pub fn new() -> Self {
        Self {
            term: Term::stderr(),
            theme: ColorfulTheme::default(),
            spinner: None,
        }
    }

    /// Set the terminal title and clear the screen (interactive mode).
    ///
    /// # Errors
    /// Returns the underlying terminal I/O error.
    pub fn prepare_screen(&self, title: &str) -> io::Result<()> {
        self.term.set_title(title);
        self.term.clear_screen()
    }

    /// Display the application header.
    ///
    /// # Errors
    /// Returns the underlying terminal I/O error.
    pub fn header(&mut self, title: &str, text: &str) -> io::Result<()> {
        self.clear_spinner();
        self.term.write_line("")?;
        self.term
            .write_line(&style(title).cyan().bold().to_string())?;
        self.term.write_line(text)?;
        self.term.write_line("")
    }

    /// Present a list of choices; `Ok(None)` means the user cancelled.
    ///
    /// # Errors
    /// Returns the underlying terminal I/O error.
    pub fn select(&mut self, prompt: &str, items: &[&str]) -> io::Result<Option<usize>> {
        self.clear_spinner();
        match Select::with_theme(&self.theme)
            .with_prompt(prompt)
            .items(items)
            .default(0)
            .interact_opt()
        {
            Ok(choice) => Ok(choice),
            Err(err) => interact_error(err),
        }
    }

    /// Stop any running spinner, leaving the terminal on a fresh line.
    pub fn finish(&mut self) {
        self.clear_spinner();
    }

    fn clear_spinner(&mut self) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_and_clear();
        }
    }

    fn write_line(&self, line: &str) -> io::Result<()> {
        if let Some(spinner) = &self.spinner {
            spinner.suspend(|| self.term.write_line(line))
        } else {
            self.term.write_line(line)
        }
    }
}

impl Default for TerminalUi {
    fn default() -> Self {
        Self::new()
    }
}

impl ConsoleUi for TerminalUi {
    fn notice(&mut self, kind: Notice, text: &str) -> io::Result<()> {
        let prefix = match kind {
            Notice::Info => style("[i]").cyan().bold(),
            Notice::Warning => style("[!]").yellow().bold(),
            Notice::Success => style("[+]").green().bold(),
            Notice::Error => style("[x]").red().bold(),
        };
        self.write_line(&format!("{prefix} {text}"))
    }

    fn confirm(&mut self, prompt: &str) -> io::Result<Option<bool>> {
        self.clear_spinner();
        match Confirm::with_theme(&self.theme)
            .with_prompt(prompt)
            .interact_opt()
        {
            Ok(answer) => Ok(answer),
            Err(err) => interact_error(err),
        }
    }

    fn panel(&mut self, title: &str, rows: &[(String, String)]) -> io::Result<()> {
        self.clear_spinner();
        self.term.write_line("")?;
        self.term
            .write_line(&style(title).cyan().bold().to_string())?;
        for (key, value) in rows {
            self.term.write_line(&format!(
                "  {} {}",
                style(format!("{key}:")).cyan(),
                value
            ))?;
        }
        self.term.write_line("")
    }

    fn step(&mut self, text: &str) -> io::Result<()> {
        if let Some(spinner) = &self.spinner {
            spinner.set_message(text.to_string());
            return Ok(());
        }
        let spinner_style = ProgressStyle::default_spinner()
            .tick_strings(TICKS)
            .template("{spinner:.green} {msg}")
            .map_err(io::Error::other)?;
        let spinner = ProgressBar::new_spinner()
            .with_style(spinner_style)
            .with_message(text.to_string());
        spinner.enable_steady_tick(Duration::from_millis(TICK_DURATION_MS));
        self.spinner = Some(spinner);
        Ok(())
    }
}

impl Drop for TerminalUi {
    fn drop(&mut self) {
        // Leave the cursor on a clean line even on an early exit.
        self.clear_spinner();
    }
}

/// Map a dialoguer interrupt (Ctrl+C) to a cancelled prompt, the way the
/// workflows expect it; everything else stays an error.
fn interact_error<T>(err: dialoguer::Error) -> io::Result<Option<T>> {
    match err {
        dialoguer::Error::IO(err) if err.kind() == io::ErrorKind::Interrupted => Ok(None),
        dialoguer::Error::IO(err) => Err(err),
    }
}
