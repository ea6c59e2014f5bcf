//! Status reporting
//!
//! Every stage reports through the [`Ui`] trait:
//! - [`ConsoleUi`] prints plain status lines to stdout (the default)
//! - [`UiApp`] is a ratatui dashboard with status, per-table and activity panels
//! - [`SilentUi`] discards everything, for tests

mod components;

use anyhow::Result;
use crossterm::event::{self, Event as CrosstermEvent};
use crossterm::terminal::{self, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::ExecutableCommand;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::Terminal;
use std::io::{self, Stdout};
use std::time::Duration;

use crate::schema::ALL_REGIONS;
use crate::writer::StepOutcome;
use components::{LogPanel, StatusPanel, StepsPanel};

/// Pipeline phases shown in the status panel
#[derive(Debug, Clone, PartialEq)]
pub enum Phase {
    Fetching,
    Decoding,
    LoadingMaster,
    DerivingRegions,
    Complete,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Phase::Fetching => write!(f, "Fetching dataset"),
            Phase::Decoding => write!(f, "Decoding records"),
            Phase::LoadingMaster => write!(f, "Loading master table"),
            Phase::DerivingRegions => write!(f, "Deriving region tables"),
            Phase::Complete => write!(f, "Complete"),
        }
    }
}

/// Progress information for the current operation
#[derive(Debug, Clone, Default)]
pub struct Progress {
    pub current: u64,
    pub total: u64,
    pub label: String,
}

impl Progress {
    pub fn new(current: u64, total: u64, label: impl Into<String>) -> Self {
        Self {
            current,
            total,
            label: label.into(),
        }
    }

    pub fn ratio(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.current as f64 / self.total as f64
        }
    }
}

/// Trait for UI implementations - allows console, TUI and silent/test modes
pub trait Ui {
    fn set_phase(&mut self, phase: Phase);
    fn set_info(&mut self, info: impl Into<String>);
    fn set_progress(&mut self, current: u64, total: u64, label: impl Into<String>);
    fn clear_progress(&mut self);
    fn log(&mut self, message: impl Into<String>);

    /// A table finished refreshing, successfully or not
    fn step_finished(&mut self, outcome: &StepOutcome) {
        self.log(outcome.to_string());
    }
}

/// Plain line-oriented output on stdout
#[derive(Default)]
pub struct ConsoleUi;

impl ConsoleUi {
    pub fn new() -> Self {
        Self
    }

    fn phase_line(phase: &Phase) -> String {
        format!("\n{}...", phase)
    }

    fn log_line(message: &str) -> String {
        format!("  {}", message)
    }
}

impl Ui for ConsoleUi {
    fn set_phase(&mut self, phase: Phase) {
        println!("{}", Self::phase_line(&phase));
    }

    fn set_info(&mut self, info: impl Into<String>) {
        println!("{}", info.into());
    }

    // Per-row progress would flood a terminal; the TUI shows it instead
    fn set_progress(&mut self, _current: u64, _total: u64, _label: impl Into<String>) {}

    fn clear_progress(&mut self) {}

    fn log(&mut self, message: impl Into<String>) {
        println!("{}", Self::log_line(&message.into()));
    }
}

/// Terminal dashboard
pub struct UiApp {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    status: StatusPanel,
    steps: StepsPanel,
    log: LogPanel,
}

impl UiApp {
    /// Create a new UI application and enter the alternate screen
    pub fn new() -> Result<Self> {
        terminal::enable_raw_mode()?;
        let mut stdout = io::stdout();
        stdout.execute(EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;

        Ok(Self {
            terminal,
            status: StatusPanel::new(),
            steps: StepsPanel::new(),
            log: LogPanel::new(),
        })
    }

    fn draw(&mut self) -> Result<()> {
        let status = &self.status;
        let steps = &self.steps;
        let log = &self.log;
        // master + every region, header and borders
        let steps_height = (ALL_REGIONS.len() + 4) as u16;

        self.terminal.draw(|frame| {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([
                    Constraint::Length(5),
                    Constraint::Length(steps_height),
                    Constraint::Min(5),
                ])
                .split(frame.area());

            status.render(frame, chunks[0]);
            steps.render(frame, chunks[1]);
            log.render(frame, chunks[2]);
        })?;

        Ok(())
    }

    /// Show the summary, wait for a keypress, then restore the terminal
    pub fn finish(mut self, summary: &str) -> Result<()> {
        self.set_phase(Phase::Complete);
        self.clear_progress();
        self.log(summary);
        self.log("Press any key to exit...");
        self.draw()?;

        loop {
            if event::poll(Duration::from_millis(100))? {
                if let CrosstermEvent::Key(_) = event::read()? {
                    break;
                }
            }
        }

        self.restore()
    }

    /// Restore terminal without waiting
    pub fn restore(mut self) -> Result<()> {
        terminal::disable_raw_mode()?;
        self.terminal.backend_mut().execute(LeaveAlternateScreen)?;
        self.terminal.show_cursor()?;
        Ok(())
    }
}

impl Ui for UiApp {
    fn set_phase(&mut self, phase: Phase) {
        self.status.set_phase(phase);
        self.draw().ok();
    }

    fn set_info(&mut self, info: impl Into<String>) {
        self.status.set_info(info);
        self.draw().ok();
    }

    fn set_progress(&mut self, current: u64, total: u64, label: impl Into<String>) {
        self.status
            .set_progress(Some(Progress::new(current, total, label)));
        self.draw().ok();
    }

    fn clear_progress(&mut self) {
        self.status.set_progress(None);
        self.draw().ok();
    }

    fn log(&mut self, message: impl Into<String>) {
        self.log.add(message);
        self.draw().ok();
    }

    fn step_finished(&mut self, outcome: &StepOutcome) {
        self.steps.push(outcome.clone());
        self.draw().ok();
    }
}

impl Drop for UiApp {
    fn drop(&mut self) {
        terminal::disable_raw_mode().ok();
        self.terminal
            .backend_mut()
            .execute(LeaveAlternateScreen)
            .ok();
        self.terminal.show_cursor().ok();
    }
}

/// Silent UI implementation for testing and non-interactive use
#[derive(Default)]
pub struct SilentUi;

impl SilentUi {
    pub fn new() -> Self {
        Self
    }
}

impl Ui for SilentUi {
    fn set_phase(&mut self, _phase: Phase) {}
    fn set_info(&mut self, _info: impl Into<String>) {}
    fn set_progress(&mut self, _current: u64, _total: u64, _label: impl Into<String>) {}
    fn clear_progress(&mut self) {}
    fn log(&mut self, _message: impl Into<String>) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_ratio() {
        assert_eq!(Progress::new(3, 0, "x").ratio(), 0.0);
        assert_eq!(Progress::new(1, 4, "x").ratio(), 0.25);
    }

    #[test]
    fn test_console_lines() {
        assert_eq!(ConsoleUi::phase_line(&Phase::Fetching), "\nFetching dataset...");
        assert_eq!(
            ConsoleUi::log_line("The GET request was successful: 200 OK"),
            "  The GET request was successful: 200 OK"
        );

        let failed = StepOutcome::failed(
            "Europe_Meteorites",
            &crate::error::LoadError::storage("Europe_Meteorites")(rusqlite::Error::InvalidQuery),
        );
        let line = ConsoleUi::log_line(&failed.to_string());
        assert!(line.starts_with("  Europe_Meteorites: FAILED ("));
        assert!(line.contains("Europe_Meteorites database error"));

        let loaded = ConsoleUi::log_line(&StepOutcome::loaded("Meteorite_Data", 3).to_string());
        assert_eq!(loaded, "  Meteorite_Data: 3 rows");
    }

    #[test]
    fn test_phase_display() {
        assert_eq!(Phase::DerivingRegions.to_string(), "Deriving region tables");
    }
}
