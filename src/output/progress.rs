//! Progress display while files are added.
//!
//! Draws on stderr and only when stderr is a terminal, so piping the page
//! list or JSON output stays clean.
//!
//! # Examples
//!
//! ```
//! use pdfbuilder::output::progress::{ProgressBar, ProgressStyle};
//!
//! let mut progress = ProgressBar::new(3, ProgressStyle::Bar);
//! progress.set_message("Adding files");
//! for done in 1..=3 {
//!     progress.update(done);
//! }
//! progress.finish();
//! ```

use std::io::{self, IsTerminal, Write};
use std::time::{Duration, Instant};

const BAR_WIDTH: usize = 30;

/// Style of progress indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressStyle {
    /// `[=====>    ] 3/10`
    Bar,
    /// `3/10`
    Counter,
}

/// Progress indicator for a known number of steps.
#[derive(Debug)]
pub struct ProgressBar {
    total: usize,
    current: usize,
    style: ProgressStyle,
    message: Option<String>,
    start_time: Instant,
    last_draw: Option<Instant>,
    min_interval: Duration,
    enabled: bool,
}

impl ProgressBar {
    /// Create a progress bar, enabled when stderr is a terminal.
    pub fn new(total: usize, style: ProgressStyle) -> Self {
        Self {
            total,
            current: 0,
            style,
            message: None,
            start_time: Instant::now(),
            last_draw: None,
            min_interval: Duration::from_millis(80),
            enabled: io::stderr().is_terminal(),
        }
    }

    /// Create a progress bar that never draws.
    pub fn disabled() -> Self {
        let mut bar = Self::new(0, ProgressStyle::Counter);
        bar.enabled = false;
        bar
    }

    /// Whether anything will be drawn.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Text shown before the bar.
    pub fn set_message(&mut self, message: impl Into<String>) {
        self.message = Some(message.into());
    }

    /// Change the number of steps.
    pub fn set_total(&mut self, total: usize) {
        self.total = total;
    }

    /// Steps completed so far.
    pub fn position(&self) -> usize {
        self.current
    }

    /// Set the number of completed steps and redraw if due.
    pub fn update(&mut self, current: usize) {
        self.current = current.min(self.total);

        let due = self
            .last_draw
            .is_none_or(|t| t.elapsed() >= self.min_interval);
        if due || self.current == self.total {
            self.draw();
        }
    }

    /// Advance by one step.
    pub fn increment(&mut self) {
        self.update(self.current + 1);
    }

    /// Draw the completed bar and end the line.
    pub fn finish(&mut self) {
        self.current = self.total;
        if self.enabled {
            self.draw();
            eprintln!();
        }
    }

    /// Erase the bar from the terminal.
    pub fn clear(&self) {
        if self.enabled {
            eprint!("\r\x1b[K");
            io::stderr().flush().ok();
        }
    }

    fn draw(&mut self) {
        self.last_draw = Some(Instant::now());
        if !self.enabled {
            return;
        }
        eprint!("\r\x1b[K{}", self.render());
        io::stderr().flush().ok();
    }

    /// Current line, without terminal control codes.
    pub fn render(&self) -> String {
        let counter = format!("{}/{}", self.current, self.total);
        let body = match self.style {
            ProgressStyle::Counter => counter,
            ProgressStyle::Bar => {
                let filled = BAR_WIDTH * self.current / self.total.max(1);
                let head = if filled > 0 && filled < BAR_WIDTH { ">" } else { "" };
                let body = "=".repeat(filled - head.len());
                format!(
                    "[{body}{head}{}] {counter} {}",
                    " ".repeat(BAR_WIDTH - filled),
                    format_duration(self.start_time.elapsed())
                )
            }
        };

        match &self.message {
            Some(message) => format!("{message} {body}"),
            None => body,
        }
    }
}

/// Format a duration as `1.2s` or `2m05s`.
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    if secs < 60 {
        format!("{:.1}s", duration.as_secs_f64())
    } else {
        format!("{}m{:02}s", secs / 60, secs % 60)
    }
}
