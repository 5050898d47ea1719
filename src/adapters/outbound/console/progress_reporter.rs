use crate::ports::outbound::ProgressReporter;
use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use std::cell::RefCell;
use std::time::Duration;

const BAR_TEMPLATE: &str = "   {spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} - {msg}";
const SPINNER_TEMPLATE: &str = "   {spinner:.green} {msg} ({elapsed})";

/// StderrProgressReporter adapter for reporting progress to stderr
///
/// This adapter implements the ProgressReporter port, writing status lines
/// to stderr so they never mix with command output on stdout. Uses indicatif
/// for progress bars and the scan wait spinner; indicatif hides them when
/// stderr is not a terminal.
pub struct StderrProgressReporter {
    progress_bar: RefCell<Option<ProgressBar>>,
    color: bool,
}

impl StderrProgressReporter {
    pub fn new() -> Self {
        Self::with_color(true)
    }

    /// # Arguments
    /// * `color` - Colorize status symbols; false for `--no-color`
    pub fn with_color(color: bool) -> Self {
        Self {
            progress_bar: RefCell::new(None),
            color,
        }
    }

    fn bar_for(&self, total: usize) -> ProgressBar {
        let mut slot = self.progress_bar.borrow_mut();
        if let Some(pb) = slot.as_ref() {
            return pb.clone();
        }

        let pb = if total == 0 {
            let pb = ProgressBar::new_spinner();
            pb.set_style(
                ProgressStyle::with_template(SPINNER_TEMPLATE)
                    .unwrap_or_else(|_| ProgressStyle::default_spinner()),
            );
            pb.enable_steady_tick(Duration::from_millis(120));
            pb
        } else {
            let pb = ProgressBar::new(total as u64);
            pb.set_style(
                ProgressStyle::with_template(BAR_TEMPLATE)
                    .unwrap_or_else(|_| ProgressStyle::default_bar())
                    .progress_chars("=>-"),
            );
            pb
        };
        *slot = Some(pb.clone());
        pb
    }

    fn clear_bar(&self) {
        if let Some(pb) = self.progress_bar.borrow_mut().take() {
            pb.finish_and_clear();
        }
    }

    /// Prints a line without tearing an active progress bar
    fn print_line(&self, line: String) {
        match self.progress_bar.borrow().as_ref() {
            Some(pb) => pb.suspend(|| eprintln!("{}", line)),
            None => eprintln!("{}", line),
        }
    }

    fn symbol(&self, symbol: &str, paint: fn(&str) -> String) -> String {
        if self.color {
            paint(symbol)
        } else {
            symbol.to_string()
        }
    }
}

impl Default for StderrProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressReporter for StderrProgressReporter {
    fn report(&self, message: &str) {
        self.print_line(message.to_string());
    }

    fn report_progress(&self, current: usize, total: usize, message: Option<&str>) {
        let pb = self.bar_for(total);
        if total > 0 {
            pb.set_length(total as u64);
            pb.set_position(current as u64);
        }
        if let Some(msg) = message {
            pb.set_message(msg.to_string());
        }
        if total > 0 && current >= total {
            self.clear_bar();
        }
    }

    fn report_warning(&self, message: &str) {
        let symbol = self.symbol("!", |s| s.yellow().bold().to_string());
        self.print_line(format!("{} {}", symbol, message));
    }

    fn report_error(&self, message: &str) {
        self.clear_bar();
        let symbol = self.symbol("✗", |s| s.red().bold().to_string());
        eprintln!("{} {}", symbol, message);
    }

    fn report_completion(&self, message: &str) {
        self.clear_bar();
        let symbol = self.symbol("✓", |s| s.green().bold().to_string());
        eprintln!("{} {}", symbol, message);
    }
}
