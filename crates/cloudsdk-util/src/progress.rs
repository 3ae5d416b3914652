use std::io::Write;

use console::Style;
use indicatif::{ProgressBar, ProgressStyle};

/// Receives progress notifications from a long-running operation.
///
/// A listener sees one `start`, any number of `update`s and one `done`.
/// When `start` declared a known total, the `update` values add up to it.
pub trait ProgressListener: Send {
    /// Begin tracking work. `total_work` is `None` when the size is unknown.
    fn start(&mut self, message: &str, total_work: Option<u64>);

    /// Record `work_done` more units of completed work.
    fn update(&mut self, work_done: u64);

    /// Mark the tracked work as finished.
    fn done(&mut self);

    /// Create a listener for a sub-task that owns `allocation` units of this
    /// listener's total.
    fn new_child(&mut self, allocation: u64) -> Box<dyn ProgressListener>;
}

/// A listener that ignores every notification.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentProgress;

impl ProgressListener for SilentProgress {
    fn start(&mut self, _message: &str, _total_work: Option<u64>) {}

    fn update(&mut self, _work_done: u64) {}

    fn done(&mut self) {}

    fn new_child(&mut self, _allocation: u64) -> Box<dyn ProgressListener> {
        Box::new(SilentProgress)
    }
}

/// Renders progress to the terminal with an indicatif bar.
///
/// Starts as a determinate bar when the total is known and as a spinner
/// otherwise. Children advance the same bar, scaled to their allocation.
pub struct ProgressBarListener {
    bar: ProgressBar,
}

impl ProgressBarListener {
    pub fn new() -> Self {
        Self {
            bar: ProgressBar::new(0),
        }
    }

    /// Wrap an existing bar, e.g. a hidden one in tests or one owned by a
    /// `MultiProgress`.
    pub fn with_bar(bar: ProgressBar) -> Self {
        Self { bar }
    }

    pub fn bar(&self) -> &ProgressBar {
        &self.bar
    }
}

impl Default for ProgressBarListener {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressListener for ProgressBarListener {
    fn start(&mut self, message: &str, total_work: Option<u64>) {
        match total_work {
            Some(total) => {
                self.bar.set_length(total);
                self.bar.set_style(bar_style());
            }
            None => {
                self.bar.set_style(spinner_style());
                self.bar
                    .enable_steady_tick(std::time::Duration::from_millis(80));
            }
        }
        self.bar.set_position(0);
        self.bar.set_message(message.to_string());
    }

    fn update(&mut self, work_done: u64) {
        self.bar.inc(work_done);
    }

    fn done(&mut self) {
        self.bar.finish_and_clear();
    }

    fn new_child(&mut self, allocation: u64) -> Box<dyn ProgressListener> {
        Box::new(ScaledChildListener::new(self.bar.clone(), allocation))
    }
}

/// Maps a sub-task's own units onto a fixed slice of a parent bar.
struct ScaledChildListener {
    bar: ProgressBar,
    allocation: u64,
    total: Option<u64>,
    completed: u64,
    reported: u64,
}

impl ScaledChildListener {
    fn new(bar: ProgressBar, allocation: u64) -> Self {
        Self {
            bar,
            allocation,
            total: None,
            completed: 0,
            reported: 0,
        }
    }

    fn advance_to(&mut self, target: u64) {
        let target = target.min(self.allocation);
        if target > self.reported {
            self.bar.inc(target - self.reported);
            self.reported = target;
        }
    }
}

impl ProgressListener for ScaledChildListener {
    fn start(&mut self, message: &str, total_work: Option<u64>) {
        self.total = total_work;
        self.bar.set_message(message.to_string());
    }

    fn update(&mut self, work_done: u64) {
        self.completed = self.completed.saturating_add(work_done);
        if let Some(total) = self.total.filter(|t| *t > 0) {
            let scaled =
                (u128::from(self.completed) * u128::from(self.allocation) / u128::from(total)) as u64;
            self.advance_to(scaled);
        }
    }

    fn done(&mut self) {
        self.advance_to(self.allocation);
    }

    fn new_child(&mut self, allocation: u64) -> Box<dyn ProgressListener> {
        let allocation = allocation.min(self.allocation.saturating_sub(self.reported));
        self.reported += allocation;
        Box::new(ScaledChildListener::new(self.bar.clone(), allocation))
    }
}

fn bar_style() -> ProgressStyle {
    ProgressStyle::default_bar()
        .template("{msg} [{bar:40.cyan/blue}] {percent}% ({eta})")
        .expect("valid template")
        .progress_chars("=> ")
}

fn spinner_style() -> ProgressStyle {
    ProgressStyle::default_spinner()
        .template("{spinner:.green} {msg}")
        .expect("valid template")
}

/// Print a Cargo-style status line: `  Installing Cloud SDK LATEST`
///
/// The `label` is right-padded to 12 characters and printed in bold green,
/// followed by the `message` in the default terminal colour.
pub fn status(label: &str, message: &str) {
    let green_bold = Style::new().green().bold();
    let _ = writeln!(
        std::io::stderr(),
        "{:>12} {message}",
        green_bold.apply_to(label),
    );
}

/// Like [`status`] but uses bold cyan for informational (non-action) messages.
pub fn status_info(label: &str, message: &str) {
    let cyan_bold = Style::new().cyan().bold();
    let _ = writeln!(
        std::io::stderr(),
        "{:>12} {message}",
        cyan_bold.apply_to(label),
    );
}

/// Print a warning-style status line (bold yellow label).
pub fn status_warn(label: &str, message: &str) {
    let yellow_bold = Style::new().yellow().bold();
    let _ = writeln!(
        std::io::stderr(),
        "{:>12} {message}",
        yellow_bold.apply_to(label),
    );
}
