//! Spinner for long-running stages.

use std::io::IsTerminal;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

/// Spinner drawn on stderr, or nothing when output is not interactive.
pub(crate) struct Progress {
    bar: Option<ProgressBar>,
}

impl Progress {
    /// The spinner is only shown when `enabled`, stderr is a TTY and neither
    /// `NO_COLOR` nor `PTREVAL_NO_PROGRESS` is set.
    pub(crate) fn new(enabled: bool) -> Self {
        let bar = (enabled && is_interactive()).then(|| {
            let pb = ProgressBar::new_spinner();
            if let Ok(style) = ProgressStyle::with_template("{spinner:.cyan} {msg} [{elapsed}]") {
                pb.set_style(
                    style.tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", " "]),
                );
            }
            pb.enable_steady_tick(Duration::from_millis(80));
            pb
        });
        Self { bar }
    }

    pub(crate) fn set_message(&self, msg: impl Into<String>) {
        if let Some(bar) = &self.bar {
            bar.set_message(msg.into());
        }
    }

    pub(crate) fn finish_and_clear(&self) {
        if let Some(bar) = &self.bar {
            bar.finish_and_clear();
        }
    }
}

impl Drop for Progress {
    fn drop(&mut self) {
        self.finish_and_clear();
    }
}

fn is_interactive() -> bool {
    std::io::stderr().is_terminal()
        && std::env::var_os("NO_COLOR").is_none()
        && std::env::var_os("PTREVAL_NO_PROGRESS").is_none()
}
