//! Progress bar for focus group dispatches using indicatif.
//!
//! One bar is drawn per dispatch. Notifications may arrive out of order, so
//! the sink counts them instead of trusting the `completed` value ordering.

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::sync::Mutex;
use std::time::Duration;

use crate::domain::ports::ProgressSink;

const PROGRESS_TEMPLATE: &str =
    "[{elapsed_precise}] {prefix:.bold} {bar:40.cyan/blue} {pos}/{len} {msg} (ETA: {eta})";
const PROGRESS_CHARS: &str = "█▓▒░ ";

#[derive(Default)]
struct BarState {
    bar: Option<ProgressBar>,
    seen: usize,
    total: usize,
    dispatches: usize,
}

/// [`ProgressSink`] drawing an indicatif bar on stderr.
pub struct ProgressBarSink {
    state: Mutex<BarState>,
    hidden: bool,
}

impl ProgressBarSink {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(BarState::default()),
            hidden: false,
        }
    }

    /// A sink that tracks progress without drawing, for JSON output.
    pub fn hidden() -> Self {
        Self {
            state: Mutex::new(BarState::default()),
            hidden: true,
        }
    }

    /// Number of dispatches a bar was started for.
    pub fn dispatches(&self) -> usize {
        self.state.lock().map(|s| s.dispatches).unwrap_or_default()
    }

    /// Clear any bar still on screen.
    pub fn finish(&self) {
        if let Ok(mut state) = self.state.lock() {
            if let Some(bar) = state.bar.take() {
                bar.finish_and_clear();
            }
        }
    }

    fn start_bar(&self, label: &str, total: usize, dispatch: usize) -> ProgressBar {
        let bar = ProgressBar::new(total as u64);
        if self.hidden {
            bar.set_draw_target(ProgressDrawTarget::hidden());
        }
        // Keep the default style if the template is rejected.
        if let Ok(style) = ProgressStyle::default_bar().template(PROGRESS_TEMPLATE) {
            bar.set_style(style.progress_chars(PROGRESS_CHARS));
        }
        bar.set_prefix(format!("{label} #{dispatch}"));
        bar.set_message("reactions");
        bar.enable_steady_tick(Duration::from_millis(100));
        bar
    }
}

impl Default for ProgressBarSink {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressSink for ProgressBarSink {
    fn on_progress(&self, label: &str, completed: usize, total: usize) {
        let Ok(mut state) = self.state.lock() else {
            return;
        };

        if state.bar.is_none() || state.seen >= state.total {
            if let Some(previous) = state.bar.take() {
                previous.finish_and_clear();
            }
            state.dispatches += 1;
            state.seen = 0;
            state.total = total;
            let dispatch = state.dispatches;
            state.bar = Some(self.start_bar(label, total, dispatch));
        }

        state.seen += 1;
        if let Some(bar) = &state.bar {
            let position = completed.max(state.seen) as u64;
            if position > bar.position() {
                bar.set_position(position);
            }
            if state.seen >= state.total {
                bar.finish_with_message("done");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_out_of_order_notifications_stay_in_one_bar() {
        let sink = ProgressBarSink::hidden();
        sink.on_progress("focus", 2, 3);
        sink.on_progress("focus", 1, 3);
        sink.on_progress("focus", 3, 3);
        assert_eq!(sink.dispatches(), 1);
    }

    #[test]
    fn test_new_bar_per_dispatch() {
        let sink = ProgressBarSink::hidden();
        for completed in 1..=2 {
            sink.on_progress("focus", completed, 2);
        }
        for completed in 1..=2 {
            sink.on_progress("focus", completed, 2);
        }
        assert_eq!(sink.dispatches(), 2);
        sink.finish();
    }
}
