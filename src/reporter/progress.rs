//! Progress bar for terminal output during scanning.
//!
//! Uses Braille pattern characters for a modern, high-density display.

use crate::scanner::{ProgressEvent, ProgressSink};
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::OnceLock;

/// Minimum number of files to display progress bar
const MIN_FILES_FOR_PROGRESS: usize = 10;

/// Progress bar driven by scan progress events.
///
/// The file count is only known once the walk has finished, so the bar is
/// created on the first event.
pub struct ScanProgress {
    is_tty: bool,
    is_ci: bool,
    bar: OnceLock<Option<ProgressBar>>,
}

impl ScanProgress {
    /// Progress bar is only shown if:
    /// - Total files >= 10
    /// - Running in TTY (interactive terminal)
    /// - Not in CI mode
    pub fn new(is_tty: bool, is_ci: bool) -> Self {
        Self {
            is_tty,
            is_ci,
            bar: OnceLock::new(),
        }
    }

    fn bar_for(&self, total_files: usize) -> Option<&ProgressBar> {
        self.bar
            .get_or_init(|| {
                should_show_progress(total_files, self.is_tty, self.is_ci)
                    .then(|| create_progress_bar(total_files))
            })
            .as_ref()
    }
}

impl ProgressSink for ScanProgress {
    fn on_progress(&self, event: ProgressEvent) {
        if let Some(bar) = self.bar_for(event.files_total) {
            bar.set_position(event.files_examined as u64);
            bar.set_message(format!("{} groups", event.documents_found));
        }
    }

    fn on_finish(&self) {
        if let Some(Some(bar)) = self.bar.get() {
            bar.finish_and_clear();
        }
    }
}

/// Check if progress bar should be displayed.
fn should_show_progress(total_files: usize, is_tty: bool, is_ci: bool) -> bool {
    total_files >= MIN_FILES_FOR_PROGRESS && is_tty && !is_ci
}

/// Create a progress bar with Braille pattern style.
fn create_progress_bar(total: usize) -> ProgressBar {
    let style = ProgressStyle::with_template(
        "Scanning {bar:40} {pos:>4}/{len:4} files ({percent:>3}%) {msg} [{elapsed_precise} < {eta_precise}]",
    )
    .map(|style| style.progress_chars("⣿⣀ ")) // Braille pattern: filled, current, empty
    .unwrap_or_else(|_| ProgressStyle::default_bar());
    let pb = ProgressBar::new(total as u64);
    pb.set_style(style);
    pb
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(examined: usize, total: usize) -> ProgressEvent {
        ProgressEvent {
            files_examined: examined,
            files_total: total,
            documents_found: 0,
        }
    }

    #[test]
    fn test_should_show_progress_below_threshold() {
        // 9 files - below threshold
        assert!(!should_show_progress(9, true, false));
    }

    #[test]
    fn test_should_show_progress_at_threshold() {
        assert!(should_show_progress(10, true, false));
    }

    #[test]
    fn test_should_not_show_in_non_tty() {
        assert!(!should_show_progress(100, false, false));
    }

    #[test]
    fn test_should_not_show_in_ci() {
        assert!(!should_show_progress(100, true, true));
    }

    #[test]
    fn test_bar_created_on_first_event() {
        let progress = ScanProgress::new(true, false);
        assert!(progress.bar.get().is_none());
        progress.on_progress(event(1, 20));
        assert!(matches!(progress.bar.get(), Some(Some(_))));
        progress.on_progress(event(2, 20));
        progress.on_finish();
    }

    #[test]
    fn test_no_bar_when_below_threshold() {
        let progress = ScanProgress::new(true, false);
        progress.on_progress(event(1, 5));
        assert!(matches!(progress.bar.get(), Some(None)));
        // Should not panic even without bar
        progress.on_finish();
    }

    #[test]
    fn test_no_bar_in_ci() {
        let progress = ScanProgress::new(true, true);
        progress.on_progress(event(1, 100));
        assert!(matches!(progress.bar.get(), Some(None)));
    }

    #[test]
    fn test_finish_before_any_event() {
        let progress = ScanProgress::new(true, false);
        progress.on_finish();
    }

    #[test]
    fn test_create_progress_bar() {
        let pb = create_progress_bar(100);
        assert_eq!(pb.length(), Some(100));
    }
}
