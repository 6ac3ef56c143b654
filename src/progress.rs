//! Shared progress tracking for parallel file processing
//!
//! Workers converge on one [`ProgressReporter`]: whichever worker finishes a
//! file calls [`ProgressReporter::file_done`] exactly once for it. The
//! completion counter is atomic and exact; the rendered bar (percentage,
//! filled width, last-completed label truncated to 30 characters) may
//! interleave between workers, which is acceptable as long as the displayed
//! position never regresses and reaches the total exactly once.

use indicatif::{ProgressBar, ProgressStyle};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Maximum number of label characters shown next to the bar
const LABEL_WIDTH: usize = 30;

/// Monotonic completion indicator shared across workers
#[derive(Debug)]
pub struct ProgressReporter {
    counter: AtomicUsize,
    total: usize,
    bar: ProgressBar,
}

impl ProgressReporter {
    /// Create a reporter rendering to stderr
    pub fn new(total: usize) -> Self {
        Self::with_bar(total, ProgressBar::new(total as u64))
    }

    /// Create a reporter with no visible output (used by tests and non-TTY runs)
    pub fn hidden(total: usize) -> Self {
        Self::with_bar(total, ProgressBar::hidden())
    }

    fn with_bar(total: usize, bar: ProgressBar) -> Self {
        bar.set_style(
            ProgressStyle::default_bar()
                .template("[{bar:50}] {percent:>3}% ({pos}/{len}) {msg}")
                .expect("static progress template")
                .progress_chars("=> "),
        );
        Self {
            counter: AtomicUsize::new(0),
            total,
            bar,
        }
    }

    /// Record one completed file and refresh the indicator
    ///
    /// Safe to call concurrently; each call increments the shared counter by
    /// exactly one. Returns the counter value after the increment.
    pub fn file_done(&self, label: &str) -> usize {
        let current = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        debug_assert!(current <= self.total);
        // inc() keeps the rendered position monotonic even when two workers
        // race between counting and drawing.
        self.bar.inc(1);
        self.bar.set_message(truncate_label(label));
        current
    }

    /// Completed count so far
    pub fn current(&self) -> usize {
        self.counter.load(Ordering::SeqCst)
    }

    /// Total file count this run converges to
    pub fn total(&self) -> usize {
        self.total
    }

    /// Finish rendering and return the final counter value
    pub fn finish(&self) -> usize {
        self.bar.finish_and_clear();
        self.counter.load(Ordering::SeqCst)
    }
}

fn truncate_label(label: &str) -> String {
    label.chars().take(LABEL_WIDTH).collect()
}
