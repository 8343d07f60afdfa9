//! Progress reporting for the background loader
//!
//! The loader thread bumps a shared counter while the render loop reads it
//! to draw the status line.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

#[derive(Clone, Debug)]
pub struct Progress {
    current: Arc<AtomicUsize>,
    total: Arc<AtomicUsize>,
    cancelled: Arc<AtomicBool>,
}

impl Progress {
    pub fn new(total: usize) -> Self {
        Self {
            current: Arc::new(AtomicUsize::new(0)),
            total: Arc::new(AtomicUsize::new(total)),
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    #[inline]
    pub fn inc_by(&self, n: usize) {
        self.current.fetch_add(n, Ordering::Relaxed);
    }

    /// The total is only known once the file has been parsed
    #[inline]
    pub fn set_total(&self, total: usize) {
        self.total.store(total, Ordering::Relaxed);
    }

    #[inline]
    pub fn current(&self) -> usize {
        self.current.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn total(&self) -> usize {
        self.total.load(Ordering::Relaxed)
    }

    /// Progress as a percentage (0-100)
    pub fn percent(&self) -> usize {
        let total = self.total();
        if total == 0 {
            return 0;
        }
        (self.current().min(total) * 100) / total
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }

    pub fn format(&self, operation: &str) -> String {
        let total = self.total();
        if total == 0 {
            format!("{}: reading...", operation)
        } else {
            format!("{}: {}/{} rows ({}%)", operation, self.current().min(total), total, self.percent())
        }
    }
}

impl Default for Progress {
    fn default() -> Self {
        Self::new(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shared_between_clones() {
        let progress = Progress::new(0);
        let worker = progress.clone();
        assert_eq!(progress.format("Loading"), "Loading: reading...");

        worker.set_total(2000);
        worker.inc_by(1000);
        assert_eq!(progress.percent(), 50);
        assert_eq!(progress.format("Loading"), "Loading: 1000/2000 rows (50%)");

        worker.inc_by(1000);
        assert_eq!(progress.percent(), 100);
    }

    #[test]
    fn test_cancel() {
        let progress = Progress::new(10);
        assert!(!progress.is_cancelled());
        progress.clone().cancel();
        assert!(progress.is_cancelled());
    }
}
