//! Progress-callback trait for per-page recognition events.
//!
//! Inject an [`Arc<dyn RecognitionProgress>`] via
//! [`crate::config::RecognitionConfigBuilder::progress_callback`] to receive
//! events as the Recognition Adapter works through a document. The CLI uses it
//! to drive a progress bar; the HTTP service leaves it unset.
//!
//! # Example
//!
//! ```rust
//! use ocr_convert::{RecognitionProgress, RecognitionConfig};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     completed: AtomicUsize,
//! }
//!
//! impl RecognitionProgress for CountingCallback {
//!     fn on_page_complete(&self, page: usize, total_pages: usize, chars: usize) {
//!         self.completed.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("page {page}/{total_pages}: {chars} chars");
//!     }
//! }
//!
//! let config = RecognitionConfig::builder()
//!     .progress_callback(Arc::new(CountingCallback { completed: AtomicUsize::new(0) }))
//!     .build()
//!     .unwrap();
//! ```

use std::sync::Arc;

/// Called by the Recognition Adapter as it processes each page.
///
/// Pages may be recognised concurrently (see
/// [`crate::config::RecognitionConfig::concurrency`]), so `on_page_*` can be
/// called from several tasks at once. All methods default to no-ops.
pub trait RecognitionProgress: Send + Sync {
    /// Called once the page count is known, before any page is recognised.
    fn on_document_start(&self, total_pages: usize) {
        let _ = total_pages;
    }

    /// Called just before the engine is invoked for a page (1-indexed).
    fn on_page_start(&self, page: usize, total_pages: usize) {
        let _ = (page, total_pages);
    }

    /// Called when the engine returned for a page. `chars` may be 0.
    fn on_page_complete(&self, page: usize, total_pages: usize, chars: usize) {
        let _ = (page, total_pages, chars);
    }

    /// Called when the engine failed on a page; the page is recorded as empty.
    fn on_page_error(&self, page: usize, total_pages: usize, error: &str) {
        let _ = (page, total_pages, error);
    }

    /// Called once after every page has been attempted.
    fn on_document_complete(&self, total_pages: usize, pages_with_text: usize) {
        let _ = (total_pages, pages_with_text);
    }
}

/// A no-op implementation.
pub struct NoopProgress;

impl RecognitionProgress for NoopProgress {}

/// Convenience alias matching the type stored in [`crate::config::RecognitionConfig`].
pub type ProgressCallback = Arc<dyn RecognitionProgress>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct Tracking {
        starts: AtomicUsize,
        completes: AtomicUsize,
        errors: AtomicUsize,
        with_text: AtomicUsize,
    }

    impl RecognitionProgress for Tracking {
        fn on_page_start(&self, _page: usize, _total: usize) {
            self.starts.fetch_add(1, Ordering::SeqCst);
        }

        fn on_page_complete(&self, _page: usize, _total: usize, _chars: usize) {
            self.completes.fetch_add(1, Ordering::SeqCst);
        }

        fn on_page_error(&self, _page: usize, _total: usize, _error: &str) {
            self.errors.fetch_add(1, Ordering::SeqCst);
        }

        fn on_document_complete(&self, _total: usize, pages_with_text: usize) {
            self.with_text.store(pages_with_text, Ordering::SeqCst);
        }
    }

    #[test]
    fn noop_does_not_panic() {
        let cb: ProgressCallback = Arc::new(NoopProgress);
        cb.on_document_start(2);
        cb.on_page_start(1, 2);
        cb.on_page_complete(1, 2, 10);
        cb.on_page_error(2, 2, "boom");
        cb.on_document_complete(2, 1);
    }

    #[test]
    fn tracking_receives_events() {
        let t = Tracking::default();
        t.on_page_start(1, 2);
        t.on_page_complete(1, 2, 12);
        t.on_page_start(2, 2);
        t.on_page_error(2, 2, "exit status 1");
        t.on_document_complete(2, 1);

        assert_eq!(t.starts.load(Ordering::SeqCst), 2);
        assert_eq!(t.completes.load(Ordering::SeqCst), 1);
        assert_eq!(t.errors.load(Ordering::SeqCst), 1);
        assert_eq!(t.with_text.load(Ordering::SeqCst), 1);
    }
}
