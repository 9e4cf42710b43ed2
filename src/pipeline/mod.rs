//! Pipeline stages for document-to-text recognition.
//!
//! Each submodule implements exactly one transformation step, so each is
//! testable on its own and the external collaborators (pdfium, tesseract) sit
//! behind traits that tests can replace.
//!
//! ## Data Flow
//!
//! ```text
//! render / decode ──▶ engine ──▶ clean ──▶ segment
//!  (pdfium / image)  (tesseract) (whitespace) (paragraphs, sentences)
//! ```
//!
//! 1. [`render`]: rasterise every PDF page; runs in `spawn_blocking` because
//!    pdfium is not async-safe
//! 2. [`decode`]: decode uploaded images to RGB; PNG-encode pages for the engine
//! 3. [`engine`]: run the OCR engine on one page; the only stage that spawns
//!    a process
//! 4. [`clean`]: deterministic whitespace normalisation per page
//! 5. [`segment`]: paragraph and sentence splitting, used by the serializer

pub mod clean;
pub mod decode;
pub mod engine;
pub mod render;
pub mod segment;
