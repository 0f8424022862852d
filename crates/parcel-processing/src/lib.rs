//! Parcel Processing Library
//!
//! The first two stages of a property import: fetching the raw document bytes from the
//! location a client submitted, and turning those bytes into page-ordered text.

pub mod document;
pub mod fetch;

pub use document::{ParseError, PdfTextExtractor, TextExtractor};
pub use fetch::{DocumentFetcher, FetchError, HttpDocumentFetcher};
