//! Juicy Collector Library
//!
//! Build-time content collection for the Juicy blog.
//!
//! # Modules
//!
//! - [`collector`] - Walks collection directories and validates every document

pub mod collector;

pub use collector::{
    CollectorError, ContentCollector, DocumentFailure, FailureKind, Result, SiteContent,
};
