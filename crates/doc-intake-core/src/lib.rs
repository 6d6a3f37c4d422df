//! # Doc Intake Core
//!
//! Shared, runtime-free logic for Doc Intake: the document collection
//! store, filename-rule grouping, the stepwise classification sequencer,
//! browse helpers, and the filename-rule searches.
//!
//! This crate contains no tokio or filesystem I/O. Every operation is
//! synchronous and runs to completion; the application crate owns the
//! event loop, the artificial search delays, and file acquisition.

pub mod blob;
pub mod browse;
pub mod error;
pub mod grouping;
pub mod models;
pub mod sample;
pub mod search;
pub mod sequencer;
pub mod store;
