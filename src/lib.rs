//! # Doc Intake
//!
//! A local document intake and labeling tool.
//!
//! Doc Intake uploads image files into an in-memory collection, walks the
//! user through labeling them in filename-defined groups, and lets them
//! browse, filter, search, and export the labeled collection. Nothing is
//! persisted: every run starts with an empty collection.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐   ┌───────────────────────────────┐   ┌──────────┐
//! │  Acquire    │──▶│         IntakeSession          │──▶│  Export  │
//! │ files/dirs  │   │ Store ─ Sequencer ─ Browse     │   │ manifest │
//! └─────────────┘   │        Search (delayed)        │   └──────────┘
//!                   └───────────────┬───────────────┘
//!                                   ▼
//!                             ┌──────────┐
//!                             │   CLI    │
//!                             │ (intake) │
//!                             └──────────┘
//! ```
//!
//! The store, grouping, sequencer, browse, and search rules live in the
//! runtime-free `doc-intake-core` crate.
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`acquire`] | File acquisition from paths |
//! | [`session`] | Application state and mode lifecycle |
//! | [`search`] | Delayed search by image and by prompt |
//! | [`export`] | Document export with manifest |
//! | [`logging`] | Tracing subscriber setup |

pub mod acquire;
pub mod config;
pub mod export;
pub mod logging;
pub mod search;
pub mod session;
