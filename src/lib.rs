//! # gut-diary
//!
//! REST backend for a personal meal and gastrointestinal symptom diary.
//!
//! Users log meals (with the foods eaten and their nutrition snapshots)
//! and symptoms (kind, intensity, time) into a per-day diary. The service
//! validates every request field by field, stores entries through a
//! [`persistence::DiaryStore`], and answers day, month, date-range and
//! symptom-overview queries.
//!
//! ## Architecture
//!
//! ```text
//! Clients (HTTP)
//!     │
//!     ├── REST Handlers + request parsers (api/)
//!     │
//!     ├── DiaryService (service/)
//!     │
//!     ├── DiaryEntry / EntryDocument (domain/)
//!     │
//!     └── DiaryStore (persistence/)
//!             ├── MemoryStore
//!             └── PostgresStore
//! ```
//!
//! Date, text and cookie helpers live in [`util`].

pub mod api;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod error;
pub mod persistence;
pub mod service;
pub mod util;
pub mod validation;

pub use app_state::AppState;
pub use config::DiaryConfig;
pub use domain::{DiaryEntry, EntryDocument, EntryKind, EntryPayload};
pub use error::DiaryError;
pub use persistence::{DiaryStore, MemoryStore, PostgresStore};
pub use service::DiaryService;
