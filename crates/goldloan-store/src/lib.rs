//! # goldloan-store: Persistence and Form Session
//!
//! Connects the pure record in `goldloan-core` to storage and time.
//!
//! ## Modules
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        goldloan-store                                   │
//! │                                                                         │
//! │  storage   Storage port; MemoryStorage and FileStorage backends        │
//! │  slot      ApplicationSlot: the shared "ApplicationData" entry         │
//! │  settle    SettleTimer: debounce as a state machine                    │
//! │  session   FormSession: edits, saves, submission                       │
//! │  autosave  AutosaveDriver: tokio task owning a session                 │
//! │  config    AppConfig: TOML file + environment                          │
//! │  error     StoreError                                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//! ```rust
//! use goldloan_store::{ApplicationSlot, FormSession, FormSettings, MemoryStorage};
//! use goldloan_core::Edit;
//! use tokio::time::Instant;
//!
//! let slot = ApplicationSlot::new(MemoryStorage::new());
//! let mut session = FormSession::open(slot, &FormSettings::default());
//!
//! session.apply(Edit::AddOrnament, Instant::now()).unwrap();
//! assert!(session.slot().load().is_some());
//! ```

pub mod autosave;
pub mod config;
pub mod error;
pub mod session;
pub mod settle;
pub mod slot;
pub mod storage;

pub use autosave::{AutosaveDriver, AutosaveHandle};
pub use config::{AppConfig, FormSettings, StorageSettings};
pub use error::{StoreError, StoreResult};
pub use session::FormSession;
pub use settle::SettleTimer;
pub use slot::ApplicationSlot;
pub use storage::{FileStorage, MemoryStorage, Storage};
