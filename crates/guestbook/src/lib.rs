//! Guestbook storage for the invitation site.
//!
//! Visitors leave a name and a message; everyone sees every message, newest
//! first. The whole guestbook is a single JSON document on disk:
//!
//! ```text
//! {data_dir}/
//! └── wishes.json   # [{"id", "name", "message", "createdAt"}, ...]
//! ```
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use guestbook::{StoreConfig, WishStore};
//!
//! // Creates data/wishes.json with the two seed messages on first use
//! let store = WishStore::open(StoreConfig::with_data_dir("data")).unwrap();
//!
//! let wishes = store.append("Budi", "Selamat ya!").unwrap();
//! assert_eq!(wishes[0].name, "Budi");
//!
//! // Never fails: unreadable storage shows up as an empty guestbook
//! for wish in store.list_all() {
//!     println!("{}: {}", wish.name, wish.text);
//! }
//! ```
//!
//! # Concurrency
//!
//! Appends are read-modify-write cycles over one file, so they are
//! serialized behind a single lock inside [`WishStore`]. Share the store as
//! `Arc<WishStore>`; do not open two stores over the same file in one process.
//! Every write lands in a temporary file first and is renamed into place, so
//! readers never observe a half-written document.

pub mod config;
pub mod error;
pub mod id;
pub mod message;
pub mod store;

pub use config::StoreConfig;
pub use error::{Error, Result};
pub use id::IdAllocator;
pub use message::{Message, MessageId, Submission};
pub use store::{seed_messages, WishStore};
