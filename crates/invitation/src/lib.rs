//! Wedding invitation server.
//!
//! Serves the single-page invitation site and a small JSON API around the
//! guestbook: reading and signing wishes, a quote for the couple, and a
//! WhatsApp link carrying the guest's greeting.

pub mod quote;
pub mod serve;
pub mod share;
pub mod telemetry;
pub mod web;

pub use quote::{QuoteProvider, StaticQuoteProvider};
pub use web::{router, WebState};
