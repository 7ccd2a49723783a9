//! Incremental codec and command-safety classifier for Subversion's
//! `ra_svn` wire protocol, built for repository-access proxies.
//!
//! A proxy that sits between `svn` clients and `svnserve` needs to read the
//! client's command stream as it passes through, decide per command whether
//! the connection is allowed to execute it, and forward or reject without
//! ever reformatting the bytes the real server sees. This crate is that core:
//!
//! - [`Decoder`] — a stateful incremental parser turning socket bytes into
//!   complete top-level [`Message`]s, tolerant of arbitrary chunk boundaries.
//! - [`serialize`] / [`encode_item`] — canonical wire encoding of
//!   [`SvnItem`] trees.
//! - [`is_read_only`] — name-based classification of commands against a
//!   fixed, fail-closed safe set.
//! - [`ProxyGate`] — the per-connection filter combining the three.
//!
//! No socket I/O happens here; the session layer owns the sockets and drives
//! one gate per connection.
//!
//! ## Getting started
//!
//! ```rust
//! use svngate::{GateAction, ProxyGate};
//!
//! fn main() -> svngate::Result<()> {
//!     // A connection without write permission.
//!     let mut gate = ProxyGate::new(false);
//!
//!     let mut to_server = Vec::new();
//!     let mut to_client = Vec::new();
//!     for action in gate.feed(b"( get-latest-rev ( ) ) ( commit ( 3:msg ) ) ")? {
//!         match action {
//!             GateAction::Forward(raw) => to_server.extend_from_slice(&raw),
//!             GateAction::Reject(response) => to_client.extend_from_slice(&response),
//!         }
//!     }
//!     assert_eq!(to_server, b"( get-latest-rev ( ) ) ");
//!     assert!(!to_client.is_empty());
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - `serde`: enables `Serialize`/`Deserialize` for public data types.
//!
//! ## Protocol notes
//!
//! - The decoder accepts any single ASCII whitespace byte as a token
//!   separator, as real `svn` clients terminate commands with a newline.
//! - Input that can never become valid fails fast with
//!   [`GateError::Syntax`]; running out of bytes mid-token never fails.
//! - Buffer size and nesting depth are capped ([`DecoderLimits`]) so hostile
//!   input cannot grow memory without bound.

#![deny(unsafe_code)]

mod classify;
mod error;
mod gate;
mod wire;

pub use classify::is_read_only;
pub use error::GateError;
pub use gate::{GateAction, ProxyGate, SVN_ERR_RA_NOT_AUTHORIZED, failure_response};
/// Convenience alias for results returned by this crate.
pub type Result<T> = std::result::Result<T, GateError>;
pub use wire::{Decoder, DecoderLimits, Message, SvnItem, encode_item, serialize};
