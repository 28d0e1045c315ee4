//! A small framed request/response TCP library with address-record handoff.
//!
//! A [`Server`] binds, persists an [`AddressRecord`] to disk, and dispatches
//! each accepted connection to a [`RequestHandler`] on a background task. A
//! [`Client`] loads the record, connects, and exchanges length-prefixed
//! UTF-8 messages over a [`Connection`].

pub mod client;
pub mod config;
pub mod connection;
pub mod error;
pub mod handler;
pub mod record;
pub mod server;

pub use client::Client;
pub use config::Config;
pub use connection::{Connection, MAX_FRAME_LEN};
pub use error::{Error, Result};
pub use handler::{LogHandler, RequestHandler, UppercaseHandler, receive_and_log};
pub use record::{AddressRecord, DEFAULT_RECORD_FILE};
pub use server::{Server, ServerHandle};
