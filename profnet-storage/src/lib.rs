//! `profnet-storage` persists the `profnet-core` domains into RocksDB
//!
//! The [`Profnet`] facade is the usual entrypoint: it loads the TOML configuration, opens the
//! database and builds the connection and message services on top of it.
pub mod common;
pub mod config;
pub mod db;
pub mod repository;

mod profnet;
pub use profnet::{setup_tracing, ConnectionService, MessageService, Profnet};
