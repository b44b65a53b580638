//! RocksDB implementations of the repository traits of `profnet-core`
pub mod connection;
pub mod message;

mod store;
