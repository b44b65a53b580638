//! `profnet-core` is the domain layer of a professional networking service
//!
//! It provides two domains:
//!
//! - `connection`, connection requests between users gated by their degree of separation
//! - `message`, direct messages with a per-party delete lifecycle
//!
//! Storage is abstracted behind the `Repo*Builder` traits of each domain, this crate never
//! touches a database by itself.
pub mod connection;
pub mod message;
pub mod shared;
