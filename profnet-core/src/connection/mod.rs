//! `connection` is the domain that maintains professional connections between users
//!
//! A user may ask another user to connect. The target of the request decides to accept or
//! reject it, and an accepted connection makes both users part of each other's network.
//!
//! Not everyone may be requested. Once a user has built a reasonably sized network, requests
//! are limited to users reachable through accepted connections within a bounded number of hops,
//! see [`reachability::Authorizer`]. Users with a small network may request anyone.
//!
//! A pending request from the other side is always honored first: when `bob` already asked
//! `alice`, a request from `alice` to `bob` simply accepts it.
pub mod edge;
pub mod graph;
pub mod reachability;
pub mod types;
pub mod usecase;
