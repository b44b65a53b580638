//! `shared` holds the building blocks used by both the `connection` and the `message` domains
pub mod lock;
pub mod types;

#[cfg(test)]
pub mod fakes;
