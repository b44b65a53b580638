//! `message` is the domain of direct messages between users
//!
//! Sending a message does not require any connection. Sender and receiver share one record,
//! deleting a message hides it from the deleting side only. The record is hidden from every
//! read once both sides deleted it.
//!
//! Reading a message as its receiver marks it as delivered.
pub mod message;
pub mod types;
pub mod usecase;
