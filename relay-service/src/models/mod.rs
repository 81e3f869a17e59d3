//! Domain models for the relay service.

pub mod catalog;
pub mod chat;

pub use catalog::{Catalog, Movie};
pub use chat::{ChatReply, ChatRequest, PingResponse};
