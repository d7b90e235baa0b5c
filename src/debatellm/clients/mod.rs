//! Provider specific [`ClientWrapper`](crate::debatellm::client_wrapper::ClientWrapper) implementations.
//!
//! Each submodule offers a concrete client that speaks a particular vendor's
//! API while conforming to the uniform contract the gateway retries around.

pub mod http_pool;

pub mod deepseek;
pub mod openai;
