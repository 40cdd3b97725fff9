//! GTUVERSE client library.
//!
//! This library provides the API proxy that fronts the room backend and the
//! client data layer (request helper, typed API namespaces, session context)
//! used by the command line client.

pub mod api;
pub mod auth;
pub mod chat;
pub mod client;
pub mod config;
pub mod envelope;
pub mod locale;
