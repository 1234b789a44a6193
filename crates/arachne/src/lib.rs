//! arachne - client library for the Arachne scenario-management server.
//!
//! This library exposes the pieces behind the `arachne` CLI for testing and
//! embedding purposes: the typed HTTP [`client`], keyed entity [`store`]s,
//! the [`poll`] loop used to follow busy cases, and the terminal [`output`]
//! renderers.

pub mod client;
pub mod config;
pub mod output;
pub mod poll;
pub mod store;

pub use client::Client;
pub use config::Config;
