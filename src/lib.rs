//! Client side of the HH auto-apply console: profile management, vacancy
//! search, application history and the popup OAuth handshake.

pub mod api;
pub mod auth;
pub mod config;
pub mod console;
pub mod constants;
pub mod dom;
pub mod logging;
pub mod notify;
pub mod render;

#[cfg(test)]
mod testing;
