//! User sweeper CLI library.
//!
//! Exposes the configuration, credential and menu workflow modules used by the
//! `user-sweeper` binary.

pub mod config;
pub mod credentials;
pub mod errors;
pub mod terminal;
pub mod workflow;
