//! wabulk Library
//!
//! Core modules for sending approved WhatsApp templates to a contact list.

pub mod config;
pub mod contacts;
pub mod error;
pub mod graph;
pub mod report;
pub mod sender;
pub mod session;
pub mod templates;
pub mod variables;
