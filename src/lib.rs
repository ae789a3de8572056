//! ragchat - conversational client for a retrieval-augmented Q&A service
//!
//! The core is a small state machine that turns user questions into remote
//! queries and reconciles the answers (or failures) into an observable
//! transcript. Rendering is left to the caller.

pub mod config;
pub mod controller;
pub mod gateway;
pub mod render;
pub mod state_machine;
pub mod transcript;
