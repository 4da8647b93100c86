//! Modules layer - Infrastructure components for external integrations
//!
//! Contains the classifier gateway client and the moderation store backends.

pub mod classifier;
pub mod store;
