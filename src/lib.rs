//! Preference-aware article blocks.
//!
//! Extracts a user's interest identifiers, derives cache-context keys from
//! them, and selects recent published articles for display blocks.

pub mod application;
pub mod cache;
pub mod config;
pub mod domain;
pub mod infra;
