//! Application services layer.

pub mod articles;
pub mod blocks;
pub mod error;
pub mod preferences;
pub mod repos;
