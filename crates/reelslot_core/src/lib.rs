pub mod config;
pub mod document;
pub mod editing;
pub mod error;
pub mod geometry;
pub mod history;
pub mod interaction;
pub mod layers;
pub mod types;
