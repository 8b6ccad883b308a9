pub mod album;
pub mod api;
pub mod config;
pub mod error;
pub mod gallery;
pub mod sequencer;
pub mod telemetry;
pub mod upload;
pub mod web_pages;
