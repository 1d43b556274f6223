pub mod app;
pub mod archive;
pub mod config;
pub mod crawler;
pub mod diff;
pub mod domain;
pub mod error;
pub mod output;
pub mod registry;
pub mod store;
pub mod transform;
