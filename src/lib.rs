pub mod app;
pub mod archive;
pub mod config;
pub mod domain;
pub mod error;
pub mod index;
pub mod output;
pub mod query;
pub mod records;
pub mod transport;
