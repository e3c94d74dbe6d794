pub mod config;
pub mod downloader;
pub mod errors;
pub mod manifest;
pub mod models;
pub mod sources;
pub mod transcode;
pub mod utils;
