//! Remote API client and its connection settings

pub mod config;
pub mod rest;

pub use self::config::ClientConfig;
pub use self::rest::RestClient;
