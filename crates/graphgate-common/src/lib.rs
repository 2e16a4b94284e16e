//! graphgate common - shared types and utilities
//!
//! This crate provides the data types, error taxonomy and configuration
//! shared by the auth, client and gateway crates.

pub mod config;
pub mod error;
pub mod types;

pub use config::Config;
pub use error::{Error, ErrorCode, Result, RpcDomain};
pub use types::*;
