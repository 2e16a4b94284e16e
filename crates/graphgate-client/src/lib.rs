//! graphgate client - backend RPC clients
//!
//! Each backend is reached through a trait so the gateway can be driven by
//! in-memory implementations in tests. The gRPC implementations convert wire
//! messages into the types in `graphgate_common` and map backend statuses
//! through [`graphgate_common::Error::from_rpc`].

pub mod directory;
pub mod storage;

// Re-exports
pub use directory::{AccountDirectory, GrpcAccountDirectory};
pub use storage::{GrpcStorageGateway, StorageGateway};
