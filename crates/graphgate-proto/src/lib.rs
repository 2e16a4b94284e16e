//! graphgate protocol - gRPC service definitions
//!
//! Generated code for the two backends the gateway talks to.

/// Account directory service (user records)
pub mod accounts {
    tonic::include_proto!("graphgate.accounts");
}

/// Storage gateway service (file and folder metadata)
pub mod storage {
    tonic::include_proto!("graphgate.storage");
}
