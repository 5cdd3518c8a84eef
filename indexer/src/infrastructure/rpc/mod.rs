pub mod client;
pub mod error;
pub mod types;

pub use client::NearRpcClient;
pub use error::RpcClientError;
