use std::error::Error;
use std::fmt;

/// Error type for chain RPC operations
#[derive(Debug, Clone)]
pub enum RpcClientError {
    /// Transport-layer failure (connection refused, timeout, bad gateway)
    Transport(String),
    /// The node reports the requested height as absent or skipped
    UnknownBlock(u64),
    /// Any other error reported by the node
    Rpc(String),
    /// The node answered with a payload we could not decode
    Decode(String),
}

impl RpcClientError {
    /// Transport errors are routine network noise and are logged quieter
    /// than real node-side errors.
    pub fn is_transport(&self) -> bool {
        matches!(self, RpcClientError::Transport(_))
    }
}

impl fmt::Display for RpcClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RpcClientError::Transport(msg) => write!(f, "RPC transport error: {}", msg),
            RpcClientError::UnknownBlock(height) => {
                write!(f, "Block at height {} is unknown to the node", height)
            }
            RpcClientError::Rpc(msg) => write!(f, "RPC error: {}", msg),
            RpcClientError::Decode(msg) => write!(f, "RPC decode error: {}", msg),
        }
    }
}

impl Error for RpcClientError {}

impl From<reqwest::Error> for RpcClientError {
    fn from(err: reqwest::Error) -> Self {
        RpcClientError::Transport(err.to_string())
    }
}
