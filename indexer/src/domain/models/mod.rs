mod block;

pub use block::{BlockData, ChunkData, TransactionData};
