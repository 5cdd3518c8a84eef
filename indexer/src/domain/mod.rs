pub mod chain;
pub mod errors;
pub mod models;
