pub mod config;
pub mod error;
pub mod normalize;
pub mod observability;
pub mod server;
pub mod square;
