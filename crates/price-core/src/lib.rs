pub mod artifact;
pub mod config;
pub mod encode;
pub mod error;
pub mod intake;
pub mod pipeline;
pub mod schema;
