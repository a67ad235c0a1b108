//! Client modules for external API interactions

pub mod endpoint;

pub use endpoint::{RequestMode, SummarizeClient};
