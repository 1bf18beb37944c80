pub mod cli;
pub mod color;
pub mod error;
pub mod output;
pub mod pipeline;
