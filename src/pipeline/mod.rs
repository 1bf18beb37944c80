pub mod adjust;
pub mod assign;
pub mod config;
pub mod contrast;
pub mod extract;
pub mod sample;
pub mod session;
