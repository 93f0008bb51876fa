pub mod clean;
pub mod config;
pub mod dwell;
pub mod encode;
pub mod error;
pub mod features;
pub mod frame;
pub mod loader;
pub mod output;
pub mod pipeline;
pub mod record;
