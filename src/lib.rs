pub mod config;
pub mod format;
pub mod logging;
pub mod prompt;
pub mod sampler;
pub mod session;
pub mod system;
pub mod ui;
