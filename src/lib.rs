// Upmark image upload service library

pub mod config;
pub mod constants;
pub mod imaging;
pub mod logging;
pub mod metrics;
pub mod pipeline;
pub mod server;
pub mod storage;
pub mod watermark;
