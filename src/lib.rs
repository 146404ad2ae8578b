// Karasu batch image pipeline library

pub mod batch;
pub mod config;
pub mod encoder;
pub mod error;
pub mod format;
pub mod logging;
pub mod metadata;
pub mod orientation;
pub mod pipeline;
pub mod planner;
pub mod resize;
pub mod stats;
pub mod watermark;
