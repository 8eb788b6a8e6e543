pub mod app;
pub mod bridge;
pub mod cli;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod host;
pub mod lifecycle;
pub mod model;
pub mod normalize;
pub mod signals;
pub mod throttle;

#[cfg(test)]
pub mod test_utils;
