pub mod api;
pub mod config;
pub mod detector;
pub mod handlers;
pub mod metrics_constants;
pub mod time;
pub mod window;

#[cfg(test)]
mod test_utils;
