//! Minimal Google Cloud REST clients: credentials, Cloud Monitoring time series and Compute
//! Engine instance lifecycle.
pub mod auth;
pub mod compute;
pub mod error;
pub mod metrics;
pub mod monitoring;
