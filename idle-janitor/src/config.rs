use std::num::NonZeroU64;
use std::str::FromStr;

use envconfig::Envconfig;
use gcp_common::auth::DEFAULT_METADATA_URL;
use gcp_common::compute::{InstanceRef, DEFAULT_COMPUTE_URL};
use gcp_common::monitoring::DEFAULT_MONITORING_URL;

use crate::detector::DetectorSettings;

#[derive(Envconfig, Clone)]
pub struct Config {
    #[envconfig(from = "BIND_HOST", default = "0.0.0.0")]
    pub host: String,

    #[envconfig(from = "BIND_PORT", default = "8080")]
    pub port: u16,

    pub project_id: NonEmptyString,

    pub instance_zone: NonEmptyString,

    pub instance_name: NonEmptyString,

    // Name of the user-defined log-based metric, without the `logging.googleapis.com/user/` prefix.
    pub metric_name: NonEmptyString,

    #[envconfig(default = "https://monitoring.googleapis.com")]
    pub monitoring_api_url: String,

    #[envconfig(default = "https://compute.googleapis.com")]
    pub compute_api_url: String,

    #[envconfig(default = "http://metadata.google.internal")]
    pub metadata_url: String,

    // When unset, tokens come from the metadata server.
    pub access_token: Option<NonEmptyString>,

    // When unset, checks only run when triggered over HTTP.
    pub check_interval_secs: Option<NonZeroU64>,

    #[envconfig(default = "true")]
    pub export_prometheus: bool,
}

impl Config {
    /// Produce a host:port address for binding a TcpListener.
    pub fn bind(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn get_detector_settings(&self) -> DetectorSettings {
        let instance = InstanceRef {
            project: self.project_id.as_str().to_owned(),
            zone: self.instance_zone.as_str().to_owned(),
            instance: self.instance_name.as_str().to_owned(),
        };

        DetectorSettings {
            metric_name: self.metric_name.as_str().to_owned(),
            instance,
        }
    }

    pub fn uses_default_endpoints(&self) -> bool {
        self.monitoring_api_url == DEFAULT_MONITORING_URL
            && self.compute_api_url == DEFAULT_COMPUTE_URL
            && self.metadata_url == DEFAULT_METADATA_URL
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NonEmptyString(pub String);

impl NonEmptyString {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct StringIsEmptyError;

impl FromStr for NonEmptyString {
    type Err = StringIsEmptyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().is_empty() {
            Err(StringIsEmptyError)
        } else {
            Ok(NonEmptyString(s.to_owned()))
        }
    }
}
