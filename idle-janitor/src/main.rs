//! Stop a Compute Engine instance once its activity metric goes quiet.
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use envconfig::Envconfig;
use eyre::Result;
use gcp_common::auth::{MetadataTokenSource, StaticTokenSource, TokenSource};
use gcp_common::compute::ComputeClient;
use gcp_common::metrics::setup_metrics_recorder;
use gcp_common::monitoring::MonitoringClient;
use tracing::{error, info, warn};

use idle_janitor::config::Config;
use idle_janitor::detector::IdleDetector;
use idle_janitor::handlers;
use idle_janitor::time::SystemTime;

async fn listen(app: Router, bind: String) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(bind).await?;

    axum::serve(listener, app).await?;

    Ok(())
}

async fn check_loop(detector: Arc<IdleDetector>, interval: Duration) {
    let mut interval = tokio::time::interval(interval);

    loop {
        interval.tick().await;

        // Failures are already logged and counted by the detector, the next tick is a fresh check.
        if let Ok(outcome) = detector.check_activity().await {
            info!("scheduled check finished with {:?}", outcome);
        }
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let config = Config::init_from_env().expect("failed to load configuration from env");

    if !config.uses_default_endpoints() {
        warn!(
            monitoring = %config.monitoring_api_url,
            compute = %config.compute_api_url,
            metadata = %config.metadata_url,
            "using non-default api endpoints"
        );
    }

    let client = reqwest::Client::builder()
        .user_agent("idle-janitor")
        .build()
        .expect("failed to construct reqwest client for idle janitor");

    let tokens: Arc<dyn TokenSource + Send + Sync> = match &config.access_token {
        Some(token) => Arc::new(StaticTokenSource::new(token.as_str())),
        None => Arc::new(MetadataTokenSource::new(
            client.clone(),
            &config.metadata_url,
        )),
    };

    let detector = Arc::new(IdleDetector::new(
        config.get_detector_settings(),
        Arc::new(MonitoringClient::new(
            client.clone(),
            &config.monitoring_api_url,
            tokens.clone(),
        )),
        Arc::new(ComputeClient::new(
            client,
            &config.compute_api_url,
            tokens,
        )),
        Arc::new(SystemTime {}),
    ));

    let recorder_handle = if config.export_prometheus {
        Some(setup_metrics_recorder().expect("failed to install metrics recorder"))
    } else {
        None
    };

    let app = handlers::app(detector.clone(), recorder_handle);

    info!("watching {}, listening on {}", detector.instance(), config.bind());
    let http_server = tokio::spawn(listen(app, config.bind()));

    match config.check_interval_secs {
        Some(secs) => {
            let check_loop = tokio::spawn(check_loop(
                detector,
                Duration::from_secs(secs.get()),
            ));

            tokio::select! {
                res = check_loop => {
                    error!("check loop exited");
                    if let Err(e) = res {
                        error!("check loop failed with: {}", e)
                    }
                }
                res = http_server => {
                    error!("http server exited");
                    if let Ok(Err(e)) = res {
                        error!("failed to start idle-janitor http server, {}", e)
                    }
                }
            }
        }
        None => match http_server.await {
            Ok(Ok(_)) => {}
            Ok(Err(e)) => error!("failed to start idle-janitor http server, {}", e),
            Err(e) => error!("http server task failed with: {}", e),
        },
    }

    info!("exiting");
}
