use std::process::ExitCode;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::error;
use tracing_subscriber::EnvFilter;

use traveltime_engine::credentials::EnvCredentials;
use traveltime_engine::engine::{Engine, EngineConfig};
use traveltime_engine::job::Job;
use traveltime_engine::settings::FileSettings;

/// Settings file used when `TRAVELTIME_SETTINGS` is not set.
const DEFAULT_SETTINGS_PATH: &str = "traveltime_settings.json";

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let Some(job_path) = std::env::args().nth(1) else {
        eprintln!("usage: traveltime-engine <job.json>");
        return ExitCode::from(2);
    };

    let text = match std::fs::read_to_string(&job_path) {
        Ok(text) => text,
        Err(e) => {
            error!(path = %job_path, error = %e, "could not read job file");
            return ExitCode::FAILURE;
        }
    };

    let settings_path = std::env::var("TRAVELTIME_SETTINGS")
        .unwrap_or_else(|_| DEFAULT_SETTINGS_PATH.to_string());

    let result = async {
        let job = Job::from_json(&text)?;
        let engine = Engine::new(
            EngineConfig::default(),
            Arc::new(FileSettings::new(settings_path)),
            Arc::new(EnvCredentials),
        )?;
        job.run(&engine, &CancellationToken::new()).await
    }
    .await;

    match result {
        Ok(output) => match serde_json::to_string_pretty(&output) {
            Ok(json) => {
                println!("{json}");
                ExitCode::SUCCESS
            }
            Err(e) => {
                error!(error = %e, "could not encode output");
                ExitCode::FAILURE
            }
        },
        Err(e) => {
            error!(kind = ?e.kind(), "{e}");
            ExitCode::FAILURE
        }
    }
}
