//! Process entry shared by the service binaries.

use std::process::ExitCode;

use dotenvy::dotenv;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::startup::{self, ConfigSource, ServiceKind};

pub fn main_for(kind: ServiceKind) -> ExitCode {
    // .env first so RUST_LOG, DATABASE_URL and friends apply
    dotenv().ok();
    let service = kind.name();
    let resolved = startup::resolve_config(kind);
    let json_logs = resolved.as_ref().map(|(cfg, _)| cfg.server.json_logs).unwrap_or(false);
    common::utils::logging::init_logging(json_logs);
    info!(service, event = "logger_init", json_logs, "tracing subscriber initialized");

    let (cfg, source) = match resolved {
        Ok(r) => r,
        Err(e) => {
            error!(service, event = "config_invalid", error = %e, "refusing to start");
            return ExitCode::FAILURE;
        }
    };
    match &source {
        ConfigSource::File(path) => {
            info!(service, event = "config_loaded", %path, "configuration loaded from file")
        }
        ConfigSource::Env { reason } => {
            warn!(service, event = "config_env", %reason, "no config file, using environment")
        }
    }

    let service_id = Uuid::new_v4();
    let pid = std::process::id();
    let version = env!("CARGO_PKG_VERSION");

    std::panic::set_hook(Box::new(move |info| {
        error!(
            service,
            event = "panic",
            %service_id,
            pid,
            message = %info,
            "unhandled panic occurred"
        );
    }));

    let mut builder = tokio::runtime::Builder::new_multi_thread();
    builder.enable_all();
    if let Some(w) = cfg.server.worker_threads {
        builder.worker_threads(w);
    }
    let rt = match builder.build() {
        Ok(rt) => rt,
        Err(e) => {
            error!(
                service,
                event = "runtime_build_failed",
                error = %e,
                "failed to build tokio runtime"
            );
            return ExitCode::FAILURE;
        }
    };

    info!(
        service,
        event = "start",
        %service_id,
        pid,
        version,
        host = %cfg.server.host,
        port = cfg.server.port,
        threads = cfg.server.worker_threads.unwrap_or_default(),
        "service starting"
    );

    match rt.block_on(startup::run(kind, cfg)) {
        Ok(()) => {
            info!(service, event = "stop", %service_id, pid, "service stopped normally");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(
                service,
                event = "run_failed",
                %service_id,
                error = %e,
                "service exited with error"
            );
            ExitCode::FAILURE
        }
    }
}
