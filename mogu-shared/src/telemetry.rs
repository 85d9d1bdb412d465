use std::time::Instant;

use metrics::histogram;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub fn init_tracing(service_name: &str) {
    let crate_target = service_name.replace('-', "_");
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("info,{crate_target}=debug")));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true);

    let is_production = std::env::var("MOGU_ENV")
        .map(|v| v == "production")
        .unwrap_or(false);

    if is_production {
        let json_layer = tracing_subscriber::fmt::layer()
            .json()
            .with_target(true)
            .with_thread_ids(true);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(json_layer)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .init();
    }

    tracing::info!(service = service_name, "tracing initialized");
}

/// Run one pipeline stage, recording its wall time under
/// `mogu_stage_duration_seconds{stage}`.
pub fn timed_stage<T>(stage: &'static str, f: impl FnOnce() -> T) -> T {
    let start = Instant::now();
    let out = f();
    let duration = start.elapsed().as_secs_f64();

    histogram!("mogu_stage_duration_seconds", "stage" => stage).record(duration);
    tracing::debug!(stage, duration_secs = duration, "stage finished");

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timed_stage_returns_inner_value() {
        let value = timed_stage("unit", || 21 * 2);
        assert_eq!(value, 42);
    }
}
