//! Logging and trace export for voxform
//!
//! Formatted logs through `tracing-subscriber`, plus OTLP span export when
//! an exporter is configured.

mod metadata;

use opentelemetry::{global, trace::TracerProvider as _};
use opentelemetry_sdk::trace::{Sampler, SdkTracerProvider};
use voxform_config::{ExportProtocol, ExporterConfig, TelemetryConfig};

/// Guard that shuts the tracer provider down on drop, flushing pending spans
pub struct TelemetryGuard {
    tracer_provider: Option<SdkTracerProvider>,
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        if let Some(provider) = self.tracer_provider.take()
            && let Err(e) = provider.shutdown()
        {
            eprintln!("failed to shutdown tracer provider: {e}");
        }
    }
}

/// Initialize logging and, when configured, OTLP trace export
///
/// `log_filter` is an `EnvFilter` directive such as `info` or
/// `voxform_server=debug,info`; an invalid directive falls back to `info`.
/// The returned guard must be held for the lifetime of the application.
///
/// # Errors
///
/// Returns an error if the OTLP exporter cannot be built
pub fn init(config: Option<&TelemetryConfig>, log_filter: &str) -> anyhow::Result<TelemetryGuard> {
    use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

    let filter = EnvFilter::try_new(log_filter).unwrap_or_else(|_| EnvFilter::new("info"));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false);

    let mut guard = TelemetryGuard { tracer_provider: None };

    match config.and_then(|c| c.exporter.as_ref().map(|exporter| (c, exporter))) {
        Some((telemetry_config, exporter)) => {
            let tracer_provider = init_tracer(telemetry_config, exporter)?;
            let otel_layer = tracing_opentelemetry::layer().with_tracer(tracer_provider.tracer("voxform"));
            global::set_tracer_provider(tracer_provider.clone());
            guard.tracer_provider = Some(tracer_provider);

            tracing_subscriber::registry()
                .with(filter)
                .with(fmt_layer)
                .with(otel_layer)
                .init();
        }
        None => {
            tracing_subscriber::registry().with(filter).with(fmt_layer).init();
        }
    }

    Ok(guard)
}

fn init_tracer(config: &TelemetryConfig, exporter: &ExporterConfig) -> anyhow::Result<SdkTracerProvider> {
    let provider = SdkTracerProvider::builder()
        .with_resource(metadata::build_resource(config))
        .with_sampler(sampler(config))
        .with_batch_exporter(build_span_exporter(exporter)?)
        .build();

    Ok(provider)
}

fn sampler(config: &TelemetryConfig) -> Sampler {
    let sampling_rate = config.tracing.as_ref().map_or(1.0, |t| t.sampling_rate);

    let sampler = if sampling_rate >= 1.0 {
        Sampler::AlwaysOn
    } else if sampling_rate <= 0.0 {
        Sampler::AlwaysOff
    } else {
        Sampler::TraceIdRatioBased(sampling_rate)
    };

    if config.tracing.as_ref().is_none_or(|t| t.parent_based) {
        Sampler::ParentBased(Box::new(sampler))
    } else {
        sampler
    }
}

fn build_span_exporter(config: &ExporterConfig) -> anyhow::Result<opentelemetry_otlp::SpanExporter> {
    use opentelemetry_otlp::{SpanExporter, WithExportConfig};

    let exporter = match config.protocol {
        ExportProtocol::Grpc => SpanExporter::builder()
            .with_tonic()
            .with_endpoint(config.endpoint.as_str())
            .build()
            .map_err(|e| anyhow::anyhow!("failed to build gRPC span exporter: {e}"))?,
        ExportProtocol::HttpProto => SpanExporter::builder()
            .with_http()
            .with_endpoint(config.endpoint.as_str())
            .build()
            .map_err(|e| anyhow::anyhow!("failed to build HTTP span exporter: {e}"))?,
    };

    Ok(exporter)
}
