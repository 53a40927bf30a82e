use opentelemetry::{KeyValue, trace::TracerProvider as _};
use opentelemetry_otlp::{SpanExporter, WithExportConfig};
use opentelemetry_sdk::{Resource, runtime, trace as sdktrace};
use opentelemetry_semantic_conventions::resource::SERVICE_NAME;
use tracing::{Subscriber, subscriber::set_global_default};
use tracing_bunyan_formatter::{BunyanFormattingLayer, JsonStorageLayer};
use tracing_log::LogTracer;
use tracing_subscriber::{EnvFilter, Registry, layer::SubscriberExt};

/// Builds the JSON log subscriber. Spans are also exported over OTLP when
/// `otlp_endpoint` is set.
pub fn get_subscriber<Sink>(
    name: String,
    env_filter: String,
    otlp_endpoint: Option<String>,
    sink: Sink,
) -> impl Subscriber + Send + Sync
where
    Sink: for<'a> tracing_subscriber::fmt::MakeWriter<'a> + Sync + Send + 'static,
{
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(env_filter));

    let telemetry_layer = otlp_endpoint.and_then(|endpoint| match otlp_tracer(&name, &endpoint) {
        Ok(tracer) => Some(tracing_opentelemetry::layer().with_tracer(tracer)),
        Err(e) => {
            // The subscriber is not installed yet, so stderr is all we have.
            eprintln!("OTLP export to {endpoint} disabled: {e:?}");
            None
        }
    });

    Registry::default()
        .with(env_filter)
        .with(telemetry_layer)
        .with(JsonStorageLayer)
        .with(BunyanFormattingLayer::new(name, sink))
}

fn otlp_tracer(name: &str, endpoint: &str) -> anyhow::Result<sdktrace::Tracer> {
    let exporter = SpanExporter::builder()
        .with_tonic()
        .with_endpoint(endpoint)
        .build()?;

    let resource = Resource::new(vec![KeyValue::new(SERVICE_NAME, name.to_string())]);

    let tracer_provider = sdktrace::TracerProvider::builder()
        .with_batch_exporter(exporter, runtime::Tokio)
        .with_resource(resource)
        .build();

    let tracer = tracer_provider.tracer("listkeeper");
    opentelemetry::global::set_tracer_provider(tracer_provider);
    Ok(tracer)
}

pub fn init_subscriber(subscriber: impl Subscriber + Send + Sync) {
    LogTracer::init().expect("Failed to initialize env log tracer");
    set_global_default(subscriber).expect("failed to create subscriber");
}
