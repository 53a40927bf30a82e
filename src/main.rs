use listkeeper::{
    configuration::get_configuration,
    startup::Application,
    telemetry::{get_subscriber, init_subscriber},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let subscriber = get_subscriber(
        "listkeeper".into(),
        "info".into(),
        std::env::var("OTEL_EXPORTER_OTLP_ENDPOINT").ok(),
        std::io::stdout,
    );
    init_subscriber(subscriber);

    let configuration = get_configuration()?;
    let result = match Application::build(configuration).await {
        Ok(application) => application.run_until_stopped().await,
        Err(e) => Err(e),
    };
    if let Err(e) = &result {
        tracing::error!("Application stopped: {:?}", e);
    }

    opentelemetry::global::shutdown_tracer_provider();
    result
}
