use opentelemetry::{global, KeyValue};
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::{
	metrics::{
		reader::{DefaultAggregationSelector, DefaultTemporalitySelector},
		MeterProviderBuilder, PeriodicReader, SdkMeterProvider,
	},
	runtime,
	trace::{BatchConfig, Sampler, Tracer},
	Resource,
};
use opentelemetry_semantic_conventions::{
	resource::{DEPLOYMENT_ENVIRONMENT, SERVICE_NAME, SERVICE_VERSION},
	SCHEMA_URL,
};
use tracing::{level_filters::LevelFilter, Level};
use tracing_opentelemetry::MetricsLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Constructs a [`Resource`] which describes the service.
fn resource() -> Resource {
	Resource::from_schema_url(
		[
			KeyValue::new(SERVICE_NAME, env!("CARGO_PKG_NAME")),
			KeyValue::new(SERVICE_VERSION, env!("CARGO_PKG_VERSION")),
			KeyValue::new(
				DEPLOYMENT_ENVIRONMENT,
				if cfg!(debug_assertions) {
					"development"
				} else {
					"production"
				},
			),
		],
		SCHEMA_URL,
	)
}

/// Constructs an [`SdkMeterProvider`] exporting to the collector at `endpoint`.
///
/// Tracing events with `monotonic_counter.*` fields become counters.
fn init_meter_provider(endpoint: &str) -> Result<SdkMeterProvider, opentelemetry::metrics::MetricsError> {
	let exporter = opentelemetry_otlp::new_exporter()
		.tonic()
		.with_endpoint(endpoint)
		.build_metrics_exporter(
			Box::new(DefaultAggregationSelector::new()),
			Box::new(DefaultTemporalitySelector::new()),
		)?;

	let reader = PeriodicReader::builder(exporter, runtime::Tokio)
		.with_interval(std::time::Duration::from_secs(5))
		.build();

	let meter_provider = MeterProviderBuilder::default()
		.with_resource(resource())
		.with_reader(reader)
		.build();

	global::set_meter_provider(meter_provider.clone());

	Ok(meter_provider)
}

/// Constructs a [`Tracer`] exporting spans in batches to the collector at `endpoint`.
fn init_tracer(endpoint: &str) -> Result<Tracer, opentelemetry::trace::TraceError> {
	opentelemetry_otlp::new_pipeline()
		.tracing()
		.with_trace_config(
			opentelemetry_sdk::trace::Config::default()
				.with_sampler(Sampler::TraceIdRatioBased(1.0))
				.with_resource(resource()),
		)
		.with_batch_config(BatchConfig::default())
		.with_exporter(opentelemetry_otlp::new_exporter().tonic().with_endpoint(endpoint))
		.install_batch(runtime::Tokio)
}

/// Initializes the tracing subscriber at `level`.
///
/// With an OTLP `endpoint`, spans and metrics are exported as well, and the
/// returned guard cleans up the global tracer and meter provider when dropped.
/// If the exporters cannot be built, the service logs locally only.
pub fn init_tracing_subscriber(level: Level, endpoint: Option<&str>) -> Option<OtelGuard> {
	let telemetry = endpoint.and_then(|endpoint| {
		match (init_meter_provider(endpoint), init_tracer(endpoint)) {
			(Ok(meter_provider), Ok(tracer)) => Some((meter_provider, tracer)),
			(Err(error), _) => {
				eprintln!("failed to build metrics exporter: {error}");
				None
			}
			(_, Err(error)) => {
				eprintln!("failed to build trace exporter: {error}");
				None
			}
		}
	});

	let (metrics, spans, guard) = match telemetry {
		Some((meter_provider, tracer)) => (
			Some(MetricsLayer::new(meter_provider.clone())),
			Some(tracing_opentelemetry::layer().with_tracer(tracer)),
			Some(OtelGuard { meter_provider }),
		),
		None => (None, None, None),
	};

	tracing_subscriber::registry()
		.with(LevelFilter::from_level(level))
		.with(tracing_subscriber::fmt::layer().with_ansi(true))
		.with(metrics)
		.with(spans)
		.init();

	guard
}

pub struct OtelGuard {
	meter_provider: SdkMeterProvider,
}

impl Drop for OtelGuard {
	fn drop(&mut self) {
		if let Err(err) = self.meter_provider.shutdown() {
			eprintln!("{err:?}");
		}

		opentelemetry::global::shutdown_tracer_provider();
	}
}
