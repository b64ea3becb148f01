use std::sync::Arc;

use anyhow::Context;
use axum::http::{HeaderValue, Method};
use clap::Parser;
use opentelemetry_otlp::SpanExporter;
use opentelemetry_sdk::trace::{Sampler, SdkTracerProvider};
use opentelemetry_sdk::Resource;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use opentelemetry::trace::TracerProvider as _;
use opentelemetry_otlp::WithExportConfig as _;

use cf_domain::config::{Config, ObservabilityConfig};
use cf_gateway::api;
use cf_gateway::bootstrap;
use cf_gateway::cli::{self, Cli, Command, ConfigCommand};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // No subcommand behaves like `serve`.
    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => {
            let (config, _) = cli::load_config()?;
            let otel = init_telemetry(&config.observability);
            run_server(Arc::new(config), otel).await
        }
        Command::Config(sub) => {
            let (config, config_path) = cli::load_config()?;
            match sub {
                ConfigCommand::Validate => {
                    if !cli::config::validate(&config, &config_path) {
                        std::process::exit(1);
                    }
                    Ok(())
                }
                ConfigCommand::Show => cli::config::show(&config),
            }
        }
        Command::Version => {
            println!("cronforge {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

/// Set up the `tracing` pipeline for the `serve` command.
///
/// Logs always go to stdout as JSON lines. With `otlp_endpoint` set, the
/// same spans are additionally shipped to a collector over OTLP/gRPC; the
/// returned provider handle must be shut down on exit so buffered spans
/// reach the collector.
fn init_telemetry(obs: &ObservabilityConfig) -> Option<SdkTracerProvider> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,cf_gateway=debug"));
    let stdout_json = tracing_subscriber::fmt::layer().json();
    let base = tracing_subscriber::registry().with(filter).with(stdout_json);

    match &obs.otlp_endpoint {
        None => {
            base.init();
            None
        }
        Some(endpoint) => match otlp_provider(endpoint, obs) {
            Ok(provider) => {
                let tracer = provider.tracer("cronforge");
                base.with(tracing_opentelemetry::layer().with_tracer(tracer)).init();
                Some(provider)
            }
            Err(e) => {
                // Tracing is not up yet at this point, so stderr it is.
                eprintln!(
                    "WARNING: OTLP exporter for {endpoint} unavailable ({e:#}); \
                     telemetry export disabled"
                );
                base.init();
                None
            }
        },
    }
}

/// Construct a batch-exporting tracer provider targeting `endpoint`.
fn otlp_provider(endpoint: &str, obs: &ObservabilityConfig) -> anyhow::Result<SdkTracerProvider> {
    let exporter = SpanExporter::builder().with_tonic().with_endpoint(endpoint);
    let res = Resource::builder().with_service_name(obs.service_name.clone()).build();
    Ok(SdkTracerProvider::builder()
        .with_batch_exporter(exporter.build().context("building OTLP span exporter")?)
        .with_resource(res)
        .with_sampler(Sampler::TraceIdRatioBased(obs.sample_rate))
        .build())
}

/// Bring up state, router, and listener, then serve until shutdown.
async fn run_server(config: Arc<Config>, otel: Option<SdkTracerProvider>) -> anyhow::Result<()> {
    tracing::info!("CronForge starting");

    // ── Shared state & background loops ──────────────────────────────
    let state = bootstrap::build_app_state(config.clone()).await?;
    bootstrap::spawn_runtime_loops(&state);

    // ── Middleware stack ─────────────────────────────────────────────
    let cors = cors_from_config(&config.server.cors);
    let max_concurrent = config.server.max_concurrent_requests;
    tracing::info!(max_concurrent, "request concurrency capped");

    // ── Router ───────────────────────────────────────────────────────
    let app = api::router(state.clone())
        .layer(cors)
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .layer(tower::limit::ConcurrencyLimitLayer::new(max_concurrent))
        .with_state(state);

    // ── Bind ─────────────────────────────────────────────────────────
    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("binding to {bind_addr}"))?;

    tracing::info!(addr = %bind_addr, "CronForge listening");

    let server = axum::serve(listener, app).with_graceful_shutdown(shutdown_signal());
    server.await.context("serving HTTP")?;

    // ── Post-shutdown flush ──────────────────────────────────────────
    // Buffered OTel spans only reach the collector once the provider
    // shuts down.
    if let Some(Err(e)) = otel.map(|provider| provider.shutdown()) {
        tracing::warn!(error = ?e, "failed to flush OTel spans on shutdown");
    }

    tracing::info!("gateway stopped");
    Ok(())
}

/// Resolve when SIGINT or SIGTERM arrives so Axum can drain connections.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let mut sigterm =
            signal(SignalKind::terminate()).expect("failed to register SIGTERM handler");

        tokio::select! {
            _ = tokio::signal::ctrl_c() => tracing::info!("stopping on SIGINT"),
            _ = sigterm.recv() => tracing::info!("stopping on SIGTERM"),
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
        tracing::info!("stopping on SIGINT");
    }
}

/// Translate the configured CORS origin list into a [`CorsLayer`].
///
/// An origin ending in `:*` matches any port on that host, which keeps
/// local dev servers working without enumerating ports. A lone `"*"`
/// entry allows every origin and drops credentials support.
fn cors_from_config(cors: &cf_domain::config::CorsConfig) -> CorsLayer {
    use axum::http::header;

    let base = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    // allow_credentials cannot be combined with a wildcard origin.
    if cors.allowed_origins == ["*"] {
        tracing::warn!("CORS configured with wildcard \"*\", all origins allowed");
        return base.allow_origin(tower_http::cors::Any);
    }

    let (wildcards, exact): (Vec<String>, Vec<String>) = cors
        .allowed_origins
        .iter()
        .cloned()
        .partition(|origin| origin.ends_with(":*"));

    if wildcards.is_empty() {
        let parsed = exact.iter().filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "unparseable CORS origin, skipping");
                None
            }
        });
        return base.allow_origin(AllowOrigin::list(parsed)).allow_credentials(true);
    }

    let prefixes: Vec<String> = wildcards
        .into_iter()
        .map(|w| w.trim_end_matches('*').to_owned())
        .collect();

    let predicate = AllowOrigin::predicate(move |header, _| {
        let Ok(origin) = header.to_str() else { return false };
        exact.iter().any(|e| e == origin)
            || prefixes.iter().any(|p| match origin.strip_prefix(p.as_str()) {
                Some(port) => !port.is_empty() && port.bytes().all(|b| b.is_ascii_digit()),
                None => false,
            })
    });
    base.allow_origin(predicate).allow_credentials(true)
}
