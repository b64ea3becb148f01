use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Telemetry export configuration
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Controls OTLP trace export.
///
/// Left alone, the gateway only writes structured JSON logs. Pointing
/// `otlp_endpoint` at a gRPC collector (Jaeger, Grafana Tempo, an
/// otel-collector sidecar) forwards every `tracing` span there as well.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// OTLP gRPC endpoint, e.g. `http://localhost:4317`. `None` keeps
    /// the exporter off.
    #[serde(default)]
    pub otlp_endpoint: Option<String>,

    /// Reported as the `service.name` resource attribute.
    #[serde(default = "d_cronforge")]
    pub service_name: String,

    /// Fraction of traces to keep, `0.0` to `1.0`. Applied with
    /// `TraceIdRatioBased` sampling so a whole trace is kept or dropped
    /// together.
    #[serde(default = "d_sample_all")]
    pub sample_rate: f64,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self { otlp_endpoint: None, service_name: d_cronforge(), sample_rate: d_sample_all() }
    }
}

fn d_cronforge() -> String {
    "cronforge".into()
}

fn d_sample_all() -> f64 {
    1.0
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
