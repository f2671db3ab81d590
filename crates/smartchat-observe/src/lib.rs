//! Observability setup for the Smart Chatbot: structured logging with an
//! optional OpenTelemetry stdout exporter.

pub mod tracing_setup;
