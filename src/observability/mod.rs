//! OpenTelemetry-based observability with file-based trace export.
//!
//! ```text
//! tracing macros → tracing-opentelemetry → OpenTelemetry SDK → FileSpanExporter → hirafi-otlp.json
//! ```
//!
//! - **File export**: spans go to `hirafi-otlp.json` in the plugin data
//!   directory, one OTLP/JSON document per line
//! - **Rotation**: the file rotates at 10 MiB, keeping 3 backups
//! - **Cross-thread traces**: worker messages carry a trace context so spans
//!   on the worker thread join the trace that issued them
//!
//! Trace level comes from the `trace_level` plugin option, default `"info"`,
//! and accepts `EnvFilter` directives such as `hirafi=debug`.
//!
//! # Modules
//!
//! - `init`: Subscriber setup
//! - `tracer`: Tracer provider with file export
//! - `span_formatter`: OTLP JSON serialization
//! - `file_writer`: Rotating file writer

mod file_writer;
mod init;
mod span_formatter;
mod tracer;

pub use init::{init_tracing, TRACE_FILE};
