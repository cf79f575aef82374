//! OTLP JSON span formatter.
//!
//! Converts OpenTelemetry span data into the OTLP/JSON trace layout, one
//! document per exported batch. The document is modeled as serde structs so
//! the field names and encodings (hex ids, nanosecond strings, typed
//! attribute values) are fixed in one place.

use std::time::{Duration, SystemTime};

use opentelemetry::trace::{SpanId, SpanKind, Status};
use opentelemetry::{KeyValue, Value};
use opentelemetry_sdk::export::trace::SpanData;
use opentelemetry_sdk::resource::Resource;
use serde::Serialize;

/// Instrumentation scope written on every batch.
pub const SCOPE_NAME: &str = "hirafi";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TracesDocument {
    resource_spans: Vec<ResourceSpans>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ResourceSpans {
    resource: ResourceDto,
    scope_spans: Vec<ScopeSpans>,
}

#[derive(Debug, Serialize)]
struct ResourceDto {
    attributes: Vec<AttributeDto>,
}

#[derive(Debug, Serialize)]
struct ScopeSpans {
    scope: ScopeDto,
    spans: Vec<SpanDto>,
}

#[derive(Debug, Serialize)]
struct ScopeDto {
    name: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SpanDto {
    trace_id: String,
    span_id: String,
    parent_span_id: String,
    name: String,
    kind: u8,
    start_time_unix_nano: String,
    end_time_unix_nano: String,
    attributes: Vec<AttributeDto>,
    events: Vec<EventDto>,
    status: StatusDto,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct EventDto {
    time_unix_nano: String,
    name: String,
    attributes: Vec<AttributeDto>,
}

#[derive(Debug, Serialize)]
struct StatusDto {
    code: u8,
    #[serde(skip_serializing_if = "String::is_empty")]
    message: String,
}

#[derive(Debug, Serialize)]
struct AttributeDto {
    key: String,
    value: AnyValue,
}

/// OTLP typed attribute value. Integers are strings in OTLP/JSON.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
enum AnyValue {
    BoolValue(bool),
    IntValue(String),
    DoubleValue(f64),
    StringValue(String),
}

impl From<&Value> for AnyValue {
    fn from(value: &Value) -> Self {
        match value {
            Value::Bool(b) => Self::BoolValue(*b),
            Value::I64(i) => Self::IntValue(i.to_string()),
            Value::F64(f) => Self::DoubleValue(*f),
            Value::String(s) => Self::StringValue(s.to_string()),
            Value::Array(_) => Self::StringValue(value.to_string()),
        }
    }
}

fn attributes(pairs: &[KeyValue]) -> Vec<AttributeDto> {
    pairs
        .iter()
        .map(|kv| AttributeDto {
            key: kv.key.to_string(),
            value: AnyValue::from(&kv.value),
        })
        .collect()
}

fn unix_nanos(time: SystemTime) -> String {
    time.duration_since(SystemTime::UNIX_EPOCH)
        .unwrap_or(Duration::ZERO)
        .as_nanos()
        .to_string()
}

const fn kind_code(kind: &SpanKind) -> u8 {
    match kind {
        SpanKind::Internal => 1,
        SpanKind::Server => 2,
        SpanKind::Client => 3,
        SpanKind::Producer => 4,
        SpanKind::Consumer => 5,
    }
}

fn status(status: &Status) -> StatusDto {
    match status {
        Status::Unset => StatusDto {
            code: 0,
            message: String::new(),
        },
        Status::Ok => StatusDto {
            code: 1,
            message: String::new(),
        },
        Status::Error { description } => StatusDto {
            code: 2,
            message: description.to_string(),
        },
    }
}

impl From<&SpanData> for SpanDto {
    fn from(span: &SpanData) -> Self {
        Self {
            trace_id: format!("{:032x}", span.span_context.trace_id()),
            span_id: format!("{:016x}", span.span_context.span_id()),
            parent_span_id: if span.parent_span_id == SpanId::INVALID {
                String::new()
            } else {
                format!("{:016x}", span.parent_span_id)
            },
            name: span.name.to_string(),
            kind: kind_code(&span.span_kind),
            start_time_unix_nano: unix_nanos(span.start_time),
            end_time_unix_nano: unix_nanos(span.end_time),
            attributes: attributes(&span.attributes),
            events: span
                .events
                .iter()
                .map(|event| EventDto {
                    time_unix_nano: unix_nanos(event.timestamp),
                    name: event.name.to_string(),
                    attributes: attributes(&event.attributes),
                })
                .collect(),
            status: status(&span.status),
        }
    }
}

/// Formats span batches as OTLP JSON documents.
pub struct SpanFormatter {
    resource: Resource,
}

impl SpanFormatter {
    pub const fn new(resource: Resource) -> Self {
        Self { resource }
    }

    /// Builds the document for one batch.
    ///
    /// ```json
    /// {
    ///   "resourceSpans": [{
    ///     "resource": {"attributes": [{"key": "service.name", "value": {"stringValue": "hirafi"}}]},
    ///     "scopeSpans": [{"scope": {"name": "hirafi"}, "spans": [...]}]
    ///   }]
    /// }
    /// ```
    pub fn format_batch(&self, batch: &[SpanData]) -> TracesDocument {
        let resource_attributes = self
            .resource
            .iter()
            .map(|(key, value)| AttributeDto {
                key: key.to_string(),
                value: AnyValue::from(value),
            })
            .collect();

        TracesDocument {
            resource_spans: vec![ResourceSpans {
                resource: ResourceDto {
                    attributes: resource_attributes,
                },
                scope_spans: vec![ScopeSpans {
                    scope: ScopeDto { name: SCOPE_NAME },
                    spans: batch.iter().map(SpanDto::from).collect(),
                }],
            }],
        }
    }

    /// Serializes one batch as a single JSON line.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be serialized.
    pub fn format_line(&self, batch: &[SpanData]) -> serde_json::Result<String> {
        serde_json::to_string(&self.format_batch(batch))
    }
}

impl std::fmt::Debug for SpanFormatter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpanFormatter").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_batch_keeps_resource_and_scope() {
        let resource = Resource::new(vec![KeyValue::new("service.name", "hirafi")]);
        let line = SpanFormatter::new(resource).format_line(&[]).unwrap();
        let json: serde_json::Value = serde_json::from_str(&line).unwrap();

        let group = &json["resourceSpans"][0];
        let service = group["resource"]["attributes"]
            .as_array()
            .unwrap()
            .iter()
            .find(|attr| attr["key"] == "service.name")
            .unwrap();
        assert_eq!(service["value"]["stringValue"], "hirafi");
        assert_eq!(group["scopeSpans"][0]["scope"]["name"], "hirafi");
        assert_eq!(group["scopeSpans"][0]["spans"].as_array().unwrap().len(), 0);
    }

    #[test]
    fn attribute_values_use_otlp_encodings() {
        let encoded = serde_json::to_value(attributes(&[
            KeyValue::new("count", 3_i64),
            KeyValue::new("ok", true),
            KeyValue::new("kind", "search"),
        ]))
        .unwrap();

        assert_eq!(encoded[0]["value"]["intValue"], "3");
        assert_eq!(encoded[1]["value"]["boolValue"], true);
        assert_eq!(encoded[2]["value"]["stringValue"], "search");
    }
}
