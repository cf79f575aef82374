//! PostgREST-dialect store backend.
//!
//! Selects become `GET /rest/v1/{table}?select=*&...`, inserts a `POST` that
//! asks for the stored representation back, and status transitions a call to
//! the `transition_status` function, which performs the guarded update on the
//! server and returns how many rows it changed.

use serde_json::{json, Value};
use url::Url;

use super::command::{StoreCommand, StoreOutcome};
use super::http::{is_success, map_status_error, HttpRequest};
use crate::domain::{HirafiError, Result};

const REST_PREFIX: [&str; 2] = ["rest", "v1"];
const TRANSITION_FUNCTION: &str = "transition_status";

/// Connection settings for a remote store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestBackend {
    base: Url,
    key: String,
}

impl RestBackend {
    /// Creates a backend for the store at `base_url`, authenticating with the
    /// anonymous `key`.
    ///
    /// # Errors
    ///
    /// Returns [`HirafiError::Config`] if the URL does not parse or cannot
    /// carry a path.
    pub fn new(base_url: &str, key: impl Into<String>) -> Result<Self> {
        let base = Url::parse(base_url.trim())
            .map_err(|e| HirafiError::Config(format!("invalid store_url {base_url:?}: {e}")))?;
        if base.cannot_be_a_base() {
            return Err(HirafiError::Config(format!(
                "store_url {base_url:?} cannot carry a path"
            )));
        }
        Ok(Self {
            base,
            key: key.into(),
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        self.base.as_str()
    }

    /// Describes `command` as an HTTP request.
    ///
    /// # Errors
    ///
    /// Fails only if a record cannot be serialized.
    pub fn request(&self, command: &StoreCommand) -> Result<HttpRequest> {
        let request = match command {
            StoreCommand::Select(query) => {
                let mut url = self.endpoint(&[&query.table])?;
                url.query_pairs_mut().extend_pairs(query.to_params());
                HttpRequest::get(url.as_str()).header("Accept", "application/json")
            }
            StoreCommand::Insert { table, record } => {
                let url = self.endpoint(&[table])?;
                HttpRequest::post_json(url.as_str(), record)?
                    .header("Prefer", "return=representation")
            }
            StoreCommand::Transition {
                table,
                id,
                from,
                to,
                assign,
            } => {
                let url = self.endpoint(&["rpc", TRANSITION_FUNCTION])?;
                let body = json!({
                    "p_table": table,
                    "p_id": id,
                    "p_from": from,
                    "p_to": to,
                    "p_assign": assign,
                });
                HttpRequest::post_json(url.as_str(), &body)?
            }
        };

        Ok(request
            .header("apikey", self.key.clone())
            .header("Authorization", format!("Bearer {}", self.key)))
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| HirafiError::Config("store_url cannot carry a path".to_string()))?
            .pop_if_empty()
            .extend(REST_PREFIX)
            .extend(segments);
        Ok(url)
    }
}

/// Interprets a store reply.
///
/// Arrays are row sets, a bare number is an affected-row count, a single
/// object is one row and an empty body is no rows.
///
/// # Errors
///
/// Non-2xx replies become [`HirafiError::Remote`]; unexpected payloads become
/// [`HirafiError::Decode`].
pub fn parse_reply(status: u16, body: &[u8]) -> Result<StoreOutcome> {
    if !is_success(status) {
        return Err(map_status_error(status, body));
    }
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(StoreOutcome::Rows(Vec::new()));
    }

    match serde_json::from_slice::<Value>(body)? {
        Value::Array(rows) => Ok(StoreOutcome::Rows(rows)),
        Value::Number(n) => n
            .as_u64()
            .and_then(|n| usize::try_from(n).ok())
            .map(StoreOutcome::Affected)
            .ok_or_else(|| HirafiError::Decode(format!("invalid affected count: {n}"))),
        row @ Value::Object(_) => Ok(StoreOutcome::Rows(vec![row])),
        other => Err(HirafiError::Decode(format!(
            "unexpected store payload: {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{Predicate, Query};
    use crate::remote::http::HttpMethod;
    use std::collections::BTreeMap;

    fn backend() -> RestBackend {
        RestBackend::new("https://demo.store.example/", "anon-key").unwrap()
    }

    #[test]
    fn select_renders_encoded_query_string() {
        let query = Query::new("users")
            .with(Predicate::eq("role", "worker"))
            .with(Predicate::eq("wilaya", "Tizi Ouzou"));
        let request = backend().request(&StoreCommand::Select(query)).unwrap();

        assert_eq!(request.method, HttpMethod::Get);
        assert_eq!(
            request.url,
            "https://demo.store.example/rest/v1/users?select=*&role=eq.worker&wilaya=eq.Tizi+Ouzou"
        );
        assert_eq!(request.headers["apikey"], "anon-key");
        assert_eq!(request.headers["Authorization"], "Bearer anon-key");
    }

    #[test]
    fn insert_asks_for_representation() {
        let command = StoreCommand::Insert {
            table: "bookings".to_string(),
            record: json!({"status": "pending"}),
        };
        let request = backend().request(&command).unwrap();
        assert_eq!(request.method, HttpMethod::Post);
        assert!(request.url.ends_with("/rest/v1/bookings"));
        assert_eq!(request.headers["Prefer"], "return=representation");
    }

    #[test]
    fn transition_calls_the_guarded_update_function() {
        let command = StoreCommand::Transition {
            table: "bookings".to_string(),
            id: "7".to_string(),
            from: "pending".to_string(),
            to: "accepted".to_string(),
            assign: BTreeMap::from([("worker_id".to_string(), json!("w-1"))]),
        };
        let request = backend().request(&command).unwrap();
        let body: Value = serde_json::from_slice(&request.body).unwrap();

        assert!(request.url.ends_with("/rest/v1/rpc/transition_status"));
        assert_eq!(body["p_from"], "pending");
        assert_eq!(body["p_assign"]["worker_id"], "w-1");
    }

    #[test]
    fn base_path_is_preserved() {
        let backend = RestBackend::new("https://host.example/proxy", "k").unwrap();
        let request = backend
            .request(&StoreCommand::Select(Query::new("users")))
            .unwrap();
        assert_eq!(request.url, "https://host.example/proxy/rest/v1/users?select=*");
    }

    #[test]
    fn invalid_base_url_is_a_config_error() {
        assert!(matches!(
            RestBackend::new("not a url", "k"),
            Err(HirafiError::Config(_))
        ));
    }

    #[test]
    fn replies_map_to_outcomes() {
        assert_eq!(
            parse_reply(200, b"[{\"id\":1}]").unwrap(),
            StoreOutcome::Rows(vec![json!({"id": 1})])
        );
        assert_eq!(parse_reply(200, b"0").unwrap(), StoreOutcome::Affected(0));
        assert_eq!(parse_reply(204, b"").unwrap(), StoreOutcome::Rows(Vec::new()));
        assert!(matches!(
            parse_reply(409, br#"{"message":"conflict"}"#),
            Err(HirafiError::Remote { status: 409, .. })
        ));
        assert!(matches!(parse_reply(200, b"\"ok\""), Err(HirafiError::Decode(_))));
    }
}
