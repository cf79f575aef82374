//! Store commands, their outcomes, and request fencing.
//!
//! A [`StoreCommand`] is a backend-neutral description of one store call. The
//! REST backend turns it into an HTTP request; the local backend executes it
//! on the worker thread. Either way the reply comes back as a
//! [`StoreOutcome`] tagged with the [`RequestContext`] it was issued under.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::query::Query;

/// One call against the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StoreCommand {
    /// Returns every row matching the query.
    Select(Query),

    /// Inserts one row and returns it as stored.
    Insert { table: String, record: Value },

    /// Moves a row from `from` to `to` only while its status is still `from`,
    /// optionally stamping extra columns. Returns the number of rows changed.
    Transition {
        table: String,
        id: String,
        from: String,
        to: String,
        #[serde(default)]
        assign: BTreeMap<String, Value>,
    },
}

impl StoreCommand {
    /// Short name used in logs and spans.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Select(_) => "select",
            Self::Insert { .. } => "insert",
            Self::Transition { .. } => "transition",
        }
    }
}

/// What a successful store call produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StoreOutcome {
    Rows(Vec<Value>),
    Affected(usize),
}

impl StoreOutcome {
    /// Returns the rows, or nothing for a count.
    #[must_use]
    pub fn into_rows(self) -> Vec<Value> {
        match self {
            Self::Rows(rows) => rows,
            Self::Affected(_) => Vec::new(),
        }
    }

    /// Returns the affected count; a row set counts its rows.
    #[must_use]
    pub fn affected(&self) -> usize {
        match self {
            Self::Rows(rows) => rows.len(),
            Self::Affected(count) => *count,
        }
    }
}

/// Monotonic identifier of an issued request within its [`ReplyKind`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RequestToken(pub u64);

/// Which handler a reply is routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReplyKind {
    Search,
    Login,
    CreateBooking,
    LoadBookings,
    AcceptBooking,
    Recommendation,
    BioDraft,
}

impl ReplyKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Search => "search",
            Self::Login => "login",
            Self::CreateBooking => "create_booking",
            Self::LoadBookings => "load_bookings",
            Self::AcceptBooking => "accept_booking",
            Self::Recommendation => "recommendation",
            Self::BioDraft => "bio_draft",
        }
    }

    /// True for replies that replace what an earlier reply of the same kind
    /// installed. Only these are fenced; write confirmations always apply.
    #[must_use]
    pub const fn replaces(self) -> bool {
        match self {
            Self::Search | Self::Login | Self::LoadBookings | Self::Recommendation | Self::BioDraft => {
                true
            }
            Self::CreateBooking | Self::AcceptBooking => false,
        }
    }

    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        [
            Self::Search,
            Self::Login,
            Self::CreateBooking,
            Self::LoadBookings,
            Self::AcceptBooking,
            Self::Recommendation,
            Self::BioDraft,
        ]
        .into_iter()
        .find(|kind| kind.as_str() == value)
    }
}

const KIND_KEY: &str = "hirafi.kind";
const TOKEN_KEY: &str = "hirafi.token";
const SUBJECT_KEY: &str = "hirafi.subject";

/// Routing data that travels with a request and comes back with its reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestContext {
    pub kind: ReplyKind,
    pub token: RequestToken,
    /// Identifier the reply refers to, such as the booking being accepted.
    #[serde(default)]
    pub subject: Option<String>,
}

impl RequestContext {
    /// Encodes the context as the string map attached to a web request.
    ///
    /// ```
    /// use hirafi::remote::{ReplyKind, RequestContext, RequestToken};
    ///
    /// let context = RequestContext {
    ///     kind: ReplyKind::Search,
    ///     token: RequestToken(3),
    ///     subject: None,
    /// };
    /// assert_eq!(RequestContext::decode(&context.encode()), Some(context));
    /// ```
    #[must_use]
    pub fn encode(&self) -> BTreeMap<String, String> {
        let mut map = BTreeMap::new();
        map.insert(KIND_KEY.to_string(), self.kind.as_str().to_string());
        map.insert(TOKEN_KEY.to_string(), self.token.0.to_string());
        if let Some(subject) = &self.subject {
            map.insert(SUBJECT_KEY.to_string(), subject.clone());
        }
        map
    }

    /// Reads a context back; `None` for replies this plugin did not issue.
    #[must_use]
    pub fn decode(map: &BTreeMap<String, String>) -> Option<Self> {
        let kind = ReplyKind::parse(map.get(KIND_KEY)?)?;
        let token = map.get(TOKEN_KEY)?.parse().ok().map(RequestToken)?;
        Some(Self {
            kind,
            token,
            subject: map.get(SUBJECT_KEY).cloned(),
        })
    }
}

/// Issues request tokens and decides which replies are still current.
///
/// Each reply kind has its own counter. For kinds whose reply replaces state
/// (see [`ReplyKind::replaces`]), issuing a new request makes every earlier
/// reply of that kind stale, so a slow search can never overwrite the results
/// of a newer one. Write replies are current whenever their token was issued:
/// each one reports on its own subject.
#[derive(Debug, Clone, Default)]
pub struct RequestLedger {
    latest: HashMap<ReplyKind, RequestToken>,
}

impl RequestLedger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Issues the next token for `kind` and returns the context to send.
    pub fn issue(&mut self, kind: ReplyKind, subject: Option<String>) -> RequestContext {
        let next = self
            .latest
            .get(&kind)
            .map_or(RequestToken(1), |t| RequestToken(t.0.saturating_add(1)));
        self.latest.insert(kind, next);
        tracing::trace!(kind = kind.as_str(), token = next.0, "request issued");
        RequestContext {
            kind,
            token: next,
            subject,
        }
    }

    /// True when the reply carrying `context` should still be applied.
    #[must_use]
    pub fn is_current(&self, context: &RequestContext) -> bool {
        let Some(latest) = self.latest.get(&context.kind) else {
            return false;
        };
        if context.kind.replaces() {
            *latest == context.token
        } else {
            context.token <= *latest
        }
    }

    /// Latest token issued for `kind`, if any.
    #[must_use]
    pub fn latest(&self, kind: ReplyKind) -> Option<RequestToken> {
        self.latest.get(&kind).copied()
    }
}
