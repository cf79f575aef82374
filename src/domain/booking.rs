//! Booking requests between a seeker and a worker.
//!
//! The workflow is deliberately a single step: a seeker creates a request in
//! [`BookingStatus::Pending`], and a worker claims it by moving it to
//! [`BookingStatus::Accepted`]. The transition is guarded on the current status
//! by the store, so only the first accept succeeds.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Accepted,
}

impl BookingStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
        }
    }
}

/// A booking row as stored in the bookings table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Booking {
    /// Store-assigned identifier; absent until the row is inserted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub seeker_id: String,
    /// Worker the seeker asked for, or the one who accepted.
    #[serde(default)]
    pub worker_id: Option<String>,
    #[serde(default)]
    pub details: String,
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
}

impl Booking {
    /// Creates an unsaved pending request from `seeker_id` to `worker_id`.
    pub fn pending(
        seeker_id: impl Into<String>,
        worker_id: Option<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            seeker_id: seeker_id.into(),
            worker_id,
            details: details.into(),
            status: BookingStatus::Pending,
            created_at: Utc::now(),
        }
    }

    /// Returns true when `worker_id` may accept this booking.
    ///
    /// Open requests (no target worker) can be taken by anyone; targeted ones
    /// only by the requested worker.
    #[must_use]
    pub fn acceptable_by(&self, worker_id: &str) -> bool {
        self.status == BookingStatus::Pending
            && self.worker_id.as_deref().map_or(true, |target| target == worker_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_booking_serializes_without_id() {
        let booking = Booking::pending("s-1", Some("w-1".to_string()), "leaking tap");
        let json = serde_json::to_value(&booking).unwrap();
        assert!(json.get("id").is_none());
        assert_eq!(json["status"], "pending");
    }

    #[test]
    fn targeted_booking_is_only_acceptable_by_its_worker() {
        let booking = Booking::pending("s-1", Some("w-1".to_string()), "");
        assert!(booking.acceptable_by("w-1"));
        assert!(!booking.acceptable_by("w-2"));

        let open = Booking::pending("s-1", None, "");
        assert!(open.acceptable_by("w-2"));
    }

    #[test]
    fn accepted_booking_is_not_acceptable() {
        let mut booking = Booking::pending("s-1", None, "");
        booking.status = BookingStatus::Accepted;
        assert!(!booking.acceptable_by("w-1"));
    }
}
