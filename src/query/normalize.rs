//! Result normalization.
//!
//! Store rows are flat (`first_name`, `wilaya`, `is_verified`, ...) and their
//! exact shape drifts between deployments. This module decodes them into the
//! structured domain types, filling defaults for anything optional. A row
//! that cannot be decoded at all is skipped and logged; normalization as a
//! whole never fails.

use serde::Deserialize;
use serde_json::Value;

use crate::domain::{Booking, Location, Review, Role, User, Verification, Worker};

/// Decides whether a worker row is listed, given its raw verification flag.
///
/// Only an explicit `false` excludes a row. A missing column and `true` both
/// include it, so a store without the column still returns results.
///
/// ```
/// use hirafi::query::verification_inclusion;
///
/// assert!(verification_inclusion(None));
/// assert!(verification_inclusion(Some(true)));
/// assert!(!verification_inclusion(Some(false)));
/// ```
#[must_use]
pub const fn verification_inclusion(flag: Option<bool>) -> bool {
    !matches!(flag, Some(false))
}

/// Flat row layout shared by the users table and its worker view.
///
/// Columns outside the identity fields decode leniently: a value of the wrong
/// shape counts as absent instead of dropping the whole row.
#[derive(Debug, Deserialize)]
struct RawUser {
    #[serde(deserialize_with = "id_text")]
    id: String,
    #[serde(default)]
    first_name: Option<String>,
    #[serde(default)]
    last_name: Option<String>,
    #[serde(default)]
    phone: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    role: Option<Role>,
    #[serde(default, alias = "region")]
    wilaya: Option<String>,
    #[serde(default, alias = "sub_region")]
    commune: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    avatar_url: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    bio: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    category: Option<CategoryValue>,
    #[serde(default, deserialize_with = "lenient")]
    categories: Option<Vec<String>>,
    #[serde(default, deserialize_with = "lenient")]
    skills: Option<Vec<String>>,
    #[serde(default, deserialize_with = "lenient_number")]
    rating: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    completed_jobs: Option<u32>,
    #[serde(default, deserialize_with = "lenient")]
    reviews: Option<Vec<Value>>,
    #[serde(default, deserialize_with = "lenient")]
    is_verified: Option<bool>,
    #[serde(default, deserialize_with = "lenient")]
    verification_status: Option<Verification>,
    #[serde(default, deserialize_with = "lenient")]
    id_documents: Option<Vec<String>>,
}

/// The category column holds a single key in some deployments and a list in
/// others.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CategoryValue {
    One(String),
    Many(Vec<String>),
}

impl RawUser {
    fn categories(&self) -> Vec<String> {
        let mut keys: Vec<String> = match &self.category {
            Some(CategoryValue::One(key)) => vec![key.clone()],
            Some(CategoryValue::Many(keys)) => keys.clone(),
            None => Vec::new(),
        };
        for key in self.categories.iter().flatten() {
            if !keys.contains(key) {
                keys.push(key.clone());
            }
        }
        keys.retain(|key| !key.trim().is_empty());
        keys
    }

    fn verification(&self) -> Verification {
        match (self.verification_status, self.is_verified) {
            (Some(status), _) => status,
            (None, Some(true)) => Verification::Verified,
            (None, _) => Verification::Unverified,
        }
    }

    fn into_user(self, fallback_role: Role) -> User {
        let categories = self.categories();
        let verification = self.verification();
        let mut user = User::new(
            self.id,
            self.first_name.unwrap_or_default(),
            self.last_name.unwrap_or_default(),
            self.phone.unwrap_or_default(),
            self.role.unwrap_or(fallback_role),
        );
        user.location = Location {
            region: self.wilaya.unwrap_or_default(),
            sub_region: self.commune.filter(|c| !c.trim().is_empty()),
        };
        user.avatar_url = self.avatar_url.filter(|a| !a.trim().is_empty());
        user.bio = self.bio.unwrap_or_default();
        user.category = categories.into_iter().next();
        user.verification = verification;
        user.id_documents = self.id_documents.unwrap_or_default();
        user.skills = dedup(self.skills.unwrap_or_default());
        user
    }

    fn into_worker(self) -> Worker {
        let categories = self.categories();
        let verified = self.is_verified;
        let rating = self.rating.unwrap_or(0.0);
        let completed_jobs = self.completed_jobs.unwrap_or(0);
        let reviews = self
            .reviews
            .clone()
            .unwrap_or_default()
            .into_iter()
            .filter_map(|raw| match serde_json::from_value::<Review>(raw) {
                Ok(review) => Some(review),
                Err(e) => {
                    tracing::debug!(error = %e, "skipping undecodable review");
                    None
                }
            })
            .collect();

        let user = self.into_user(Role::Worker);
        Worker {
            skills: user.skills.clone(),
            user,
            categories,
            rating,
            completed_jobs,
            reviews,
            verified,
        }
    }
}

/// Decodes worker rows, dropping rows excluded by [`verification_inclusion`].
#[must_use]
pub fn normalize_workers(rows: Vec<Value>) -> Vec<Worker> {
    let total = rows.len();
    let workers: Vec<Worker> = rows
        .into_iter()
        .filter_map(|row| decode::<RawUser>(row, "worker"))
        .map(RawUser::into_worker)
        .filter(|worker| verification_inclusion(worker.verified))
        .collect();

    tracing::debug!(total, kept = workers.len(), "normalized worker rows");
    workers
}

/// Decodes user rows. Rows without a role are skipped since a role cannot be
/// assumed for an account.
#[must_use]
pub fn normalize_users(rows: Vec<Value>) -> Vec<User> {
    rows.into_iter()
        .filter_map(|row| decode::<RawUser>(row, "user"))
        .filter_map(|raw| match raw.role {
            Some(role) => Some(raw.into_user(role)),
            None => {
                tracing::warn!(id = %raw.id, "skipping user row without role");
                None
            }
        })
        .collect()
}

/// Decodes booking rows, accepting numeric identifiers.
#[must_use]
pub fn normalize_bookings(rows: Vec<Value>) -> Vec<Booking> {
    rows.into_iter()
        .map(stringify_id)
        .filter_map(|row| decode::<Booking>(row, "booking"))
        .collect()
}

fn decode<T: serde::de::DeserializeOwned>(row: Value, kind: &str) -> Option<T> {
    match serde_json::from_value(row) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(kind, error = %e, "skipping undecodable row");
            None
        }
    }
}

fn stringify_id(mut row: Value) -> Value {
    if let Some(id) = row.get_mut("id") {
        if let Value::Number(n) = id {
            *id = Value::String(n.to_string());
        }
    }
    row
}

fn id_text<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) if !s.is_empty() => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected a string or numeric id, got {other}"
        ))),
    }
}

/// Decodes an optional column, treating a value of the wrong shape as absent.
fn lenient<'de, D, T>(deserializer: D) -> std::result::Result<Option<T>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: serde::de::DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    if value.is_null() {
        return Ok(None);
    }
    match serde_json::from_value(value) {
        Ok(decoded) => Ok(Some(decoded)),
        Err(e) => {
            tracing::debug!(error = %e, "ignoring malformed column");
            Ok(None)
        }
    }
}

/// Like [`lenient`], but also reads numbers stored as text.
fn lenient_number<'de, D, T>(deserializer: D) -> std::result::Result<Option<T>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: serde::de::DeserializeOwned + std::str::FromStr,
{
    let value = Value::deserialize(deserializer)?;
    if let Value::String(text) = &value {
        return Ok(text.trim().parse().ok());
    }
    lenient(value).map_err(serde::de::Error::custom)
}

fn dedup(items: Vec<String>) -> Vec<String> {
    let mut seen = Vec::with_capacity(items.len());
    for item in items {
        let item = item.trim().to_string();
        if !item.is_empty() && !seen.contains(&item) {
            seen.push(item);
        }
    }
    seen
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::BookingStatus;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case::absent(json!({"id": "w"}), true)]
    #[case::null(json!({"id": "w", "is_verified": null}), true)]
    #[case::verified(json!({"id": "w", "is_verified": true}), true)]
    #[case::rejected(json!({"id": "w", "is_verified": false}), false)]
    fn inclusion_follows_the_verification_flag(#[case] row: Value, #[case] kept: bool) {
        assert_eq!(normalize_workers(vec![row]).len(), usize::from(kept));
    }

    #[test]
    fn flat_row_becomes_structured_worker() {
        let row = json!({
            "id": 42,
            "first_name": "Karim",
            "last_name": "Saadi",
            "phone": "0550",
            "role": "worker",
            "wilaya": "Oran",
            "commune": "Es Senia",
            "category": "plumbing",
            "categories": ["plumbing", "tiling"],
            "skills": ["pipes", "pipes", " "],
            "rating": 4.5,
            "completed_jobs": 12,
            "reviews": [
                {"id": "r1", "author_id": "s1", "rating": 5.0, "comment": "ok",
                 "created_at": "2024-03-01T10:00:00Z"},
                {"broken": true}
            ]
        });

        let workers = normalize_workers(vec![row]);
        let worker = &workers[0];
        assert_eq!(worker.user.id, "42");
        assert_eq!(worker.user.location.label(), "Es Senia, Oran");
        assert_eq!(worker.categories, vec!["plumbing", "tiling"]);
        assert_eq!(worker.skills, vec!["pipes"]);
        assert_eq!(worker.completed_jobs, 12);
        assert_eq!(worker.reviews.len(), 1);
        assert_eq!(worker.primary_category(), Some("plumbing"));
    }

    #[rstest]
    #[case::text_rating(json!({"id": "w", "rating": "4.5"}), 4.5, 0)]
    #[case::negative_jobs(json!({"id": "w", "rating": 3.0, "completed_jobs": -2}), 3.0, 0)]
    #[case::text_jobs(json!({"id": "w", "completed_jobs": "7"}), 0.0, 7)]
    #[case::garbage(json!({"id": "w", "rating": [1], "completed_jobs": "lots"}), 0.0, 0)]
    fn drifted_numeric_columns_fall_back_to_defaults(
        #[case] row: Value,
        #[case] rating: f64,
        #[case] jobs: u32,
    ) {
        let worker = normalize_workers(vec![row]).remove(0);
        assert!((worker.rating - rating).abs() < f64::EPSILON);
        assert_eq!(worker.completed_jobs, jobs);
    }

    #[test]
    fn malformed_optional_columns_do_not_drop_the_row() {
        let row = json!({
            "id": "w",
            "first_name": "Sami",
            "role": "WORKER",
            "skills": "welding",
            "is_verified": "yes",
            "reviews": {"not": "a list"}
        });
        let worker = normalize_workers(vec![row]).remove(0);
        assert_eq!(worker.user.first_name, "Sami");
        assert_eq!(worker.user.role(), Role::Worker);
        assert!(worker.skills.is_empty());
        assert_eq!(worker.verified, None);

        let users = normalize_users(vec![json!({"id": "u", "role": "SEEKER"})]);
        assert!(users.is_empty(), "unknown role spellings are not guessed");
    }

    #[test]
    fn logged_in_users_keep_their_skills() {
        let row = json!({"id": "w", "role": "worker", "skills": ["pipes", "boilers"]});
        let user = normalize_users(vec![row]).remove(0);
        assert_eq!(user.skills, vec!["pipes", "boilers"]);
    }

    #[test]
    fn list_shaped_category_column_is_accepted() {
        let row = json!({"id": "w", "category": ["painting", "masonry"]});
        let worker = normalize_workers(vec![row]).remove(0);
        assert_eq!(worker.categories, vec!["painting", "masonry"]);
    }

    #[test]
    fn undecodable_rows_are_skipped_not_fatal() {
        let rows = vec![json!({"id": null}), json!("garbage"), json!({"id": "ok"})];
        let workers = normalize_workers(rows);
        assert_eq!(workers.len(), 1);
        assert_eq!(workers[0].user.id, "ok");
    }

    #[test]
    fn verification_status_prefers_explicit_column() {
        let rows = vec![
            json!({"id": "a", "role": "seeker", "verification_status": "pending"}),
            json!({"id": "b", "role": "worker", "is_verified": true}),
            json!({"id": "c"}),
        ];
        let users = normalize_users(rows);
        assert_eq!(users.len(), 2);
        assert_eq!(users[0].verification, Verification::Pending);
        assert_eq!(users[1].verification, Verification::Verified);
    }

    #[test]
    fn bookings_accept_numeric_ids() {
        let rows = vec![json!({
            "id": 7,
            "seeker_id": "s1",
            "status": "pending",
            "created_at": "2024-03-01T10:00:00Z"
        })];
        let bookings = normalize_bookings(rows);
        assert_eq!(bookings[0].id.as_deref(), Some("7"));
        assert_eq!(bookings[0].status, BookingStatus::Pending);
    }
}
