//! User and worker domain models.
//!
//! A [`User`] is the identity record shared by every marketplace actor. A
//! [`Worker`] is a user listed in the marketplace, carrying the searchable
//! craft attributes plus externally computed reputation data.

use serde::{Deserialize, Serialize};

/// Marketplace role of a user.
///
/// Fixed at account creation; [`User`] exposes no way to change it.
///
/// The store holds roles in lowercase, the same spelling searches compare
/// against, so no other spelling is accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Independent craftsman offering services.
    Worker,
    /// Customer looking for a service.
    Seeker,
    /// Back-office actor reviewing identities.
    Admin,
}

impl Role {
    /// Returns the value stored in the `role` column.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Worker => "worker",
            Self::Seeker => "seeker",
            Self::Admin => "admin",
        }
    }
}

/// Identity review state, moved forward only by an administrator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verification {
    #[default]
    Unverified,
    Pending,
    Verified,
}

/// Administrative location of a user: wilaya plus commune.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub region: String,
    pub sub_region: Option<String>,
}

impl Location {
    /// Formats the location as `commune, wilaya`, or just the wilaya.
    #[must_use]
    pub fn label(&self) -> String {
        match self.sub_region.as_deref().filter(|s| !s.is_empty()) {
            Some(sub) => format!("{sub}, {}", self.region),
            None => self.region.clone(),
        }
    }
}

/// Identity record for any marketplace actor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    role: Role,
    #[serde(default)]
    pub location: Location,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub verification: Verification,
    #[serde(default)]
    pub id_documents: Vec<String>,
    /// Skills a worker lists on their profile; empty for other roles.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skills: Vec<String>,
}

impl User {
    /// Creates a user with the given identity and role; every other field
    /// starts empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use hirafi::domain::{Role, User};
    ///
    /// let user = User::new("u-1", "Amina", "Khelifi", "0550123456", Role::Seeker);
    /// assert_eq!(user.full_name(), "Amina Khelifi");
    /// assert_eq!(user.role(), Role::Seeker);
    /// ```
    pub fn new(
        id: impl Into<String>,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        phone: impl Into<String>,
        role: Role,
    ) -> Self {
        Self {
            id: id.into(),
            first_name: first_name.into(),
            last_name: last_name.into(),
            phone: phone.into(),
            role,
            location: Location::default(),
            avatar_url: None,
            bio: String::new(),
            category: None,
            verification: Verification::default(),
            id_documents: Vec::new(),
            skills: Vec::new(),
        }
    }

    #[must_use]
    pub const fn role(&self) -> Role {
        self.role
    }

    #[must_use]
    pub fn is_worker(&self) -> bool {
        self.role == Role::Worker
    }

    /// Returns `first last`, skipping whichever part is empty.
    #[must_use]
    pub fn full_name(&self) -> String {
        [self.first_name.trim(), self.last_name.trim()]
            .into_iter()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// A review left by a seeker after a completed job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub id: String,
    pub author_id: String,
    pub rating: f64,
    #[serde(default)]
    pub comment: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// A user listed in the marketplace as a service provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Worker {
    pub user: User,
    /// Every category the worker serves; the first one is the primary craft.
    pub categories: Vec<String>,
    pub skills: Vec<String>,
    pub rating: f64,
    pub completed_jobs: u32,
    pub reviews: Vec<Review>,
    /// Raw verification flag as stored; `None` when the column is absent.
    pub verified: Option<bool>,
}

impl Worker {
    /// Returns the primary category, falling back to the user's own field.
    #[must_use]
    pub fn primary_category(&self) -> Option<&str> {
        self.categories
            .first()
            .map(String::as_str)
            .or(self.user.category.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_uses_the_lowercase_column_spelling() {
        let role: Role = serde_json::from_str("\"worker\"").unwrap();
        assert_eq!(role, Role::Worker);
        assert!(serde_json::from_str::<Role>("\"WORKER\"").is_err());
        assert_eq!(serde_json::to_string(&Role::Seeker).unwrap(), "\"seeker\"");
    }

    #[test]
    fn full_name_skips_blank_parts() {
        let user = User::new("1", "Yacine", "  ", "0", Role::Worker);
        assert_eq!(user.full_name(), "Yacine");
    }

    #[test]
    fn location_label_includes_commune_when_known() {
        let location = Location {
            region: "Oran".to_string(),
            sub_region: Some("Bir El Djir".to_string()),
        };
        assert_eq!(location.label(), "Bir El Djir, Oran");
        assert_eq!(Location { sub_region: None, ..location }.label(), "Oran");
    }
}
