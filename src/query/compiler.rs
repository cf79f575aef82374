//! Filter-to-query compilation.
//!
//! Turns the sparse [`Filter`] held in UI state into a [`Query`]. Only present
//! fields contribute predicates; an empty filter selects every worker.
//!
//! The `category` column is not shaped the same in every deployment: older
//! tables store a single category string, newer ones an array of categories.
//! [`WorkerSchema::category_shape`] tells the compiler which predicate form to
//! emit.

use super::{Predicate, Query};
use crate::domain::{BookingStatus, Filter, Role};

/// Storage shape of the category column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CategoryShape {
    /// One category per row; matched with equality.
    #[default]
    Scalar,
    /// Array of categories per row; matched with set membership.
    List,
}

impl CategoryShape {
    /// Parses `scalar` or `list`; anything else is `None`.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "scalar" => Some(Self::Scalar),
            "list" | "array" => Some(Self::List),
            _ => None,
        }
    }
}

/// Column layout of the users table as seen by the compiler and normalizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerSchema {
    pub users_table: String,
    pub bookings_table: String,
    pub role_field: String,
    pub region_field: String,
    pub category_field: String,
    pub category_shape: CategoryShape,
    /// Columns searched by the free-text query, alongside `bio_field`.
    pub name_fields: Vec<String>,
    pub bio_field: String,
    pub phone_field: String,
}

impl Default for WorkerSchema {
    fn default() -> Self {
        Self {
            users_table: "users".to_string(),
            bookings_table: "bookings".to_string(),
            role_field: "role".to_string(),
            region_field: "wilaya".to_string(),
            category_field: "category".to_string(),
            category_shape: CategoryShape::Scalar,
            name_fields: vec!["first_name".to_string(), "last_name".to_string()],
            bio_field: "bio".to_string(),
            phone_field: "phone".to_string(),
        }
    }
}

/// Compiles a search filter into a worker query.
///
/// - Always constrains the role to `worker`.
/// - A present region adds an exact match on the region column.
/// - A present category adds equality or set membership, per the schema.
/// - A present free-text query adds a case-insensitive substring match on
///   any name column or the bio.
///
/// # Examples
///
/// ```
/// use hirafi::domain::Filter;
/// use hirafi::query::{compile_filter, WorkerSchema};
///
/// let query = compile_filter(&Filter::default(), &WorkerSchema::default());
/// assert_eq!(query.predicates.len(), 1);
/// ```
#[must_use]
pub fn compile_filter(filter: &Filter, schema: &WorkerSchema) -> Query {
    let _span = tracing::debug_span!("compile_filter",
        has_query = filter.query().is_some(),
        has_region = filter.region().is_some(),
        has_category = filter.category().is_some()
    )
    .entered();

    let mut query = Query::new(&schema.users_table)
        .with(Predicate::eq(&schema.role_field, Role::Worker.as_str()));

    if let Some(region) = filter.region() {
        query = query.with(Predicate::eq(&schema.region_field, region));
    }

    if let Some(category) = filter.category() {
        query = query.with(match schema.category_shape {
            CategoryShape::Scalar => Predicate::eq(&schema.category_field, category),
            CategoryShape::List => Predicate::contains(&schema.category_field, category),
        });
    }

    if let Some(text) = filter.query() {
        let branches = schema
            .name_fields
            .iter()
            .chain(std::iter::once(&schema.bio_field))
            .map(|field| Predicate::ilike(field, text))
            .collect();
        query = query.with(Predicate::Any(branches));
    }

    tracing::debug!(predicate_count = query.predicates.len(), "filter compiled");
    query
}

/// Compiles the login lookup: users whose phone matches exactly.
#[must_use]
pub fn compile_user_lookup(phone: &str, schema: &WorkerSchema) -> Query {
    Query::new(&schema.users_table).with(Predicate::eq(&schema.phone_field, phone.trim()))
}

/// Compiles the query listing bookings still waiting for a worker.
#[must_use]
pub fn compile_pending_bookings(schema: &WorkerSchema) -> Query {
    Query::new(&schema.bookings_table)
        .with(Predicate::eq("status", BookingStatus::Pending.as_str()))
}

/// Compiles the query listing every booking a seeker has made.
#[must_use]
pub fn compile_seeker_bookings(seeker_id: &str, schema: &WorkerSchema) -> Query {
    Query::new(&schema.bookings_table).with(Predicate::eq("seeker_id", seeker_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn records() -> Vec<Value> {
        vec![
            json!({"id": "1", "role": "worker", "first_name": "Karim", "last_name": "Saadi",
                   "bio": "Plombier depuis 10 ans", "wilaya": "Algiers", "category": "plumbing",
                   "categories": ["plumbing"]}),
            json!({"id": "2", "role": "worker", "first_name": "Samir", "last_name": "Hadj",
                   "bio": "Electricien", "wilaya": "Oran", "category": "electricity",
                   "categories": ["electricity", "plumbing"]}),
            json!({"id": "3", "role": "worker", "first_name": "Lina", "last_name": "Brahimi",
                   "bio": "", "wilaya": "Algiers", "category": "painting",
                   "categories": ["painting"]}),
            json!({"id": "4", "role": "seeker", "first_name": "Karima", "last_name": "Ould",
                   "bio": "", "wilaya": "Algiers"}),
        ]
    }

    fn ids(query: &Query) -> Vec<String> {
        records()
            .into_iter()
            .filter(|r| query.matches(r))
            .filter_map(|r| r["id"].as_str().map(String::from))
            .collect()
    }

    #[test]
    fn empty_filter_only_constrains_role() {
        let query = compile_filter(&Filter::default(), &WorkerSchema::default());
        assert_eq!(query.predicates, vec![Predicate::eq("role", "worker")]);
        assert_eq!(ids(&query), vec!["1", "2", "3"]);
    }

    #[test]
    fn region_filter_keeps_only_that_region() {
        let filter = Filter {
            region: "Algiers".to_string(),
            ..Filter::default()
        };
        let query = compile_filter(&filter, &WorkerSchema::default());
        assert_eq!(ids(&query), vec!["1", "3"]);
    }

    #[test]
    fn region_and_category_intersect() {
        let schema = WorkerSchema::default();
        let both = Filter {
            region: "Algiers".to_string(),
            category: "plumbing".to_string(),
            ..Filter::default()
        };
        let region_only = Filter {
            region: "Algiers".to_string(),
            ..Filter::default()
        };
        let category_only = Filter {
            category: "plumbing".to_string(),
            ..Filter::default()
        };

        let result = ids(&compile_filter(&both, &schema));
        let by_region = ids(&compile_filter(&region_only, &schema));
        let by_category = ids(&compile_filter(&category_only, &schema));

        assert_eq!(result, vec!["1"]);
        assert!(result.iter().all(|id| by_region.contains(id) && by_category.contains(id)));
    }

    #[test]
    fn list_shaped_category_uses_set_membership() {
        let schema = WorkerSchema {
            category_field: "categories".to_string(),
            category_shape: CategoryShape::List,
            ..WorkerSchema::default()
        };
        let filter = Filter {
            category: "plumbing".to_string(),
            ..Filter::default()
        };
        let query = compile_filter(&filter, &schema);
        assert!(query
            .predicates
            .contains(&Predicate::contains("categories", "plumbing")));
        assert_eq!(ids(&query), vec!["1", "2"]);
    }

    #[test]
    fn free_text_matches_name_or_bio_ignoring_case() {
        let schema = WorkerSchema::default();
        for text in ["KARIM", "karim", "plombier", "PLOMB", "hadj"] {
            let filter = Filter {
                query: text.to_string(),
                ..Filter::default()
            };
            let matched = ids(&compile_filter(&filter, &schema));
            assert!(!matched.is_empty(), "{text} should match a worker");
            assert!(!matched.contains(&"4".to_string()), "seekers never match");
        }
    }

    #[test]
    fn free_text_renders_an_or_parameter() {
        let filter = Filter {
            query: "karim".to_string(),
            ..Filter::default()
        };
        let params = compile_filter(&filter, &WorkerSchema::default()).to_params();
        assert!(params.contains(&(
            "or".to_string(),
            "(first_name.ilike.*karim*,last_name.ilike.*karim*,bio.ilike.*karim*)".to_string()
        )));
    }

    #[test]
    fn category_shape_parses_known_values() {
        assert_eq!(CategoryShape::parse("LIST"), Some(CategoryShape::List));
        assert_eq!(CategoryShape::parse("scalar"), Some(CategoryShape::Scalar));
        assert_eq!(CategoryShape::parse("tree"), None);
    }

    #[test]
    fn user_lookup_trims_phone() {
        let query = compile_user_lookup(" 0550 ", &WorkerSchema::default());
        assert_eq!(query.predicates, vec![Predicate::eq("phone", "0550")]);
    }
}
