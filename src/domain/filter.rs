//! Search filter value object.
//!
//! A [`Filter`] is the sparse set of criteria a seeker types into the search
//! bar. It never leaves the client: the query compiler turns it into a store
//! query, and it is discarded with the rest of the UI state.

use serde::{Deserialize, Serialize};

/// Editable field of the filter bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FilterField {
    Query,
    Region,
    Category,
}

impl FilterField {
    /// Field that receives focus after this one when cycling with Tab.
    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            Self::Query => Self::Region,
            Self::Region => Self::Category,
            Self::Category => Self::Query,
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Query => "Search",
            Self::Region => "Wilaya",
            Self::Category => "Craft",
        }
    }
}

/// Free-text, region and category criteria; empty strings mean "absent".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filter {
    pub query: String,
    pub region: String,
    pub category: String,
}

impl Filter {
    /// Returns the trimmed free-text query, or `None` when blank.
    #[must_use]
    pub fn query(&self) -> Option<&str> {
        present(&self.query)
    }

    #[must_use]
    pub fn region(&self) -> Option<&str> {
        present(&self.region)
    }

    #[must_use]
    pub fn category(&self) -> Option<&str> {
        present(&self.category)
    }

    /// True when no field constrains the search.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.query().is_none() && self.region().is_none() && self.category().is_none()
    }

    #[must_use]
    pub fn field(&self, field: FilterField) -> &str {
        match field {
            FilterField::Query => &self.query,
            FilterField::Region => &self.region,
            FilterField::Category => &self.category,
        }
    }

    pub fn field_mut(&mut self, field: FilterField) -> &mut String {
        match field {
            FilterField::Query => &mut self.query,
            FilterField::Region => &mut self.region,
            FilterField::Category => &mut self.category,
        }
    }
}

fn present(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whitespace_only_fields_are_absent() {
        let filter = Filter {
            query: "   ".to_string(),
            region: String::new(),
            category: "\t".to_string(),
        };
        assert!(filter.is_empty());
        assert_eq!(filter.query(), None);
    }

    #[test]
    fn present_fields_are_trimmed() {
        let filter = Filter {
            region: " Oran ".to_string(),
            ..Filter::default()
        };
        assert_eq!(filter.region(), Some("Oran"));
        assert!(!filter.is_empty());
    }

    #[test]
    fn tab_cycles_through_all_fields() {
        let mut field = FilterField::Query;
        for _ in 0..3 {
            field = field.next();
        }
        assert_eq!(field, FilterField::Query);
    }
}
