//! Domain layer for the Hirafi plugin.
//!
//! Core marketplace types, independent of Zellij APIs and of the store
//! dialect used to fetch them.
//!
//! # Organization
//!
//! - [`error`]: Error types and result aliases
//! - [`user`]: Users, workers and reviews
//! - [`filter`]: The search filter value object
//! - [`booking`]: Booking requests and their status
//! - [`catalog`]: Static wilaya and category catalogs
//!
//! # Examples
//!
//! ```
//! use hirafi::domain::{Filter, Result};
//!
//! fn region_only() -> Result<Filter> {
//!     Ok(Filter {
//!         region: "Algiers".to_string(),
//!         ..Filter::default()
//!     })
//! }
//! ```

pub mod booking;
pub mod catalog;
pub mod error;
pub mod filter;
pub mod user;

pub use booking::{Booking, BookingStatus};
pub use error::{HirafiError, Result};
pub use filter::{Filter, FilterField};
pub use user::{Location, Review, Role, User, Verification, Worker};
