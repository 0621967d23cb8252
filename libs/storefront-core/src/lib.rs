//! Storefront Core - reporting periods, row storage and admin screen services
//!
//! This library backs the administration dashboard of a small online shop
//! whose data lives in a hosted PostgREST/GoTrue backend.
//!
//! # Features
//!
//! - **Reporting periods**: `PeriodSelector` values resolved into inclusive
//!   local date ranges against an injectable clock
//! - **Row storage**: a `RowStore` seam with in-memory and REST implementations
//! - **Screen services**: catalog, orders, customers, returns, favorites and
//!   the dashboard overview
//! - **Admin-only auth**: sign-in that admits administrator profiles only
//!
//! # Quick Start
//!
//! ```
//! use storefront_core::{DateRangeResolver, FixedClock, PeriodSelector};
//!
//! let resolver = DateRangeResolver::with_clock(FixedClock::at(2024, 2, 10, 9, 0, 0).unwrap());
//! let range = resolver
//!     .resolve(&PeriodSelector::SpecificMonth { month: 1, year: 2024 })
//!     .unwrap();
//! assert_eq!(range.to_string(), "2024-02-01T00:00:00.000 .. 2024-02-29T23:59:59.999");
//! ```
//!
//! # Crate Features
//!
//! - `test-utils`: seeded in-memory tables and an in-memory auth provider

pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod period;
pub mod query;
pub mod services;
pub mod store;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use auth::{AuthProvider, AuthService, AuthState, AuthUser, RestAuth};
pub use config::{ConfigLoader, StorefrontConfig};
pub use error::{Result, StorefrontError};
pub use models::*;
pub use period::{
    Clock, DateRange, DateRangeResolver, FixedClock, PeriodForm, PeriodKind, PeriodSelector,
    SystemClock, UtcBounds,
};
pub use query::{FilterOp, RowQuery};
pub use services::{
    OrderFilter, ProductFilter, ProductSort, ReturnFilter, ServiceSettings, Storefront,
};
pub use store::{AccessToken, MemoryStore, RestStore, Row, RowStore};
