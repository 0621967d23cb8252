//! Services behind each admin screen
//!
//! A [`Storefront`] bundles the row store with the operator's UTC offset and
//! the dashboard settings; each screen borrows it through an accessor such as
//! [`Storefront::orders`]. Date ranges arrive on the operator's local calendar
//! and are converted to UTC here, so services only see transport bounds.

pub mod catalog;
pub mod customers;
pub mod dashboard;
pub mod favorites;
pub mod orders;
pub mod returns;

pub use catalog::{CatalogService, ProductFilter, ProductSort};
pub use customers::CustomerService;
pub use dashboard::DashboardService;
pub use favorites::FavoriteService;
pub use orders::{OrderFilter, OrderService};
pub use returns::{ReturnFilter, ReturnService};

use crate::config::StorefrontConfig;
use crate::error::Result;
use crate::models::CustomerRef;
use crate::period::{DateRange, UtcBounds};
use crate::query::RowQuery;
use crate::store::{from_rows, tables, RowStore};
use chrono::FixedOffset;
use std::collections::{HashMap, HashSet};
use storefront_common::{DEFAULT_TOP_LIMIT, DEFAULT_TREND_DAYS, LOW_STOCK_THRESHOLD};

/// Tunables of the dashboard screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServiceSettings {
    pub low_stock_threshold: i64,
    pub trend_days: u32,
    pub top_limit: usize,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            low_stock_threshold: LOW_STOCK_THRESHOLD,
            trend_days: DEFAULT_TREND_DAYS,
            top_limit: DEFAULT_TOP_LIMIT,
        }
    }
}

impl From<&StorefrontConfig> for ServiceSettings {
    fn from(config: &StorefrontConfig) -> Self {
        Self {
            low_stock_threshold: config.low_stock_threshold,
            trend_days: config.trend_days,
            top_limit: config.top_limit,
        }
    }
}

/// Entry point to the screen services
#[derive(Debug, Clone)]
pub struct Storefront<S> {
    store: S,
    offset: FixedOffset,
    settings: ServiceSettings,
}

impl<S: RowStore> Storefront<S> {
    /// Services over `store`, using the configured offset and settings
    pub fn new(store: S, config: &StorefrontConfig) -> Self {
        Self::with_offset(store, config.utc_offset(), ServiceSettings::from(config))
    }

    pub const fn with_offset(store: S, offset: FixedOffset, settings: ServiceSettings) -> Self {
        Self {
            store,
            offset,
            settings,
        }
    }

    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Offset of the operator's calendar from UTC
    pub const fn offset(&self) -> FixedOffset {
        self.offset
    }

    pub const fn settings(&self) -> &ServiceSettings {
        &self.settings
    }

    pub const fn catalog(&self) -> CatalogService<'_, S> {
        CatalogService::new(self)
    }

    pub const fn orders(&self) -> OrderService<'_, S> {
        OrderService::new(self)
    }

    pub const fn customers(&self) -> CustomerService<'_, S> {
        CustomerService::new(self)
    }

    pub const fn returns(&self) -> ReturnService<'_, S> {
        ReturnService::new(self)
    }

    pub const fn favorites(&self) -> FavoriteService<'_, S> {
        FavoriteService::new(self)
    }

    pub const fn dashboard(&self) -> DashboardService<'_, S> {
        DashboardService::new(self)
    }

    /// UTC transport bounds of a local range; `None` when unbounded
    pub(crate) fn window(&self, range: &DateRange) -> Result<Option<UtcBounds>> {
        range.to_utc(&self.offset)
    }

    /// Names and emails of the given profiles, keyed by profile id
    pub(crate) async fn customer_refs(
        &self,
        ids: impl IntoIterator<Item = &str>,
    ) -> Result<HashMap<String, CustomerRef>> {
        let ids: HashSet<&str> = ids.into_iter().collect();
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let rows = self
            .store
            .select(
                &RowQuery::table(tables::PROFILES)
                    .select(&["id", "name", "email"])
                    .in_list("id", ids),
            )
            .await?;
        let refs: Vec<ProfileRef> = from_rows(rows)?;
        Ok(refs
            .into_iter()
            .map(|p| {
                (
                    p.id,
                    CustomerRef {
                        name: p.name,
                        email: p.email,
                    },
                )
            })
            .collect())
    }
}

#[derive(serde::Deserialize)]
struct ProfileRef {
    id: String,
    #[serde(default)]
    name: Option<String>,
    email: String,
}

/// Case-insensitive substring match; an empty needle matches everything
pub(crate) fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    needle.is_empty() || haystack.to_lowercase().contains(&needle.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[test]
    fn test_settings_from_config() {
        let mut config = StorefrontConfig::default();
        config.top_limit = 10;
        config.utc_offset_minutes = Some(420);
        let storefront = Storefront::new(MemoryStore::new(), &config);
        assert_eq!(storefront.settings().top_limit, 10);
        assert_eq!(storefront.settings().low_stock_threshold, 5);
        assert_eq!(storefront.offset().local_minus_utc(), 7 * 3600);
    }

    #[test]
    fn test_contains_ignore_case() {
        assert!(contains_ignore_case("Phantom GX Elite", "gx"));
        assert!(contains_ignore_case("anything", ""));
        assert!(!contains_ignore_case("Nike", "puma"));
    }
}
