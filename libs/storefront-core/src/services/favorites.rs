//! Wishlist analytics screen

use super::Storefront;
use crate::error::Result;
use crate::models::{Favorite, FavoriteDetail, FavoriteProduct, FavoriteSummary};
use crate::period::DateRange;
use crate::query::RowQuery;
use crate::store::{from_rows, str_field, tables, RowStore};
use std::collections::HashMap;
use tracing::{debug, instrument};

const PRODUCT_COLUMNS: [&str; 6] = ["id", "name", "brand", "favorite_count", "stock", "status"];

pub struct FavoriteService<'a, S> {
    ctx: &'a Storefront<S>,
}

impl<'a, S: RowStore> FavoriteService<'a, S> {
    pub(crate) const fn new(ctx: &'a Storefront<S>) -> Self {
        Self { ctx }
    }

    /// Products ranked by how often they were favorited
    ///
    /// For the all-time range this is the stored per-product counter. For a
    /// bounded range the favorites created inside it are counted per product,
    /// and products nobody favorited in the range are left out.
    ///
    /// # Errors
    /// Returns an error if a store query fails or a row is malformed
    #[instrument(skip(self, range), fields(range = %range))]
    pub async fn ranking(&self, range: &DateRange) -> Result<Vec<FavoriteProduct>> {
        let Some(window) = self.ctx.window(range)? else {
            let rows = self
                .ctx
                .store()
                .select(
                    &RowQuery::table(tables::PRODUCTS)
                        .select(&PRODUCT_COLUMNS)
                        .order("favorite_count", false),
                )
                .await?;
            return from_rows(rows);
        };

        let favorite_rows = self
            .ctx
            .store()
            .select(
                &RowQuery::table(tables::FAVORITES)
                    .select(&["product_id"])
                    .within("created_at", Some(&window)),
            )
            .await?;
        let mut counts: HashMap<String, i64> = HashMap::new();
        for row in &favorite_rows {
            if let Some(product_id) = str_field(row, "product_id") {
                *counts.entry(product_id.to_string()).or_default() += 1;
            }
        }
        debug!(favorites = favorite_rows.len(), products = counts.len(), "favorites in range");
        if counts.is_empty() {
            return Ok(Vec::new());
        }

        let product_rows = self
            .ctx
            .store()
            .select(
                &RowQuery::table(tables::PRODUCTS)
                    .select(&PRODUCT_COLUMNS)
                    .in_list("id", counts.keys().map(String::as_str)),
            )
            .await?;
        let mut products: Vec<FavoriteProduct> = from_rows(product_rows)?;
        for product in &mut products {
            product.favorite_count = counts.get(&product.id).copied().unwrap_or(0);
        }
        products.sort_by(|a, b| {
            b.favorite_count
                .cmp(&a.favorite_count)
                .then_with(|| a.name.cmp(&b.name))
        });
        Ok(products)
    }

    /// Who favorited a product within `range`, newest first
    ///
    /// Favorites whose profile no longer exists are skipped.
    ///
    /// # Errors
    /// Returns an error if a store query fails or a row is malformed
    #[instrument(skip(self, range), fields(range = %range))]
    pub async fn details(&self, product_id: &str, range: &DateRange) -> Result<Vec<FavoriteDetail>> {
        let window = self.ctx.window(range)?;
        let rows = self
            .ctx
            .store()
            .select(
                &RowQuery::table(tables::FAVORITES)
                    .eq("product_id", product_id)
                    .within("created_at", window.as_ref())
                    .order("created_at", false),
            )
            .await?;
        let favorites: Vec<Favorite> = from_rows(rows)?;
        let profiles = self
            .ctx
            .customer_refs(favorites.iter().map(|f| f.user_id.as_str()))
            .await?;

        Ok(favorites
            .into_iter()
            .filter_map(|favorite| {
                let profile = profiles.get(&favorite.user_id)?;
                Some(FavoriteDetail {
                    user_name: profile
                        .name
                        .clone()
                        .filter(|name| !name.is_empty())
                        .unwrap_or_else(|| "Unknown".to_string()),
                    user_email: profile.email.clone(),
                    user_id: favorite.user_id,
                    created_at: favorite.created_at,
                })
            })
            .collect())
    }
}

/// Headline numbers for a ranking as returned by [`FavoriteService::ranking`]
///
/// The average is rounded half up; the top product is the first entry.
#[must_use]
pub fn summarize(ranking: &[FavoriteProduct]) -> FavoriteSummary {
    let total: i64 = ranking.iter().map(|p| p.favorite_count).sum();
    let average = match i64::try_from(ranking.len()) {
        Ok(len) if len > 0 => (2 * total + len) / (2 * len),
        _ => 0,
    };
    FavoriteSummary {
        total,
        average,
        top: ranking.first().cloned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ProductStatus;

    fn ranked(id: &str, count: i64) -> FavoriteProduct {
        FavoriteProduct {
            id: id.into(),
            name: id.into(),
            brand: "Nike".into(),
            favorite_count: count,
            stock: 10,
            status: ProductStatus::Active,
        }
    }

    #[test]
    fn test_summarize() {
        let summary = summarize(&[ranked("a", 5), ranked("b", 2)]);
        assert_eq!(summary.total, 7);
        // 3.5 rounds up
        assert_eq!(summary.average, 4);
        assert_eq!(summary.top.unwrap().id, "a");
    }

    #[test]
    fn test_summarize_rounds_down_below_half() {
        let summary = summarize(&[ranked("a", 4), ranked("b", 0), ranked("c", 0)]);
        assert_eq!(summary.average, 1);
    }

    #[test]
    fn test_summarize_empty() {
        let summary = summarize(&[]);
        assert_eq!(summary.total, 0);
        assert_eq!(summary.average, 0);
        assert!(summary.top.is_none());
    }
}
