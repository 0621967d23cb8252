//! Product catalog screen

use super::{contains_ignore_case, Storefront};
use crate::error::{Result, StorefrontError};
use crate::models::{Product, ProductInput};
use crate::query::RowQuery;
use crate::store::{from_row, from_rows, tables, RowStore};
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use tracing::{info, instrument};

/// Sort orders offered by the product list
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProductSort {
    #[default]
    Newest,
    NameAsc,
    NameDesc,
    PriceAsc,
    PriceDesc,
    StockAsc,
    StockDesc,
}

impl ProductSort {
    pub const ALL: [Self; 7] = [
        Self::Newest,
        Self::NameAsc,
        Self::NameDesc,
        Self::PriceAsc,
        Self::PriceDesc,
        Self::StockAsc,
        Self::StockDesc,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Newest => "newest",
            Self::NameAsc => "name-asc",
            Self::NameDesc => "name-desc",
            Self::PriceAsc => "price-asc",
            Self::PriceDesc => "price-desc",
            Self::StockAsc => "stock-asc",
            Self::StockDesc => "stock-desc",
        }
    }

    /// Sort products in place; ties keep their incoming order
    pub fn apply(self, products: &mut [Product]) {
        match self {
            Self::Newest => products.sort_by_key(|p| Reverse(p.created_at)),
            Self::NameAsc => products.sort_by_key(|p| p.name.to_lowercase()),
            Self::NameDesc => products.sort_by_key(|p| Reverse(p.name.to_lowercase())),
            Self::PriceAsc => products.sort_by_key(|p| p.price),
            Self::PriceDesc => products.sort_by_key(|p| Reverse(p.price)),
            Self::StockAsc => products.sort_by_key(|p| p.stock),
            Self::StockDesc => products.sort_by_key(|p| Reverse(p.stock)),
        }
    }
}

impl fmt::Display for ProductSort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProductSort {
    type Err = StorefrontError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|sort| sort.as_str() == s)
            .ok_or_else(|| StorefrontError::invalid_argument(format!("unknown product sort '{s}'")))
    }
}

/// Search box and brand dropdown of the product list
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductFilter {
    /// Matched against name and brand, ignoring case
    pub search: Option<String>,
    /// Exact brand
    pub brand: Option<String>,
}

impl ProductFilter {
    #[must_use]
    pub fn matches(&self, product: &Product) -> bool {
        let search = self.search.as_deref().unwrap_or("").trim();
        let matches_search = contains_ignore_case(&product.name, search)
            || contains_ignore_case(&product.brand, search);
        let matches_brand = self
            .brand
            .as_deref()
            .filter(|brand| !brand.is_empty())
            .map_or(true, |brand| product.brand == brand);
        matches_search && matches_brand
    }
}

pub struct CatalogService<'a, S> {
    ctx: &'a Storefront<S>,
}

impl<'a, S: RowStore> CatalogService<'a, S> {
    pub(crate) const fn new(ctx: &'a Storefront<S>) -> Self {
        Self { ctx }
    }

    /// Products matching the filter, in the requested order
    ///
    /// # Errors
    /// Returns an error if the store query fails or a row is malformed
    #[instrument(skip(self))]
    pub async fn list(&self, filter: &ProductFilter, sort: ProductSort) -> Result<Vec<Product>> {
        let rows = self
            .ctx
            .store()
            .select(&RowQuery::table(tables::PRODUCTS).order("created_at", false))
            .await?;
        let mut products: Vec<Product> = from_rows(rows)?;
        products.retain(|product| filter.matches(product));
        sort.apply(&mut products);
        Ok(products)
    }

    /// # Errors
    /// Returns `NotFound` if no product has this id
    pub async fn get(&self, id: &str) -> Result<Product> {
        let mut rows = self
            .ctx
            .store()
            .select(&RowQuery::table(tables::PRODUCTS).eq("id", id).limit(1))
            .await?;
        match rows.pop() {
            Some(row) => from_row(row),
            None => Err(StorefrontError::not_found("Product", id)),
        }
    }

    /// Distinct brands, sorted
    ///
    /// # Errors
    /// Returns an error if the store query fails
    pub async fn brands(&self) -> Result<Vec<String>> {
        let rows = self
            .ctx
            .store()
            .select(&RowQuery::table(tables::PRODUCTS).select(&["brand"]))
            .await?;
        let brands: BTreeSet<String> = rows
            .iter()
            .filter_map(|row| crate::store::str_field(row, "brand"))
            .filter(|brand| !brand.is_empty())
            .map(str::to_string)
            .collect();
        Ok(brands.into_iter().collect())
    }

    /// # Errors
    /// Returns `Validation` for an invalid input, or a store error
    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create(&self, input: &ProductInput) -> Result<Product> {
        input.validate()?;
        let mut row = input.to_row();
        row.insert("favorite_count".into(), 0.into());
        let stored = self.ctx.store().insert(tables::PRODUCTS, row).await?;
        let product: Product = from_row(stored)?;
        info!(id = %product.id, "created product");
        Ok(product)
    }

    /// # Errors
    /// Returns `Validation` for an invalid input or `NotFound` for an unknown id
    #[instrument(skip(self, input))]
    pub async fn update(&self, id: &str, input: &ProductInput) -> Result<Product> {
        input.validate()?;
        let changed = self
            .ctx
            .store()
            .update(&RowQuery::table(tables::PRODUCTS).eq("id", id), input.to_row())
            .await?;
        if changed == 0 {
            return Err(StorefrontError::not_found("Product", id));
        }
        info!(id, "updated product");
        self.get(id).await
    }

    /// # Errors
    /// Returns `NotFound` if no product has this id
    #[instrument(skip(self))]
    pub async fn delete(&self, id: &str) -> Result<()> {
        let removed = self
            .ctx
            .store()
            .delete(&RowQuery::table(tables::PRODUCTS).eq("id", id))
            .await?;
        if removed == 0 {
            return Err(StorefrontError::not_found("Product", id));
        }
        info!(id, "deleted product");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ProductStatus;
    use chrono::{TimeZone, Utc};

    fn product(id: &str, name: &str, brand: &str, price: i64, stock: i64, day: u32) -> Product {
        Product {
            id: id.into(),
            name: name.into(),
            brand: brand.into(),
            category: "Football".into(),
            price,
            stock,
            status: ProductStatus::Active,
            images: Vec::new(),
            video_url: None,
            favorite_count: 0,
            created_at: Utc.with_ymd_and_hms(2026, 1, day, 0, 0, 0).single(),
        }
    }

    fn products() -> Vec<Product> {
        vec![
            product("a", "Phantom GX", "Nike", 3_500_000, 24, 1),
            product("b", "copa pure", "Adidas", 2_800_000, 2, 3),
            product("c", "Future 7", "Puma", 1_950_000, 10, 2),
        ]
    }

    fn ids(products: &[Product]) -> Vec<&str> {
        products.iter().map(|p| p.id.as_str()).collect()
    }

    #[test]
    fn test_sort_keys_parse() {
        for sort in ProductSort::ALL {
            assert_eq!(sort.as_str().parse::<ProductSort>().unwrap(), sort);
        }
        assert!("cheapest".parse::<ProductSort>().is_err());
    }

    #[test]
    fn test_sorting() {
        let mut list = products();
        ProductSort::Newest.apply(&mut list);
        assert_eq!(ids(&list), ["b", "c", "a"]);
        ProductSort::NameAsc.apply(&mut list);
        assert_eq!(ids(&list), ["b", "c", "a"]);
        ProductSort::PriceDesc.apply(&mut list);
        assert_eq!(ids(&list), ["a", "b", "c"]);
        ProductSort::StockAsc.apply(&mut list);
        assert_eq!(ids(&list), ["b", "c", "a"]);
    }

    #[test]
    fn test_filter() {
        let list = products();
        let by_search = ProductFilter {
            search: Some("PUMA".into()),
            brand: None,
        };
        assert_eq!(list.iter().filter(|p| by_search.matches(p)).count(), 1);

        let by_brand = ProductFilter {
            search: None,
            brand: Some("Nike".into()),
        };
        let matched: Vec<_> = list.iter().filter(|p| by_brand.matches(p)).collect();
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].id, "a");

        assert!(list.iter().all(|p| ProductFilter::default().matches(p)));
    }
}
