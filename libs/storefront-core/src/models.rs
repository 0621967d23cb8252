//! Data models for storefront entities
//!
//! Field names follow the column names of the hosted tables so rows
//! deserialize directly.

use crate::error::{Result, StorefrontError};
use crate::store::Row;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;
use std::str::FromStr;

/// Amount in whole rupiah
pub type Money = i64;

/// Catalog visibility of a product
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductStatus {
    Active,
    Inactive,
    LowStock,
}

impl ProductStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
            Self::LowStock => "low_stock",
        }
    }
}

impl FromStr for ProductStatus {
    type Err = StorefrontError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "active" => Ok(Self::Active),
            "inactive" => Ok(Self::Inactive),
            "low_stock" => Ok(Self::LowStock),
            other => Err(StorefrontError::invalid_argument(format!(
                "unknown product status '{other}'"
            ))),
        }
    }
}

/// Product row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub brand: String,
    pub category: String,
    pub price: Money,
    pub stock: i64,
    pub status: ProductStatus,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub video_url: Option<String>,
    #[serde(default)]
    pub favorite_count: i64,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Fields an operator edits when creating or updating a product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductInput {
    pub name: String,
    pub brand: String,
    pub category: String,
    pub price: Money,
    pub stock: i64,
    pub status: ProductStatus,
    /// Single image URL (or data URL); blank means no image
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub video_url: Option<String>,
}

impl ProductInput {
    /// Check the fields an operator must fill in
    ///
    /// # Errors
    /// Returns `Validation` for a blank name or brand, or negative price or stock
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(StorefrontError::validation("product name is required"));
        }
        if self.brand.trim().is_empty() {
            return Err(StorefrontError::validation("product brand is required"));
        }
        if self.price < 0 {
            return Err(StorefrontError::validation("price cannot be negative"));
        }
        if self.stock < 0 {
            return Err(StorefrontError::validation("stock cannot be negative"));
        }
        Ok(())
    }

    /// The row written to the products table
    #[must_use]
    pub fn to_row(&self) -> Row {
        let images: Vec<String> = self
            .image_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .map(str::to_string)
            .into_iter()
            .collect();
        let video_url = self
            .video_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty());

        let mut row = Row::new();
        row.insert("name".into(), json!(self.name.trim()));
        row.insert("brand".into(), json!(self.brand.trim()));
        row.insert("category".into(), json!(self.category));
        row.insert("price".into(), json!(self.price));
        row.insert("stock".into(), json!(self.stock));
        row.insert("status".into(), json!(self.status.as_str()));
        row.insert("images".into(), json!(images));
        row.insert("video_url".into(), json!(video_url));
        row
    }
}

impl From<&Product> for ProductInput {
    fn from(product: &Product) -> Self {
        Self {
            name: product.name.clone(),
            brand: product.brand.clone(),
            category: product.category.clone(),
            price: product.price,
            stock: product.stock,
            status: product.status,
            image_url: product.images.first().cloned(),
            video_url: product.video_url.clone(),
        }
    }
}

/// Fulfilment state of an order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    New,
    Paid,
    Processing,
    Shipped,
    Completed,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [Self; 6] = [
        Self::New,
        Self::Paid,
        Self::Processing,
        Self::Shipped,
        Self::Completed,
        Self::Cancelled,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::New => "NEW",
            Self::Paid => "PAID",
            Self::Processing => "PROCESSING",
            Self::Shipped => "SHIPPED",
            Self::Completed => "COMPLETED",
            Self::Cancelled => "CANCELLED",
        }
    }

    /// Completed and cancelled orders are final
    #[must_use]
    pub const fn can_change_status(self) -> bool {
        !matches!(self, Self::Completed | Self::Cancelled)
    }

    /// Orders can be cancelled until they ship
    #[must_use]
    pub const fn can_cancel(self) -> bool {
        !matches!(self, Self::Shipped | Self::Completed | Self::Cancelled)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = StorefrontError;

    fn from_str(s: &str) -> Result<Self> {
        let upper = s.trim().to_ascii_uppercase();
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == upper)
            .ok_or_else(|| StorefrontError::invalid_argument(format!("unknown order status '{s}'")))
    }
}

/// Name and email of the profile behind an order, return or favorite
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerRef {
    pub name: Option<String>,
    pub email: String,
}

impl CustomerRef {
    /// Name when set, email otherwise
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .filter(|name| !name.is_empty())
            .unwrap_or(&self.email)
    }
}

/// Line of an order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: String,
    #[serde(default)]
    pub order_id: Option<String>,
    #[serde(default)]
    pub product_id: Option<String>,
    pub product_name: String,
    pub quantity: i64,
    pub unit_price: Money,
    #[serde(default)]
    pub size: Option<String>,
}

/// Order row joined with its customer and items
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    pub order_number: String,
    pub customer_id: String,
    pub status: OrderStatus,
    pub total: Money,
    #[serde(default)]
    pub courier: Option<String>,
    #[serde(default)]
    pub tracking_number: Option<String>,
    #[serde(default)]
    pub shipping_address: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub customer: Option<CustomerRef>,
    #[serde(default)]
    pub items: Vec<OrderItem>,
}

impl Order {
    /// Customer name, then email, then `Unknown`
    #[must_use]
    pub fn customer_name(&self) -> &str {
        self.customer
            .as_ref()
            .map_or("Unknown", CustomerRef::display_name)
    }
}

/// Row of the profiles table, shared by admins and customers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
    pub role: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Profile {
    #[must_use]
    pub fn customer_ref(&self) -> CustomerRef {
        CustomerRef {
            name: self.name.clone(),
            email: self.email.clone(),
        }
    }
}

/// Customer profile with order statistics
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub id: String,
    pub name: Option<String>,
    pub email: String,
    pub phone: Option<String>,
    pub status: String,
    pub created_at: Option<DateTime<Utc>>,
    pub order_count: usize,
    pub last_order_date: Option<DateTime<Utc>>,
}

impl Customer {
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status == "active"
    }
}

/// Review state of a return request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReturnStatus {
    Pending,
    Approved,
    Rejected,
    Completed,
}

impl ReturnStatus {
    pub const ALL: [Self; 4] = [Self::Pending, Self::Approved, Self::Rejected, Self::Completed];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Approved => "APPROVED",
            Self::Rejected => "REJECTED",
            Self::Completed => "COMPLETED",
        }
    }
}

impl fmt::Display for ReturnStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReturnStatus {
    type Err = StorefrontError;

    fn from_str(s: &str) -> Result<Self> {
        let upper = s.trim().to_ascii_uppercase();
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == upper)
            .ok_or_else(|| {
                StorefrontError::invalid_argument(format!("unknown return status '{s}'"))
            })
    }
}

/// Return request joined with its customer and order number
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnRequest {
    pub id: String,
    pub order_id: String,
    pub customer_id: String,
    pub reason: String,
    #[serde(default)]
    pub items: Vec<Value>,
    pub status: ReturnStatus,
    #[serde(default)]
    pub admin_notes: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub customer: Option<CustomerRef>,
    #[serde(default)]
    pub order_number: Option<String>,
}

/// Row of the favorites (wishlist) table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Favorite {
    pub user_id: String,
    pub product_id: String,
    pub created_at: DateTime<Utc>,
}

/// Product with the number of times it was favorited in the selected period
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FavoriteProduct {
    pub id: String,
    pub name: String,
    pub brand: String,
    #[serde(default)]
    pub favorite_count: i64,
    pub stock: i64,
    pub status: ProductStatus,
}

/// Who favorited a product, and when
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FavoriteDetail {
    pub user_id: String,
    pub user_name: String,
    pub user_email: String,
    pub created_at: DateTime<Utc>,
}

/// Headline numbers of the favorites screen
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FavoriteSummary {
    pub total: i64,
    pub average: i64,
    pub top: Option<FavoriteProduct>,
}

/// Headline numbers of the dashboard
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardStats {
    pub total_sales: Money,
    pub orders_today: usize,
    pub low_stock_products: usize,
    pub total_favorites: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopProduct {
    pub id: String,
    pub name: String,
    pub brand: String,
    pub favorite_count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BestSeller {
    pub product_id: String,
    pub product_name: String,
    pub total_sold: i64,
}

/// Sales total of one day in the trend chart
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailySales {
    pub date: NaiveDate,
    /// Short weekday label, e.g. `Mon`
    pub day: String,
    pub sales: Money,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecentOrder {
    pub id: String,
    pub order_number: String,
    pub customer_name: String,
    pub created_at: DateTime<Utc>,
    pub total: Money,
    pub status: OrderStatus,
}

/// Everything the dashboard screen shows
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardSnapshot {
    pub stats: DashboardStats,
    pub top_products: Vec<TopProduct>,
    pub best_sellers: Vec<BestSeller>,
    pub daily_sales: Vec<DailySales>,
    pub recent_orders: Vec<RecentOrder>,
}

/// Signed-in operator whose profile carries the admin role
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminUser {
    pub id: String,
    pub email: String,
    pub name: Option<String>,
    pub role: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input() -> ProductInput {
        ProductInput {
            name: "Phantom GX Elite FG".into(),
            brand: "Nike".into(),
            category: "Futsal".into(),
            price: 3_500_000,
            stock: 24,
            status: ProductStatus::Active,
            image_url: Some("  https://cdn.example.com/phantom.png ".into()),
            video_url: Some(String::new()),
        }
    }

    #[test]
    fn test_product_input_validation() {
        assert!(input().validate().is_ok());

        let mut blank_name = input();
        blank_name.name = "  ".into();
        assert!(matches!(
            blank_name.validate(),
            Err(StorefrontError::Validation { .. })
        ));

        let mut blank_brand = input();
        blank_brand.brand = String::new();
        assert!(blank_brand.validate().is_err());

        let mut negative_stock = input();
        negative_stock.stock = -1;
        assert!(negative_stock.validate().is_err());
    }

    #[test]
    fn test_product_input_row_trims_media() {
        let row = input().to_row();
        assert_eq!(row["images"], json!(["https://cdn.example.com/phantom.png"]));
        assert_eq!(row["video_url"], Value::Null);
        assert_eq!(row["status"], json!("active"));
    }

    #[test]
    fn test_product_deserializes_with_defaults() {
        let product: Product = serde_json::from_value(json!({
            "id": "PRD-003",
            "name": "Ultra Ultimate FG/AG",
            "brand": "Puma",
            "category": "Football",
            "price": 2800000,
            "stock": 3,
            "status": "low_stock"
        }))
        .unwrap();
        assert_eq!(product.status, ProductStatus::LowStock);
        assert!(product.images.is_empty());
        assert_eq!(product.favorite_count, 0);
    }

    #[test]
    fn test_order_status_parsing() {
        assert_eq!("shipped".parse::<OrderStatus>().unwrap(), OrderStatus::Shipped);
        assert_eq!("CANCELLED".parse::<OrderStatus>().unwrap(), OrderStatus::Cancelled);
        assert!("SELESAI".parse::<OrderStatus>().is_err());
        assert_eq!(serde_json::to_value(OrderStatus::New).unwrap(), json!("NEW"));
    }

    #[test]
    fn test_order_status_transitions() {
        assert!(OrderStatus::Paid.can_change_status());
        assert!(!OrderStatus::Completed.can_change_status());
        assert!(OrderStatus::Processing.can_cancel());
        assert!(!OrderStatus::Shipped.can_cancel());
        assert!(OrderStatus::Shipped.can_change_status());
    }

    #[test]
    fn test_return_status_parsing() {
        assert_eq!("approved".parse::<ReturnStatus>().unwrap(), ReturnStatus::Approved);
        assert!("DONE".parse::<ReturnStatus>().is_err());
    }

    #[test]
    fn test_customer_name_fallbacks() {
        let named = CustomerRef {
            name: Some("Andi Pratama".into()),
            email: "andi@example.com".into(),
        };
        let unnamed = CustomerRef {
            name: None,
            email: "budi@example.com".into(),
        };
        let empty_name = CustomerRef {
            name: Some(String::new()),
            email: "citra@example.com".into(),
        };
        assert_eq!(named.display_name(), "Andi Pratama");
        assert_eq!(unnamed.display_name(), "budi@example.com");
        assert_eq!(empty_name.display_name(), "citra@example.com");
    }
}
