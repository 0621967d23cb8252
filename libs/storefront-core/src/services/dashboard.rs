//! Dashboard overview screen

use super::Storefront;
use crate::error::Result;
use crate::models::{
    BestSeller, DailySales, DashboardSnapshot, DashboardStats, Money, OrderStatus, RecentOrder,
    TopProduct,
};
use crate::period::{calendar, resolve_at, Clock, DateRange, PeriodSelector};
use crate::query::RowQuery;
use crate::store::{from_rows, int_field, str_field, tables, RowStore};
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Utc};
use serde::Deserialize;
use std::collections::HashMap;
use storefront_common::{MAX_TREND_DAYS, WEEKDAY_LABELS};
use tracing::{debug, instrument};

#[derive(Deserialize)]
struct SaleStamp {
    total: Money,
    created_at: DateTime<Utc>,
}

#[derive(Deserialize)]
struct RecentOrderRow {
    id: String,
    order_number: String,
    customer_id: String,
    total: Money,
    status: OrderStatus,
    created_at: DateTime<Utc>,
}

pub struct DashboardService<'a, S> {
    ctx: &'a Storefront<S>,
}

impl<'a, S: RowStore> DashboardService<'a, S> {
    pub(crate) const fn new(ctx: &'a Storefront<S>) -> Self {
        Self { ctx }
    }

    /// Everything the dashboard shows, with the panels loaded concurrently
    ///
    /// # Errors
    /// Returns the first error of any panel
    #[instrument(skip_all)]
    pub async fn snapshot<C: Clock>(&self, clock: &C) -> Result<DashboardSnapshot> {
        let now = clock.now();
        let (stats, top_products, best_sellers, daily_sales, recent_orders) = tokio::try_join!(
            self.stats_at(now),
            self.top_products(),
            self.best_sellers(),
            self.daily_sales_at(now),
            self.recent_orders(),
        )?;
        Ok(DashboardSnapshot {
            stats,
            top_products,
            best_sellers,
            daily_sales,
            recent_orders,
        })
    }

    /// Headline numbers
    ///
    /// # Errors
    /// Returns an error if a store query fails
    pub async fn stats<C: Clock>(&self, clock: &C) -> Result<DashboardStats> {
        self.stats_at(clock.now()).await
    }

    async fn stats_at(&self, now: NaiveDateTime) -> Result<DashboardStats> {
        let store = self.ctx.store();
        let today = self.ctx.window(&resolve_at(&PeriodSelector::Daily, now)?)?;

        let completed = store
            .select(
                &RowQuery::table(tables::ORDERS)
                    .select(&["total"])
                    .eq("status", OrderStatus::Completed.as_str()),
            )
            .await?;
        let total_sales: Money = completed.iter().map(|row| int_field(row, "total")).sum();

        let orders_today = store
            .count(&RowQuery::table(tables::ORDERS).within("created_at", today.as_ref()))
            .await?;
        let low_stock_products = store
            .count(
                &RowQuery::table(tables::PRODUCTS)
                    .lte("stock", self.ctx.settings().low_stock_threshold)
                    .eq("status", "active"),
            )
            .await?;
        let total_favorites = store.count(&RowQuery::table(tables::FAVORITES)).await?;

        Ok(DashboardStats {
            total_sales,
            orders_today,
            low_stock_products,
            total_favorites,
        })
    }

    /// Most favorited products by their stored counter
    ///
    /// # Errors
    /// Returns an error if the store query fails or a row is malformed
    pub async fn top_products(&self) -> Result<Vec<TopProduct>> {
        let rows = self
            .ctx
            .store()
            .select(
                &RowQuery::table(tables::PRODUCTS)
                    .select(&["id", "name", "brand", "favorite_count"])
                    .order("favorite_count", false)
                    .limit(self.ctx.settings().top_limit),
            )
            .await?;
        from_rows(rows)
    }

    /// Products by units sold across all order lines
    ///
    /// # Errors
    /// Returns an error if the store query fails
    pub async fn best_sellers(&self) -> Result<Vec<BestSeller>> {
        let rows = self
            .ctx
            .store()
            .select(
                &RowQuery::table(tables::ORDER_ITEMS)
                    .select(&["product_id", "product_name", "quantity"]),
            )
            .await?;

        let mut sellers: Vec<BestSeller> = Vec::new();
        let mut index: HashMap<&str, usize> = HashMap::new();
        for row in &rows {
            let Some(product_id) = str_field(row, "product_id") else {
                continue;
            };
            let quantity = int_field(row, "quantity");
            match index.get(product_id) {
                Some(&i) => sellers[i].total_sold += quantity,
                None => {
                    index.insert(product_id, sellers.len());
                    sellers.push(BestSeller {
                        product_id: product_id.to_string(),
                        product_name: str_field(row, "product_name").unwrap_or("").to_string(),
                        total_sold: quantity,
                    });
                }
            }
        }
        sellers.sort_by(|a, b| b.total_sold.cmp(&a.total_sold));
        sellers.truncate(self.ctx.settings().top_limit);
        Ok(sellers)
    }

    /// Order totals per local day over the configured trend window, oldest first
    ///
    /// # Errors
    /// Returns an error if the store query fails or a row is malformed
    pub async fn daily_sales<C: Clock>(&self, clock: &C) -> Result<Vec<DailySales>> {
        self.daily_sales_at(clock.now()).await
    }

    async fn daily_sales_at(&self, now: NaiveDateTime) -> Result<Vec<DailySales>> {
        let days = self.ctx.settings().trend_days.clamp(1, MAX_TREND_DAYS);
        let last = now.date();
        let first = calendar::add_days(last, -(i64::from(days) - 1))?;
        let range = DateRange::between(
            calendar::start_of_day(first),
            calendar::end_of_day(last)?,
        )?;
        let window = self.ctx.window(&range)?;

        let rows = self
            .ctx
            .store()
            .select(
                &RowQuery::table(tables::ORDERS)
                    .select(&["total", "created_at"])
                    .within("created_at", window.as_ref()),
            )
            .await?;
        let sales: Vec<SaleStamp> = from_rows(rows)?;

        let offset = self.ctx.offset();
        let mut by_day: HashMap<NaiveDate, Money> = HashMap::new();
        for sale in &sales {
            let day = sale.created_at.with_timezone(&offset).date_naive();
            *by_day.entry(day).or_default() += sale.total;
        }
        debug!(orders = sales.len(), days, "bucketed daily sales");

        let mut trend = Vec::with_capacity(days as usize);
        let mut date = first;
        for _ in 0..days {
            trend.push(DailySales {
                date,
                day: weekday_label(date).to_string(),
                sales: by_day.get(&date).copied().unwrap_or(0),
            });
            date = calendar::add_days(date, 1)?;
        }
        Ok(trend)
    }

    /// Latest orders with the customer's display name
    ///
    /// # Errors
    /// Returns an error if a store query fails or a row is malformed
    pub async fn recent_orders(&self) -> Result<Vec<RecentOrder>> {
        let rows = self
            .ctx
            .store()
            .select(
                &RowQuery::table(tables::ORDERS)
                    .select(&[
                        "id",
                        "order_number",
                        "customer_id",
                        "total",
                        "status",
                        "created_at",
                    ])
                    .order("created_at", false)
                    .limit(self.ctx.settings().top_limit),
            )
            .await?;
        let orders: Vec<RecentOrderRow> = from_rows(rows)?;
        let customers = self
            .ctx
            .customer_refs(orders.iter().map(|o| o.customer_id.as_str()))
            .await?;

        Ok(orders
            .into_iter()
            .map(|order| RecentOrder {
                customer_name: customers
                    .get(&order.customer_id)
                    .map_or("Unknown", |c| c.display_name())
                    .to_string(),
                id: order.id,
                order_number: order.order_number,
                created_at: order.created_at,
                total: order.total,
                status: order.status,
            })
            .collect())
    }
}

fn weekday_label(date: NaiveDate) -> &'static str {
    WEEKDAY_LABELS[date.weekday().num_days_from_sunday() as usize]
}
