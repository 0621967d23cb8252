//! Order management screen

use super::{contains_ignore_case, Storefront};
use crate::error::{Result, StorefrontError};
use crate::models::{Order, OrderItem, OrderStatus};
use crate::query::RowQuery;
use crate::store::{from_row, from_rows, tables, Row, RowStore};
use serde_json::{json, Value};
use std::collections::HashMap;
use tracing::{info, instrument};

/// Search box and status dropdown of the order list
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderFilter {
    /// Matched against the order number and the customer name, ignoring case
    pub search: Option<String>,
    pub status: Option<OrderStatus>,
}

impl OrderFilter {
    #[must_use]
    pub fn matches(&self, order: &Order) -> bool {
        let search = self.search.as_deref().unwrap_or("").trim();
        let customer = order
            .customer
            .as_ref()
            .map_or("", |customer| customer.display_name());
        let matches_search = contains_ignore_case(&order.order_number, search)
            || contains_ignore_case(customer, search);
        let matches_status = self.status.map_or(true, |status| order.status == status);
        matches_search && matches_status
    }
}

pub struct OrderService<'a, S> {
    ctx: &'a Storefront<S>,
}

impl<'a, S: RowStore> OrderService<'a, S> {
    pub(crate) const fn new(ctx: &'a Storefront<S>) -> Self {
        Self { ctx }
    }

    /// Orders newest first, each with its customer and line items
    ///
    /// # Errors
    /// Returns an error if a store query fails or a row is malformed
    #[instrument(skip(self))]
    pub async fn list(&self, filter: &OrderFilter) -> Result<Vec<Order>> {
        let rows = self
            .ctx
            .store()
            .select(&RowQuery::table(tables::ORDERS).order("created_at", false))
            .await?;
        let mut orders: Vec<Order> = from_rows(rows)?;
        self.attach_details(&mut orders).await?;
        orders.retain(|order| filter.matches(order));
        Ok(orders)
    }

    /// # Errors
    /// Returns `NotFound` if no order has this id
    pub async fn get(&self, id: &str) -> Result<Order> {
        let mut rows = self
            .ctx
            .store()
            .select(&RowQuery::table(tables::ORDERS).eq("id", id).limit(1))
            .await?;
        let row = rows
            .pop()
            .ok_or_else(|| StorefrontError::not_found("Order", id))?;
        let mut orders = vec![from_row::<Order>(row)?];
        self.attach_details(&mut orders).await?;
        orders
            .pop()
            .ok_or_else(|| StorefrontError::not_found("Order", id))
    }

    /// Move an order to a new status
    ///
    /// # Errors
    /// Returns `NotFound` for an unknown order and `Validation` if the order
    /// is already completed or cancelled. Moving to `Cancelled` follows the
    /// rules of [`OrderService::cancel`].
    #[instrument(skip(self))]
    pub async fn update_status(&self, id: &str, status: OrderStatus) -> Result<Order> {
        if status == OrderStatus::Cancelled {
            return self.cancel(id).await;
        }
        let current = self.get(id).await?;
        if !current.status.can_change_status() {
            return Err(StorefrontError::validation(format!(
                "order {} is {} and can no longer change status",
                current.order_number, current.status
            )));
        }
        self.patch(id, "status", json!(status.as_str())).await?;
        info!(order = %current.order_number, from = %current.status, to = %status, "order status changed");
        self.get(id).await
    }

    /// # Errors
    /// Returns `NotFound` for an unknown order and `Validation` once the
    /// order has shipped
    #[instrument(skip(self))]
    pub async fn cancel(&self, id: &str) -> Result<Order> {
        let current = self.get(id).await?;
        if !current.status.can_cancel() {
            return Err(StorefrontError::validation(format!(
                "order {} is {} and can no longer be cancelled",
                current.order_number, current.status
            )));
        }
        self.patch(id, "status", json!(OrderStatus::Cancelled.as_str()))
            .await?;
        info!(order = %current.order_number, "order cancelled");
        self.get(id).await
    }

    /// Record the courier's tracking number; a blank number clears it
    ///
    /// # Errors
    /// Returns `NotFound` if no order has this id
    #[instrument(skip(self))]
    pub async fn set_tracking_number(&self, id: &str, tracking_number: &str) -> Result<Order> {
        let tracking_number = tracking_number.trim();
        let value = if tracking_number.is_empty() {
            Value::Null
        } else {
            json!(tracking_number)
        };
        self.patch(id, "tracking_number", value).await?;
        self.get(id).await
    }

    async fn patch(&self, id: &str, column: &str, value: Value) -> Result<()> {
        let mut patch = Row::new();
        patch.insert(column.to_string(), value);
        let changed = self
            .ctx
            .store()
            .update(&RowQuery::table(tables::ORDERS).eq("id", id), patch)
            .await?;
        if changed == 0 {
            return Err(StorefrontError::not_found("Order", id));
        }
        Ok(())
    }

    async fn attach_details(&self, orders: &mut [Order]) -> Result<()> {
        if orders.is_empty() {
            return Ok(());
        }
        let customers = self
            .ctx
            .customer_refs(orders.iter().map(|o| o.customer_id.as_str()))
            .await?;

        let item_rows = self
            .ctx
            .store()
            .select(
                &RowQuery::table(tables::ORDER_ITEMS)
                    .in_list("order_id", orders.iter().map(|o| o.id.as_str())),
            )
            .await?;
        let mut items_by_order: HashMap<String, Vec<OrderItem>> = HashMap::new();
        for item in from_rows::<OrderItem>(item_rows)? {
            if let Some(order_id) = item.order_id.clone() {
                items_by_order.entry(order_id).or_default().push(item);
            }
        }

        for order in orders.iter_mut() {
            order.customer = customers.get(&order.customer_id).cloned();
            order.items = items_by_order.remove(&order.id).unwrap_or_default();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CustomerRef;
    use chrono::{TimeZone, Utc};

    fn order(number: &str, status: OrderStatus, customer: Option<CustomerRef>) -> Order {
        Order {
            id: number.to_lowercase(),
            order_number: number.into(),
            customer_id: "cust".into(),
            status,
            total: 100,
            courier: None,
            tracking_number: None,
            shipping_address: None,
            created_at: Utc.with_ymd_and_hms(2026, 1, 18, 3, 0, 0).unwrap(),
            customer,
            items: Vec::new(),
        }
    }

    #[test]
    fn test_filter_by_number_customer_and_status() {
        let andi = order(
            "ORD-2026-001",
            OrderStatus::Paid,
            Some(CustomerRef {
                name: Some("Andi Pratama".into()),
                email: "andi@example.com".into(),
            }),
        );
        let anonymous = order("ORD-2026-002", OrderStatus::New, None);

        let by_number = OrderFilter {
            search: Some("002".into()),
            status: None,
        };
        assert!(!by_number.matches(&andi));
        assert!(by_number.matches(&anonymous));

        let by_customer = OrderFilter {
            search: Some("andi".into()),
            status: None,
        };
        assert!(by_customer.matches(&andi));
        assert!(!by_customer.matches(&anonymous));

        let by_status = OrderFilter {
            search: None,
            status: Some(OrderStatus::New),
        };
        assert!(!by_status.matches(&andi));
        assert!(by_status.matches(&anonymous));
    }
}
