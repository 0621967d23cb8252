//! Return request review screen

use super::{contains_ignore_case, Storefront};
use crate::error::{Result, StorefrontError};
use crate::models::{ReturnRequest, ReturnStatus};
use crate::period::DateRange;
use crate::query::RowQuery;
use crate::store::{from_row, from_rows, str_field, tables, Row, RowStore};
use chrono::{SecondsFormat, Utc};
use serde_json::json;
use std::collections::HashMap;
use tracing::{info, instrument};

/// Search box and status dropdown of the returns list
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReturnFilter {
    /// Matched against the order number and the customer name, ignoring case
    pub search: Option<String>,
    pub status: Option<ReturnStatus>,
}

impl ReturnFilter {
    #[must_use]
    pub fn matches(&self, request: &ReturnRequest) -> bool {
        let search = self.search.as_deref().unwrap_or("").trim();
        let customer = request
            .customer
            .as_ref()
            .map_or("", |customer| customer.display_name());
        let matches_search = contains_ignore_case(request.order_number.as_deref().unwrap_or(""), search)
            || contains_ignore_case(customer, search);
        let matches_status = self.status.map_or(true, |status| request.status == status);
        matches_search && matches_status
    }
}

pub struct ReturnService<'a, S> {
    ctx: &'a Storefront<S>,
}

impl<'a, S: RowStore> ReturnService<'a, S> {
    pub(crate) const fn new(ctx: &'a Storefront<S>) -> Self {
        Self { ctx }
    }

    /// Return requests filed within `range`, newest first
    ///
    /// # Errors
    /// Returns an error if a store query fails or a row is malformed
    #[instrument(skip(self, range), fields(range = %range))]
    pub async fn list(&self, range: &DateRange, filter: &ReturnFilter) -> Result<Vec<ReturnRequest>> {
        let window = self.ctx.window(range)?;
        let rows = self
            .ctx
            .store()
            .select(
                &RowQuery::table(tables::RETURNS)
                    .within("created_at", window.as_ref())
                    .order("created_at", false),
            )
            .await?;
        let mut requests: Vec<ReturnRequest> = from_rows(rows)?;
        self.attach_details(&mut requests).await?;
        requests.retain(|request| filter.matches(request));
        Ok(requests)
    }

    /// # Errors
    /// Returns `NotFound` if no return request has this id
    pub async fn get(&self, id: &str) -> Result<ReturnRequest> {
        let mut rows = self
            .ctx
            .store()
            .select(&RowQuery::table(tables::RETURNS).eq("id", id).limit(1))
            .await?;
        let row = rows
            .pop()
            .ok_or_else(|| StorefrontError::not_found("Return", id))?;
        let mut requests = vec![from_row::<ReturnRequest>(row)?];
        self.attach_details(&mut requests).await?;
        requests
            .pop()
            .ok_or_else(|| StorefrontError::not_found("Return", id))
    }

    /// # Errors
    /// Returns `NotFound` for an unknown request and `Validation` if it was
    /// already reviewed
    pub async fn approve(&self, id: &str, admin_notes: &str) -> Result<ReturnRequest> {
        self.review(id, ReturnStatus::Approved, admin_notes).await
    }

    /// # Errors
    /// Returns `NotFound` for an unknown request and `Validation` if it was
    /// already reviewed
    pub async fn reject(&self, id: &str, admin_notes: &str) -> Result<ReturnRequest> {
        self.review(id, ReturnStatus::Rejected, admin_notes).await
    }

    #[instrument(skip(self, admin_notes))]
    async fn review(
        &self,
        id: &str,
        status: ReturnStatus,
        admin_notes: &str,
    ) -> Result<ReturnRequest> {
        let current = self.get(id).await?;
        if current.status != ReturnStatus::Pending {
            return Err(StorefrontError::validation(format!(
                "return {id} is already {}",
                current.status
            )));
        }

        let mut patch = Row::new();
        patch.insert("status".into(), json!(status.as_str()));
        patch.insert("admin_notes".into(), json!(admin_notes.trim()));
        patch.insert(
            "updated_at".into(),
            json!(Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)),
        );
        self.ctx
            .store()
            .update(&RowQuery::table(tables::RETURNS).eq("id", id), patch)
            .await?;
        info!(id, %status, "return reviewed");
        self.get(id).await
    }

    async fn attach_details(&self, requests: &mut [ReturnRequest]) -> Result<()> {
        if requests.is_empty() {
            return Ok(());
        }
        let customers = self
            .ctx
            .customer_refs(requests.iter().map(|r| r.customer_id.as_str()))
            .await?;
        let order_rows = self
            .ctx
            .store()
            .select(
                &RowQuery::table(tables::ORDERS)
                    .select(&["id", "order_number"])
                    .in_list("id", requests.iter().map(|r| r.order_id.as_str())),
            )
            .await?;
        let order_numbers: HashMap<&str, &str> = order_rows
            .iter()
            .filter_map(|row| Some((str_field(row, "id")?, str_field(row, "order_number")?)))
            .collect();

        for request in requests.iter_mut() {
            request.customer = customers.get(&request.customer_id).cloned();
            request.order_number = order_numbers
                .get(request.order_id.as_str())
                .map(|number| (*number).to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CustomerRef;
    use chrono::TimeZone;

    #[test]
    fn test_filter_matches_order_number_and_status() {
        let request = ReturnRequest {
            id: "RET-001".into(),
            order_id: "o1".into(),
            customer_id: "c1".into(),
            reason: "Ukuran tidak sesuai".into(),
            items: Vec::new(),
            status: ReturnStatus::Pending,
            admin_notes: None,
            created_at: Utc.with_ymd_and_hms(2026, 1, 17, 9, 0, 0).unwrap(),
            updated_at: None,
            customer: Some(CustomerRef {
                name: None,
                email: "sari@example.com".into(),
            }),
            order_number: Some("ORD-2026-003".into()),
        };

        let by_number = ReturnFilter {
            search: Some("ord-2026-003".into()),
            status: None,
        };
        assert!(by_number.matches(&request));

        let by_email = ReturnFilter {
            search: Some("sari".into()),
            status: Some(ReturnStatus::Pending),
        };
        assert!(by_email.matches(&request));

        let approved_only = ReturnFilter {
            search: None,
            status: Some(ReturnStatus::Approved),
        };
        assert!(!approved_only.matches(&request));
    }
}
