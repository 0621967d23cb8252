//! Customer list screen

use super::{contains_ignore_case, Storefront};
use crate::error::Result;
use crate::models::{Customer, Profile};
use crate::period::DateRange;
use crate::query::RowQuery;
use crate::store::{from_rows, tables, RowStore};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::HashMap;
use storefront_common::CUSTOMER_ROLE;
use tracing::instrument;

#[derive(Deserialize)]
struct OrderStamp {
    customer_id: String,
    created_at: DateTime<Utc>,
}

pub struct CustomerService<'a, S> {
    ctx: &'a Storefront<S>,
}

impl<'a, S: RowStore> CustomerService<'a, S> {
    pub(crate) const fn new(ctx: &'a Storefront<S>) -> Self {
        Self { ctx }
    }

    /// Customers who registered within `range`, newest first, with order statistics
    ///
    /// `search` matches name and email ignoring case, and phone as typed.
    ///
    /// # Errors
    /// Returns an error if a store query fails or a row is malformed
    #[instrument(skip(self, range), fields(range = %range))]
    pub async fn list(&self, range: &DateRange, search: Option<&str>) -> Result<Vec<Customer>> {
        let window = self.ctx.window(range)?;
        let rows = self
            .ctx
            .store()
            .select(
                &RowQuery::table(tables::PROFILES)
                    .eq("role", CUSTOMER_ROLE)
                    .within("created_at", window.as_ref())
                    .order("created_at", false),
            )
            .await?;
        let profiles: Vec<Profile> = from_rows(rows)?;

        let search = search.unwrap_or("").trim();
        let profiles: Vec<Profile> = profiles
            .into_iter()
            .filter(|p| {
                contains_ignore_case(p.name.as_deref().unwrap_or(""), search)
                    || contains_ignore_case(&p.email, search)
                    || p.phone.as_deref().unwrap_or("").contains(search)
            })
            .collect();
        if profiles.is_empty() {
            return Ok(Vec::new());
        }

        let order_rows = self
            .ctx
            .store()
            .select(
                &RowQuery::table(tables::ORDERS)
                    .select(&["customer_id", "created_at"])
                    .in_list("customer_id", profiles.iter().map(|p| p.id.as_str())),
            )
            .await?;
        let mut stats: HashMap<String, (usize, Option<DateTime<Utc>>)> = HashMap::new();
        for stamp in from_rows::<OrderStamp>(order_rows)? {
            let entry = stats.entry(stamp.customer_id).or_insert((0, None));
            entry.0 += 1;
            entry.1 = entry.1.max(Some(stamp.created_at));
        }

        Ok(profiles
            .into_iter()
            .map(|profile| {
                let (order_count, last_order_date) =
                    stats.get(&profile.id).copied().unwrap_or((0, None));
                Customer {
                    id: profile.id,
                    name: profile.name,
                    email: profile.email,
                    phone: profile.phone,
                    status: profile.status.unwrap_or_else(|| "active".to_string()),
                    created_at: profile.created_at,
                    order_count,
                    last_order_date,
                }
            })
            .collect())
    }
}
