//! Row store over the hosted PostgREST API

use super::{Row, RowStore};
use crate::config::StorefrontConfig;
use crate::error::{Result, StorefrontError};
use crate::query::{FilterOp, RowQuery};
use async_trait::async_trait;
use parking_lot::RwLock;
use reqwest::{Method, RequestBuilder, Response};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Bearer token of the signed-in operator, shared between auth and data clients
#[derive(Debug, Clone, Default)]
pub struct AccessToken(Arc<RwLock<Option<String>>>);

impl AccessToken {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, token: Option<String>) {
        *self.0.write() = token;
    }

    #[must_use]
    pub fn get(&self) -> Option<String> {
        self.0.read().clone()
    }
}

/// PostgREST client for the project's `/rest/v1` tables
#[derive(Debug, Clone)]
pub struct RestStore {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    token: AccessToken,
}

impl RestStore {
    /// Build a client from configuration
    ///
    /// # Errors
    /// Returns `Configuration` if the backend settings are incomplete or the
    /// HTTP client cannot be built
    pub fn new(config: &StorefrontConfig, token: AccessToken) -> Result<Self> {
        config.validate_remote()?;
        let client = http_client(config)?;
        Ok(Self::with_client(client, &config.api_url, &config.api_key, token))
    }

    /// Build a client around an existing `reqwest::Client`
    #[must_use]
    pub fn with_client(
        client: reqwest::Client,
        base_url: &str,
        api_key: &str,
        token: AccessToken,
    ) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            token,
        }
    }

    #[must_use]
    pub const fn access_token(&self) -> &AccessToken {
        &self.token
    }

    #[must_use]
    pub fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    fn request(&self, method: Method, table: &str) -> RequestBuilder {
        let bearer = self.token.get().unwrap_or_else(|| self.api_key.clone());
        self.client
            .request(method, self.table_url(table))
            .header("apikey", &self.api_key)
            .bearer_auth(bearer)
    }
}

/// Shared `reqwest` client construction for the REST and auth clients
pub(crate) fn http_client(config: &StorefrontConfig) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(config.request_timeout())
        .build()
        .map_err(|e| StorefrontError::configuration(format!("Failed to build HTTP client: {e}")))
}

/// Fail with the response body when the status is not 2xx
pub(crate) async fn ensure_success(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(StorefrontError::store(format!(
        "backend returned {status}: {body}"
    )))
}

#[async_trait]
impl RowStore for RestStore {
    #[instrument(skip(self), fields(table = query.table_name()))]
    async fn select(&self, query: &RowQuery) -> Result<Vec<Row>> {
        let response = self
            .request(Method::GET, query.table_name())
            .query(&query_pairs(query, true))
            .send()
            .await?;
        let rows: Vec<Row> = ensure_success(response).await?.json().await?;
        debug!(rows = rows.len(), "rest select");
        Ok(rows)
    }

    #[instrument(skip(self), fields(table = query.table_name()))]
    async fn count(&self, query: &RowQuery) -> Result<usize> {
        let response = self
            .request(Method::HEAD, query.table_name())
            .query(&query_pairs(query, false))
            .header("Prefer", "count=exact")
            .send()
            .await?;
        let response = ensure_success(response).await?;
        let range = response
            .headers()
            .get("content-range")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| StorefrontError::store("count response has no Content-Range"))?;
        parse_content_range(range)
            .ok_or_else(|| StorefrontError::store(format!("unreadable Content-Range '{range}'")))
    }

    #[instrument(skip(self, row))]
    async fn insert(&self, table: &str, row: Row) -> Result<Row> {
        let response = self
            .request(Method::POST, table)
            .header("Prefer", "return=representation")
            .json(&row)
            .send()
            .await?;
        let mut rows: Vec<Row> = ensure_success(response).await?.json().await?;
        rows.pop()
            .ok_or_else(|| StorefrontError::store(format!("insert into {table} returned no row")))
    }

    #[instrument(skip(self, patch), fields(table = query.table_name()))]
    async fn update(&self, query: &RowQuery, patch: Row) -> Result<usize> {
        let response = self
            .request(Method::PATCH, query.table_name())
            .query(&query_pairs(query, false))
            .header("Prefer", "return=representation")
            .json(&patch)
            .send()
            .await?;
        let rows: Vec<Value> = ensure_success(response).await?.json().await?;
        Ok(rows.len())
    }

    #[instrument(skip(self), fields(table = query.table_name()))]
    async fn delete(&self, query: &RowQuery) -> Result<usize> {
        let response = self
            .request(Method::DELETE, query.table_name())
            .query(&query_pairs(query, false))
            .header("Prefer", "return=representation")
            .send()
            .await?;
        let rows: Vec<Value> = ensure_success(response).await?.json().await?;
        Ok(rows.len())
    }
}

/// URL query parameters for a query
///
/// With `with_shape` the projection, ordering and limit are included; writes
/// and counts only send the filters.
#[must_use]
pub fn query_pairs(query: &RowQuery, with_shape: bool) -> Vec<(String, String)> {
    let mut pairs = Vec::new();
    if with_shape {
        let columns = query
            .columns()
            .map_or_else(|| "*".to_string(), |columns| columns.join(","));
        pairs.push(("select".to_string(), columns));
    }
    for filter in query.filters() {
        let value = match (filter.op, &filter.value) {
            (FilterOp::In, Value::Array(values)) => render_list(values),
            (_, value) => render_value(value),
        };
        pairs.push((
            filter.column.clone(),
            format!("{}.{}", filter.op.as_str(), value),
        ));
    }
    if with_shape {
        if !query.ordering().is_empty() {
            let order = query
                .ordering()
                .iter()
                .map(|key| {
                    format!(
                        "{}.{}",
                        key.column,
                        if key.ascending { "asc" } else { "desc" }
                    )
                })
                .collect::<Vec<_>>()
                .join(",");
            pairs.push(("order".to_string(), order));
        }
        if let Some(limit) = query.row_limit() {
            pairs.push(("limit".to_string(), limit.to_string()));
        }
    }
    pairs
}

fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "null".to_string(),
        other => other.to_string(),
    }
}

fn render_list(values: &[Value]) -> String {
    let items: Vec<String> = values
        .iter()
        .map(|value| {
            let rendered = render_value(value);
            if rendered.contains([',', '(', ')', '"']) {
                format!("\"{}\"", rendered.replace('"', "\\\""))
            } else {
                rendered
            }
        })
        .collect();
    format!("({})", items.join(","))
}

/// Total row count from a `Content-Range` header such as `0-4/42` or `*/0`
#[must_use]
pub fn parse_content_range(header: &str) -> Option<usize> {
    header.rsplit_once('/')?.1.trim().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_pairs_full_shape() {
        let query = RowQuery::table("products")
            .select(&["id", "name", "favorite_count"])
            .lte("stock", 5)
            .eq("status", "active")
            .order("favorite_count", false)
            .order("name", true)
            .limit(5);

        assert_eq!(
            query_pairs(&query, true),
            vec![
                ("select".to_string(), "id,name,favorite_count".to_string()),
                ("stock".to_string(), "lte.5".to_string()),
                ("status".to_string(), "eq.active".to_string()),
                ("order".to_string(), "favorite_count.desc,name.asc".to_string()),
                ("limit".to_string(), "5".to_string()),
            ]
        );
    }

    #[test]
    fn test_query_pairs_filters_only() {
        let query = RowQuery::table("orders")
            .eq("id", "ORD-2026-001")
            .order("created_at", false)
            .limit(1);
        assert_eq!(
            query_pairs(&query, false),
            vec![("id".to_string(), "eq.ORD-2026-001".to_string())]
        );
    }

    #[test]
    fn test_in_list_rendering_quotes_reserved_characters() {
        let query = RowQuery::table("products").in_list("brand", ["Nike", "Adidas, Inc"]);
        assert_eq!(
            query_pairs(&query, false),
            vec![(
                "brand".to_string(),
                "in.(Nike,\"Adidas, Inc\")".to_string()
            )]
        );
    }

    #[test]
    fn test_select_star_by_default() {
        let pairs = query_pairs(&RowQuery::table("favorites"), true);
        assert_eq!(pairs, vec![("select".to_string(), "*".to_string())]);
    }

    #[test]
    fn test_parse_content_range() {
        assert_eq!(parse_content_range("0-4/42"), Some(42));
        assert_eq!(parse_content_range("*/0"), Some(0));
        assert_eq!(parse_content_range("0-4/*"), None);
        assert_eq!(parse_content_range("garbage"), None);
    }

    #[test]
    fn test_table_url_trims_trailing_slash() {
        let store = RestStore::with_client(
            reqwest::Client::new(),
            "https://demo.supabase.co/",
            "anon",
            AccessToken::new(),
        );
        assert_eq!(
            store.table_url("orders"),
            "https://demo.supabase.co/rest/v1/orders"
        );
    }

    #[test]
    fn test_new_requires_remote_settings() {
        let config = StorefrontConfig::default();
        assert!(matches!(
            RestStore::new(&config, AccessToken::new()),
            Err(StorefrontError::Configuration { .. })
        ));
    }

    #[test]
    fn test_access_token_is_shared() {
        let token = AccessToken::new();
        let store = RestStore::with_client(
            reqwest::Client::new(),
            "https://demo.supabase.co",
            "anon",
            token.clone(),
        );
        token.set(Some("jwt".into()));
        assert_eq!(store.access_token().get().as_deref(), Some("jwt"));
    }
}
