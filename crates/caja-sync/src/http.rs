//! # HTTP Remote Store
//!
//! [`RemoteStore`] implementation against a hosted row store with a
//! PostgREST-style REST surface.
//!
//! ## Wire Conventions
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Read:    GET  /rest/v1/products?business_id=eq.<id>                    │
//! │  Upsert:  POST /rest/v1/products                                        │
//! │           Prefer: resolution=merge-duplicates   (idempotent by row id)  │
//! │  Delete:  DELETE /rest/v1/products?id=eq.<id>                           │
//! │           Prefer: return=representation                                 │
//! │           empty result array = row already gone = NotFound              │
//! │                                                                         │
//! │  Status mapping:                                                        │
//! │    2xx            → Ok                                                  │
//! │    404            → NotFound                                            │
//! │    408 / 429 / 5xx→ Transport (transient, retried next trigger)         │
//! │    other 4xx      → Rejected (permanent, record skipped)                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::RwLock;
use url::Url;

use async_trait::async_trait;

use crate::config::SyncConfig;
use crate::error::{SyncError, SyncResult};
use crate::remote::{RemoteStore, Session};
use caja_core::{
    AuditLog, BusinessSettings, CashMovement, CashShift, Customer, InventoryMovement, Product,
    Sale, SaleItem,
};

/// Request timeout; a register should never hang on the network.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Production remote store over HTTP.
pub struct HttpRemote {
    client: reqwest::Client,
    base: Url,
    /// Session established by the app's login flow; sync reads it only.
    session: RwLock<Option<Session>>,
}

impl HttpRemote {
    /// Creates a remote store client from configuration.
    ///
    /// Fails when no base URL is configured; callers that want an
    /// offline-only deployment simply don't construct a remote.
    pub fn new(config: &SyncConfig) -> SyncResult<Self> {
        let base_url = config
            .remote
            .base_url
            .as_deref()
            .ok_or_else(|| SyncError::InvalidConfig("remote.base_url is not set".into()))?;
        let base = Url::parse(base_url)?;

        let mut headers = HeaderMap::new();
        let key = HeaderValue::from_str(&config.remote.api_key)
            .map_err(|e| SyncError::InvalidConfig(format!("api_key: {}", e)))?;
        headers.insert("apikey", key);

        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .default_headers(headers)
            .build()?;

        Ok(HttpRemote {
            client,
            base,
            session: RwLock::new(None),
        })
    }

    /// Installs the session obtained by the login flow.
    pub async fn set_session(&self, session: Session) {
        *self.session.write().await = Some(session);
    }

    /// Clears the session (sign out). Sync becomes a silent no-op.
    pub async fn clear_session(&self) {
        *self.session.write().await = None;
    }

    fn table_url(&self, table: &str) -> SyncResult<Url> {
        Ok(self.base.join(&format!("rest/v1/{}", table))?)
    }

    /// Maps a response status into the sync failure taxonomy.
    async fn check(resp: reqwest::Response, context: &str) -> SyncResult<reqwest::Response> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }

        let message = resp.text().await.unwrap_or_default();
        let code = status.as_u16();

        if code == 404 {
            Err(SyncError::NotFound(context.to_string()))
        } else if status.is_server_error() || code == 408 || code == 429 {
            Err(SyncError::Transport(format!(
                "{}: {} {}",
                context, status, message
            )))
        } else {
            Err(SyncError::Rejected {
                status: code,
                message: format!("{}: {}", context, message),
            })
        }
    }

    /// Fetches rows matching one equality filter.
    async fn fetch_rows<T: DeserializeOwned>(
        &self,
        table: &str,
        column: &str,
        value: &str,
    ) -> SyncResult<Vec<T>> {
        let url = self.table_url(table)?;
        let resp = self
            .client
            .get(url)
            .query(&[(column, format!("eq.{}", value))])
            .send()
            .await?;

        let resp = Self::check(resp, table).await?;
        Ok(resp.json().await?)
    }

    /// Idempotent upsert of one or more rows, deduplicated by primary key.
    async fn upsert_rows<T: Serialize>(&self, table: &str, rows: &[T]) -> SyncResult<()> {
        let url = self.table_url(table)?;
        let resp = self
            .client
            .post(url)
            .header("Prefer", "resolution=merge-duplicates")
            .json(rows)
            .send()
            .await?;

        Self::check(resp, table).await?;
        Ok(())
    }

    /// Deletes one row by id; reports NotFound when nothing matched.
    async fn delete_row(&self, table: &str, id: &str) -> SyncResult<()> {
        let url = self.table_url(table)?;
        let resp = self
            .client
            .delete(url)
            .query(&[("id", format!("eq.{}", id))])
            .header("Prefer", "return=representation")
            .send()
            .await?;

        let resp = Self::check(resp, table).await?;

        // A delete of an absent row still answers 200 with an empty array.
        let deleted: Vec<serde_json::Value> = resp.json().await?;
        if deleted.is_empty() {
            return Err(SyncError::NotFound(format!("{}/{}", table, id)));
        }

        Ok(())
    }
}

#[derive(Debug, serde::Deserialize)]
struct ProfileRow {
    business_id: String,
}

#[async_trait]
impl RemoteStore for HttpRemote {
    async fn session(&self) -> SyncResult<Option<Session>> {
        Ok(self.session.read().await.clone())
    }

    async fn fetch_profile_business(&self, user_id: &str) -> SyncResult<Option<String>> {
        let rows: Vec<ProfileRow> = self.fetch_rows("profiles", "user_id", user_id).await?;
        Ok(rows.into_iter().next().map(|r| r.business_id))
    }

    async fn fetch_products(&self, business_id: &str) -> SyncResult<Vec<Product>> {
        self.fetch_rows("products", "business_id", business_id)
            .await
    }

    async fn fetch_settings(&self, business_id: &str) -> SyncResult<Option<BusinessSettings>> {
        let rows: Vec<BusinessSettings> = self
            .fetch_rows("business_settings", "business_id", business_id)
            .await?;
        Ok(rows.into_iter().next())
    }

    async fn upsert_product(&self, product: &Product) -> SyncResult<()> {
        self.upsert_rows("products", std::slice::from_ref(product))
            .await
    }

    async fn delete_product(&self, id: &str) -> SyncResult<()> {
        self.delete_row("products", id).await
    }

    async fn upsert_sale(&self, sale: &Sale, items: &[SaleItem]) -> SyncResult<()> {
        self.upsert_rows("sales", std::slice::from_ref(sale)).await?;
        if !items.is_empty() {
            self.upsert_rows("sale_items", items).await?;
        }
        Ok(())
    }

    async fn insert_movement(&self, movement: &InventoryMovement) -> SyncResult<()> {
        self.upsert_rows("inventory_movements", std::slice::from_ref(movement))
            .await
    }

    async fn upsert_shift(&self, shift: &CashShift) -> SyncResult<()> {
        self.upsert_rows("cash_shifts", std::slice::from_ref(shift))
            .await
    }

    async fn insert_cash_movement(&self, movement: &CashMovement) -> SyncResult<()> {
        self.upsert_rows("cash_movements", std::slice::from_ref(movement))
            .await
    }

    async fn upsert_customer(&self, customer: &Customer) -> SyncResult<()> {
        self.upsert_rows("customers", std::slice::from_ref(customer))
            .await
    }

    async fn delete_customer(&self, id: &str) -> SyncResult<()> {
        self.delete_row("customers", id).await
    }

    async fn insert_audit(&self, entry: &AuditLog) -> SyncResult<()> {
        self.upsert_rows("audit_log", std::slice::from_ref(entry))
            .await
    }

    async fn upsert_settings(&self, settings: &BusinessSettings) -> SyncResult<()> {
        self.upsert_rows("business_settings", std::slice::from_ref(settings))
            .await
    }
}
