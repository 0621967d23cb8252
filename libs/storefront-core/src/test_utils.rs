//! Test utilities and demo data for the storefront services
//!
//! The seeded tables describe a small football boot shop. Timestamps are laid
//! out relative to a reference "now" on the operator's calendar, so the same
//! data works for fixed-clock tests and for the CLI demo mode.

use crate::auth::{AuthProvider, AuthUser};
use crate::error::{Result, StorefrontError};
use crate::period::{calendar, FixedClock};
use crate::services::{ServiceSettings, Storefront};
use crate::store::{tables, MemoryStore, Row, RowStore};
use async_trait::async_trait;
use chrono::{Duration, FixedOffset, NaiveDateTime, Offset, SecondsFormat, TimeZone, Utc};
use parking_lot::RwLock;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use storefront_common::{ADMIN_ROLE, CUSTOMER_ROLE};
use uuid::Uuid;

/// Email and password of the seeded administrator
pub const DEMO_ADMIN: (&str, &str) = ("admin@tungtungsport.com", "admin123");

/// Email and password of a seeded shopper
pub const DEMO_CUSTOMER: (&str, &str) = ("andi@email.com", "andi123");

/// Sunday 2026-01-18 15:30 on the demo calendar
#[must_use]
pub fn demo_now() -> NaiveDateTime {
    NaiveDateTime::new(
        chrono::NaiveDate::from_ymd_opt(2026, 1, 18).unwrap_or_default(),
        chrono::NaiveTime::from_hms_opt(15, 30, 0).unwrap_or_default(),
    )
}

#[must_use]
pub fn demo_clock() -> FixedClock {
    FixedClock::new(demo_now())
}

/// Western Indonesia Time, UTC+7
#[must_use]
pub fn demo_offset() -> FixedOffset {
    FixedOffset::east_opt(7 * 3600).unwrap_or_else(|| Utc.fix())
}

/// Seeded store at [`demo_now`] in [`demo_offset`]
///
/// # Errors
/// Never fails for the demo reference time
pub fn seeded_store() -> Result<MemoryStore> {
    seeded_store_at(demo_now(), demo_offset())
}

/// Services over the seeded store with default settings
///
/// # Errors
/// Never fails for the demo reference time
pub fn demo_storefront() -> Result<Storefront<Arc<MemoryStore>>> {
    Ok(Storefront::with_offset(
        Arc::new(seeded_store()?),
        demo_offset(),
        ServiceSettings::default(),
    ))
}

/// Build the demo tables relative to `now` on a calendar at `offset`
///
/// # Errors
/// Returns `InvalidArgument` if `now` is too close to the calendar limits
pub fn seeded_store_at(now: NaiveDateTime, offset: FixedOffset) -> Result<MemoryStore> {
    let stamp = |days_ago: i64, hour: u32| -> Result<Value> {
        let date = calendar::add_days(now.date(), -days_ago)?;
        let local = date
            .and_hms_opt(hour, 0, 0)
            .ok_or_else(|| StorefrontError::invalid_argument(format!("bad hour {hour}")))?;
        let utc = local - Duration::seconds(i64::from(offset.local_minus_utc()));
        Ok(json!(Utc
            .from_utc_datetime(&utc)
            .to_rfc3339_opts(SecondsFormat::Millis, true)))
    };

    let store = MemoryStore::new();

    let products = [
        ("PRD-001", "Phantom GX Elite FG", "Nike", "Futsal", 3_500_000, 24, "active", "phantom", 47),
        ("PRD-002", "Predator Accuracy.1", "Adidas", "Futsal", 3_200_000, 18, "active", "predator", 38),
        ("PRD-003", "Ultra Ultimate FG/AG", "Puma", "Football", 2_800_000, 3, "low_stock", "ultra", 31),
        ("PRD-004", "Lightspeed Reborn", "Specs", "Futsal", 599_000, 45, "active", "lightspeed", 24),
        ("PRD-005", "Mercurial Vapor 15", "Nike", "Football", 1_800_000, 0, "inactive", "vapor", 52),
        ("PRD-006", "Copa Pure.3 TF", "Adidas", "Futsal", 900_000, 30, "active", "copa", 19),
        ("PRD-007", "Top Sala Competition", "Adidas", "Futsal", 1_200_000, 2, "active", "topsala", 15),
        ("PRD-008", "React Gato", "Nike", "Futsal", 1_950_000, 22, "active", "gato", 28),
        ("PRD-009", "Future Ultimate", "Puma", "Football", 3_100_000, 12, "active", "future", 33),
        ("PRD-010", "Barricada Ultima", "Specs", "Futsal", 450_000, 60, "active", "barricada", 11),
        ("PRD-011", "X Crazyfast.1", "Adidas", "Football", 2_900_000, 1, "active", "crazyfast", 42),
        ("PRD-012", "Tiempo Legend 10", "Nike", "Football", 2_500_000, 15, "active", "tiempo", 36),
    ];
    let mut rows = Vec::new();
    for (i, (id, name, brand, category, price, stock, status, image, favorites)) in
        products.into_iter().enumerate()
    {
        rows.push(row(json!({
            "id": id,
            "name": name,
            "brand": brand,
            "category": category,
            "price": price,
            "stock": stock,
            "status": status,
            "images": [format!("/products/{image}.png")],
            "video_url": null,
            "favorite_count": favorites,
            "created_at": stamp(60 - i as i64, 9)?,
        })));
    }
    store.load_table(tables::PRODUCTS, rows);

    let profiles = [
        ("ADM-001", Some("Admin Tung Tung Sport"), DEMO_ADMIN.0, ADMIN_ROLE, None, "active", 90),
        ("CST-001", Some("Andi Pratama"), DEMO_CUSTOMER.0, CUSTOMER_ROLE, Some("+62 812 3456 7890"), "active", 40),
        ("CST-002", Some("Budi Santoso"), "budi@email.com", CUSTOMER_ROLE, Some("+62 813 4567 8901"), "active", 20),
        ("CST-003", Some("Citra Dewi"), "citra@email.com", CUSTOMER_ROLE, Some("+62 814 5678 9012"), "active", 10),
        ("CST-004", Some("Dimas Wijaya"), "dimas@email.com", CUSTOMER_ROLE, Some("+62 815 6789 0123"), "active", 5),
        ("CST-005", Some("Eka Putri"), "eka@email.com", CUSTOMER_ROLE, Some("+62 816 7890 1234"), "active", 2),
        ("CST-006", Some("Faisal Rahman"), "faisal@email.com", CUSTOMER_ROLE, Some("+62 817 8901 2345"), "active", 1),
        ("CST-007", Some("Gita Sari"), "gita@email.com", CUSTOMER_ROLE, Some("+62 818 9012 3456"), "active", 0),
        ("CST-008", Some("Hendra Gunawan"), "hendra@email.com", CUSTOMER_ROLE, Some("+62 819 0123 4567"), "inactive", 60),
        ("CST-009", None, "nadia@email.com", CUSTOMER_ROLE, None, "active", 0),
    ];
    let mut rows = Vec::new();
    for (id, name, email, role, phone, status, days_ago) in profiles {
        rows.push(row(json!({
            "id": id,
            "name": name,
            "email": email,
            "role": role,
            "phone": phone,
            "status": status,
            "created_at": stamp(days_ago, 8)?,
        })));
    }
    store.load_table(tables::PROFILES, rows);

    let orders = [
        ("ORD-2026-001", "CST-001", 3_500_000, "PROCESSING", Some("JNE"), None, 0, 10),
        ("ORD-2026-002", "CST-002", 2_800_000, "NEW", None, None, 0, 6),
        ("ORD-2026-003", "CST-003", 4_100_000, "PAID", None, None, 1, 14),
        ("ORD-2026-004", "CST-004", 1_950_000, "SHIPPED", Some("SiCepat"), Some("SCP2026011700123"), 1, 9),
        ("ORD-2026-005", "CST-005", 599_000, "COMPLETED", Some("JNT"), Some("JNT2026011600045"), 2, 13),
        ("ORD-2026-006", "CST-001", 3_100_000, "COMPLETED", Some("JNE"), Some("JNE2026011600089"), 2, 11),
        ("ORD-2026-007", "CST-006", 2_500_000, "COMPLETED", Some("AnterAja"), Some("AJ20260115123"), 3, 16),
        ("ORD-2026-008", "CST-007", 1_800_000, "SHIPPED", Some("JNE"), Some("JNE2026011500234"), 3, 10),
        ("ORD-2026-009", "CST-009", 1_200_000, "CANCELLED", None, None, 10, 12),
    ];
    let mut rows = Vec::new();
    for (id, customer, total, status, courier, tracking, days_ago, hour) in orders {
        rows.push(row(json!({
            "id": id,
            "order_number": id,
            "customer_id": customer,
            "total": total,
            "status": status,
            "courier": courier,
            "tracking_number": tracking,
            "shipping_address": "Jl. Sudirman No. 1, Jakarta",
            "created_at": stamp(days_ago, hour)?,
        })));
    }
    store.load_table(tables::ORDERS, rows);

    let items = [
        ("ORD-2026-001", "PRD-001", "Phantom GX Elite FG", 1, 3_500_000, "42"),
        ("ORD-2026-002", "PRD-003", "Ultra Ultimate FG/AG", 1, 2_800_000, "41"),
        ("ORD-2026-003", "PRD-002", "Predator Accuracy.1", 1, 3_200_000, "43"),
        ("ORD-2026-003", "PRD-006", "Copa Pure.3 TF", 1, 900_000, "43"),
        ("ORD-2026-004", "PRD-008", "React Gato", 1, 1_950_000, "40"),
        ("ORD-2026-005", "PRD-004", "Lightspeed Reborn", 1, 599_000, "39"),
        ("ORD-2026-006", "PRD-009", "Future Ultimate", 1, 3_100_000, "42"),
        ("ORD-2026-007", "PRD-012", "Tiempo Legend 10", 1, 2_500_000, "44"),
        ("ORD-2026-008", "PRD-006", "Copa Pure.3 TF", 2, 900_000, "41"),
        ("ORD-2026-009", "PRD-007", "Top Sala Competition", 1, 1_200_000, "40"),
    ];
    let rows = items
        .into_iter()
        .enumerate()
        .map(|(i, (order, product, name, quantity, unit_price, size))| {
            row(json!({
                "id": format!("ITM-{:03}", i + 1),
                "order_id": order,
                "product_id": product,
                "product_name": name,
                "quantity": quantity,
                "unit_price": unit_price,
                "size": size,
            }))
        })
        .collect();
    store.load_table(tables::ORDER_ITEMS, rows);

    let returns = [
        ("RET-001", "ORD-2026-004", "CST-004", "Ukuran tidak sesuai", "PRD-008", "PENDING", None, 0),
        ("RET-002", "ORD-2026-005", "CST-005", "Barang cacat", "PRD-004", "APPROVED", Some("Penggantian dikirim"), 1),
        ("RET-003", "ORD-2026-007", "CST-006", "Salah warna", "PRD-012", "REJECTED", Some("Melewati batas waktu"), 15),
    ];
    let mut rows = Vec::new();
    for (id, order, customer, reason, product, status, notes, days_ago) in returns {
        rows.push(row(json!({
            "id": id,
            "order_id": order,
            "customer_id": customer,
            "reason": reason,
            "items": [{"product_id": product, "quantity": 1}],
            "status": status,
            "admin_notes": notes,
            "created_at": stamp(days_ago, 11)?,
            "updated_at": null,
        })));
    }
    store.load_table(tables::RETURNS, rows);

    let favorites = [
        ("CST-001", "PRD-001", 0, 9),
        ("CST-002", "PRD-001", 1, 9),
        ("CST-003", "PRD-001", 3, 9),
        ("CST-001", "PRD-005", 0, 12),
        ("CST-004", "PRD-011", 2, 9),
        ("CST-002", "PRD-011", 0, 13),
        ("CST-005", "PRD-003", 20, 9),
        ("CST-006", "PRD-005", 40, 9),
    ];
    let mut rows = Vec::new();
    for (user, product, days_ago, hour) in favorites {
        rows.push(row(json!({
            "user_id": user,
            "product_id": product,
            "created_at": stamp(days_ago, hour)?,
        })));
    }
    store.load_table(tables::FAVORITES, rows);

    Ok(store)
}

fn row(value: Value) -> Row {
    match value {
        Value::Object(map) => map,
        _ => Row::new(),
    }
}

/// In-memory identity provider
///
/// Sign-up mimics the backend trigger by inserting a `profiles` row with the
/// requested role into the attached store.
#[derive(Debug)]
pub struct MemoryAuth<S> {
    profiles: S,
    accounts: RwLock<HashMap<String, (String, AuthUser)>>,
    session: RwLock<Option<AuthUser>>,
    sign_outs: AtomicUsize,
}

impl<S: RowStore> MemoryAuth<S> {
    pub fn new(profiles: S) -> Self {
        Self {
            profiles,
            accounts: RwLock::new(HashMap::new()),
            session: RwLock::new(None),
            sign_outs: AtomicUsize::new(0),
        }
    }

    /// Register credentials for an existing profile id
    #[must_use]
    pub fn with_account(self, email: &str, password: &str, id: &str) -> Self {
        self.accounts.write().insert(
            email.to_string(),
            (
                password.to_string(),
                AuthUser {
                    id: id.to_string(),
                    email: email.to_string(),
                },
            ),
        );
        self
    }

    /// Provider with the seeded admin and shopper accounts
    #[must_use]
    pub fn demo(profiles: S) -> Self {
        Self::new(profiles)
            .with_account(DEMO_ADMIN.0, DEMO_ADMIN.1, "ADM-001")
            .with_account(DEMO_CUSTOMER.0, DEMO_CUSTOMER.1, "CST-001")
    }

    /// Number of completed sign-outs
    pub fn sign_out_count(&self) -> usize {
        self.sign_outs.load(Ordering::SeqCst)
    }

    pub fn session(&self) -> Option<AuthUser> {
        self.session.read().clone()
    }
}

#[async_trait]
impl<S: RowStore> AuthProvider for MemoryAuth<S> {
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthUser> {
        let user = {
            let accounts = self.accounts.read();
            match accounts.get(email) {
                Some((stored, user)) if stored == password => user.clone(),
                _ => return Err(StorefrontError::unauthorized("invalid email or password")),
            }
        };
        *self.session.write() = Some(user.clone());
        Ok(user)
    }

    async fn sign_up(&self, email: &str, password: &str, name: &str) -> Result<Option<AuthUser>> {
        if self.accounts.read().contains_key(email) {
            return Err(StorefrontError::validation("user already registered"));
        }
        let user = AuthUser {
            id: Uuid::new_v4().to_string(),
            email: email.to_string(),
        };
        self.accounts
            .write()
            .insert(email.to_string(), (password.to_string(), user.clone()));
        self.profiles
            .insert(
                tables::PROFILES,
                row(json!({
                    "id": user.id,
                    "email": email,
                    "name": name,
                    "role": ADMIN_ROLE,
                    "status": "active",
                })),
            )
            .await?;
        *self.session.write() = Some(user.clone());
        Ok(Some(user))
    }

    async fn sign_out(&self) -> Result<()> {
        *self.session.write() = None;
        self.sign_outs.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn current_user(&self) -> Result<Option<AuthUser>> {
        Ok(self.session.read().clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::RowQuery;

    #[tokio::test]
    async fn test_seeded_tables() {
        let store = seeded_store().unwrap();
        assert_eq!(store.table_len(tables::PRODUCTS), 12);
        assert_eq!(store.table_len(tables::PROFILES), 10);
        assert_eq!(store.table_len(tables::ORDERS), 9);
        assert_eq!(store.table_len(tables::ORDER_ITEMS), 10);
        assert_eq!(store.table_len(tables::RETURNS), 3);
        assert_eq!(store.table_len(tables::FAVORITES), 8);
    }

    #[tokio::test]
    async fn test_timestamps_follow_the_offset() {
        let store = seeded_store().unwrap();
        let rows = store
            .select(&RowQuery::table(tables::ORDERS).eq("id", "ORD-2026-002"))
            .await
            .unwrap();
        // 06:00 at UTC+7 is 23:00 UTC the day before
        assert_eq!(rows[0]["created_at"], json!("2026-01-17T23:00:00.000Z"));
    }

    #[tokio::test]
    async fn test_memory_auth_sign_in() {
        let auth = MemoryAuth::demo(Arc::new(MemoryStore::new()));
        assert!(auth.sign_in(DEMO_ADMIN.0, "wrong").await.is_err());
        let user = auth.sign_in(DEMO_ADMIN.0, DEMO_ADMIN.1).await.unwrap();
        assert_eq!(user.id, "ADM-001");
        assert_eq!(auth.current_user().await.unwrap(), Some(user));
        auth.sign_out().await.unwrap();
        assert!(auth.session().is_none());
        assert_eq!(auth.sign_out_count(), 1);
    }
}
