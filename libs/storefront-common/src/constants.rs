//! Constants shared by the storefront admin crates

/// Products at or below this stock level count as low stock
pub const LOW_STOCK_THRESHOLD: i64 = 5;

/// Number of rows shown in dashboard "top" lists
pub const DEFAULT_TOP_LIMIT: usize = 5;

/// Number of days covered by the dashboard sales trend
pub const DEFAULT_TREND_DAYS: u32 = 7;

/// Longest sales trend the dashboard will build
pub const MAX_TREND_DAYS: u32 = 366;

/// Default HTTP request timeout in seconds
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Role stored on administrator profiles
pub const ADMIN_ROLE: &str = "admin";

/// Role stored on shopper profiles
pub const CUSTOMER_ROLE: &str = "customer";

/// Product categories offered by the catalog form
pub const PRODUCT_CATEGORIES: &[&str] = &["Futsal", "Football"];

/// Month names as shown by the period picker, indexed 0-11
pub const MONTH_NAMES: [&str; 12] = [
    "Januari",
    "Februari",
    "Maret",
    "April",
    "Mei",
    "Juni",
    "Juli",
    "Agustus",
    "September",
    "Oktober",
    "November",
    "Desember",
];

/// Short weekday labels indexed from Sunday
pub const WEEKDAY_LABELS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

/// Calendar date format used by the date picker
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Timestamp format used when showing range bounds
pub const DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_month_names_cover_the_year() {
        assert_eq!(MONTH_NAMES.len(), 12);
        assert_eq!(MONTH_NAMES[0], "Januari");
        assert_eq!(MONTH_NAMES[1], "Februari");
        assert_eq!(MONTH_NAMES[11], "Desember");
    }

    #[test]
    fn test_weekday_labels_start_on_sunday() {
        assert_eq!(WEEKDAY_LABELS[0], "Sun");
        assert_eq!(WEEKDAY_LABELS[6], "Sat");
    }

    #[test]
    fn test_dashboard_defaults() {
        assert_eq!(LOW_STOCK_THRESHOLD, 5);
        assert_eq!(DEFAULT_TOP_LIMIT, 5);
        assert_eq!(DEFAULT_TREND_DAYS, 7);
        assert!(DEFAULT_TREND_DAYS <= MAX_TREND_DAYS);
    }

    #[test]
    fn test_roles() {
        assert_eq!(ADMIN_ROLE, "admin");
        assert_eq!(CUSTOMER_ROLE, "customer");
    }
}
