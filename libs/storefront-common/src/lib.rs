//! Storefront Common - Shared constants and helpers for the storefront admin tools
//!
//! # Examples
//!
//! ```
//! use storefront_common::{format_rupiah, month_name, LOW_STOCK_THRESHOLD};
//!
//! assert_eq!(LOW_STOCK_THRESHOLD, 5);
//! assert_eq!(month_name(1), Some("Februari"));
//! assert_eq!(format_rupiah(3_500_000), "Rp 3.500.000");
//! ```

pub mod constants;
pub mod utils;

pub use constants::*;
pub use utils::*;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_re_exports() {
        assert_eq!(MONTH_NAMES.len(), 12);
        assert_eq!(DATE_FORMAT, "%Y-%m-%d");
        assert!(parse_date("2024-02-29").is_ok());
        assert_eq!(truncate_string("hi", 10), "hi");
    }
}
