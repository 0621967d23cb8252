//! Tests for CLI feature functionality
//!
//! Commands are parsed with clap and run against the seeded demo store.

use clap::Parser;
use storefront_cli::{run, Cli, Commands, Decision};
use storefront_core::test_utils::{demo_clock, demo_storefront};
use storefront_core::{OrderStatus, PeriodKind, ProductSort, StorefrontError};

async fn execute(args: &[&str]) -> Result<String, StorefrontError> {
    let cli = Cli::try_parse_from(args.iter().copied()).unwrap();
    let storefront = demo_storefront().unwrap();
    let mut output = Vec::new();
    run(&storefront, &demo_clock(), &cli.command, cli.json, &mut output).await?;
    Ok(String::from_utf8(output).unwrap())
}

#[test]
fn test_core_command_parsing() {
    let test_cases = vec![
        vec!["storefront", "dashboard"],
        vec!["storefront", "products"],
        vec!["storefront", "orders", "--status", "shipped"],
        vec!["storefront", "customers", "--period", "monthly"],
        vec!["storefront", "returns", "-p", "weekly"],
        vec!["storefront", "favorites", "--period", "daily"],
        vec!["storefront", "period", "--period", "specific_date", "--date", "2026-03-10"],
        vec!["storefront", "review", "RET-001", "approve", "--notes", "ok"],
    ];

    for args in test_cases {
        let cli = Cli::try_parse_from(args.clone());
        assert!(cli.is_ok(), "Failed to parse: {:?}", args);
    }
}

#[test]
fn test_invalid_arguments_are_rejected() {
    let test_cases = vec![
        vec!["storefront", "orders", "--status", "SELESAI"],
        vec!["storefront", "customers", "--period", "fortnightly"],
        vec!["storefront", "period", "--period", "specific_month", "--month", "13"],
        vec!["storefront", "products", "--sort", "cheapest"],
        vec!["storefront", "review", "RET-001", "maybe"],
    ];

    for args in test_cases {
        assert!(Cli::try_parse_from(args.clone()).is_err(), "Parsed: {:?}", args);
    }
}

#[test]
fn test_global_flags() {
    let cli = Cli::try_parse_from([
        "storefront",
        "--demo",
        "--verbose",
        "--email",
        "admin@tungtungsport.com",
        "--password",
        "admin123",
        "products",
        "--json",
        "--sort",
        "price-asc",
    ])
    .unwrap();

    assert!(cli.demo);
    assert!(cli.verbose);
    assert!(cli.json);
    assert_eq!(
        cli.credentials(),
        Some(("admin@tungtungsport.com", "admin123"))
    );
    assert_eq!(
        cli.command,
        Commands::Products {
            search: None,
            brand: None,
            sort: ProductSort::PriceAsc,
        }
    );
}

#[test]
fn test_period_options() {
    let cli = Cli::try_parse_from([
        "storefront",
        "favorites",
        "--period",
        "specific_month",
        "--month",
        "2",
        "--year",
        "2024",
        "--product",
        "PRD-001",
    ])
    .unwrap();

    if let Commands::Favorites { period, product } = cli.command {
        assert_eq!(period.period, PeriodKind::SpecificMonth);
        assert_eq!(period.month, Some(2));
        assert_eq!(period.year, Some(2024));
        assert_eq!(product.as_deref(), Some("PRD-001"));
    } else {
        panic!("Expected Favorites command");
    }

    let cli = Cli::try_parse_from(["storefront", "set-status", "ORD-2026-002", "paid"]).unwrap();
    assert_eq!(
        cli.command,
        Commands::SetStatus {
            id: "ORD-2026-002".into(),
            status: OrderStatus::Paid,
        }
    );

    let cli = Cli::try_parse_from(["storefront", "review", "RET-001", "reject"]).unwrap();
    assert!(matches!(
        cli.command,
        Commands::Review {
            decision: Decision::Reject,
            ..
        }
    ));
}

#[tokio::test]
async fn test_dashboard_output() {
    let output = execute(&["storefront", "dashboard"]).await.unwrap();
    assert!(output.contains("Total sales:        Rp 6.199.000"));
    assert!(output.contains("Orders today:       2"));
    assert!(output.contains("Low stock products: 2"));
    assert!(output.contains("Sun 2026-01-18 Rp 6.300.000"));
    assert!(output.contains("Copa Pure.3 TF - 3 sold"));
}

#[tokio::test]
async fn test_products_output() {
    let output = execute(&["storefront", "products", "--brand", "Specs", "--sort", "price-asc"])
        .await
        .unwrap();
    assert!(output.starts_with("Found 2 products:"));
    let barricada = output.find("Barricada Ultima").unwrap();
    let lightspeed = output.find("Lightspeed Reborn").unwrap();
    assert!(barricada < lightspeed);
    assert!(output.contains("Rp 450.000"));
}

#[tokio::test]
async fn test_orders_output() {
    let output = execute(&["storefront", "orders", "--search", "citra"])
        .await
        .unwrap();
    assert!(output.starts_with("Found 1 orders:"));
    assert!(output.contains("ORD-2026-003 Citra Dewi Rp 4.100.000 [PAID]"));
    assert!(output.contains("1 x Copa Pure.3 TF @ Rp 900.000, size 43"));
}

#[tokio::test]
async fn test_customers_json_output() {
    let output = execute(&["storefront", "--json", "customers", "--period", "daily"])
        .await
        .unwrap();
    let customers: serde_json::Value = serde_json::from_str(&output).unwrap();
    let ids: Vec<_> = customers
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["id"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(ids.len(), 2);
    assert!(ids.contains(&"CST-007".to_string()));
    assert!(ids.contains(&"CST-009".to_string()));
}

#[tokio::test]
async fn test_favorites_output() {
    let output = execute(&["storefront", "favorites", "--period", "monthly"])
        .await
        .unwrap();
    assert!(output.contains("Total favorites: 6, average per product: 2"));
    assert!(output.contains("Most favorited: Phantom GX Elite FG (3)"));

    let empty = execute(&[
        "storefront",
        "favorites",
        "--period",
        "specific_month",
        "--month",
        "6",
        "--year",
        "2020",
    ])
    .await
    .unwrap();
    assert_eq!(empty.trim(), "No favorites in this period");
}

#[tokio::test]
async fn test_review_rules_surface_as_errors() {
    let output = execute(&["storefront", "review", "RET-001", "approve", "--notes", "ok"])
        .await
        .unwrap();
    assert!(output.contains("[APPROVED]"));

    let result = execute(&["storefront", "review", "RET-002", "reject"]).await;
    assert!(matches!(result, Err(StorefrontError::Validation { .. })));

    let result = execute(&["storefront", "cancel", "ORD-2026-008"]).await;
    assert!(matches!(result, Err(StorefrontError::Validation { .. })));
}

#[tokio::test]
async fn test_period_json_output() {
    let output = execute(&[
        "storefront",
        "period",
        "--period",
        "specific_date",
        "--date",
        "2026-03-10",
        "--json",
    ])
    .await
    .unwrap();
    let report: serde_json::Value = serde_json::from_str(&output).unwrap();
    assert_eq!(report["period"], "2026-03-10");
    assert_eq!(report["utc_start"], "2026-03-09T17:00:00.000Z");
    assert_eq!(report["utc_end"], "2026-03-10T16:59:59.999Z");
}
