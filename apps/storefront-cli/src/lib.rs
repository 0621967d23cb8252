//! Storefront CLI library
//!
//! Argument definitions, the command dispatcher and the text renderers used by
//! the `storefront` binary.

pub mod logging;

use chrono::{DateTime, FixedOffset, Utc};
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use serde_json::json;
use std::io::Write;
use std::path::PathBuf;
use storefront_common::{format_date, format_datetime, format_rupiah, truncate_string};
use storefront_core::services::favorites::summarize;
use storefront_core::{
    Clock, Customer, DashboardSnapshot, DateRange, DateRangeResolver, FavoriteDetail,
    FavoriteProduct, FavoriteSummary, Order, OrderFilter, OrderStatus, PeriodForm, PeriodKind,
    Product, ProductFilter, ProductInput, ProductSort, ProductStatus, Result, ReturnFilter,
    ReturnRequest, ReturnStatus, RowStore, Storefront,
};

#[derive(Parser, Debug)]
#[command(name = "storefront")]
#[command(about = "Administer a hosted storefront from the command line")]
#[command(version)]
pub struct Cli {
    /// Configuration file (JSON or YAML); defaults to the standard locations
    #[arg(long, short)]
    pub config: Option<PathBuf>,

    /// Work on seeded in-memory demo data instead of the hosted backend
    #[arg(long)]
    pub demo: bool,

    /// Admin email used to sign in
    #[arg(long, env = "STOREFRONT_EMAIL")]
    pub email: Option<String>,

    /// Admin password used to sign in
    #[arg(long, env = "STOREFRONT_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Verbose output
    #[arg(long, short)]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub log_json: bool,

    /// Print results as JSON instead of text
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Email and password, when both were given
    #[must_use]
    pub fn credentials(&self) -> Option<(&str, &str)> {
        self.email.as_deref().zip(self.password.as_deref())
    }
}

/// The period picker as command line options
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct PeriodArgs {
    /// all, daily, weekly, monthly, yearly, specific_month or specific_date
    #[arg(long, short, default_value = "all")]
    pub period: PeriodKind,

    /// Month for specific_month, 1-12 (defaults to the current month)
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=12))]
    pub month: Option<u32>,

    /// Year for specific_month (defaults to the current year)
    #[arg(long)]
    pub year: Option<i32>,

    /// Date for specific_date, YYYY-MM-DD (defaults to today)
    #[arg(long)]
    pub date: Option<String>,
}

impl PeriodArgs {
    /// Picker state with unset fields defaulting to the clock's date
    #[must_use]
    pub fn form(&self, clock: &impl Clock) -> PeriodForm {
        let mut form = PeriodForm::new(self.period, clock);
        if let Some(month) = self.month {
            form.selected_month = month - 1;
        }
        if let Some(year) = self.year {
            form.selected_year = year;
        }
        if let Some(date) = &self.date {
            form.selected_date.clone_from(date);
        }
        form
    }
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Show the local and UTC bounds of a reporting period
    Period {
        #[command(flatten)]
        period: PeriodArgs,
    },
    /// List catalog products
    Products {
        /// Match against name and brand
        #[arg(long, short)]
        search: Option<String>,
        #[arg(long)]
        brand: Option<String>,
        /// newest, name-asc, name-desc, price-asc, price-desc, stock-asc or stock-desc
        #[arg(long, default_value = "newest")]
        sort: ProductSort,
    },
    /// Add a product to the catalog
    AddProduct {
        name: String,
        #[arg(long)]
        brand: String,
        #[arg(long, default_value = "Futsal")]
        category: String,
        #[arg(long)]
        price: i64,
        #[arg(long, default_value = "0")]
        stock: i64,
        /// active, inactive or low_stock
        #[arg(long, default_value = "active")]
        status: ProductStatus,
        #[arg(long)]
        image: Option<String>,
    },
    /// Remove a product from the catalog
    DeleteProduct { id: String },
    /// List orders, newest first
    Orders {
        /// Match against order number and customer name
        #[arg(long, short)]
        search: Option<String>,
        #[arg(long)]
        status: Option<OrderStatus>,
    },
    /// Move an order to a new status
    SetStatus { id: String, status: OrderStatus },
    /// Cancel an order that has not shipped
    Cancel { id: String },
    /// Record the courier tracking number of an order; an empty number clears it
    Track { id: String, number: String },
    /// List customers who registered within a period
    Customers {
        #[command(flatten)]
        period: PeriodArgs,
        /// Match against name, email and phone
        #[arg(long, short)]
        search: Option<String>,
    },
    /// List return requests filed within a period
    Returns {
        #[command(flatten)]
        period: PeriodArgs,
        /// Match against order number and customer name
        #[arg(long, short)]
        search: Option<String>,
        #[arg(long)]
        status: Option<ReturnStatus>,
    },
    /// Approve or reject a pending return request
    Review {
        id: String,
        #[arg(value_enum)]
        decision: Decision,
        #[arg(long, default_value = "")]
        notes: String,
    },
    /// Rank products by favorites within a period
    Favorites {
        #[command(flatten)]
        period: PeriodArgs,
        /// Show who favorited this product instead of the ranking
        #[arg(long)]
        product: Option<String>,
    },
    /// Show the dashboard overview
    Dashboard,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Approve,
    Reject,
}

/// Resolved reporting period, in both calendars
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PeriodReport {
    pub period: String,
    pub range: DateRange,
    pub utc_start: Option<String>,
    pub utc_end: Option<String>,
}

/// Resolve the period options against `clock` on a calendar at `offset`
///
/// # Errors
/// Returns `InvalidArgument` for an unparseable date or an unrepresentable year
pub fn resolve_period<C: Clock>(
    args: &PeriodArgs,
    clock: C,
    offset: &FixedOffset,
) -> Result<PeriodReport> {
    let form = args.form(&clock);
    let selector = form.selector()?;
    let range = DateRangeResolver::with_clock(clock).resolve(&selector)?;
    let utc = range.to_utc(offset)?;
    Ok(PeriodReport {
        period: selector.to_string(),
        range,
        utc_start: utc.map(|bounds| bounds.start_iso()),
        utc_end: utc.map(|bounds| bounds.end_iso()),
    })
}

/// Run a command against the services and write its result
///
/// # Errors
/// Returns the service error, or an error if writing fails
pub async fn run<S, C, W>(
    storefront: &Storefront<S>,
    clock: &C,
    command: &Commands,
    json_output: bool,
    writer: &mut W,
) -> Result<()>
where
    S: RowStore,
    C: Clock + Copy,
    W: Write,
{
    let offset = storefront.offset();
    match command {
        Commands::Period { period } => {
            let report = resolve_period(period, *clock, &offset)?;
            render(&report, json_output, writer, print_period)
        }
        Commands::Products {
            search,
            brand,
            sort,
        } => {
            let filter = ProductFilter {
                search: search.clone(),
                brand: brand.clone(),
            };
            let products = storefront.catalog().list(&filter, *sort).await?;
            render(&products, json_output, writer, |p, w| print_products(p, w))
        }
        Commands::AddProduct {
            name,
            brand,
            category,
            price,
            stock,
            status,
            image,
        } => {
            let input = ProductInput {
                name: name.clone(),
                brand: brand.clone(),
                category: category.clone(),
                price: *price,
                stock: *stock,
                status: *status,
                image_url: image.clone(),
                video_url: None,
            };
            let product = storefront.catalog().create(&input).await?;
            render(&product, json_output, writer, |p, w| {
                print_products(std::slice::from_ref(p), w)
            })
        }
        Commands::DeleteProduct { id } => {
            storefront.catalog().delete(id).await?;
            render(&json!({ "deleted": id }), json_output, writer, |_, w| {
                writeln!(w, "Deleted product {id}")?;
                Ok(())
            })
        }
        Commands::Orders { search, status } => {
            let filter = OrderFilter {
                search: search.clone(),
                status: *status,
            };
            let orders = storefront.orders().list(&filter).await?;
            render(&orders, json_output, writer, |o, w| print_orders(o, &offset, w))
        }
        Commands::SetStatus { id, status } => {
            let order = storefront.orders().update_status(id, *status).await?;
            render(&order, json_output, writer, |o, w| {
                print_orders(std::slice::from_ref(o), &offset, w)
            })
        }
        Commands::Cancel { id } => {
            let order = storefront.orders().cancel(id).await?;
            render(&order, json_output, writer, |o, w| {
                print_orders(std::slice::from_ref(o), &offset, w)
            })
        }
        Commands::Track { id, number } => {
            let order = storefront.orders().set_tracking_number(id, number).await?;
            render(&order, json_output, writer, |o, w| {
                print_orders(std::slice::from_ref(o), &offset, w)
            })
        }
        Commands::Customers { period, search } => {
            let range = resolve_period(period, *clock, &offset)?.range;
            let customers = storefront
                .customers()
                .list(&range, search.as_deref())
                .await?;
            render(&customers, json_output, writer, |c, w| {
                print_customers(c, &offset, w)
            })
        }
        Commands::Returns {
            period,
            search,
            status,
        } => {
            let range = resolve_period(period, *clock, &offset)?.range;
            let filter = ReturnFilter {
                search: search.clone(),
                status: *status,
            };
            let requests = storefront.returns().list(&range, &filter).await?;
            render(&requests, json_output, writer, |r, w| {
                print_returns(r, &offset, w)
            })
        }
        Commands::Review {
            id,
            decision,
            notes,
        } => {
            let returns = storefront.returns();
            let request = match decision {
                Decision::Approve => returns.approve(id, notes).await?,
                Decision::Reject => returns.reject(id, notes).await?,
            };
            render(&request, json_output, writer, |r, w| {
                print_returns(std::slice::from_ref(r), &offset, w)
            })
        }
        Commands::Favorites { period, product } => {
            let range = resolve_period(period, *clock, &offset)?.range;
            if let Some(product_id) = product {
                let details = storefront.favorites().details(product_id, &range).await?;
                render(&details, json_output, writer, |d, w| {
                    print_favorite_details(d, &offset, w)
                })
            } else {
                let ranking = storefront.favorites().ranking(&range).await?;
                let report = FavoritesReport {
                    summary: summarize(&ranking),
                    products: ranking,
                };
                render(&report, json_output, writer, |r, w| {
                    print_favorites(&r.products, &r.summary, w)
                })
            }
        }
        Commands::Dashboard => {
            let snapshot = storefront.dashboard().snapshot(clock).await?;
            render(&snapshot, json_output, writer, |s, w| {
                print_dashboard(s, &offset, w)
            })
        }
    }
}

/// Favorites ranking with its headline numbers
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FavoritesReport {
    pub summary: FavoriteSummary,
    pub products: Vec<FavoriteProduct>,
}

fn render<T, W, F>(value: &T, json_output: bool, writer: &mut W, text: F) -> Result<()>
where
    T: Serialize,
    W: Write,
    F: FnOnce(&T, &mut W) -> Result<()>,
{
    if json_output {
        print_json(value, writer)
    } else {
        text(value, writer)
    }
}

/// Write any result as pretty JSON
///
/// # Errors
/// Returns an error if serialization or writing fails
pub fn print_json<T: Serialize, W: Write>(value: &T, writer: &mut W) -> Result<()> {
    serde_json::to_writer_pretty(&mut *writer, value)?;
    writeln!(writer)?;
    Ok(())
}

fn local_date(at: &DateTime<Utc>, offset: &FixedOffset) -> String {
    format_date(&at.with_timezone(offset).date_naive())
}

fn local_time(at: &DateTime<Utc>, offset: &FixedOffset) -> String {
    at.with_timezone(offset).format("%Y-%m-%d %H:%M").to_string()
}

/// # Errors
/// Returns an error if writing fails
pub fn print_period<W: Write>(report: &PeriodReport, writer: &mut W) -> Result<()> {
    writeln!(writer, "Period: {}", report.period)?;
    match report.range.bounds() {
        Some((start, end)) => {
            writeln!(
                writer,
                "  Local: {} .. {}",
                format_datetime(&start),
                format_datetime(&end)
            )?;
            if let (Some(start), Some(end)) = (&report.utc_start, &report.utc_end) {
                writeln!(writer, "  UTC:   {start} .. {end}")?;
            }
        }
        None => writeln!(writer, "  Unbounded (all time)")?,
    }
    Ok(())
}

/// Print products to the given writer
///
/// # Errors
/// Returns an error if writing fails
pub fn print_products<W: Write>(products: &[Product], writer: &mut W) -> Result<()> {
    if products.is_empty() {
        writeln!(writer, "No products found")?;
        return Ok(());
    }

    writeln!(writer, "Found {} products:", products.len())?;
    for product in products {
        writeln!(
            writer,
            "  • {} {} ({}) {}",
            product.id,
            product.name,
            product.brand,
            format_rupiah(product.price)
        )?;
        writeln!(
            writer,
            "    Stock: {}, Status: {}, Favorites: {}",
            product.stock,
            product.status.as_str(),
            product.favorite_count
        )?;
    }
    Ok(())
}

/// Print orders with their lines
///
/// # Errors
/// Returns an error if writing fails
pub fn print_orders<W: Write>(
    orders: &[Order],
    offset: &FixedOffset,
    writer: &mut W,
) -> Result<()> {
    if orders.is_empty() {
        writeln!(writer, "No orders found")?;
        return Ok(());
    }

    writeln!(writer, "Found {} orders:", orders.len())?;
    for order in orders {
        writeln!(
            writer,
            "  • {} {} {} [{}]",
            order.order_number,
            order.customer_name(),
            format_rupiah(order.total),
            order.status
        )?;
        writeln!(writer, "    Placed: {}", local_time(&order.created_at, offset))?;
        for item in &order.items {
            let size = item
                .size
                .as_deref()
                .map(|size| format!(", size {size}"))
                .unwrap_or_default();
            writeln!(
                writer,
                "    {} x {} @ {}{size}",
                item.quantity,
                item.product_name,
                format_rupiah(item.unit_price)
            )?;
        }
        if let Some(tracking) = &order.tracking_number {
            let courier = order.courier.as_deref().unwrap_or("courier");
            writeln!(writer, "    Tracking: {courier} {tracking}")?;
        }
    }
    Ok(())
}

/// # Errors
/// Returns an error if writing fails
pub fn print_customers<W: Write>(
    customers: &[Customer],
    offset: &FixedOffset,
    writer: &mut W,
) -> Result<()> {
    if customers.is_empty() {
        writeln!(writer, "No customers found")?;
        return Ok(());
    }

    writeln!(writer, "Found {} customers:", customers.len())?;
    for customer in customers {
        writeln!(
            writer,
            "  • {} <{}> [{}]",
            customer.name.as_deref().unwrap_or("-"),
            customer.email,
            customer.status
        )?;
        if let Some(phone) = &customer.phone {
            writeln!(writer, "    Phone: {phone}")?;
        }
        let last = customer
            .last_order_date
            .as_ref()
            .map_or_else(|| "never".to_string(), |at| local_date(at, offset));
        writeln!(
            writer,
            "    Orders: {}, last order: {last}",
            customer.order_count
        )?;
    }
    Ok(())
}

/// # Errors
/// Returns an error if writing fails
pub fn print_returns<W: Write>(
    requests: &[ReturnRequest],
    offset: &FixedOffset,
    writer: &mut W,
) -> Result<()> {
    if requests.is_empty() {
        writeln!(writer, "No return requests found")?;
        return Ok(());
    }

    writeln!(writer, "Found {} return requests:", requests.len())?;
    for request in requests {
        let customer = request
            .customer
            .as_ref()
            .map_or("Unknown", |customer| customer.display_name());
        writeln!(
            writer,
            "  • {} {} {} [{}]",
            request.id,
            request.order_number.as_deref().unwrap_or(&request.order_id),
            customer,
            request.status
        )?;
        writeln!(
            writer,
            "    Filed: {}, Reason: {}",
            local_date(&request.created_at, offset),
            truncate_string(&request.reason, 60)
        )?;
        if let Some(notes) = request.admin_notes.as_deref().filter(|n| !n.is_empty()) {
            writeln!(writer, "    Notes: {notes}")?;
        }
    }
    Ok(())
}

/// Print the favorites ranking under its summary line
///
/// # Errors
/// Returns an error if writing fails
pub fn print_favorites<W: Write>(
    ranking: &[FavoriteProduct],
    summary: &FavoriteSummary,
    writer: &mut W,
) -> Result<()> {
    if ranking.is_empty() {
        writeln!(writer, "No favorites in this period")?;
        return Ok(());
    }

    writeln!(
        writer,
        "Total favorites: {}, average per product: {}",
        summary.total, summary.average
    )?;
    if let Some(top) = &summary.top {
        writeln!(writer, "Most favorited: {} ({})", top.name, top.favorite_count)?;
    }
    for (rank, product) in ranking.iter().enumerate() {
        writeln!(
            writer,
            "  {:>2}. {} ({}) ♥ {}",
            rank + 1,
            product.name,
            product.brand,
            product.favorite_count
        )?;
    }
    Ok(())
}

/// # Errors
/// Returns an error if writing fails
pub fn print_favorite_details<W: Write>(
    details: &[FavoriteDetail],
    offset: &FixedOffset,
    writer: &mut W,
) -> Result<()> {
    if details.is_empty() {
        writeln!(writer, "Nobody favorited this product in this period")?;
        return Ok(());
    }

    writeln!(writer, "Favorited by {} customers:", details.len())?;
    for detail in details {
        writeln!(
            writer,
            "  • {} <{}> on {}",
            detail.user_name,
            detail.user_email,
            local_time(&detail.created_at, offset)
        )?;
    }
    Ok(())
}

/// Print every dashboard panel
///
/// # Errors
/// Returns an error if writing fails
pub fn print_dashboard<W: Write>(
    snapshot: &DashboardSnapshot,
    offset: &FixedOffset,
    writer: &mut W,
) -> Result<()> {
    let stats = &snapshot.stats;
    writeln!(writer, "Total sales:        {}", format_rupiah(stats.total_sales))?;
    writeln!(writer, "Orders today:       {}", stats.orders_today)?;
    writeln!(writer, "Low stock products: {}", stats.low_stock_products)?;
    writeln!(writer, "Total favorites:    {}", stats.total_favorites)?;

    writeln!(writer)?;
    writeln!(writer, "Sales, last {} days:", snapshot.daily_sales.len())?;
    for day in &snapshot.daily_sales {
        writeln!(
            writer,
            "  {} {} {}",
            day.day,
            format_date(&day.date),
            format_rupiah(day.sales)
        )?;
    }

    writeln!(writer)?;
    writeln!(writer, "Most favorited:")?;
    for product in &snapshot.top_products {
        writeln!(
            writer,
            "  • {} ({}) ♥ {}",
            product.name, product.brand, product.favorite_count
        )?;
    }

    writeln!(writer)?;
    writeln!(writer, "Best sellers:")?;
    for seller in &snapshot.best_sellers {
        writeln!(
            writer,
            "  • {} - {} sold",
            seller.product_name, seller.total_sold
        )?;
    }

    writeln!(writer)?;
    writeln!(writer, "Recent orders:")?;
    for order in &snapshot.recent_orders {
        writeln!(
            writer,
            "  • {} {} {} [{}] {}",
            order.order_number,
            order.customer_name,
            format_rupiah(order.total),
            order.status,
            local_time(&order.created_at, offset)
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use storefront_core::test_utils::{demo_clock, demo_offset};

    #[test]
    fn test_period_args_fill_the_form() {
        let args = PeriodArgs {
            period: PeriodKind::SpecificMonth,
            month: Some(2),
            year: Some(2024),
            date: None,
        };
        let form = args.form(&demo_clock());
        assert_eq!(form.selected_month, 1);
        assert_eq!(form.selected_year, 2024);
        assert_eq!(form.selected_date, "2026-01-18");
    }

    #[test]
    fn test_resolve_period_reports_utc_bounds() {
        let args = PeriodArgs {
            period: PeriodKind::Daily,
            month: None,
            year: None,
            date: None,
        };
        let report = resolve_period(&args, demo_clock(), &demo_offset()).unwrap();
        assert_eq!(report.period, "daily");
        assert_eq!(report.utc_start.as_deref(), Some("2026-01-17T17:00:00.000Z"));
        assert_eq!(report.utc_end.as_deref(), Some("2026-01-18T16:59:59.999Z"));
    }

    #[test]
    fn test_print_period_unbounded() {
        let args = PeriodArgs {
            period: PeriodKind::All,
            month: None,
            year: None,
            date: None,
        };
        let report = resolve_period(&args, demo_clock(), &demo_offset()).unwrap();
        let mut output = Vec::new();
        print_period(&report, &mut output).unwrap();
        let text = String::from_utf8(output).unwrap();
        assert!(text.contains("Unbounded"));
        assert!(report.utc_start.is_none());
    }

    #[test]
    fn test_print_empty_lists() {
        let mut output = Vec::new();
        print_products(&[], &mut output).unwrap();
        print_orders(&[], &demo_offset(), &mut output).unwrap();
        let text = String::from_utf8(output).unwrap();
        assert!(text.contains("No products found"));
        assert!(text.contains("No orders found"));
    }
}
