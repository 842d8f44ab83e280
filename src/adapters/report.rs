use crate::domain::model::{display_value, Order, Organization, SummaryRecord};
use crate::domain::ports::{Presenter, Storage};
use crate::utils::error::Result;
use serde_json::Value;
use std::fmt::Write as _;
use std::io::{BufRead, Write};
use std::sync::Mutex;

const DETAIL_FIELDS: [(&str, &str); 14] = [
    ("number", "Number"),
    ("phone", "Phone"),
    ("status", "Status"),
    ("whenCreated", "Created"),
    ("whenConfirmed", "Confirmed"),
    ("whenPrinted", "Printed"),
    ("whenCookingCompleted", "Cooked"),
    ("whenSended", "Sent"),
    ("whenDelivered", "Delivered"),
    ("whenClosed", "Closed"),
    ("sum", "Sum"),
    ("deliveryDuration", "Duration (min)"),
    ("deliveryZone", "Zone"),
    ("comment", "Comment"),
];

fn lookup<'a>(value: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter()
        .try_fold(value, |current, key| current.get(*key))
        .filter(|v| !v.is_null())
}

fn lookup_text(value: &Value, path: &[&str]) -> String {
    lookup(value, path).map_or_else(|| "None".to_string(), display_value)
}

pub fn render_report(
    summary: &SummaryRecord,
    from: &str,
    to: &str,
    organizations: &[Organization],
) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "\n=== Report {} — {} ===", from, to);
    for org in organizations {
        let _ = writeln!(out, " - {} [{}]", org.name.as_deref().unwrap_or("None"), org.id);
    }
    let _ = writeln!(
        out,
        "Total: {}, without customer: {}, without phone: {}",
        summary.total, summary.no_client, summary.no_phone
    );
    let _ = writeln!(
        out,
        "Zero sums: {}, unique phones: {}",
        summary.zero_sum, summary.unique_phone_count
    );
    let _ = writeln!(out, "Invalid numbers: {}", summary.invalid_count);
    for phone in &summary.invalid {
        let _ = writeln!(out, "  ! {}", phone);
    }
    let _ = writeln!(out, "Duplicates (>1): {}", summary.duplicates.len());
    for (phone, count) in &summary.duplicates {
        let _ = writeln!(out, "  * {}: {}", phone, count);
    }
    out
}

pub fn render_order_list(orders: &[Order]) -> String {
    let mut out = String::new();
    for (i, order) in orders.iter().enumerate() {
        let _ = writeln!(
            out,
            "{}. №{} — {}",
            i + 1,
            order.number().unwrap_or_else(|| "None".to_string()),
            order.text("whenCreated").unwrap_or_else(|| "None".to_string())
        );
    }
    out
}

pub fn render_details(order: &Order) -> String {
    let body = order.body();
    let mut out = String::from("\n=== Details ===\n");

    for (key, label) in DETAIL_FIELDS {
        let _ = writeln!(out, "{}: {}", label, lookup_text(body, &[key]));
    }

    if let Some(customer) = lookup(body, &["customer"]) {
        let _ = writeln!(
            out,
            "Customer: {} {} (id={})",
            lookup_text(customer, &["name"]),
            lookup_text(customer, &["surname"]),
            lookup_text(customer, &["id"])
        );
    }

    if let Some(point) = lookup(body, &["deliveryPoint"]) {
        let parts: Vec<String> = [
            lookup(point, &["address", "street", "name"]),
            lookup(point, &["address", "house"]),
            lookup(point, &["address", "flat"]),
        ]
        .into_iter()
        .flatten()
        .map(display_value)
        .filter(|s| !s.is_empty())
        .collect();
        let _ = writeln!(out, "Address: {}", parts.join(" "));
    }

    out.push_str("Items:\n");
    if let Some(Value::Array(items)) = lookup(body, &["items"]) {
        for item in items {
            let _ = writeln!(
                out,
                " - {} x{} = {}",
                lookup_text(item, &["product", "name"]),
                lookup_text(item, &["amount"]),
                lookup_text(item, &["resultSum"])
            );
        }
    }

    if let Some(payment) = lookup(body, &["payments"])
        .and_then(Value::as_array)
        .and_then(|p| p.first())
    {
        let _ = writeln!(
            out,
            "Payment: {} {}",
            lookup_text(payment, &["paymentType", "name"]),
            lookup_text(payment, &["sum"])
        );
    }

    if let Some(Value::Array(discounts)) = lookup(body, &["discounts"]) {
        for discount in discounts {
            let _ = writeln!(
                out,
                "Discount: {} {}",
                lookup_text(discount, &["discountType", "name"]),
                lookup_text(discount, &["sum"])
            );
        }
    }

    out
}

/// 輸出 summary.json 與 orders.csv
pub async fn export_report<S: Storage>(
    storage: &S,
    summary: &SummaryRecord,
    orders: &[Order],
) -> Result<Vec<String>> {
    let summary_json = serde_json::to_string_pretty(summary)?;
    storage.write_file("summary.json", summary_json.as_bytes()).await?;

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(["number", "status", "phone", "sum", "whenCreated"])?;
    for order in orders {
        writer.write_record([
            order.number().unwrap_or_default(),
            order.text("status").unwrap_or_default(),
            order.phone().unwrap_or_default().to_string(),
            order.text("sum").unwrap_or_default(),
            order.text("whenCreated").unwrap_or_default(),
        ])?;
    }
    let csv_data = writer
        .into_inner()
        .map_err(|e| crate::utils::error::AuditError::IoError(e.into_error()))?;
    storage.write_file("orders.csv", &csv_data).await?;

    tracing::debug!("Exported summary and {} orders", orders.len());
    Ok(vec!["summary.json".to_string(), "orders.csv".to_string()])
}

/// Console presenter; the detail prompt reads one order number.
pub struct ConsolePresenter<R, W> {
    input: Mutex<R>,
    output: Mutex<W>,
}

impl ConsolePresenter<std::io::StdinLock<'static>, std::io::Stdout> {
    pub fn stdio() -> Self {
        Self::new(std::io::stdin().lock(), std::io::stdout())
    }
}

impl<R: BufRead, W: Write> ConsolePresenter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self {
            input: Mutex::new(input),
            output: Mutex::new(output),
        }
    }

    fn emit(&self, text: &str) -> Result<()> {
        let mut out = self
            .output
            .lock()
            .map_err(|_| std::io::Error::other("console lock poisoned"))?;
        out.write_all(text.as_bytes())?;
        out.flush()?;
        Ok(())
    }
}

impl<R: BufRead, W: Write> Presenter for ConsolePresenter<R, W> {
    fn report(
        &self,
        summary: &SummaryRecord,
        from: &str,
        to: &str,
        organizations: &[Organization],
    ) -> Result<()> {
        self.emit(&render_report(summary, from, to, organizations))
    }

    fn details(&self, orders: &[Order]) -> Result<()> {
        if orders.is_empty() {
            return Ok(());
        }
        self.emit(&render_order_list(orders))?;
        self.emit("Details #: ")?;

        let mut line = String::new();
        self.input
            .lock()
            .map_err(|_| std::io::Error::other("console lock poisoned"))?
            .read_line(&mut line)?;

        let picked = line
            .trim()
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .and_then(|i| orders.get(i));
        match picked {
            Some(order) => self.emit(&render_details(order)),
            None => Ok(()),
        }
    }
}
