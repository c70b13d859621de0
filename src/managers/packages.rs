use crate::errors::HandlerError;
use crate::managers::ManagerDeps;
use crate::services::sodium::{ClientSlot, QueryParams};
use crate::services::tool_executor::{ToolHandler, ToolSpec};
use crate::services::validation::Validation;
use crate::utils::report::{
    array_at, bool_at, entries_at, join_records, money, number_at, text_at, text_or_unknown,
    yes_no, Report,
};
use crate::utils::tool_errors::unknown_tool_error;
use async_trait::async_trait;
use serde_json::Value;

const PACKAGE_TOOLS: &[ToolSpec] = &[
    ToolSpec::new("list-service-packages", "listing service packages"),
    ToolSpec::new("get-service-package", "getting service package"),
];

#[derive(Clone)]
pub struct PackageManager {
    validation: Validation,
    slot: ClientSlot,
}

impl PackageManager {
    pub fn new(deps: &ManagerDeps) -> Self {
        Self {
            validation: deps.validation.clone(),
            slot: deps.slot.clone(),
        }
    }

    async fn list(&self, args: &Value) -> Result<String, HandlerError> {
        let client = self.slot.client()?;
        self.validation.ensure_string_list(args, "service")?;
        let query = QueryParams::from_args(
            args,
            &["search", "service", "sortBy", "sortDesc", "offset", "limit"],
        );
        let packages = client.list_service_packages(&query).await?;
        if packages.is_empty() {
            return Ok("No service packages found.".to_string());
        }
        Ok(format!(
            "Found {} package(s):\n\n{}",
            packages.len(),
            join_records(packages.iter().map(format_summary))
        ))
    }

    async fn get(&self, args: &Value) -> Result<String, HandlerError> {
        let client = self.slot.client()?;
        let code = self.validation.ensure_code(args, "code")?;
        let package = client.get_service_package(&code).await?;
        Ok(format!("Service Package Details:\n\n{}", format_detail(&package)))
    }
}

#[async_trait]
impl ToolHandler for PackageManager {
    fn tools(&self) -> &'static [ToolSpec] {
        PACKAGE_TOOLS
    }

    async fn handle(&self, tool: &str, args: Value) -> Result<String, HandlerError> {
        match tool {
            "list-service-packages" => self.list(&args).await,
            "get-service-package" => self.get(&args).await,
            _ => Err(unknown_tool_error("packages", tool, PACKAGE_TOOLS).into()),
        }
    }
}

/// Price set on a package item, only when the item overrides catalog pricing.
fn override_price(item: &Value) -> Option<f64> {
    if bool_at(item, "overridePricing") {
        number_at(item, "price")
    } else {
        None
    }
}

fn item_name(item: &Value) -> String {
    text_or_unknown(item, &["billableServiceName", "billableServiceCode"])
}

fn format_summary(record: &Value) -> String {
    let mut report = Report::new();
    report
        .labeled("Code", text_or_unknown(record, &["code"]))
        .text("Name", record, "name")
        .text("Description", record, "description")
        .flag("Archived", record, "isArchived")
        .money("Annual Value", record, "totalAnnualValue")
        .text("Services", record, "numberOfServices");

    let items = array_at(record, "items");
    if !items.is_empty() {
        report.line("Included Services:");
        for item in items {
            let price = override_price(item)
                .map(money)
                .unwrap_or_else(|| "standard pricing".to_string());
            report.line(format!(
                "  - {} ({}, {})",
                item_name(item),
                text_or_unknown(item, &["billingFrequency"]),
                price
            ));
        }
    }
    report.finish()
}

fn format_detail(record: &Value) -> String {
    let mut report = Report::new();
    report
        .labeled("Code", text_or_unknown(record, &["code"]))
        .text("Name", record, "name")
        .text("Description", record, "description")
        .labeled("Archived", yes_no(bool_at(record, "isArchived")))
        .money("Total Annual Value", record, "totalAnnualValue")
        .text("Number of Services", record, "numberOfServices");

    let items = array_at(record, "items");
    if !items.is_empty() {
        report.blank().line("Included Services:");
        for item in items {
            report.line(format!(
                "  - {} (code: {})",
                item_name(item),
                text_or_unknown(item, &["billableServiceCode"])
            ));
            if let Some(frequency) = text_at(item, "billingFrequency") {
                report.line(format!("    Billing: {}", frequency));
            }
            match override_price(item) {
                Some(price) => report.line(format!("    Price: {} (override)", money(price))),
                None => report.line("    Price: Standard pricing"),
            };
            let answers = entries_at(item, "pricingAnswers");
            if !answers.is_empty() {
                report.line("    Pre-answered pricing factors:");
                for (question, answer) in answers {
                    report.line(format!("      {}: {}", question, answer));
                }
            }
        }
    }

    if let Some(created) = text_at(record, "createdDate") {
        report.blank().labeled("Created", created);
    }
    report.text("Updated", record, "updatedDate");
    report.finish()
}
