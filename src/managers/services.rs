use crate::constants::report::{CURRENCY, UNKNOWN};
use crate::errors::HandlerError;
use crate::managers::ManagerDeps;
use crate::services::sodium::{ClientSlot, QueryParams};
use crate::services::tool_executor::{ToolHandler, ToolSpec};
use crate::services::validation::Validation;
use crate::utils::report::{
    array_at, bool_at, join_records, money, number_at, text_at, text_or_unknown, yes_no, Report,
};
use crate::utils::tool_errors::unknown_tool_error;
use async_trait::async_trait;
use serde_json::Value;

const SERVICE_TOOLS: &[ToolSpec] = &[
    ToolSpec::new("list-services", "listing services"),
    ToolSpec::new("get-service", "getting service"),
];

/// Read-only access to the tenant's billable service catalog.
#[derive(Clone)]
pub struct ServiceCatalogManager {
    validation: Validation,
    slot: ClientSlot,
}

impl ServiceCatalogManager {
    pub fn new(deps: &ManagerDeps) -> Self {
        Self {
            validation: deps.validation.clone(),
            slot: deps.slot.clone(),
        }
    }

    async fn list(&self, args: &Value) -> Result<String, HandlerError> {
        let client = self.slot.client()?;
        let query = QueryParams::from_args(
            args,
            &[
                "search",
                "category",
                "clientType",
                "isArchived",
                "sortBy",
                "sortDesc",
                "offset",
                "limit",
            ],
        );
        let services = client.list_services(&query).await?;
        if services.is_empty() {
            return Ok("No services found.".to_string());
        }
        Ok(format!(
            "Found {} service(s):\n\n{}",
            services.len(),
            join_records(services.iter().map(format_summary))
        ))
    }

    async fn get(&self, args: &Value) -> Result<String, HandlerError> {
        let client = self.slot.client()?;
        let code = self.validation.ensure_code(args, "code")?;
        let service = client.get_service(&code).await?;
        Ok(format!("Service Details:\n\n{}", format_detail(&service)))
    }
}

#[async_trait]
impl ToolHandler for ServiceCatalogManager {
    fn tools(&self) -> &'static [ToolSpec] {
        SERVICE_TOOLS
    }

    async fn handle(&self, tool: &str, args: Value) -> Result<String, HandlerError> {
        match tool {
            "list-services" => self.list(&args).await,
            "get-service" => self.get(&args).await,
            _ => Err(unknown_tool_error("services", tool, SERVICE_TOOLS).into()),
        }
    }
}

fn client_types(record: &Value) -> Option<String> {
    let types: Vec<&str> = array_at(record, "clientTypes")
        .iter()
        .filter_map(Value::as_str)
        .collect();
    (!types.is_empty()).then(|| types.join(", "))
}

fn price_or_unknown(record: &Value, path: &str) -> String {
    number_at(record, path)
        .map(money)
        .unwrap_or_else(|| format!("{}{}", CURRENCY, UNKNOWN))
}

fn header(record: &Value) -> Report {
    let mut report = Report::new();
    report
        .labeled("Code", text_or_unknown(record, &["code"]))
        .text("Name", record, "name")
        .text("Category", record, "category")
        .optional("Client Types", client_types(record))
        .text("Description", record, "description");
    report
}

fn format_summary(record: &Value) -> String {
    let mut report = header(record);
    report.flag("Archived", record, "isArchived");

    let pricing = array_at(record, "pricing");
    if !pricing.is_empty() {
        let summary: Vec<String> = pricing
            .iter()
            .map(|p| {
                format!(
                    "{} ({})",
                    price_or_unknown(p, "price"),
                    text_or_unknown(p, &["frequency"])
                )
            })
            .collect();
        report.labeled("Pricing", summary.join(", "));
    }

    let factors = array_at(record, "pricingFactors");
    if !factors.is_empty() {
        report.labeled("Pricing Factors", format!("{} question(s)", factors.len()));
    }
    report.finish()
}

/// Percentage adjustment of a pricing factor option, e.g. `+10%` for 0.1.
fn adjustment(value: f64) -> String {
    let sign = if value >= 0.0 { "+" } else { "" };
    format!("{}{:.0}%", sign, value * 100.0)
}

fn format_detail(record: &Value) -> String {
    let mut report = header(record);
    report
        .text("Accounting Code", record, "accountingCode")
        .labeled("Archived", yes_no(bool_at(record, "isArchived")));

    let pricing = array_at(record, "pricing");
    if !pricing.is_empty() {
        report.blank().line("Pricing:");
        for option in pricing {
            report.line(format!(
                "  {}: {}",
                text_or_unknown(option, &["frequency"]),
                price_or_unknown(option, "price")
            ));
            for range in array_at(option, "revenueRangeOverrides") {
                let price = number_at(range, "overridePrice")
                    .map(money)
                    .unwrap_or_else(|| "no override".to_string());
                report.line(format!(
                    "    Revenue range {}: {}",
                    text_or_unknown(range, &["revenueRangeCode"]),
                    price
                ));
                if let Some(note) = text_at(range, "overrideDescription") {
                    report.line(format!("      Note: {}", note));
                }
            }
        }
    }

    let factors = array_at(record, "pricingFactors");
    if !factors.is_empty() {
        report.blank().line("Pricing Factor Questions:");
        for factor in factors {
            report.line(format!(
                "  Q: {}",
                text_or_unknown(factor, &["description"])
            ));
            for option in array_at(factor, "options") {
                report.line(format!(
                    "    - {}: {}",
                    text_or_unknown(option, &["name"]),
                    adjustment(number_at(option, "value").unwrap_or(0.0))
                ));
            }
        }
    }

    if let Some(created) = text_at(record, "createdDate") {
        report.blank().labeled("Created", created);
    }
    report.text("Updated", record, "updatedDate");
    report.finish()
}
