use crate::errors::HandlerError;
use crate::managers::ManagerDeps;
use crate::services::sodium::ClientSlot;
use crate::services::tool_executor::{ToolHandler, ToolSpec};
use crate::services::validation::Validation;
use crate::utils::report::{
    entries_at, format_number, money, number_at, text_at, text_or_unknown, Report,
};
use crate::utils::tool_errors::unknown_tool_error;
use async_trait::async_trait;
use serde_json::Value;

const CLIENT_SERVICE_TOOLS: &[ToolSpec] = &[
    ToolSpec::new("list-client-services", "listing client services"),
    ToolSpec::new("get-client-service", "getting client service"),
    ToolSpec::new("create-client-service", "creating client service"),
    ToolSpec::new("update-client-service", "updating client service"),
];

const SERVICE_FIELDS: &[&str] = &[
    "billableServiceCode",
    "billingFrequency",
    "startDate",
    "status",
    "overridePricing",
    "price",
    "priceAdjustmentPercentage",
    "endDate",
    "managedByUserCode",
    "pricingAnswers",
];

/// Billable services assigned to a single client.
#[derive(Clone)]
pub struct ClientServiceManager {
    validation: Validation,
    slot: ClientSlot,
}

impl ClientServiceManager {
    pub fn new(deps: &ManagerDeps) -> Self {
        Self {
            validation: deps.validation.clone(),
            slot: deps.slot.clone(),
        }
    }

    async fn list(&self, args: &Value) -> Result<String, HandlerError> {
        let client = self.slot.client()?;
        let client_code = self.validation.ensure_code(args, "clientCode")?;
        let services = client.list_client_services(&client_code).await?;
        if services.is_empty() {
            return Ok(format!("No services found for client {}.", client_code));
        }
        let formatted: Vec<String> = services
            .iter()
            .map(|svc| format_service(svc, Layout::Listing))
            .collect();
        let codes: Vec<String> = services
            .iter()
            .filter_map(|svc| text_at(svc, "code"))
            .collect();
        let mut report = Report::new();
        report
            .line(format!(
                "Client services for {} ({} service(s)):",
                client_code,
                services.len()
            ))
            .blank()
            .line(formatted.join("\n\n"))
            .blank()
            .labeled("Service codes for engagement creation", codes.join(", "));
        Ok(report.finish())
    }

    async fn get(&self, args: &Value) -> Result<String, HandlerError> {
        let client = self.slot.client()?;
        let client_code = self.validation.ensure_code(args, "clientCode")?;
        let service_code = self.validation.ensure_code(args, "serviceCode")?;
        let record = client
            .get_client_service(&client_code, &service_code)
            .await?;
        Ok(format!(
            "Client Service Details:\n\n{}",
            format_service(&record, Layout::Detail)
        ))
    }

    fn body(&self, args: &Value) -> Result<Value, HandlerError> {
        for key in ["billableServiceCode", "billingFrequency", "startDate", "status"] {
            self.validation.ensure_code(args, key)?;
        }
        Ok(self.validation.select_fields(args, SERVICE_FIELDS))
    }

    async fn create(&self, args: &Value) -> Result<String, HandlerError> {
        let client = self.slot.client()?;
        let client_code = self.validation.ensure_code(args, "clientCode")?;
        let body = self.body(args)?;
        let record = client.create_client_service(&client_code, &body).await?;
        Ok(format!(
            "Service assigned to client {} successfully!\n\n{}",
            client_code,
            format_service(&record, Layout::Created)
        ))
    }

    async fn update(&self, args: &Value) -> Result<String, HandlerError> {
        let client = self.slot.client()?;
        let client_code = self.validation.ensure_code(args, "clientCode")?;
        let service_code = self.validation.ensure_code(args, "serviceCode")?;
        let body = self.body(args)?;
        let record = client
            .update_client_service(&client_code, &service_code, &body)
            .await?;
        Ok(format!(
            "Client service updated successfully!\n\n{}",
            format_service(&record, Layout::Updated)
        ))
    }
}

#[async_trait]
impl ToolHandler for ClientServiceManager {
    fn tools(&self) -> &'static [ToolSpec] {
        CLIENT_SERVICE_TOOLS
    }

    async fn handle(&self, tool: &str, args: Value) -> Result<String, HandlerError> {
        match tool {
            "list-client-services" => self.list(&args).await,
            "get-client-service" => self.get(&args).await,
            "create-client-service" => self.create(&args).await,
            "update-client-service" => self.update(&args).await,
            _ => Err(unknown_tool_error("client services", tool, CLIENT_SERVICE_TOOLS).into()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Layout {
    /// Indented, every field.
    Listing,
    /// Every field.
    Detail,
    Created,
    Updated,
}

fn format_service(record: &Value, layout: Layout) -> String {
    let indent = if layout == Layout::Listing { "  " } else { "" };
    let full = matches!(layout, Layout::Listing | Layout::Detail);
    let mut report = Report::new();
    report.line(format!(
        "{} (code: {})",
        text_or_unknown(record, &["billableService.name", "code"]),
        text_or_unknown(record, &["code"])
    ));
    let mut push = |label: &str, value: Option<String>| {
        if let Some(value) = value {
            report.line(format!("{}{}: {}", indent, label, value));
        }
    };
    push("Billing", text_at(record, "billingFrequency"));
    push("Price", number_at(record, "calculatedPrice").map(money));
    if full {
        push(
            "Adjustment",
            number_at(record, "priceAdjustmentPercentage")
                .filter(|pct| *pct != 0.0)
                .map(|pct| format!("{}%", format_number(pct))),
        );
    }
    push("Start", text_at(record, "startDate"));
    if layout != Layout::Created {
        push("End", text_at(record, "endDate"));
    }
    push("Status", text_at(record, "status"));

    let answers = entries_at(record, "pricingAnswers");
    if full && !answers.is_empty() {
        report.line(format!("{}Pricing answers:", indent));
        for (question, answer) in answers {
            report.line(format!("{}  {}: {}", indent, question, answer));
        }
    }
    report.finish()
}

#[cfg(test)]
mod tests {
    use super::{format_service, Layout};
    use serde_json::json;

    fn assigned() -> serde_json::Value {
        json!({
            "code": "CBS1",
            "billableService": {"code": "PAY", "name": "Payroll"},
            "billingFrequency": "Monthly",
            "calculatedPrice": 56.25,
            "priceAdjustmentPercentage": 12.5,
            "startDate": "2024-04-01",
            "endDate": "2025-03-31",
            "status": "Proposed",
            "pricingAnswers": {"Employees": "6+"}
        })
    }

    #[test]
    fn listing_layout_is_indented_and_complete() {
        assert_eq!(
            format_service(&assigned(), Layout::Listing),
            [
                "Payroll (code: CBS1)",
                "  Billing: Monthly",
                "  Price: £56.25",
                "  Adjustment: 12.5%",
                "  Start: 2024-04-01",
                "  End: 2025-03-31",
                "  Status: Proposed",
                "  Pricing answers:",
                "    Employees: 6+",
            ]
            .join("\n")
        );
    }

    #[test]
    fn created_layout_is_short() {
        assert_eq!(
            format_service(&assigned(), Layout::Created),
            "Payroll (code: CBS1)\nBilling: Monthly\nPrice: £56.25\nStart: 2024-04-01\nStatus: Proposed"
        );
    }

    #[test]
    fn name_falls_back_to_code() {
        let record = json!({"code": "CBS2", "priceAdjustmentPercentage": 0});
        assert_eq!(format_service(&record, Layout::Detail), "CBS2 (code: CBS2)");
        assert_eq!(format_service(&json!({}), Layout::Updated), "? (code: ?)");
    }
}
