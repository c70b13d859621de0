use crate::errors::HandlerError;
use crate::managers::ManagerDeps;
use crate::services::logger::Logger;
use crate::services::sodium::{ClientSlot, QueryParams};
use crate::services::tool_executor::{ToolHandler, ToolSpec};
use crate::services::validation::Validation;
use crate::utils::report::{join_records, reference_name, text_or_unknown, Report};
use crate::utils::tool_errors::unknown_tool_error;
use async_trait::async_trait;
use serde_json::Value;

const CLIENT_TOOLS: &[ToolSpec] = &[
    ToolSpec::new("list-clients", "listing clients"),
    ToolSpec::new("get-client", "getting client"),
    ToolSpec::new("create-client", "creating client"),
    ToolSpec::new("update-client", "updating client"),
    ToolSpec::new("delete-client", "deleting client"),
];

#[derive(Clone)]
pub struct ClientManager {
    logger: Logger,
    validation: Validation,
    slot: ClientSlot,
}

impl ClientManager {
    pub fn new(deps: &ManagerDeps) -> Self {
        Self {
            logger: deps.logger.child("clients"),
            validation: deps.validation.clone(),
            slot: deps.slot.clone(),
        }
    }

    async fn list(&self, args: &Value) -> Result<String, HandlerError> {
        let client = self.slot.client()?;
        let query = QueryParams::from_args(args, &["offset", "limit", "search"]);
        let clients = client.list_clients(&query).await?;
        if clients.is_empty() {
            return Ok("No clients found.".to_string());
        }
        Ok(format!(
            "Found {} client(s):\n\n{}",
            clients.len(),
            join_records(clients.iter().map(|record| format_client(record, false)))
        ))
    }

    async fn get(&self, args: &Value) -> Result<String, HandlerError> {
        let client = self.slot.client()?;
        let code = self.validation.ensure_code(args, "code")?;
        let record = client.get_client(&code).await?;
        Ok(format!("Client Details:\n\n{}", format_client(&record, true)))
    }

    async fn create(&self, args: &Value) -> Result<String, HandlerError> {
        let client = self.slot.client()?;
        self.validation.ensure_code(args, "name")?;
        let body = self.validation.select_fields(args, &["name", "type"]);
        let record = client.create_client(&body).await?;
        Ok(format_saved(&record, "created"))
    }

    async fn update(&self, args: &Value) -> Result<String, HandlerError> {
        let client = self.slot.client()?;
        let code = self.validation.ensure_code(args, "code")?;
        let body = self.validation.select_fields(args, &["name", "type", "status"]);
        let record = client.update_client(&code, &body).await?;
        Ok(format_saved(&record, "updated"))
    }

    async fn delete(&self, args: &Value) -> Result<String, HandlerError> {
        let client = self.slot.client()?;
        let code = self.validation.ensure_code(args, "code")?;
        client.delete_client(&code).await?;
        self.logger
            .info("client deleted", Some(&serde_json::json!({ "code": code })));
        Ok(format!("Client {} deleted successfully.", code))
    }
}

#[async_trait]
impl ToolHandler for ClientManager {
    fn tools(&self) -> &'static [ToolSpec] {
        CLIENT_TOOLS
    }

    async fn handle(&self, tool: &str, args: Value) -> Result<String, HandlerError> {
        match tool {
            "list-clients" => self.list(&args).await,
            "get-client" => self.get(&args).await,
            "create-client" => self.create(&args).await,
            "update-client" => self.update(&args).await,
            "delete-client" => self.delete(&args).await,
            _ => Err(unknown_tool_error("clients", tool, CLIENT_TOOLS).into()),
        }
    }
}

fn format_client(record: &Value, detailed: bool) -> String {
    let mut report = Report::new();
    report
        .labeled("Name", text_or_unknown(record, &["name"]))
        .labeled("Code", text_or_unknown(record, &["code"]))
        .text("Type", record, "type")
        .text("Status", record, "status")
        .optional("Manager", reference_name(record, "manager"))
        .optional("Partner", reference_name(record, "partner"))
        .text("Created", record, "createdDate");
    if detailed {
        report.text("Updated", record, "updatedDate");
    }
    report.finish()
}

fn format_saved(record: &Value, verb: &str) -> String {
    let mut report = Report::new();
    report
        .line(format!("Client {} successfully!", verb))
        .blank()
        .labeled("Code", text_or_unknown(record, &["code"]))
        .labeled("Name", text_or_unknown(record, &["name"]))
        .text("Type", record, "type")
        .text("Status", record, "status");
    report.finish()
}

#[cfg(test)]
mod tests {
    use super::{format_client, format_saved};
    use serde_json::json;

    #[test]
    fn summary_uses_reference_names_with_code_fallback() {
        let record = json!({
            "code": "C001",
            "name": "Acme Ltd",
            "type": "PrivateLimitedCompany",
            "manager": {"code": "U1", "name": "Jo Bloggs"},
            "partner": {"code": "U2"},
            "createdDate": "2024-01-02",
            "updatedDate": "2024-02-03"
        });
        assert_eq!(
            format_client(&record, false),
            "Name: Acme Ltd\nCode: C001\nType: PrivateLimitedCompany\nManager: Jo Bloggs\nPartner: U2\nCreated: 2024-01-02"
        );
        assert!(format_client(&record, true).ends_with("Updated: 2024-02-03"));
    }

    #[test]
    fn saved_report_leads_with_code() {
        let record = json!({"code": "C001", "name": "Acme Ltd", "status": "Active"});
        assert_eq!(
            format_saved(&record, "updated"),
            "Client updated successfully!\n\nCode: C001\nName: Acme Ltd\nStatus: Active"
        );
    }
}
