use crate::errors::HandlerError;
use crate::managers::ManagerDeps;
use crate::services::sodium::{ClientSlot, QueryParams};
use crate::services::tool_executor::{ToolHandler, ToolSpec};
use crate::services::validation::Validation;
use crate::utils::report::{bool_at, join_records, text_at, text_or_unknown, yes_no, Report};
use crate::utils::tool_errors::unknown_tool_error;
use async_trait::async_trait;
use serde_json::Value;

const TEMPLATE_TOOLS: &[ToolSpec] = &[
    ToolSpec::new("list-document-templates", "listing document templates"),
    ToolSpec::new("get-document-template", "getting document template"),
];

#[derive(Clone)]
pub struct TemplateManager {
    validation: Validation,
    slot: ClientSlot,
}

impl TemplateManager {
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
            &["type", "search", "isActive", "sortBy", "sortDesc", "offset", "limit"],
        );
        let templates = client.list_document_templates(&query).await?;
        if templates.is_empty() {
            return Ok("No document templates found.".to_string());
        }
        Ok(format!(
            "Found {} template(s):\n\n{}",
            templates.len(),
            join_records(templates.iter().map(|t| format_template(t, false)))
        ))
    }

    async fn get(&self, args: &Value) -> Result<String, HandlerError> {
        let client = self.slot.client()?;
        let code = self.validation.ensure_code(args, "code")?;
        let template = client.get_document_template(&code).await?;
        Ok(format!(
            "Document Template Details:\n\n{}",
            format_template(&template, true)
        ))
    }
}

#[async_trait]
impl ToolHandler for TemplateManager {
    fn tools(&self) -> &'static [ToolSpec] {
        TEMPLATE_TOOLS
    }

    async fn handle(&self, tool: &str, args: Value) -> Result<String, HandlerError> {
        match tool {
            "list-document-templates" => self.list(&args).await,
            "get-document-template" => self.get(&args).await,
            _ => Err(unknown_tool_error("templates", tool, TEMPLATE_TOOLS).into()),
        }
    }
}

fn format_template(record: &Value, detailed: bool) -> String {
    let mut report = Report::new();
    report
        .labeled("Code", text_or_unknown(record, &["code"]))
        .text("Name", record, "name")
        .text("Type", record, "type")
        .text("Description", record, "description")
        .labeled("Active", yes_no(bool_at(record, "isActive")));
    if let Some(theme) = text_at(record, "defaultDesignTheme.name") {
        report.labeled(
            "Theme",
            format!(
                "{} ({})",
                theme,
                text_or_unknown(record, &["defaultDesignTheme.code"])
            ),
        );
    }
    if detailed {
        report
            .text("Created", record, "createdDate")
            .text("Updated", record, "updatedDate");
    }
    report.finish()
}

#[cfg(test)]
mod tests {
    use super::format_template;
    use serde_json::json;

    #[test]
    fn template_lists_active_flag_and_theme() {
        let record = json!({
            "code": "PT1",
            "name": "Standard Proposal",
            "type": "Proposal",
            "isActive": true,
            "defaultDesignTheme": {"code": "TH", "name": "Classic"},
            "updatedDate": "2024-01-01"
        });
        assert_eq!(
            format_template(&record, false),
            "Code: PT1\nName: Standard Proposal\nType: Proposal\nActive: Yes\nTheme: Classic (TH)"
        );
        assert!(format_template(&record, true).ends_with("\nUpdated: 2024-01-01"));
    }

    #[test]
    fn inactive_when_flag_missing() {
        assert_eq!(format_template(&json!({"code": "X"}), false), "Code: X\nActive: No");
    }
}
