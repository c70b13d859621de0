use crate::errors::HandlerError;
use crate::managers::ManagerDeps;
use crate::services::logger::Logger;
use crate::services::sodium::ClientSlot;
use crate::services::tool_executor::{ToolHandler, ToolSpec};
use crate::services::validation::Validation;
use crate::utils::report::{join_records, text_at, text_or_unknown, Report};
use crate::utils::tool_errors::unknown_tool_error;
use async_trait::async_trait;
use serde_json::Value;

const CONTACT_TOOLS: &[ToolSpec] = &[
    ToolSpec::new("list-client-contacts", "listing contacts"),
    ToolSpec::new("get-client-contact", "getting contact"),
    ToolSpec::new("create-client-contact", "creating contact"),
    ToolSpec::new("update-client-contact", "updating contact"),
    ToolSpec::new("delete-client-contact", "deleting contact"),
];

const CONTACT_FIELDS: &[&str] = &["firstName", "lastName", "email", "phone", "type", "isPrimary"];

#[derive(Clone)]
pub struct ContactManager {
    logger: Logger,
    validation: Validation,
    slot: ClientSlot,
}

impl ContactManager {
    pub fn new(deps: &ManagerDeps) -> Self {
        Self {
            logger: deps.logger.child("contacts"),
            validation: deps.validation.clone(),
            slot: deps.slot.clone(),
        }
    }

    async fn list(&self, args: &Value) -> Result<String, HandlerError> {
        let client = self.slot.client()?;
        let client_code = self.validation.ensure_code(args, "clientCode")?;
        let contacts = client.list_client_contacts(&client_code).await?;
        if contacts.is_empty() {
            return Ok(format!("No contacts found for client {}.", client_code));
        }
        Ok(format!(
            "Found {} contact(s) for client {}:\n\n{}",
            contacts.len(),
            client_code,
            join_records(contacts.iter().map(format_contact))
        ))
    }

    async fn get(&self, args: &Value) -> Result<String, HandlerError> {
        let client = self.slot.client()?;
        let client_code = self.validation.ensure_code(args, "clientCode")?;
        let contact_code = self.validation.ensure_code(args, "contactCode")?;
        let record = client.get_client_contact(&client_code, &contact_code).await?;
        Ok(format!("Contact Details:\n\n{}", format_contact(&record)))
    }

    async fn create(&self, args: &Value) -> Result<String, HandlerError> {
        let client = self.slot.client()?;
        let client_code = self.validation.ensure_code(args, "clientCode")?;
        let body = self.validation.select_fields(args, CONTACT_FIELDS);
        let record = client.create_client_contact(&client_code, &body).await?;
        Ok(format_saved(&record, "created"))
    }

    async fn update(&self, args: &Value) -> Result<String, HandlerError> {
        let client = self.slot.client()?;
        let client_code = self.validation.ensure_code(args, "clientCode")?;
        let contact_code = self.validation.ensure_code(args, "contactCode")?;
        let body = self.validation.select_fields(args, CONTACT_FIELDS);
        let record = client
            .update_client_contact(&client_code, &contact_code, &body)
            .await?;
        Ok(format_saved(&record, "updated"))
    }

    async fn delete(&self, args: &Value) -> Result<String, HandlerError> {
        let client = self.slot.client()?;
        let client_code = self.validation.ensure_code(args, "clientCode")?;
        let contact_code = self.validation.ensure_code(args, "contactCode")?;
        client
            .delete_client_contact(&client_code, &contact_code)
            .await?;
        self.logger.info(
            "contact deleted",
            Some(&serde_json::json!({ "client": client_code, "contact": contact_code })),
        );
        Ok(format!(
            "Contact {} deleted from client {} successfully.",
            contact_code, client_code
        ))
    }
}

#[async_trait]
impl ToolHandler for ContactManager {
    fn tools(&self) -> &'static [ToolSpec] {
        CONTACT_TOOLS
    }

    async fn handle(&self, tool: &str, args: Value) -> Result<String, HandlerError> {
        match tool {
            "list-client-contacts" => self.list(&args).await,
            "get-client-contact" => self.get(&args).await,
            "create-client-contact" => self.create(&args).await,
            "update-client-contact" => self.update(&args).await,
            "delete-client-contact" => self.delete(&args).await,
            _ => Err(unknown_tool_error("contacts", tool, CONTACT_TOOLS).into()),
        }
    }
}

fn display_name(record: &Value) -> String {
    let parts: Vec<String> = ["firstName", "lastName"]
        .iter()
        .filter_map(|key| text_at(record, key))
        .collect();
    if parts.is_empty() {
        "Unnamed".to_string()
    } else {
        parts.join(" ")
    }
}

fn format_contact(record: &Value) -> String {
    let mut report = Report::new();
    report
        .labeled("Name", display_name(record))
        .labeled("Code", text_or_unknown(record, &["code"]))
        .text("Email", record, "email")
        .text("Phone", record, "phone")
        .text("Type", record, "type")
        .flag("Primary", record, "isPrimary");
    report.finish()
}

fn format_saved(record: &Value, verb: &str) -> String {
    let mut report = Report::new();
    report
        .line(format!("Contact {} successfully!", verb))
        .blank()
        .labeled("Code", text_or_unknown(record, &["code"]))
        .labeled("Name", display_name(record))
        .text("Email", record, "email")
        .text("Phone", record, "phone")
        .flag("Primary", record, "isPrimary");
    report.finish()
}

#[cfg(test)]
mod tests {
    use super::{format_contact, format_saved};
    use serde_json::json;

    #[test]
    fn contact_without_names_is_unnamed() {
        let record = json!({"code": "K1", "email": "a@b.com", "isPrimary": true});
        assert_eq!(
            format_contact(&record),
            "Name: Unnamed\nCode: K1\nEmail: a@b.com\nPrimary: Yes"
        );
    }

    #[test]
    fn saved_contact_joins_names_and_skips_type() {
        let record = json!({"code": "K2", "firstName": "Ann", "lastName": "Lee", "type": "Director"});
        assert_eq!(
            format_saved(&record, "created"),
            "Contact created successfully!\n\nCode: K2\nName: Ann Lee"
        );
    }
}
