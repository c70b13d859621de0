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

const NOTE_TOOLS: &[ToolSpec] = &[
    ToolSpec::new("list-client-notes", "listing notes"),
    ToolSpec::new("get-client-note", "getting note"),
    ToolSpec::new("create-client-note", "creating note"),
    ToolSpec::new("update-client-note", "updating note"),
    ToolSpec::new("delete-client-note", "deleting note"),
];

#[derive(Clone)]
pub struct NoteManager {
    logger: Logger,
    validation: Validation,
    slot: ClientSlot,
}

impl NoteManager {
    pub fn new(deps: &ManagerDeps) -> Self {
        Self {
            logger: deps.logger.child("notes"),
            validation: deps.validation.clone(),
            slot: deps.slot.clone(),
        }
    }

    async fn list(&self, args: &Value) -> Result<String, HandlerError> {
        let client = self.slot.client()?;
        let client_code = self.validation.ensure_code(args, "clientCode")?;
        let notes = client.list_client_notes(&client_code).await?;
        if notes.is_empty() {
            return Ok(format!("No notes found for client {}.", client_code));
        }
        Ok(format!(
            "Found {} note(s) for client {}:\n\n{}",
            notes.len(),
            client_code,
            join_records(notes.iter().map(format_note))
        ))
    }

    async fn get(&self, args: &Value) -> Result<String, HandlerError> {
        let client = self.slot.client()?;
        let client_code = self.validation.ensure_code(args, "clientCode")?;
        let note_code = self.validation.ensure_code(args, "noteCode")?;
        let record = client.get_client_note(&client_code, &note_code).await?;
        Ok(format!("Note Details:\n\n{}", format_note(&record)))
    }

    async fn create(&self, args: &Value) -> Result<String, HandlerError> {
        let client = self.slot.client()?;
        let client_code = self.validation.ensure_code(args, "clientCode")?;
        self.validation.ensure_code(args, "content")?;
        let body = self.validation.select_fields(args, &["content", "isPinned"]);
        let record = client.create_client_note(&client_code, &body).await?;
        Ok(format_saved(&record, "created"))
    }

    async fn update(&self, args: &Value) -> Result<String, HandlerError> {
        let client = self.slot.client()?;
        let client_code = self.validation.ensure_code(args, "clientCode")?;
        let note_code = self.validation.ensure_code(args, "noteCode")?;
        let body = self.validation.select_fields(args, &["content", "isPinned"]);
        let record = client
            .update_client_note(&client_code, &note_code, &body)
            .await?;
        Ok(format_saved(&record, "updated"))
    }

    async fn delete(&self, args: &Value) -> Result<String, HandlerError> {
        let client = self.slot.client()?;
        let client_code = self.validation.ensure_code(args, "clientCode")?;
        let note_code = self.validation.ensure_code(args, "noteCode")?;
        client.delete_client_note(&client_code, &note_code).await?;
        self.logger.info(
            "note deleted",
            Some(&serde_json::json!({ "client": client_code, "note": note_code })),
        );
        Ok(format!(
            "Note {} deleted from client {} successfully.",
            note_code, client_code
        ))
    }
}

#[async_trait]
impl ToolHandler for NoteManager {
    fn tools(&self) -> &'static [ToolSpec] {
        NOTE_TOOLS
    }

    async fn handle(&self, tool: &str, args: Value) -> Result<String, HandlerError> {
        match tool {
            "list-client-notes" => self.list(&args).await,
            "get-client-note" => self.get(&args).await,
            "create-client-note" => self.create(&args).await,
            "update-client-note" => self.update(&args).await,
            "delete-client-note" => self.delete(&args).await,
            _ => Err(unknown_tool_error("notes", tool, NOTE_TOOLS).into()),
        }
    }
}

fn content(record: &Value) -> String {
    text_at(record, "content").unwrap_or_default()
}

fn format_note(record: &Value) -> String {
    let mut report = Report::new();
    report
        .labeled("Code", text_or_unknown(record, &["code"]))
        .labeled("Content", content(record))
        .flag("Pinned", record, "isPinned")
        .text("Created", record, "createdAt")
        .text("Created by", record, "createdBy");
    report.finish()
}

fn format_saved(record: &Value, verb: &str) -> String {
    let mut report = Report::new();
    report
        .line(format!("Note {} successfully!", verb))
        .blank()
        .labeled("Code", text_or_unknown(record, &["code"]))
        .labeled("Content", content(record))
        .flag("Pinned", record, "isPinned");
    report.finish()
}
