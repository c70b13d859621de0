use crate::errors::HandlerError;
use crate::managers::ManagerDeps;
use crate::services::logger::Logger;
use crate::services::sodium::{ClientSlot, QueryParams};
use crate::services::tool_executor::{ToolHandler, ToolSpec};
use crate::services::validation::Validation;
use crate::utils::report::{join_records, text_or_unknown, Report};
use crate::utils::tool_errors::unknown_tool_error;
use async_trait::async_trait;
use serde_json::Value;

const TASK_TOOLS: &[ToolSpec] = &[
    ToolSpec::new("list-tasks", "listing tasks"),
    ToolSpec::new("get-task", "getting task"),
    ToolSpec::new("create-task", "creating task"),
    ToolSpec::new("update-task", "updating task"),
    ToolSpec::new("delete-task", "deleting task"),
];

#[derive(Clone)]
pub struct TaskManager {
    logger: Logger,
    validation: Validation,
    slot: ClientSlot,
}

impl TaskManager {
    pub fn new(deps: &ManagerDeps) -> Self {
        Self {
            logger: deps.logger.child("tasks"),
            validation: deps.validation.clone(),
            slot: deps.slot.clone(),
        }
    }

    async fn list(&self, args: &Value) -> Result<String, HandlerError> {
        let client = self.slot.client()?;
        let query = QueryParams::from_args(args, &["offset", "limit", "clientCode"]);
        let tasks = client.list_tasks(&query).await?;
        if tasks.is_empty() {
            return Ok("No tasks found.".to_string());
        }
        Ok(format!(
            "Found {} task(s):\n\n{}",
            tasks.len(),
            join_records(tasks.iter().map(|task| format_task(task, false)))
        ))
    }

    async fn get(&self, args: &Value) -> Result<String, HandlerError> {
        let client = self.slot.client()?;
        let code = self.validation.ensure_code(args, "code")?;
        let record = client.get_task(&code).await?;
        Ok(format!("Task Details:\n\n{}", format_task(&record, true)))
    }

    async fn create(&self, args: &Value) -> Result<String, HandlerError> {
        let client = self.slot.client()?;
        self.validation.ensure_code(args, "name")?;
        let body = self.validation.select_fields(
            args,
            &["name", "description", "dueDate", "clientCode", "assignedTo", "category"],
        );
        let record = client.create_task(&body).await?;
        let mut report = saved_header(&record, "created");
        report
            .text("Due", &record, "dueDate")
            .text("Client", &record, "clientCode")
            .text("Assigned to", &record, "assignedTo");
        Ok(report.finish())
    }

    async fn update(&self, args: &Value) -> Result<String, HandlerError> {
        let client = self.slot.client()?;
        let code = self.validation.ensure_code(args, "code")?;
        let body = self.validation.select_fields(
            args,
            &["name", "description", "status", "dueDate", "assignedTo", "category"],
        );
        let record = client.update_task(&code, &body).await?;
        let mut report = saved_header(&record, "updated");
        report
            .text("Status", &record, "status")
            .text("Due", &record, "dueDate")
            .text("Assigned to", &record, "assignedTo");
        Ok(report.finish())
    }

    async fn delete(&self, args: &Value) -> Result<String, HandlerError> {
        let client = self.slot.client()?;
        let code = self.validation.ensure_code(args, "code")?;
        client.delete_task(&code).await?;
        self.logger
            .info("task deleted", Some(&serde_json::json!({ "code": code })));
        Ok(format!("Task {} deleted successfully.", code))
    }
}

#[async_trait]
impl ToolHandler for TaskManager {
    fn tools(&self) -> &'static [ToolSpec] {
        TASK_TOOLS
    }

    async fn handle(&self, tool: &str, args: Value) -> Result<String, HandlerError> {
        match tool {
            "list-tasks" => self.list(&args).await,
            "get-task" => self.get(&args).await,
            "create-task" => self.create(&args).await,
            "update-task" => self.update(&args).await,
            "delete-task" => self.delete(&args).await,
            _ => Err(unknown_tool_error("tasks", tool, TASK_TOOLS).into()),
        }
    }
}

fn format_task(record: &Value, detailed: bool) -> String {
    let mut report = Report::new();
    report
        .labeled("Name", text_or_unknown(record, &["name"]))
        .labeled("Code", text_or_unknown(record, &["code"]))
        .text("Status", record, "status")
        .text("Due", record, "dueDate")
        .text("Client", record, "clientCode")
        .text("Assigned to", record, "assignedTo")
        .text("Category", record, "category")
        .text("Description", record, "description");
    if detailed {
        report
            .text("Created", record, "createdAt")
            .text("Updated", record, "updatedAt");
    }
    report.finish()
}

fn saved_header(record: &Value, verb: &str) -> Report {
    let mut report = Report::new();
    report
        .line(format!("Task {} successfully!", verb))
        .blank()
        .labeled("Code", text_or_unknown(record, &["code"]))
        .labeled("Name", text_or_unknown(record, &["name"]));
    report
}

#[cfg(test)]
mod tests {
    use super::format_task;
    use serde_json::json;

    #[test]
    fn detailed_task_adds_timestamps() {
        let record = json!({
            "code": "T9",
            "name": "File VAT return",
            "status": "Open",
            "dueDate": "2024-07-07",
            "clientCode": "C001",
            "createdAt": "2024-06-01",
            "updatedAt": "2024-06-02"
        });
        let summary = format_task(&record, false);
        assert_eq!(
            summary,
            "Name: File VAT return\nCode: T9\nStatus: Open\nDue: 2024-07-07\nClient: C001"
        );
        assert_eq!(
            format_task(&record, true),
            format!("{}\nCreated: 2024-06-01\nUpdated: 2024-06-02", summary)
        );
    }
}
