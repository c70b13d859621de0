use crate::errors::HandlerError;
use crate::managers::ManagerDeps;
use crate::services::logger::Logger;
use crate::services::sodium::{ClientSlot, QueryParams};
use crate::services::tool_executor::{ToolHandler, ToolSpec};
use crate::services::validation::Validation;
use crate::utils::report::{
    array_at, bool_at, field, join_records, money, number_at, reference_name, text_at,
    text_or_unknown, yes_no, Report,
};
use crate::utils::tool_errors::unknown_tool_error;
use async_trait::async_trait;
use serde_json::Value;

const ENGAGEMENT_TOOLS: &[ToolSpec] = &[
    ToolSpec::new("list-engagements", "listing engagements"),
    ToolSpec::new("get-engagement", "getting engagement"),
    ToolSpec::new("create-engagement", "creating engagement"),
    ToolSpec::new("update-engagement", "updating engagement"),
    ToolSpec::new("delete-engagement", "deleting engagement"),
    ToolSpec::new("send-engagement-email", "sending engagement email"),
    ToolSpec::new(
        "get-engagement-emails",
        "retrieving engagement email history",
    ),
    ToolSpec::new("upload-proposal-pdf", "uploading proposal PDF"),
    ToolSpec::new("get-proposal-pdf", "downloading proposal PDF"),
    ToolSpec::new("upload-loe-pdf", "uploading letter of engagement PDF"),
    ToolSpec::new("get-loe-pdf", "downloading letter of engagement PDF"),
    ToolSpec::new("get-engagement-settings", "getting engagement settings"),
];

const RECIPIENT_FIELDS: &[&str] = &["recipientFirstName", "recipientLastName", "recipientEmail"];

const CREATE_FIELDS: &[&str] = &[
    "clientCode",
    "date",
    "type",
    "recipientFirstName",
    "recipientLastName",
    "recipientEmail",
    "proposalTemplateCode",
    "lofETemplateCode",
    "clientBillableServiceCodes",
];

const UPDATE_FIELDS: &[&str] = &[
    "clientCode",
    "date",
    "status",
    "type",
    "manuallyAccepted",
    "recipientFirstName",
    "recipientLastName",
    "recipientEmail",
    "proposalTemplateCode",
    "lofETemplateCode",
    "clientBillableServiceCodes",
];

#[derive(Clone)]
pub struct EngagementManager {
    logger: Logger,
    validation: Validation,
    slot: ClientSlot,
}

impl EngagementManager {
    pub fn new(deps: &ManagerDeps) -> Self {
        Self {
            logger: deps.logger.child("engagements"),
            validation: deps.validation.clone(),
            slot: deps.slot.clone(),
        }
    }

    async fn list(&self, args: &Value) -> Result<String, HandlerError> {
        let client = self.slot.client()?;
        let query = QueryParams::from_args(
            args,
            &["offset", "limit", "search", "status", "sortBy", "sortDesc"],
        );
        let engagements = client.list_engagements(&query).await?;
        if engagements.is_empty() {
            return Ok("No engagements found.".to_string());
        }
        Ok(format!(
            "Found {} engagement(s):\n\n{}",
            engagements.len(),
            join_records(engagements.iter().map(|e| format_engagement(e).finish()))
        ))
    }

    async fn get(&self, args: &Value) -> Result<String, HandlerError> {
        let client = self.slot.client()?;
        let code = self.validation.ensure_code(args, "code")?;
        let record = client.get_engagement(&code).await?;
        let mut report = format_engagement(&record);
        report.extend(format_proposal_services(&record));
        Ok(format!("Engagement Details:\n\n{}", report.finish()))
    }

    async fn create(&self, args: &Value) -> Result<String, HandlerError> {
        let client = self.slot.client()?;
        self.validation.ensure_code(args, "clientCode")?;
        self.validation.ensure_code(args, "date")?;
        self.validation.ensure_string_list(args, "clientBillableServiceCodes")?;
        let body = self.validation.select_fields(args, CREATE_FIELDS);
        let record = client.create_engagement(&body).await?;
        Ok(format_created(&record))
    }

    async fn update(&self, args: &Value) -> Result<String, HandlerError> {
        let client = self.slot.client()?;
        let code = self.validation.ensure_code(args, "code")?;
        self.validation.ensure_optional_bool(args, "manuallyAccepted")?;
        self.validation.ensure_string_list(args, "clientBillableServiceCodes")?;
        let body = self.validation.select_fields(args, UPDATE_FIELDS);
        let record = client.update_engagement(&code, &body).await?;
        Ok(format_updated(&record))
    }

    async fn delete(&self, args: &Value) -> Result<String, HandlerError> {
        let client = self.slot.client()?;
        let code = self.validation.ensure_code(args, "code")?;
        client.delete_engagement(&code).await?;
        self.logger
            .info("engagement deleted", Some(&serde_json::json!({ "code": code })));
        Ok(format!("Engagement {} deleted successfully.", code))
    }

    async fn send_email(&self, args: &Value) -> Result<String, HandlerError> {
        let client = self.slot.client()?;
        let code = self.validation.ensure_code(args, "code")?;
        client.send_engagement_email(&code).await?;
        self.logger
            .info("engagement email sent", Some(&serde_json::json!({ "code": code })));
        Ok(format!("Email sent successfully for engagement {}.", code))
    }

    async fn emails(&self, args: &Value) -> Result<String, HandlerError> {
        let client = self.slot.client()?;
        let code = self.validation.ensure_code(args, "code")?;
        let emails = client.get_engagement_emails(&code).await?;
        if emails.is_empty() {
            return Ok(format!("No emails found for engagement {}.", code));
        }
        Ok(format!(
            "Email history for engagement {} ({} email(s)):\n\n{}",
            code,
            emails.len(),
            join_records(
                emails
                    .iter()
                    .enumerate()
                    .map(|(index, email)| format_email(email, index + 1))
            )
        ))
    }

    async fn upload_pdf(&self, args: &Value, kind: PdfKind) -> Result<String, HandlerError> {
        let client = self.slot.client()?;
        let code = self.validation.ensure_code(args, "code")?;
        let content = self.validation.ensure_base64(args, "pdfContent")?;
        match kind {
            PdfKind::Proposal => client.upload_proposal_pdf(&code, &content).await?,
            PdfKind::LetterOfEngagement => client.upload_loe_pdf(&code, &content).await?,
        };
        Ok(format!(
            "{} PDF uploaded successfully for engagement {}.",
            kind.title(),
            code
        ))
    }

    async fn download_pdf(&self, args: &Value, kind: PdfKind) -> Result<String, HandlerError> {
        let client = self.slot.client()?;
        let code = self.validation.ensure_code(args, "code")?;
        let encoded = match kind {
            PdfKind::Proposal => client.download_proposal_pdf(&code).await?,
            PdfKind::LetterOfEngagement => client.download_loe_pdf(&code).await?,
        };
        Ok(format!(
            "{} PDF for engagement {} (base64-encoded):\n\n{}",
            kind.title(),
            code,
            encoded
        ))
    }

    async fn settings(&self) -> Result<String, HandlerError> {
        let client = self.slot.client()?;
        let settings = client.get_engagement_settings().await?;
        Ok(format!("Engagement Settings:\n\n{}", format_settings(&settings)))
    }
}

#[async_trait]
impl ToolHandler for EngagementManager {
    fn tools(&self) -> &'static [ToolSpec] {
        ENGAGEMENT_TOOLS
    }

    async fn handle(&self, tool: &str, args: Value) -> Result<String, HandlerError> {
        match tool {
            "list-engagements" => self.list(&args).await,
            "get-engagement" => self.get(&args).await,
            "create-engagement" => self.create(&args).await,
            "update-engagement" => self.update(&args).await,
            "delete-engagement" => self.delete(&args).await,
            "send-engagement-email" => self.send_email(&args).await,
            "get-engagement-emails" => self.emails(&args).await,
            "upload-proposal-pdf" => self.upload_pdf(&args, PdfKind::Proposal).await,
            "get-proposal-pdf" => self.download_pdf(&args, PdfKind::Proposal).await,
            "upload-loe-pdf" => self.upload_pdf(&args, PdfKind::LetterOfEngagement).await,
            "get-loe-pdf" => self.download_pdf(&args, PdfKind::LetterOfEngagement).await,
            "get-engagement-settings" => self.settings().await,
            _ => Err(unknown_tool_error("engagements", tool, ENGAGEMENT_TOOLS).into()),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum PdfKind {
    Proposal,
    LetterOfEngagement,
}

impl PdfKind {
    fn title(self) -> &'static str {
        match self {
            PdfKind::Proposal => "Proposal",
            PdfKind::LetterOfEngagement => "Letter of engagement",
        }
    }
}

fn client_line(record: &Value) -> Option<String> {
    let client = field(record, "client").filter(|c| c.is_object())?;
    Some(format!(
        "{} ({})",
        text_or_unknown(client, &["name"]),
        text_or_unknown(client, &["code"])
    ))
}

fn recipient_name(record: &Value) -> Option<String> {
    let parts: Vec<String> = RECIPIENT_FIELDS[..2]
        .iter()
        .filter_map(|key| text_at(record, key))
        .collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join(" "))
    }
}

fn format_engagement(record: &Value) -> Report {
    let mut report = Report::new();
    report
        .labeled("Code", text_or_unknown(record, &["code"]))
        .optional("Client", client_line(record))
        .text("Status", record, "status")
        .text("Type", record, "typeName")
        .text("Date", record, "date")
        .optional("Recipient", recipient_name(record))
        .text("Email", record, "recipientEmail")
        .money("Annual Value", record, "annualValue")
        .text("Services", record, "numberOfServices")
        .optional("Proposal Template", reference_name(record, "proposalTemplate"))
        .optional("Engagement Letter", reference_name(record, "lofETemplate"))
        .text("Last Viewed", record, "lastViewed")
        .text("Accepted", record, "acceptance.acceptedDate")
        .text("Link", record, "link");
    report
}

fn format_proposal_services(record: &Value) -> Report {
    let mut report = Report::new();
    let services = array_at(record, "proposalServices");
    if services.is_empty() {
        return report;
    }
    report.blank().line("Proposal Services:");
    for service in services {
        report.line(format!(
            "  - {} (code: {})",
            text_or_unknown(service, &["billableService.name", "code"]),
            text_or_unknown(service, &["code"])
        ));
        if let Some(frequency) = text_at(service, "billingFrequency") {
            report.line(format!("    Billing: {}", frequency));
        }
        if let Some(price) = number_at(service, "calculatedPrice") {
            report.line(format!("    Price: {}", money(price)));
        }
        if let Some(status) = text_at(service, "status") {
            report.line(format!("    Status: {}", status));
        }
    }
    report
}

fn format_created(record: &Value) -> String {
    let mut report = Report::new();
    report
        .line("Engagement created successfully!")
        .blank()
        .labeled("Code", text_or_unknown(record, &["code"]))
        .optional("Client", client_line(record))
        .text("Status", record, "status");
    if text_at(record, "type").is_some() {
        report.labeled("Type", text_or_unknown(record, &["typeName", "type"]));
    }
    report
        .text("Date", record, "date")
        .optional("Recipient", recipient_name(record))
        .text("Email", record, "recipientEmail")
        .text("Services", record, "numberOfServices")
        .money("Annual Value", record, "annualValue")
        .text("Link", record, "link");
    report.finish()
}

fn format_updated(record: &Value) -> String {
    let mut report = Report::new();
    report
        .line("Engagement updated successfully!")
        .blank()
        .labeled("Code", text_or_unknown(record, &["code"]))
        .optional("Client", client_line(record))
        .text("Status", record, "status")
        .text("Type", record, "typeName")
        .text("Date", record, "date")
        .optional("Recipient", recipient_name(record))
        .text("Email", record, "recipientEmail")
        .text("Accepted", record, "acceptance.acceptedDate");
    report.finish()
}

fn format_email(email: &Value, number: usize) -> String {
    let recipients: Vec<String> = array_at(email, "toRecipients")
        .iter()
        .filter_map(|r| r.as_str().map(str::to_string))
        .collect();
    let mut report = Report::new();
    report
        .line(format!("Email #{}", number))
        .text("Sent", email, "sentDate")
        .text("Subject", email, "subject")
        .optional(
            "To",
            (!recipients.is_empty()).then(|| recipients.join(", ")),
        )
        .text("Status", email, "status")
        .text("Message ID", email, "messageId");
    report.finish()
}

const SETTINGS_FLAGS: &[(&str, &str)] = &[
    ("Show Practice Name", "showPracticeName"),
    ("Attach PDFs to Email", "attachPDFs"),
    ("Request DD Mandate", "requestDdMandate"),
    ("Notify Client Manager on Acceptance", "notifyClientManagerOnAcceptance"),
    ("Notify Partner on Acceptance", "notifyPartnerOnAcceptance"),
];

const SETTINGS_BLOCKS: &[(&str, &str)] = &[
    ("Intro Content Block", "introContentBlock"),
    ("Email Content Block", "emailContentBlock"),
    ("Signature Page Block", "signaturePageContentBlock"),
    ("Thank You Content Block", "thankYouContentBlock"),
    ("Thank You Email Block", "thankYouEmailContentBlock"),
    ("Acceptance Task", "acceptanceTask"),
];

/// Named references only render when they carry a name.
fn named_reference(record: &Value, path: &str) -> Option<String> {
    let name = text_at(record, &format!("{}.name", path))?;
    let code_path = format!("{}.code", path);
    let code = text_or_unknown(record, &[code_path.as_str()]);
    Some(format!("{} ({})", name, code))
}

fn format_settings(settings: &Value) -> String {
    let mut report = Report::new();
    report.optional("Design Theme", named_reference(settings, "designTheme"));
    for (label, key) in SETTINGS_FLAGS {
        report.labeled(label, yes_no(bool_at(settings, key)));
    }
    for (label, key) in SETTINGS_BLOCKS {
        report.optional(label, named_reference(settings, key));
    }
    report.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn engagement() -> Value {
        json!({
            "code": "E100",
            "client": {"code": "C001", "name": "Acme Ltd"},
            "status": "Sent",
            "type": "ProposalAndEngagementLetter",
            "typeName": "Proposal & Engagement Letter",
            "date": "2024-04-06",
            "recipientFirstName": "Ann",
            "recipientEmail": "ann@acme.test",
            "annualValue": 1200,
            "numberOfServices": 2,
            "proposalTemplate": {"code": "PT1", "name": "Standard Proposal"},
            "acceptance": {"acceptedDate": "2024-04-10"},
            "link": "https://sodium.test/e/E100"
        })
    }

    #[test]
    fn engagement_summary_follows_field_order() {
        assert_eq!(
            format_engagement(&engagement()).finish(),
            [
                "Code: E100",
                "Client: Acme Ltd (C001)",
                "Status: Sent",
                "Type: Proposal & Engagement Letter",
                "Date: 2024-04-06",
                "Recipient: Ann",
                "Email: ann@acme.test",
                "Annual Value: £1200.00",
                "Services: 2",
                "Proposal Template: Standard Proposal",
                "Accepted: 2024-04-10",
                "Link: https://sodium.test/e/E100",
            ]
            .join("\n")
        );
    }

    #[test]
    fn created_report_falls_back_to_raw_type() {
        let record = json!({"code": "E2", "type": "EngagementLetter"});
        assert_eq!(
            format_created(&record),
            "Engagement created successfully!\n\nCode: E2\nType: EngagementLetter"
        );
    }

    #[test]
    fn proposal_services_render_under_details() {
        let record = json!({
            "proposalServices": [
                {"code": "CS1", "billableService": {"code": "S1", "name": "Payroll"},
                 "billingFrequency": "Monthly", "calculatedPrice": 50.5}
            ]
        });
        assert_eq!(
            format_proposal_services(&record).finish(),
            "\nProposal Services:\n  - Payroll (code: CS1)\n    Billing: Monthly\n    Price: £50.50"
        );
        assert!(format_proposal_services(&json!({})).is_empty());
    }

    #[test]
    fn emails_are_numbered_from_one() {
        let email = json!({
            "sentDate": "2024-04-06T09:00:00Z",
            "subject": "Your proposal",
            "toRecipients": ["ann@acme.test", "bob@acme.test"],
            "status": "Delivered"
        });
        assert_eq!(
            format_email(&email, 1),
            "Email #1\nSent: 2024-04-06T09:00:00Z\nSubject: Your proposal\nTo: ann@acme.test, bob@acme.test\nStatus: Delivered"
        );
    }

    #[test]
    fn settings_always_list_flags() {
        let settings = json!({
            "designTheme": {"code": "T1", "name": "Classic"},
            "attachPDFs": true,
            "introContentBlock": {"code": "B1"},
            "acceptanceTask": {"code": "AT", "name": "Onboard"}
        });
        assert_eq!(
            format_settings(&settings),
            [
                "Design Theme: Classic (T1)",
                "Show Practice Name: No",
                "Attach PDFs to Email: Yes",
                "Request DD Mandate: No",
                "Notify Client Manager on Acceptance: No",
                "Notify Partner on Acceptance: No",
                "Acceptance Task: Onboard (AT)",
            ]
            .join("\n")
        );
    }
}
