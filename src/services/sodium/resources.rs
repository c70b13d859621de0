use crate::errors::ApiError;
use crate::services::sodium::{QueryParams, SodiumClient};
use reqwest::Method;
use serde_json::Value;

/// A tenant-relative collection such as `clients` or
/// `clients/{code}/clientnote`. Every operation is a single request.
pub struct Collection<'a> {
    client: &'a SodiumClient,
    segments: Vec<&'a str>,
}

impl<'a> Collection<'a> {
    fn member(&self, code: &'a str) -> Vec<&'a str> {
        let mut segments = self.segments.clone();
        segments.push(code);
        segments
    }

    pub async fn list(&self, query: Option<&QueryParams>) -> Result<Vec<Value>, ApiError> {
        self.client.request_list(&self.segments, query).await
    }

    pub async fn get(&self, code: &'a str) -> Result<Value, ApiError> {
        self.client
            .request(Method::GET, &self.member(code), None, None)
            .await
    }

    pub async fn create(&self, body: &Value) -> Result<Value, ApiError> {
        self.client
            .request(Method::POST, &self.segments, None, Some(body))
            .await
    }

    pub async fn update(&self, code: &'a str, body: &Value) -> Result<Value, ApiError> {
        self.client
            .request(Method::PUT, &self.member(code), None, Some(body))
            .await
    }

    pub async fn delete(&self, code: &'a str) -> Result<Value, ApiError> {
        self.client
            .request(Method::DELETE, &self.member(code), None, None)
            .await
    }
}

const CLIENTS: &str = "clients";
const CONTACTS: &str = "clientcontact";
const NOTES: &str = "clientnote";
const SERVICES: &str = "services";
const CLIENT_SERVICES: &str = "clientbillableservice";
const TASKS: &str = "tasks";
const ENGAGEMENTS: &str = "engagements";
const DOCUMENT_TEMPLATES: &str = "document-templates";
const SERVICE_PACKAGES: &str = "service-packages";

impl SodiumClient {
    pub fn collection<'a>(&'a self, segments: &[&'a str]) -> Collection<'a> {
        Collection {
            client: self,
            segments: self.tenant_path(segments),
        }
    }

    // clients

    pub async fn list_clients(&self, query: &QueryParams) -> Result<Vec<Value>, ApiError> {
        self.collection(&[CLIENTS]).list(Some(query)).await
    }

    pub async fn get_client(&self, code: &str) -> Result<Value, ApiError> {
        self.collection(&[CLIENTS]).get(code).await
    }

    pub async fn create_client(&self, body: &Value) -> Result<Value, ApiError> {
        self.collection(&[CLIENTS]).create(body).await
    }

    pub async fn update_client(&self, code: &str, body: &Value) -> Result<Value, ApiError> {
        self.collection(&[CLIENTS]).update(code, body).await
    }

    pub async fn delete_client(&self, code: &str) -> Result<Value, ApiError> {
        self.collection(&[CLIENTS]).delete(code).await
    }

    // contacts

    pub async fn list_client_contacts(&self, client_code: &str) -> Result<Vec<Value>, ApiError> {
        self.collection(&[CLIENTS, client_code, CONTACTS])
            .list(None)
            .await
    }

    pub async fn get_client_contact(
        &self,
        client_code: &str,
        contact_code: &str,
    ) -> Result<Value, ApiError> {
        self.collection(&[CLIENTS, client_code, CONTACTS])
            .get(contact_code)
            .await
    }

    pub async fn create_client_contact(
        &self,
        client_code: &str,
        body: &Value,
    ) -> Result<Value, ApiError> {
        self.collection(&[CLIENTS, client_code, CONTACTS])
            .create(body)
            .await
    }

    pub async fn update_client_contact(
        &self,
        client_code: &str,
        contact_code: &str,
        body: &Value,
    ) -> Result<Value, ApiError> {
        self.collection(&[CLIENTS, client_code, CONTACTS])
            .update(contact_code, body)
            .await
    }

    pub async fn delete_client_contact(
        &self,
        client_code: &str,
        contact_code: &str,
    ) -> Result<Value, ApiError> {
        self.collection(&[CLIENTS, client_code, CONTACTS])
            .delete(contact_code)
            .await
    }

    // notes

    pub async fn list_client_notes(&self, client_code: &str) -> Result<Vec<Value>, ApiError> {
        self.collection(&[CLIENTS, client_code, NOTES]).list(None).await
    }

    pub async fn get_client_note(
        &self,
        client_code: &str,
        note_code: &str,
    ) -> Result<Value, ApiError> {
        self.collection(&[CLIENTS, client_code, NOTES])
            .get(note_code)
            .await
    }

    pub async fn create_client_note(
        &self,
        client_code: &str,
        body: &Value,
    ) -> Result<Value, ApiError> {
        self.collection(&[CLIENTS, client_code, NOTES])
            .create(body)
            .await
    }

    pub async fn update_client_note(
        &self,
        client_code: &str,
        note_code: &str,
        body: &Value,
    ) -> Result<Value, ApiError> {
        self.collection(&[CLIENTS, client_code, NOTES])
            .update(note_code, body)
            .await
    }

    pub async fn delete_client_note(
        &self,
        client_code: &str,
        note_code: &str,
    ) -> Result<Value, ApiError> {
        self.collection(&[CLIENTS, client_code, NOTES])
            .delete(note_code)
            .await
    }

    // tasks

    pub async fn list_tasks(&self, query: &QueryParams) -> Result<Vec<Value>, ApiError> {
        self.collection(&[TASKS]).list(Some(query)).await
    }

    pub async fn get_task(&self, code: &str) -> Result<Value, ApiError> {
        self.collection(&[TASKS]).get(code).await
    }

    pub async fn create_task(&self, body: &Value) -> Result<Value, ApiError> {
        self.collection(&[TASKS]).create(body).await
    }

    pub async fn update_task(&self, code: &str, body: &Value) -> Result<Value, ApiError> {
        self.collection(&[TASKS]).update(code, body).await
    }

    pub async fn delete_task(&self, code: &str) -> Result<Value, ApiError> {
        self.collection(&[TASKS]).delete(code).await
    }

    // client billable services

    pub async fn list_client_services(&self, client_code: &str) -> Result<Vec<Value>, ApiError> {
        self.collection(&[CLIENTS, client_code, SERVICES, CLIENT_SERVICES])
            .list(None)
            .await
    }

    pub async fn get_client_service(
        &self,
        client_code: &str,
        service_code: &str,
    ) -> Result<Value, ApiError> {
        self.collection(&[CLIENTS, client_code, SERVICES, CLIENT_SERVICES])
            .get(service_code)
            .await
    }

    pub async fn create_client_service(
        &self,
        client_code: &str,
        body: &Value,
    ) -> Result<Value, ApiError> {
        self.collection(&[CLIENTS, client_code, SERVICES, CLIENT_SERVICES])
            .create(body)
            .await
    }

    pub async fn update_client_service(
        &self,
        client_code: &str,
        service_code: &str,
        body: &Value,
    ) -> Result<Value, ApiError> {
        self.collection(&[CLIENTS, client_code, SERVICES, CLIENT_SERVICES])
            .update(service_code, body)
            .await
    }

    // engagements

    pub async fn list_engagements(&self, query: &QueryParams) -> Result<Vec<Value>, ApiError> {
        self.collection(&[ENGAGEMENTS]).list(Some(query)).await
    }

    pub async fn get_engagement(&self, code: &str) -> Result<Value, ApiError> {
        self.collection(&[ENGAGEMENTS]).get(code).await
    }

    pub async fn create_engagement(&self, body: &Value) -> Result<Value, ApiError> {
        self.collection(&[ENGAGEMENTS]).create(body).await
    }

    pub async fn update_engagement(&self, code: &str, body: &Value) -> Result<Value, ApiError> {
        self.collection(&[ENGAGEMENTS]).update(code, body).await
    }

    pub async fn delete_engagement(&self, code: &str) -> Result<Value, ApiError> {
        self.collection(&[ENGAGEMENTS]).delete(code).await
    }

    pub async fn send_engagement_email(&self, code: &str) -> Result<Value, ApiError> {
        let path = self.tenant_path(&[ENGAGEMENTS, code, "email"]);
        self.request(Method::POST, &path, None, None).await
    }

    /// The history endpoint answers with a bare array; an envelope is
    /// unwrapped the same way as list endpoints.
    pub async fn get_engagement_emails(&self, code: &str) -> Result<Vec<Value>, ApiError> {
        let path = self.tenant_path(&[ENGAGEMENTS, code, "email"]);
        self.request_list(&path, None).await
    }

    pub async fn upload_proposal_pdf(
        &self,
        code: &str,
        pdf_content: &str,
    ) -> Result<Value, ApiError> {
        self.upload_pdf(code, PdfKind::Proposal, pdf_content).await
    }

    pub async fn download_proposal_pdf(&self, code: &str) -> Result<String, ApiError> {
        self.download_pdf(code, PdfKind::Proposal).await
    }

    pub async fn upload_loe_pdf(&self, code: &str, pdf_content: &str) -> Result<Value, ApiError> {
        self.upload_pdf(code, PdfKind::LetterOfEngagement, pdf_content)
            .await
    }

    pub async fn download_loe_pdf(&self, code: &str) -> Result<String, ApiError> {
        self.download_pdf(code, PdfKind::LetterOfEngagement).await
    }

    async fn upload_pdf(
        &self,
        code: &str,
        kind: PdfKind,
        pdf_content: &str,
    ) -> Result<Value, ApiError> {
        let path = self.tenant_path(&[ENGAGEMENTS, code, "pdf", kind.segment()]);
        let body = serde_json::json!({ "pdfContent": pdf_content });
        self.request(Method::POST, &path, None, Some(&body)).await
    }

    async fn download_pdf(&self, code: &str, kind: PdfKind) -> Result<String, ApiError> {
        let path = self.tenant_path(&[ENGAGEMENTS, code, "pdf", kind.segment()]);
        self.binary_request(&path, None).await
    }

    pub async fn get_engagement_settings(&self) -> Result<Value, ApiError> {
        let path = self.tenant_path(&["practice", "engagement-settings"]);
        self.request(Method::GET, &path, None, None).await
    }

    // billable service catalog

    pub async fn list_services(&self, query: &QueryParams) -> Result<Vec<Value>, ApiError> {
        self.collection(&[SERVICES]).list(Some(query)).await
    }

    pub async fn get_service(&self, code: &str) -> Result<Value, ApiError> {
        self.collection(&[SERVICES]).get(code).await
    }

    // document templates

    pub async fn list_document_templates(
        &self,
        query: &QueryParams,
    ) -> Result<Vec<Value>, ApiError> {
        self.collection(&[DOCUMENT_TEMPLATES]).list(Some(query)).await
    }

    pub async fn get_document_template(&self, code: &str) -> Result<Value, ApiError> {
        self.collection(&[DOCUMENT_TEMPLATES]).get(code).await
    }

    // service packages

    pub async fn list_service_packages(
        &self,
        query: &QueryParams,
    ) -> Result<Vec<Value>, ApiError> {
        self.collection(&[SERVICE_PACKAGES]).list(Some(query)).await
    }

    pub async fn get_service_package(&self, code: &str) -> Result<Value, ApiError> {
        self.collection(&[SERVICE_PACKAGES]).get(code).await
    }
}

#[derive(Debug, Clone, Copy)]
enum PdfKind {
    Proposal,
    LetterOfEngagement,
}

impl PdfKind {
    fn segment(self) -> &'static str {
        match self {
            PdfKind::Proposal => "proposal",
            PdfKind::LetterOfEngagement => "letter-of-engagement",
        }
    }
}
