mod common;
use common::{restore_env, Canned, StubServer, ENV_LOCK};

use serde_json::{json, Value};
use sodium_mcp::app::App;
use sodium_mcp::mcp::server::McpServer;
use sodium_mcp::services::sodium::SodiumConfig;

fn server_for(stub: &StubServer) -> McpServer {
    let config = SodiumConfig::new(&stub.base_url(), "k", "acme");
    McpServer::from_app(App::with_config(config).expect("app"))
}

async fn call_tool(server: &McpServer, name: &str, arguments: Value) -> Value {
    let line = json!({
        "jsonrpc": "2.0",
        "id": 1,
        "method": "tools/call",
        "params": {"name": name, "arguments": arguments},
    })
    .to_string();
    let response = server.handle_line(&line).await.expect("response");
    serde_json::to_value(&response).expect("serialize")
}

fn text(response: &Value) -> &str {
    response["result"]["content"][0]["text"]
        .as_str()
        .expect("text content")
}

#[tokio::test]
async fn create_client_renders_the_saved_record() {
    let stub = StubServer::start(vec![Canned::json(
        201,
        json!({"code": "C001", "name": "Acme Ltd", "type": "PrivateLimitedCompany"}),
    )])
    .await;
    let server = server_for(&stub);

    let out = call_tool(
        &server,
        "create-client",
        json!({"name": "Acme Ltd", "type": "PrivateLimitedCompany"}),
    )
    .await;
    let body = text(&out);
    assert!(body.starts_with("Client created successfully!\n\n"));
    assert!(body.contains("Code: C001"));
    assert!(body.contains("Name: Acme Ltd"));
    assert!(body.contains("Type: PrivateLimitedCompany"));

    let requests = stub.requests().await;
    assert_eq!(requests[0].path, "/tenants/acme/clients");
    assert_eq!(
        requests[0].json(),
        json!({"name": "Acme Ltd", "type": "PrivateLimitedCompany"})
    );
}

#[tokio::test]
async fn empty_list_has_a_fixed_message() {
    let stub = StubServer::start(vec![Canned::json(200, json!({"data": [], "totalCount": 0}))]).await;
    let server = server_for(&stub);

    let out = call_tool(&server, "list-clients", json!({"limit": 5})).await;
    assert_eq!(text(&out), "No clients found.");
    assert_eq!(stub.requests().await[0].query.as_deref(), Some("limit=5"));
}

#[tokio::test]
async fn api_failures_become_error_text() {
    let stub = StubServer::start(vec![Canned::json(
        404,
        json!({"message": "Engagement not found"}),
    )])
    .await;
    let server = server_for(&stub);

    let out = call_tool(&server, "get-engagement", json!({"code": "E404"})).await;
    assert!(out.get("error").is_none());
    assert_eq!(text(&out), "Error getting engagement: Engagement not found");
}

#[tokio::test]
async fn missing_tenant_fails_without_a_request() {
    let stub = StubServer::start(vec![]).await;
    let base = stub.base_url();
    let config = SodiumConfig::from_lookup(|key| match key {
        "SODIUM_API_KEY" => Some("k".to_string()),
        "SODIUM_API_URL" => Some(base.clone()),
        _ => None,
    });
    let server = McpServer::from_app(App::with_config(config).expect("app"));

    let out = call_tool(&server, "list-tasks", json!({})).await;
    assert_eq!(
        text(&out),
        "Error listing tasks: SODIUM_TENANT environment variable is required"
    );
    assert!(stub.requests().await.is_empty());
}

#[tokio::test]
async fn invalid_base64_is_rejected_before_upload() {
    let stub = StubServer::start(vec![]).await;
    let server = server_for(&stub);

    let out = call_tool(
        &server,
        "upload-proposal-pdf",
        json!({"code": "E1", "pdfContent": "not base64!"}),
    )
    .await;
    assert!(text(&out).starts_with("Error uploading proposal PDF:"));
    assert!(stub.requests().await.is_empty());
}

#[tokio::test]
async fn upload_sends_the_pdf_content_as_json() {
    let stub = StubServer::start(vec![Canned::no_content()]).await;
    let server = server_for(&stub);

    let out = call_tool(
        &server,
        "upload-loe-pdf",
        json!({"code": "E7", "pdfContent": "JVBERi0xLjc="}),
    )
    .await;
    assert_eq!(
        text(&out),
        "Letter of engagement PDF uploaded successfully for engagement E7."
    );

    let requests = stub.requests().await;
    assert_eq!(
        requests[0].path,
        "/tenants/acme/engagements/E7/pdf/letter-of-engagement"
    );
    assert_eq!(requests[0].json(), json!({"pdfContent": "JVBERi0xLjc="}));
}

#[tokio::test]
async fn schema_violations_never_reach_the_api() {
    let stub = StubServer::start(vec![]).await;
    let server = server_for(&stub);

    let out = call_tool(
        &server,
        "create-client-service",
        json!({"clientCode": "C1", "billableServiceCode": "PAY", "startDate": "2024-01-01",
               "status": "Live", "billingFrequency": "Monthly"}),
    )
    .await;
    assert_eq!(out["error"]["code"], -32602);
    let message = out["error"]["message"].as_str().unwrap_or_default();
    assert!(message.starts_with("Invalid arguments for create-client-service"));
    assert!(message.contains("/status"));
    assert!(stub.requests().await.is_empty());
}

#[tokio::test]
async fn environment_configures_the_client() {
    let _guard = ENV_LOCK.lock().await;
    let stub = StubServer::start(vec![Canned::json(200, json!([]))]).await;

    let keys = ["SODIUM_API_URL", "SODIUM_API_KEY", "SODIUM_TENANT"];
    let previous: Vec<Option<String>> = keys.iter().map(|k| std::env::var(k).ok()).collect();
    std::env::set_var("SODIUM_API_URL", stub.base_url());
    std::env::set_var("SODIUM_API_KEY", "env-key");
    std::env::set_var("SODIUM_TENANT", "envco");

    let server = McpServer::from_app(App::initialize().expect("app"));
    let out = call_tool(&server, "get-engagement-emails", json!({"code": "E1"})).await;

    for (key, value) in keys.iter().zip(previous) {
        restore_env(key, value);
    }

    assert_eq!(text(&out), "No emails found for engagement E1.");
    let requests = stub.requests().await;
    assert_eq!(requests[0].path, "/tenants/envco/engagements/E1/email");
    assert_eq!(requests[0].header("x-api-key"), Some("env-key"));
}

#[tokio::test]
async fn pdf_download_failures_become_error_text() {
    let stub = StubServer::start(vec![
        Canned::json(404, json!({"message": "Engagement not found"})),
        Canned::raw(500, Some("text/plain"), b"upstream exploded"),
    ])
    .await;
    let server = server_for(&stub);

    let out = call_tool(&server, "get-proposal-pdf", json!({"code": "E404"})).await;
    assert!(out.get("error").is_none());
    assert_eq!(
        text(&out),
        "Error downloading proposal PDF: Engagement not found"
    );

    let out = call_tool(&server, "get-loe-pdf", json!({"code": "E500"})).await;
    assert_eq!(
        text(&out),
        "Error downloading letter of engagement PDF: HTTP 500: Internal Server Error"
    );

    let requests = stub.requests().await;
    assert_eq!(requests[0].path, "/tenants/acme/engagements/E404/pdf/proposal");
    assert_eq!(requests[0].header("accept"), Some("application/pdf"));
}

#[tokio::test]
async fn whole_number_paging_arguments_reach_the_api_as_integers() {
    let stub = StubServer::start(vec![Canned::json(200, json!({"data": []}))]).await;
    let server = server_for(&stub);

    let out = call_tool(&server, "list-clients", json!({"offset": 10.0, "limit": 5.0})).await;
    assert_eq!(text(&out), "No clients found.");
    assert_eq!(
        stub.requests().await[0].query.as_deref(),
        Some("offset=10&limit=5")
    );
}
