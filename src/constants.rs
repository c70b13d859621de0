pub mod sodium {
    pub const DEFAULT_API_URL: &str = "https://api.sodiumhq.com";
    pub const ENV_API_URL: &str = "SODIUM_API_URL";
    pub const ENV_API_KEY: &str = "SODIUM_API_KEY";
    pub const ENV_TENANT: &str = "SODIUM_TENANT";
    pub const API_KEY_HEADER: &str = "x-api-key";
    pub const TENANTS_SEGMENT: &str = "tenants";
    pub const USER_AGENT: &str = concat!("sodium-mcp/", env!("CARGO_PKG_VERSION"));
}

pub mod media {
    pub const JSON: &str = "application/json";
    pub const PDF: &str = "application/pdf";
}

pub mod protocols {
    pub const ALLOWED_HTTP: &[&str] = &["http:", "https:"];
}

pub mod server {
    pub const PROTOCOL_VERSION: &str = "2025-06-18";
    pub const SERVER_NAME: &str = "sodium-mcp";
    pub const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");
}

pub mod report {
    pub const RECORD_SEPARATOR: &str = "\n\n---\n\n";
    pub const CURRENCY: &str = "£";
    pub const UNKNOWN: &str = "?";
}
