#[tokio::main]
async fn main() {
    if let Err(err) = sodium_mcp::mcp::server::run_stdio().await {
        eprintln!("sodium-mcp: {}", err);
        std::process::exit(1);
    }
}
