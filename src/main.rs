use mcp_graph_server::config::ServerConfig;
use mcp_graph_server::server::McpServer;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // stdout carries the protocol; logs go to stderr.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let config = match ServerConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            tracing::error!("mcp-graph-server: configuration error: {e}");
            std::process::exit(1);
        }
    };

    let mut server = McpServer::new(config);
    if let Err(e) = server.preload() {
        tracing::error!("mcp-graph-server: configuration error: {e}");
        std::process::exit(1);
    }

    if let Err(e) = server.run().await {
        tracing::error!("mcp-graph-server: fatal error: {e}");
        std::process::exit(1);
    }
}
