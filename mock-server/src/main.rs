use mock_server::Encoding;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,mock_server=debug".into()),
        )
        .init();

    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let encoding = match std::env::var("MOCK_ENCODING").as_deref() {
        Ok("gzip") => Encoding::Gzip,
        Ok("deflate") => Encoding::Deflate,
        _ => Encoding::Identity,
    };
    let addr = format!("127.0.0.1:{port}");
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!(%addr, ?encoding, "mock CreateSend API listening");
    mock_server::run_with_encoding(listener, encoding).await
}
