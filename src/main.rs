use tracing::error;

#[tokio::main]
async fn main() {
    if let Err(err) = prompt_forge::run().await {
        error!("Server exited with error: {}", err);
        std::process::exit(1);
    }
}
