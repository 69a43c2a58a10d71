#[tokio::main]
async fn main() -> anyhow::Result<()> {
    farmassist_server::start().await
}
