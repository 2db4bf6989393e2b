#[tokio::main]
async fn main() -> anyhow::Result<()> {
    sync_anywhere::run().await
}
