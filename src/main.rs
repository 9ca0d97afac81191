#[tokio::main]
async fn main() -> anyhow::Result<()> {
    six_cities::app::run().await?;
    Ok(())
}
