#[tokio::main]
async fn main() -> anyhow::Result<()> {
    rego_server::run().await
}
