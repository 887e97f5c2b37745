use vaultdeck::cli::run_cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if it exists (optional - won't fail if missing)
    dotenvy::dotenv().ok();

    run_cli().await
}
