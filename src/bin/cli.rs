use miette::Result;

#[tokio::main]
async fn main() -> Result<()> {
    famille::cli::run().await
}
