#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = quecho_config::load()?;
    quecho_log::init(&config.log.level);

    let app = quecho::app(&config.echo)?;
    app.run(&config.server).await?;
    Ok(())
}
