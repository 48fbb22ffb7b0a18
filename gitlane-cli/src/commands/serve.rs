use anyhow::Result;
use colored::Colorize;
use gitlane_server::GitlaneServer;
use std::path::PathBuf;

pub async fn run(port: Option<u16>, config: Option<PathBuf>) -> Result<()> {
    let mut config = super::load_config(config)?;
    if let Some(port) = port {
        config.server.port = port;
    }

    let addr = config.socket_addr()?;
    let server = GitlaneServer::new(&config);

    println!("{}", "🚀 Starting gitlane server...".bold().cyan());
    println!(
        "   {}: {}",
        "Repository".bold(),
        config.registry.initial_repository
    );
    println!(
        "   {}: {} x {}",
        "Lane grid".bold(),
        config.layout.commit_spacing,
        config.layout.lane_height
    );
    println!(
        "   {}: {}",
        "API Server".bold(),
        format!("http://{}", addr).green()
    );
    println!();
    println!("{}", "Press Ctrl+C to stop".dimmed());
    println!();

    server.serve(addr).await?;

    Ok(())
}
