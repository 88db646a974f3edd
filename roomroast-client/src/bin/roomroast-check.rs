use anyhow::{bail, Result};
use clap::Parser;
use roomroast_client::RoastClient;

/// Check that the server and its inference backend are up
#[derive(Parser, Debug)]
#[command(version, about)]
pub struct Args {
    /// URL of the server to check
    #[arg(long, default_value = "http://localhost:3000")]
    server: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();
    let args = Args::parse();

    println!("Checking {}...", args.server);
    let status = match RoastClient::new(&args.server).status().await {
        Ok(status) => status,
        Err(e) => {
            eprintln!("\nError connecting to server!");
            if args.server.starts_with("https://localhost") || args.server.starts_with("https://127.0.0.1") {
                eprintln!("\nHint: Local dev servers typically use HTTP, not HTTPS.");
                eprintln!("Try: cargo run --bin roomroast-check -- --server http://localhost:3000");
            }
            return Err(e);
        }
    };

    if status.online {
        println!("\nInference server is online.");
        if status.models.is_empty() {
            println!("No models installed yet. Try: ollama pull moondream && ollama pull qwen2.5:3b");
        }
        for model in &status.models {
            println!("  {}", model);
        }
    } else {
        println!("\nInference server is offline.");
        if let Some(detail) = &status.detail {
            println!("{}", detail);
        }
        println!("Please install Ollama from ollama.com to use this app.");
        bail!("Inference server is offline");
    }
    Ok(())
}
