use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use roomroast::Intensity;
use roomroast_client::{load_image, render, RoastClient};

/// Roast a photo of a room
#[derive(Parser, Debug)]
#[command(version, about)]
pub struct Args {
    /// The photo to roast
    image: PathBuf,
    /// How hard to go: gentle, medium or savage
    #[arg(short, long, default_value = "gentle")]
    intensity: Intensity,
    /// URL of the roomroast server
    #[arg(long, default_value = "http://localhost:3000")]
    server: String,
    /// Print the raw JSON result instead of the formatted roast
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();
    let args = Args::parse();

    let image = load_image(&args.image)?;
    println!("Roasting {} ({})...", args.image.display(), args.intensity);

    let client = RoastClient::new(&args.server);
    let result = client.roast(image, args.intensity).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print!("\n{}", render(&result));
    }
    Ok(())
}
