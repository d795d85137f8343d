use clap::Parser;
use client::network::Client;
use log::info;
use shared::{Position, DEFAULT_HOST, DEFAULT_PORT, WORLD_HEIGHT, WORLD_WIDTH};
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Server address to connect to
    #[arg(short, long, default_value_t = format!("{}:{}", DEFAULT_HOST, DEFAULT_PORT))]
    server: String,

    /// Display name announced to the server
    #[arg(short, long, default_value = "player")]
    username: String,

    /// Position updates sent per second
    #[arg(short = 'r', long, default_value = "20")]
    send_rate: u32,

    /// Initial x coordinate
    #[arg(short, long, default_value_t = WORLD_WIDTH / 2.0)]
    x: f32,

    /// Initial y coordinate
    #[arg(short, long, default_value_t = WORLD_HEIGHT / 2.0)]
    y: f32,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    if std::env::var("RUST_LOG").is_err() {
        eprintln!("Set RUST_LOG=info for detailed logging");
    }

    let args = Args::parse();
    let send_interval = Duration::from_secs_f64(1.0 / args.send_rate.max(1) as f64);

    info!("Starting client, connecting to {}", args.server);

    let mut client = Client::new(&args.server, &args.username, send_interval).await?;

    // The input layer owns this handle; until one is attached, the player
    // stays at the starting position.
    let position = client.position_handle();
    *position.write().await = Position::new(args.x, args.y).wrapped();

    client.run().await?;

    Ok(())
}
