//! Spotify relay server binary.

// crates.io
use spotify_relay::{config::RelayConfig, error::Result, obs, server};

#[tokio::main]
async fn main() -> Result<()> {
	obs::init_tracing();

	let config = RelayConfig::from_env()?;

	server::serve(config).await
}
