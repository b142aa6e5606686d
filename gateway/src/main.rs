//! Mesh Gateway - device-side command service.

use std::env;
use std::sync::Arc;

use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use mesh_gateway::{Config, DeviceClock, DeviceContext, Initializing, InterfaceState, SystemTicks, VERSION};
use mesh_gateway_common::SERVICE_NAME;

fn print_version() {
    println!("{} {}", SERVICE_NAME, VERSION);
}

// One cooperative event loop; handlers never run in parallel.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Uptime counts from here.
    let clock = DeviceClock::start(Arc::new(SystemTicks::new()));

    // Handle --version / -V
    let args: Vec<String> = env::args().collect();
    if args.iter().any(|a| a == "--version" || a == "-V") {
        print_version();
        return Ok(());
    }

    // Load configuration
    let config = Config::load().map_err(|e| {
        format!(
            "Failed to load configuration: {}. \
             Check config.toml or the GATEWAY__SECTION__KEY environment variables.",
            e
        )
    })?;

    // Initialize tracing
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level)))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting {} {}", SERVICE_NAME, VERSION);
    tracing::info!(
        "USB network: enabled={}, interface={}",
        config.usbnet.enabled,
        config.usbnet.interface
    );

    let context = DeviceContext::new(clock, InterfaceState::from_config(&config.usbnet));
    let serving = Initializing::new(context).bring_up().await?;

    // Start server
    let addr = config.api.bind_addr();
    tracing::info!("Listening on {}", addr);

    let listener = TcpListener::bind(&addr).await?;
    serving.serve(listener).await?;

    Ok(())
}
