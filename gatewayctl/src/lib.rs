//! gatewayctl - command-line client for the mesh gateway REST API.

pub mod cli;
pub mod client;
pub mod error;
pub mod output;
pub mod request;

pub use cli::{Cli, Commands};
pub use client::GatewayClient;
pub use error::CtlError;
pub use request::GatewayRequest;

/// Run one CLI invocation and return the rendered response.
///
/// Arguments are validated before the client is built, so a bad `--args`
/// never reaches the network.
pub async fn run(cli: &Cli) -> Result<String, CtlError> {
    let request = cli.request()?;
    let client = GatewayClient::new(&cli.base_url(), cli.timeout()?)?;
    let response = client.send(&request).await?;
    Ok(output::render(&response))
}
