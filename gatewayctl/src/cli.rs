//! Command-line arguments.

use std::time::Duration;

use clap::{Parser, Subcommand};
use mesh_gateway_common::{DEFAULT_PORT, DEVICE_HOSTNAME};

use crate::error::CtlError;
use crate::request::GatewayRequest;

/// Send JSON commands to a mesh gateway REST API
#[derive(Debug, Parser)]
#[command(name = "gatewayctl")]
#[command(version)]
pub struct Cli {
    /// Gateway host
    #[arg(long, env = "GATEWAYCTL_HOST", default_value = DEVICE_HOSTNAME)]
    pub host: String,

    /// Gateway port
    #[arg(long, env = "GATEWAYCTL_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// HTTP timeout in seconds
    #[arg(long, env = "GATEWAYCTL_TIMEOUT", default_value_t = 5.0)]
    pub timeout: f64,

    /// Enable debug logging on stderr
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// GET /health
    Health,
    /// POST /command {cmd: status}
    Status,
    /// POST /echo
    Echo { message: String },
    /// POST /command with custom cmd/args
    Call {
        cmd: String,
        /// JSON object string
        #[arg(long, default_value = "{}")]
        args: String,
    },
}

impl Cli {
    pub fn base_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }

    pub fn timeout(&self) -> Result<Duration, CtlError> {
        match Duration::try_from_secs_f64(self.timeout) {
            Ok(timeout) if !timeout.is_zero() => Ok(timeout),
            _ => Err(CtlError::Validation(format!(
                "Invalid --timeout: {} (expected a positive number of seconds)",
                self.timeout
            ))),
        }
    }

    pub fn request(&self) -> Result<GatewayRequest, CtlError> {
        match &self.command {
            Commands::Health => Ok(GatewayRequest::Health),
            Commands::Status => Ok(GatewayRequest::Status),
            Commands::Echo { message } => Ok(GatewayRequest::echo(message.clone())),
            Commands::Call { cmd, args } => GatewayRequest::call(cmd.clone(), args),
        }
    }
}
