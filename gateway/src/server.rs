//! Service lifecycle: `Initializing` -> `Serving`.
//!
//! Bring-up consumes the `Initializing` value, so a serving gateway can never
//! re-enter initialization.

use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;

use crate::api;
use crate::context::DeviceContext;
use crate::error::Result;
use crate::netif::{BringUp, NetifParams};

/// Gateway before the USB network has been brought up.
#[derive(Debug)]
pub struct Initializing {
    context: DeviceContext,
}

impl Initializing {
    pub fn new(context: DeviceContext) -> Self {
        Self { context }
    }

    /// Run the one-shot network bring-up and start serving.
    pub async fn bring_up(self) -> Result<Serving> {
        match self.context.netif.bring_up(&NetifParams::mesh_gateway()).await? {
            BringUp::Absent => tracing::info!("No USB network capability, skipping bring-up"),
            BringUp::AlreadyUp => tracing::info!("USB network already up, leaving it untouched"),
            BringUp::Started => tracing::info!("USB network started"),
        }

        Ok(Serving {
            context: Arc::new(self.context),
        })
    }
}

/// Gateway accepting requests.
#[derive(Debug, Clone)]
pub struct Serving {
    context: Arc<DeviceContext>,
}

impl Serving {
    pub fn context(&self) -> &Arc<DeviceContext> {
        &self.context
    }

    pub fn router(&self) -> Router {
        api::router(self.context.clone())
    }

    /// Serve on `listener` until Ctrl-C.
    pub async fn serve(self, listener: TcpListener) -> Result<()> {
        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown_signal())
            .await?;
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        // Without a signal handler, serve until the process is killed.
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::DeviceClock;
    use crate::error::Error;
    use crate::netif::InterfaceState;
    use crate::test_util::{ManualTicks, RecordingNetif};

    fn context(netif: InterfaceState) -> DeviceContext {
        DeviceContext::new(DeviceClock::start(Arc::new(ManualTicks::new(0))), netif)
    }

    #[tokio::test]
    async fn test_bring_up_then_serving() {
        let netif = Arc::new(RecordingNetif::down());
        let serving = Initializing::new(context(InterfaceState::Present(netif.clone())))
            .bring_up()
            .await
            .unwrap();

        assert_eq!(netif.start_calls(), vec![NetifParams::mesh_gateway()]);
        assert!(serving.context().netif.is_present());
    }

    #[tokio::test]
    async fn test_bring_up_failure_is_fatal() {
        let netif = Arc::new(RecordingNetif::failing());
        let result = Initializing::new(context(InterfaceState::Present(netif)))
            .bring_up()
            .await;

        assert!(matches!(result, Err(Error::BringUp(_))));
    }
}
