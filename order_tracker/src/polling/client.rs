use std::sync::Arc;

use error_stack::{ResultExt, report};
use tokio::sync::{mpsc::Sender, oneshot, watch};

use crate::{
    error::{Error, TrackerResult},
    polling::{TrackerSnapshot, messages::PollerRequest},
};

/// Cloneable handle to a running `OrderPoller`
#[derive(Debug, Clone)]
pub struct PollerClient {
    client: Sender<PollerRequest>,
    snapshots: watch::Receiver<Arc<TrackerSnapshot>>,
}

impl PollerClient {
    pub fn new(
        client: Sender<PollerRequest>,
        snapshots: watch::Receiver<Arc<TrackerSnapshot>>,
    ) -> Self {
        Self { client, snapshots }
    }

    /// Receiver that always holds the latest installed snapshot.
    pub fn subscribe(&self) -> watch::Receiver<Arc<TrackerSnapshot>> {
        self.snapshots.clone()
    }

    /// Latest installed snapshot, without a round trip to the poller.
    pub fn latest(&self) -> Arc<TrackerSnapshot> {
        self.snapshots.borrow().clone()
    }

    pub async fn snapshot(&self) -> TrackerResult<Arc<TrackerSnapshot>> {
        let (resp_sender, resp_receiver) = oneshot::channel();
        self.client
            .send(PollerRequest::GetSnapshot { resp: resp_sender })
            .await
            .change_context(Error::ModuleStopped("OrderPoller".to_string()))
            .attach_printable("Failed to send get snapshot request")?;
        Self::await_response(resp_receiver, "get snapshot").await
    }

    /// Fetches orders immediately. Fails if that fetch fails; the poller keeps
    /// its previous snapshot either way.
    pub async fn refresh(&self) -> TrackerResult<Arc<TrackerSnapshot>> {
        let (resp_sender, resp_receiver) = oneshot::channel();
        self.client
            .send(PollerRequest::Refresh { resp: resp_sender })
            .await
            .change_context(Error::ModuleStopped("OrderPoller".to_string()))
            .attach_printable("Failed to send refresh request")?;
        Self::await_response(resp_receiver, "refresh").await
    }

    /// Stops the poller's timers. No fetch is issued after this returns.
    pub async fn shutdown(&self) -> TrackerResult<()> {
        let (resp_sender, resp_receiver) = oneshot::channel();
        self.client
            .send(PollerRequest::Shutdown { resp: resp_sender })
            .await
            .change_context(Error::ModuleStopped("OrderPoller".to_string()))
            .attach_printable("Failed to send shutdown request")?;
        Self::await_response(resp_receiver, "shutdown").await
    }

    async fn await_response<T>(
        resp_receiver: oneshot::Receiver<Result<T, Error>>,
        request: &str,
    ) -> TrackerResult<T> {
        match resp_receiver.await {
            Ok(Ok(data)) => Ok(data),
            Ok(Err(e)) => {
                tracing::warn!("Poller {request} request failed: {e}");
                Err(report!(e)).attach_printable_lazy(|| format!("Poller {request} request failed"))
            }
            Err(_) => {
                tracing::error!("Failed to receive response from poller");
                Err(report!(Error::ModuleStopped("OrderPoller".to_string()))
                    .attach_printable("Failed to receive response from poller"))
            }
        }
    }
}
