use std::sync::Arc;

use tokio::sync::oneshot;

use crate::{error::Error, polling::TrackerSnapshot};

type Responder<T> = oneshot::Sender<Result<T, Error>>;

#[derive(Debug)]
pub enum PollerRequest {
    GetSnapshot {
        resp: Responder<Arc<TrackerSnapshot>>,
    },
    /// Fetch orders now, outside the timer
    Refresh {
        resp: Responder<Arc<TrackerSnapshot>>,
    },
    Shutdown {
        resp: Responder<()>,
    },
}
