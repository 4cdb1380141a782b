use crate::application::controller::FlowController;
use crate::domain::flow::{FlowView, Intent};
use crate::error::{FlowError, Result};
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

const INTENT_QUEUE_DEPTH: usize = 32;

type Reply = oneshot::Sender<Result<FlowView>>;

/// Handle to a flow controller running in its own task.
///
/// Intents are queued and applied one at a time, each to completion, so two
/// confirmations can never overlap. Work already started keeps running even if
/// the caller stops waiting for the reply.
pub struct FlowSession {
    intents: mpsc::Sender<(Intent, Reply)>,
    view: watch::Receiver<FlowView>,
    worker: JoinHandle<FlowView>,
}

impl FlowSession {
    /// Spawns the actor and runs the start-of-flow initialization.
    pub async fn start(mut controller: FlowController) -> Result<Self> {
        controller.initialize().await?;
        let view = controller.subscribe();
        let (intents, mut inbox) = mpsc::channel::<(Intent, Reply)>(INTENT_QUEUE_DEPTH);

        let worker = tokio::spawn(async move {
            while let Some((intent, reply)) = inbox.recv().await {
                let name = intent.name();
                let result = controller.apply(intent).await.map(|_| controller.view());
                if let Err(e) = &result {
                    debug!(intent = name, error = %e, "Intent rejected");
                }
                if reply.send(result).is_err() {
                    debug!(intent = name, "Caller stopped waiting for intent result");
                }
            }
            controller.view()
        });

        Ok(Self {
            intents,
            view,
            worker,
        })
    }

    pub async fn dispatch(&self, intent: Intent) -> Result<FlowView> {
        let (reply, response) = oneshot::channel();
        self.intents
            .send((intent, reply))
            .await
            .map_err(|_| FlowError::SessionClosed)?;
        response.await.map_err(|_| FlowError::SessionClosed)?
    }

    /// Latest published projection.
    pub fn snapshot(&self) -> FlowView {
        self.view.borrow().clone()
    }

    pub fn watch(&self) -> watch::Receiver<FlowView> {
        self.view.clone()
    }

    /// Stops accepting intents, drains the queue and returns the final view.
    pub async fn shutdown(self) -> Result<FlowView> {
        drop(self.intents);
        self.worker.await.map_err(|e| {
            warn!(error = %e, "Flow session task ended abnormally");
            FlowError::InternalError(Box::new(e))
        })
    }
}
