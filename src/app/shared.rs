//! Thread-safe handle to one [`Controller`].
//!
//! Ingestion arrives on a transport thread while the tick runs on the
//! main loop.  Both go through the same mutex; a tick holds it for its
//! whole duration, so readings never land half-way through a decision.
//! The time feed is read before the lock is taken, so feed I/O never
//! stalls ingestion.

use std::sync::Arc;

use log::warn;
use parking_lot::Mutex;

use crate::alarms::Alarm;
use crate::error::IngestError;
use crate::store::{Device, Metric};

use super::ingest::IngestUpdate;
use super::ports::{CommandPort, EventSink, TimeFeedPort};
use super::service::{Controller, TickOutcome};
use super::status::StatusReport;

#[derive(Clone)]
pub struct SharedController {
    inner: Arc<Mutex<Controller>>,
}

impl SharedController {
    pub fn new(controller: Controller) -> Self {
        Self {
            inner: Arc::new(Mutex::new(controller)),
        }
    }

    pub fn ingest(&self, update: &IngestUpdate) -> Result<(), IngestError> {
        self.inner.lock().ingest(update)
    }

    /// Decode `payload` and store it, stamped with the controller's "now".
    pub fn ingest_payload(&self, device: Device, metric: Metric, payload: &str) -> Result<(), IngestError> {
        let mut controller = self.inner.lock();
        let update = IngestUpdate::decode(device, metric, payload, controller.now_ms())
            .inspect_err(|e| warn!("Rejected {device}/{} payload: {e}", metric.name()))?;
        controller.ingest(&update)
    }

    pub fn tick(
        &self,
        feed: &mut impl TimeFeedPort,
        out: &mut impl CommandPort,
        sink: &mut impl EventSink,
    ) -> TickOutcome {
        let read = feed.read();
        self.inner.lock().tick_from(read, out, sink)
    }

    pub fn status(&self) -> StatusReport {
        self.inner.lock().status()
    }

    pub fn alarms(&self) -> Vec<Alarm> {
        self.inner.lock().alarms().to_vec()
    }

    /// Run `f` with exclusive access to the controller.
    pub fn with<R>(&self, f: impl FnOnce(&mut Controller) -> R) -> R {
        f(&mut self.inner.lock())
    }
}
