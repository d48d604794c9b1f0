//! Queue relay service.
//!
//! Forwards the kiosk's operations to the external queue-assigner and joins its
//! answers with the local name store. Ordering, priorities and wait times are
//! always the external service's; the relay never reorders or filters.
//!
//! ## Submission and id reconciliation
//!
//! The queue-assigner may not return the id it assigns to a new patient. When it
//! does, that id is used directly. When it does not, the relay:
//!
//! 1. snapshots the queue ids before predicting,
//! 2. predicts, waits the reconcile delay, and re-fetches the queue,
//! 3. binds the name to the first entry that is neither in the snapshot nor already
//!    named locally.
//!
//! Submissions hold a lock across these steps, so two concurrent check-ins never
//! diff against the same snapshot. The store write is insert-if-absent, so one id is
//! never bound to two names.

use crate::assigner::{HttpQueueAssigner, QueueAssigner};
use crate::names::{NameRecord, NameStore};
use crate::prediction::PredictionRequest;
use crate::validation::validate_check_in;
use crate::{CoreConfig, KioskError, KioskResult};
use api_shared::{CheckInReq, EnrichedEntry, HealthRes, HealthService, QueueEntry};
use kiosk_types::PatientId;
use serde_json::Value;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

/// Result of a check-in submission.
#[derive(Debug, Clone, PartialEq)]
pub enum Submission {
    /// The patient was identified in the queue and their name stored.
    Enrolled(EnrichedEntry),
    /// The prediction succeeded but the new queue entry could not be identified yet.
    /// Carries the raw prediction; no name was stored.
    Pending(Value),
}

/// Relay between the kiosk and the external queue-assigner.
pub struct QueueRelay {
    assigner: Arc<dyn QueueAssigner>,
    names: NameStore,
    reconcile_delay: Duration,
    submit_lock: Mutex<()>,
}

impl QueueRelay {
    /// Creates a relay over an existing assigner and store, taking the reconcile delay
    /// from `cfg`.
    pub fn new(assigner: Arc<dyn QueueAssigner>, names: NameStore, cfg: &CoreConfig) -> Self {
        Self::with_reconcile_delay(assigner, names, cfg.reconcile_delay())
    }

    /// Builds a relay from configuration: an HTTP queue-assigner client and the
    /// on-disk name store.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built or the store cannot be opened.
    pub fn connect(cfg: &CoreConfig) -> KioskResult<Self> {
        let assigner = Arc::new(HttpQueueAssigner::new(cfg)?);
        let names = NameStore::open(cfg.name_store_dir())?;
        Ok(Self::new(assigner, names, cfg))
    }

    /// Creates a relay with an explicit reconcile delay.
    ///
    /// # Arguments
    /// * `assigner` - External queue-assigner (HTTP client, or a fake in tests)
    /// * `names` - Local name store
    /// * `reconcile_delay` - Wait between a prediction and the queue re-fetch used to find
    ///   the new entry; may be zero
    pub fn with_reconcile_delay(
        assigner: Arc<dyn QueueAssigner>,
        names: NameStore,
        reconcile_delay: Duration,
    ) -> Self {
        Self {
            assigner,
            names,
            reconcile_delay,
            submit_lock: Mutex::new(()),
        }
    }

    /// Shared handle to the queue-assigner, e.g. for the priority refresher.
    pub fn assigner(&self) -> Arc<dyn QueueAssigner> {
        self.assigner.clone()
    }

    /// The local name store.
    pub fn names(&self) -> &NameStore {
        &self.names
    }

    /// Probes the external service. Never fails; an unreachable service reports "down".
    pub async fn health(&self) -> HealthRes {
        match self.assigner.probe().await {
            Ok(status) => HealthService::up(status),
            Err(e) => {
                tracing::warn!("queue-assigner health probe failed: {e}");
                HealthService::down()
            }
        }
    }

    /// The external queue with names attached, in the external order.
    ///
    /// # Errors
    ///
    /// Fails as a whole if either the queue-assigner or the name store fails; entries are
    /// never shown as anonymous because of a store fault.
    pub async fn list_queue(&self) -> KioskResult<Vec<EnrichedEntry>> {
        let queue = self.assigner.queue().await?;
        let names = self.names.names()?;

        Ok(queue
            .into_iter()
            .map(|entry| {
                let name = names.get(&entry.patient_id).cloned();
                entry.enrich(name)
            })
            .collect())
    }

    /// One queued patient with their name attached.
    ///
    /// # Errors
    ///
    /// Returns `KioskError::PatientNotFound` if the id is not in the external queue.
    pub async fn get_patient(&self, id: &PatientId) -> KioskResult<EnrichedEntry> {
        let entry = self
            .assigner
            .queue()
            .await?
            .into_iter()
            .find(|entry| entry.patient_id == id.as_str())
            .ok_or_else(|| KioskError::PatientNotFound(id.to_string()))?;

        let name = self.names.name_of(id.as_str())?;
        Ok(entry.enrich(name))
    }

    /// Validates a check-in, submits it for prediction and stores the patient's name.
    ///
    /// # Errors
    ///
    /// Returns `KioskError::InvalidInput` before any network call if the check-in is
    /// invalid, and propagates queue-assigner and store failures.
    pub async fn submit(&self, req: &CheckInReq) -> KioskResult<Submission> {
        let check_in = validate_check_in(req)?;
        let payload = PredictionRequest::from(&check_in);

        let _guard = self.submit_lock.lock().await;

        let before: HashSet<String> = self
            .assigner
            .queue()
            .await?
            .into_iter()
            .map(|entry| entry.patient_id)
            .collect();

        let prediction = self.assigner.predict(&payload).await?;

        let entry = match crate::assigner::entry_from_body(prediction.clone()) {
            Some(entry) => Some(entry),
            None => {
                tokio::time::sleep(self.reconcile_delay).await;
                self.find_new_entry(&before).await?
            }
        };

        let Some(entry) = entry else {
            tracing::warn!("submitted patient not yet visible in queue; name not stored");
            return Ok(Submission::Pending(prediction));
        };

        let Ok(id) = PatientId::parse(&entry.patient_id) else {
            tracing::warn!("queue-assigner returned an empty patient id; name not stored");
            return Ok(Submission::Pending(prediction));
        };
        if !self.names.insert_if_absent(&id, &check_in.full_name)? {
            return Err(KioskError::DuplicatePatientId(id.to_string()));
        }
        self.names.flush().await?;

        tracing::info!(patient_id = %id, "patient checked in");
        Ok(Submission::Enrolled(
            entry.enrich(Some(check_in.full_name.into_inner())),
        ))
    }

    async fn find_new_entry(&self, before: &HashSet<String>) -> KioskResult<Option<QueueEntry>> {
        for entry in self.assigner.queue().await? {
            if before.contains(&entry.patient_id) {
                continue;
            }
            if !self.names.contains(&entry.patient_id)? {
                return Ok(Some(entry));
            }
        }
        Ok(None)
    }

    /// Dequeues the next patient and forgets their name.
    ///
    /// # Errors
    ///
    /// Returns `KioskError::QueueEmpty` when there is nobody to call. Upstream errors are
    /// propagated without retry; in both cases the name store is untouched. A store error
    /// after the dequeue is returned once the called patient's record has been dropped.
    pub async fn call_next(&self) -> KioskResult<EnrichedEntry> {
        let entry = self.assigner.next().await?.ok_or(KioskError::QueueEmpty)?;

        let name = match self.names.name_of(&entry.patient_id) {
            Ok(name) => name,
            Err(e) => {
                // The patient has left the external queue; their record goes too.
                tracing::error!(
                    patient_id = %entry.patient_id,
                    "patient dequeued but name lookup failed: {e}"
                );
                self.names.remove(&entry.patient_id)?;
                self.names.flush().await?;
                return Err(e);
            }
        };
        self.names.remove(&entry.patient_id)?;
        self.names.flush().await?;

        tracing::info!(patient_id = %entry.patient_id, "patient called");
        Ok(entry.enrich(name))
    }

    /// Asks the queue-assigner to recompute priorities.
    pub async fn refresh_priorities(&self) -> KioskResult<()> {
        self.assigner.update_priorities().await
    }

    /// Every locally stored name.
    pub fn stored_names(&self) -> KioskResult<Vec<NameRecord>> {
        self.names.records()
    }
}
