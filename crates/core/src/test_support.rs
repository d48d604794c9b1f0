//! Fixtures shared by the unit tests of this crate.

use crate::assigner::QueueAssigner;
use crate::prediction::PredictionRequest;
use crate::{KioskError, KioskResult};
use api_shared::{CheckInReq, QueueEntry, VitalSignsReq};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::Mutex;

pub fn jane_doe() -> CheckInReq {
    CheckInReq {
        full_name: "Jane Doe".into(),
        age: Some(40.0),
        gender: "Female".into(),
        weight: Some(60.0),
        height: Some(1.65),
        contact_number: None,
        emergency_contact: None,
        vital_signs: VitalSignsReq {
            heart_rate: Some(72.0),
            blood_pressure_systolic: Some(120.0),
            blood_pressure_diastolic: Some(80.0),
            temperature: Some(36.6),
            oxygen_saturation: Some(98.0),
            respiratory_rate: Some(16.0),
        },
    }
}

pub fn check_in_named(name: &str) -> CheckInReq {
    CheckInReq {
        full_name: name.into(),
        ..jane_doe()
    }
}

pub fn entry(id: &str) -> QueueEntry {
    QueueEntry::new(id)
        .with("priority_score", json!(1.0))
        .with("estimated_wait_time", json!(10.0))
}

/// How the fake answers `POST /predict/`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PredictMode {
    /// Enqueue and return a prediction without the id.
    Enqueue,
    /// Enqueue and return the new id in the prediction.
    EnqueueWithId,
    /// Return a prediction but never enqueue.
    Lagging,
}

#[derive(Debug)]
pub struct FakeState {
    pub queue: VecDeque<QueueEntry>,
    pub predictions: Vec<PredictionRequest>,
    pub next_id: u32,
    pub mode: PredictMode,
    pub unreachable: bool,
    pub refresh_calls: usize,
    pub fail_refresh: bool,
}

/// In-memory queue-assigner. Queue order is insertion order.
#[derive(Debug)]
pub struct FakeAssigner {
    pub state: Mutex<FakeState>,
}

impl FakeAssigner {
    pub fn new(mode: PredictMode) -> Self {
        Self {
            state: Mutex::new(FakeState {
                queue: VecDeque::new(),
                predictions: Vec::new(),
                next_id: 1,
                mode,
                unreachable: false,
                refresh_calls: 0,
                fail_refresh: false,
            }),
        }
    }

    pub fn with_queue(mode: PredictMode, ids: &[&str]) -> Self {
        let fake = Self::new(mode);
        fake.state.lock().unwrap().queue = ids.iter().map(|id| entry(id)).collect();
        fake
    }

    pub fn queued_ids(&self) -> Vec<String> {
        let state = self.state.lock().unwrap();
        state.queue.iter().map(|e| e.patient_id.clone()).collect()
    }

    fn check_reachable(state: &FakeState) -> KioskResult<()> {
        if state.unreachable {
            return Err(KioskError::Upstream("connection refused".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl QueueAssigner for FakeAssigner {
    async fn probe(&self) -> KioskResult<u16> {
        Self::check_reachable(&self.state.lock().unwrap())?;
        Ok(200)
    }

    async fn queue(&self) -> KioskResult<Vec<QueueEntry>> {
        let state = self.state.lock().unwrap();
        Self::check_reachable(&state)?;
        Ok(state.queue.iter().cloned().collect())
    }

    async fn predict(&self, request: &PredictionRequest) -> KioskResult<Value> {
        let mut state = self.state.lock().unwrap();
        Self::check_reachable(&state)?;
        state.predictions.push(request.clone());

        let id = format!("p{}", state.next_id);
        state.next_id += 1;
        if state.mode != PredictMode::Lagging {
            state.queue.push_back(entry(&id));
        }

        Ok(match state.mode {
            PredictMode::EnqueueWithId => json!({"patient_id": id, "priority_score": 1.0}),
            _ => json!({"prediction": "urgent"}),
        })
    }

    async fn next(&self) -> KioskResult<Option<QueueEntry>> {
        let mut state = self.state.lock().unwrap();
        Self::check_reachable(&state)?;
        Ok(state.queue.pop_front())
    }

    async fn update_priorities(&self) -> KioskResult<()> {
        let mut state = self.state.lock().unwrap();
        state.refresh_calls += 1;
        if state.fail_refresh {
            return Err(KioskError::UpstreamStatus {
                status: 500,
                message: "boom".into(),
            });
        }
        Ok(())
    }
}
