//! # Kiosk Core
//!
//! Core logic of the kiosk check-in relay:
//! - Check-in validation and mapping to the queue-assigner's prediction schema
//! - An HTTP client for the external queue-assigner
//! - The local patient-name store (sled)
//! - The queue relay, which joins the external queue with stored names
//! - The priority-refresh ticker
//!
//! **No API concerns**: HTTP servers, routing and status codes belong in `api-rest`.

pub mod assigner;
pub mod config;
pub mod constants;
pub mod error;
pub mod names;
pub mod prediction;
pub mod refresher;
pub mod relay;
pub mod validation;

#[cfg(test)]
mod test_support;

pub use assigner::{HttpQueueAssigner, QueueAssigner};
pub use config::CoreConfig;
pub use error::{KioskError, KioskResult};
pub use names::{NameRecord, NameStore};
pub use prediction::PredictionRequest;
pub use refresher::PriorityRefresher;
pub use relay::{QueueRelay, Submission};
pub use validation::{validate_check_in, CheckIn, Gender, VitalSigns};

// Re-export the shared crates so dependants need only one import path.
pub use api_shared;
pub use kiosk_types::{NonEmptyText, PatientId};
