//! # API Shared
//!
//! Shared wire types and utilities for the kiosk relay.
//!
//! Contains:
//! - JSON request/response types for the REST surface and the external queue-assigner
//!   (`queue` and `check_in` modules)
//! - `HealthService` for building health-check responses
//! - API-key checking for the admin endpoints
//!
//! Used by `kiosk-core`, `api-rest` and the CLI so that every layer agrees on one
//! representation of a queue entry.

pub mod auth;
pub mod check_in;
pub mod health;
pub mod queue;

pub use check_in::{CheckInReq, VitalSignsReq};
pub use health::{HealthRes, HealthService};
pub use queue::{CallNextRes, EnrichedEntry, MessageRes, QueueEntry, ANONYMOUS_NAME};
