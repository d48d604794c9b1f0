//! Constants used throughout the kiosk core crate.
//!
//! Defaults for configuration, external endpoint paths and the fixed values sent
//! to the queue-assigner live here so they are defined exactly once.

/// Default base URL of the external queue-assigner.
pub const DEFAULT_QUEUE_ASSIGNER_URL: &str = "https://queue-assigner.onrender.com";

/// Default directory for the local patient-name store.
pub const DEFAULT_NAME_STORE_DIR: &str = "kiosk_data/names";

/// Default bound on every outbound call, in seconds.
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;

/// Default period of the priority-refresh ticker, in seconds.
pub const DEFAULT_PRIORITY_REFRESH_SECS: u64 = 300;

/// Default wait between a prediction and the queue re-fetch, in milliseconds.
pub const DEFAULT_RECONCILE_DELAY_MS: u64 = 500;

/// Name of the sled tree holding patient names.
pub const NAME_TREE: &str = "patient_names";

/// Queue-assigner endpoint paths, relative to the base URL.
pub const QUEUE_PATH: &str = "queue/";
pub const PREDICT_PATH: &str = "predict/";
pub const QUEUE_NEXT_PATH: &str = "queue/next/";
pub const UPDATE_PRIORITIES_PATH: &str = "queue/update-priorities/";

/// Placeholder values for derived measurements this system does not compute.
pub const DERIVED_HRV: f64 = 60.0;
pub const DERIVED_PULSE_PRESSURE: f64 = 40.0;
pub const DERIVED_BMI: f64 = 22.5;
pub const DERIVED_MAP: f64 = 88.3;
