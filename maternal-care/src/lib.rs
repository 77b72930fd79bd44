//! Maternal health records with threshold-based risk assessment and alerting.
//!
//! Inbound records are validated, written to the [`RecordStore`], and, for
//! metrics, assessed against the configured thresholds. A high-risk verdict
//! raises a new [`HealthAlert`](maternal_core::HealthAlert) for the owning
//! profile.

pub mod alerts;
pub mod clock;
pub mod risk;
pub mod store;
pub mod validation;

mod service;

pub use clock::{Clock, IdGenerator, SystemClock, UuidGenerator};
pub use risk::{assess, RiskFinding, RiskVerdict};
pub use service::MaternalCare;
pub use store::{Collection, RecordStore};
