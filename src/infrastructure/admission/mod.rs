//! Admission decision engine

mod service;

pub use service::{AdmissionOutcome, AdmissionService};
