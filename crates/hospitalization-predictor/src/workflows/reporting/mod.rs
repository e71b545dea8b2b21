//! Disagreement reporting: lets the caregiver flag a prediction they disagree
//! with, identified by their provider number.

pub mod domain;
pub mod gateway;
pub mod service;

pub use domain::{
    sanitize_provider_number, DisagreementReport, ReportForm, ReportValidationError,
    DEFAULT_COUNTRY,
};
pub use gateway::{ReportGateway, SimulatedReportGateway};
pub use service::{
    ReportTicket, ReportingSettings, ReportingSnapshot, ReportingState, ReportingWorkflow,
    SendOutcome,
};
