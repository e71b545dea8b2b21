//! Caregiver-side pipeline for the COVID hospitalization prediction service.
//!
//! The crate validates a patient assessment, encodes it as an observation
//! bundle, submits it to the remote prediction service and interprets the
//! multi-model response. [`workflows::prediction::SubmissionStateMachine`] and
//! [`workflows::reporting::ReportingWorkflow`] expose the user-facing
//! lifecycles that a UI layer renders.

pub mod config;
pub mod error;
pub mod i18n;
pub mod preferences;
pub mod telemetry;
pub mod workflows;
