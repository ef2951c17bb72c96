//! Core library for the HireDesk hiring platform.
//!
//! Candidate-facing intake (wizard, validation, submission pipeline) and the
//! admin review console live in [`applications`]; console sessions in
//! [`auth`]; document blob storage and direct-upload signing in [`storage`].
//! [`config`], [`telemetry`], and [`error`] carry the service plumbing.

pub mod applications;
pub mod auth;
pub mod config;
pub mod error;
pub mod storage;
pub mod telemetry;
