//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Own every cross-entity rule so storage stays rule-free.
//!
//! # See also
//! - `repo::contracts` for the storage seams these services consume.

pub mod assessment_service;
pub mod error;
pub mod organization_service;
