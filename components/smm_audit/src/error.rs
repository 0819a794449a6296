//! Error types for registration audit operations
//!
//! ## License
//!
//! Copyright (c) Microsoft Corporation.
//!
//! SPDX-License-Identifier: Apache-2.0
//!

use mm_services::ServiceError;

/// Audit conditions reported by the registration monitor.
///
/// All four conditions are advisory: the monitor's public operations have no failure
/// return channel, and violations are routed to the configured
/// [`ViolationPolicy`](crate::policy::ViolationPolicy) instead. The real handler
/// registration proceeds unaffected in every case.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditError {
    /// The ambient MM configuration table registry is not initialized yet.
    EnvironmentNotReady,
    /// Allocation or installation of the persistent notification slot failed.
    StoreUnavailable,
    /// `notify` was called while an earlier notification was still unconfirmed.
    RegistrationAlreadyPending,
    /// A handler was registered that was never announced, or was announced with a
    /// different identity.
    UnauditedRegistration,
}

impl From<ServiceError> for AuditError {
    fn from(error: ServiceError) -> Self {
        match error {
            ServiceError::EnvironmentNotReady => AuditError::EnvironmentNotReady,
            ServiceError::StoreUnavailable => AuditError::StoreUnavailable,
        }
    }
}
