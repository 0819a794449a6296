//! Violation reporting policies
//!
//! The original discipline is a debug/release split: hard assertion in development
//! builds, warning log line in production. That split is modeled as an injected
//! policy so both behaviors are constructible and testable in any build.
//!
//! ## License
//!
//! Copyright (c) Microsoft Corporation.
//!
//! SPDX-License-Identifier: Apache-2.0
//!

use crate::error::AuditError;

/// How audit violations are surfaced.
///
/// Policies are side-effect sinks only; they cannot veto or alter the operation that
/// detected the violation.
pub trait ViolationPolicy {
    /// Reports a detected violation.
    fn report(&self, violation: AuditError);
}

impl<P: ViolationPolicy + ?Sized> ViolationPolicy for &P {
    fn report(&self, violation: AuditError) {
        (**self).report(violation)
    }
}

/// Halts execution on any violation so the offending call site is caught during
/// development.
#[derive(Debug, Default, Clone, Copy)]
pub struct AssertAndHalt;

impl ViolationPolicy for AssertAndHalt {
    fn report(&self, violation: AuditError) {
        log::error!(target: "smi_audit", "SMI audit violation: {violation:?}");
        panic!("SMI audit violation: {violation:?}");
    }
}

/// Logs the violation and continues; the registration path is unaffected.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogAndContinue;

impl ViolationPolicy for LogAndContinue {
    fn report(&self, violation: AuditError) {
        match violation {
            AuditError::UnauditedRegistration => {
                log::warn!(target: "smi_audit", "unknown SMI handler registration attempted")
            }
            AuditError::RegistrationAlreadyPending => {
                log::error!(target: "smi_audit", "SMI handler registration already pending")
            }
            AuditError::EnvironmentNotReady | AuditError::StoreUnavailable => {
                log::error!(target: "smi_audit", "audit slot unavailable: {violation:?}")
            }
        }
    }
}

/// The build-matched policy: [`AssertAndHalt`] when debug assertions are enabled,
/// [`LogAndContinue`] otherwise.
#[cfg(debug_assertions)]
pub type DefaultPolicy = AssertAndHalt;

/// The build-matched policy: [`AssertAndHalt`] when debug assertions are enabled,
/// [`LogAndContinue`] otherwise.
#[cfg(not(debug_assertions))]
pub type DefaultPolicy = LogAndContinue;
