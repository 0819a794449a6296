//! Registration monitor
//!
//! [`EnforcingMonitor`] implements the notify/confirm rendezvous over the persistent
//! slot; [`NullMonitor`] is the build-time alternative used when auditing is
//! disabled.
//!
//! ## License
//!
//! Copyright (c) Microsoft Corporation.
//!
//! SPDX-License-Identifier: Apache-2.0
//!

use mm_services::MmServices;

use crate::error::AuditError;
use crate::policy::{DefaultPolicy, ViolationPolicy};
use crate::slot::{HANDLER_ID_NONE, HandlerId, RegistrationSlot, SlotAccessor};

/// The audit interface wrapped around SMI handler registration.
///
/// Both operations are advisory instrumentation, not control-flow gates: they have
/// no return value, and the real dispatcher registration proceeds regardless of any
/// violation detected here.
pub trait RegistrationMonitor {
    /// Announces that `handler` is about to be registered with a dispatcher.
    ///
    /// `handler` must be a non-null token; [`HANDLER_ID_NONE`] is reserved as the
    /// empty sentinel.
    fn notify(&self, handler: HandlerId);

    /// Verifies that `handler`, just accepted by a dispatcher, was announced first,
    /// and consumes the pending notification on an exact match.
    fn confirm_registration(&self, handler: HandlerId);
}

/// Monitor that checks every registration against the preceding notification.
///
/// State machine, per slot:
///
/// - `Empty --notify(h)--> Pending(h)`
/// - `Pending(h) --confirm_registration(h)--> Empty`
/// - `Pending(h) --confirm_registration(h')-->` violation, state unchanged
/// - `Pending(h) --notify(h2)-->` violation, new notification dropped
/// - `Empty --confirm_registration(h)-->` violation, state unchanged
pub struct EnforcingMonitor<S: MmServices, P: ViolationPolicy = DefaultPolicy> {
    slot: SlotAccessor<S>,
    policy: P,
}

impl<S: MmServices> EnforcingMonitor<S, DefaultPolicy> {
    /// Creates a monitor with the build-matched [`DefaultPolicy`].
    pub const fn new(services: S) -> Self {
        Self::with_policy(services, DefaultPolicy {})
    }
}

impl<S: MmServices, P: ViolationPolicy> EnforcingMonitor<S, P> {
    /// Creates a monitor reporting violations through `policy`.
    pub const fn with_policy(services: S, policy: P) -> Self {
        Self { slot: SlotAccessor::new(services), policy }
    }

    /// Resolves the persistent slot, reporting unavailability through the policy.
    ///
    /// Unavailability is fail-soft: the caller returns without mutating anything.
    fn resolve_slot(&self) -> Option<&mut RegistrationSlot> {
        match self.slot.get_or_create() {
            // SAFETY: the slot lives in the MM configuration table for the life
            // of the execution context, and MM execution is single-threaded and
            // non-reentrant, so this monitor holds the only live reference.
            Ok(slot) => Some(unsafe { &mut *slot.as_ptr() }),
            Err(error) => {
                log::error!(target: "smi_audit", "cannot locate or create the registration slot: {error:?}");
                self.policy.report(error);
                None
            }
        }
    }
}

impl<S: MmServices, P: ViolationPolicy> RegistrationMonitor for EnforcingMonitor<S, P> {
    fn notify(&self, handler: HandlerId) {
        let Some(slot) = self.resolve_slot() else {
            return;
        };

        if !slot.is_empty() {
            log::error!(
                target: "smi_audit",
                "SMI handler registration already pending: 0x{:X} (dropping 0x{handler:X})",
                slot.notified_handler
            );
            self.policy.report(AuditError::RegistrationAlreadyPending);
            return;
        }

        slot.notified_handler = handler;
    }

    fn confirm_registration(&self, handler: HandlerId) {
        let Some(slot) = self.resolve_slot() else {
            return;
        };

        if slot.notified_handler == HANDLER_ID_NONE || slot.notified_handler != handler {
            log::warn!(target: "smi_audit", "unknown SMI handler registration attempted: 0x{handler:X}");
            self.policy.report(AuditError::UnauditedRegistration);
            return;
        }

        slot.notified_handler = HANDLER_ID_NONE;
    }
}

/// Monitor used when auditing is disabled; both operations are unconditional no-ops.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullMonitor;

impl NullMonitor {
    /// Creates a new `NullMonitor` instance.
    pub const fn new() -> Self {
        Self {}
    }
}

impl RegistrationMonitor for NullMonitor {
    fn notify(&self, _handler: HandlerId) {}

    fn confirm_registration(&self, _handler: HandlerId) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slot::REGISTRATION_SLOT_GUID;
    use crate::test_support::{FakeMmServices, RecordingPolicy};

    fn pending_handler(services: &FakeMmServices) -> Option<HandlerId> {
        services.installed_table(&REGISTRATION_SLOT_GUID).map(|table| {
            // SAFETY: the fake keeps installed blocks alive for the test, and the
            // slot accessor installed a RegistrationSlot under this GUID.
            unsafe { table.cast::<RegistrationSlot>().as_ref() }.notified_handler
        })
    }

    #[test]
    fn notify_then_matching_confirm_leaves_slot_empty() {
        let services = FakeMmServices::new();
        let policy = RecordingPolicy::default();
        let monitor = EnforcingMonitor::with_policy(&services, &policy);

        monitor.notify(0x1000);
        assert_eq!(pending_handler(&services), Some(0x1000));

        monitor.confirm_registration(0x1000);
        assert_eq!(pending_handler(&services), Some(HANDLER_ID_NONE));
        assert!(policy.violations.borrow().is_empty());
    }

    #[test]
    fn confirm_without_notify_is_an_unaudited_registration() {
        let services = FakeMmServices::new();
        let policy = RecordingPolicy::default();
        let monitor = EnforcingMonitor::with_policy(&services, &policy);

        monitor.confirm_registration(0x1000);
        assert_eq!(*policy.violations.borrow(), [AuditError::UnauditedRegistration]);
        // Slot stays empty.
        assert_eq!(pending_handler(&services), Some(HANDLER_ID_NONE));
    }

    #[test]
    fn double_notify_keeps_the_first_pending_handler() {
        let services = FakeMmServices::new();
        let policy = RecordingPolicy::default();
        let monitor = EnforcingMonitor::with_policy(&services, &policy);

        monitor.notify(0x1000);
        monitor.notify(0x2000);
        assert_eq!(*policy.violations.borrow(), [AuditError::RegistrationAlreadyPending]);
        assert_eq!(pending_handler(&services), Some(0x1000));

        // The original notification is still confirmable.
        monitor.confirm_registration(0x1000);
        assert_eq!(*policy.violations.borrow(), [AuditError::RegistrationAlreadyPending]);
        assert_eq!(pending_handler(&services), Some(HANDLER_ID_NONE));
    }

    #[test]
    fn mismatched_confirm_leaves_the_pending_notification_intact() {
        let services = FakeMmServices::new();
        let policy = RecordingPolicy::default();
        let monitor = EnforcingMonitor::with_policy(&services, &policy);

        monitor.notify(0x1000);
        monitor.confirm_registration(0x2000);
        assert_eq!(*policy.violations.borrow(), [AuditError::UnauditedRegistration]);
        assert_eq!(pending_handler(&services), Some(0x1000));

        monitor.confirm_registration(0x1000);
        assert_eq!(*policy.violations.borrow(), [AuditError::UnauditedRegistration]);
        assert_eq!(pending_handler(&services), Some(HANDLER_ID_NONE));
    }

    #[test]
    fn back_to_back_pairs_cycle_cleanly() {
        let services = FakeMmServices::new();
        let policy = RecordingPolicy::default();
        let monitor = EnforcingMonitor::with_policy(&services, &policy);

        monitor.notify(0x1000);
        monitor.confirm_registration(0x1000);
        monitor.notify(0x2000);
        monitor.confirm_registration(0x2000);

        assert!(policy.violations.borrow().is_empty());
        assert_eq!(pending_handler(&services), Some(HANDLER_ID_NONE));
    }

    #[test]
    fn unready_environment_reports_and_mutates_nothing() {
        let services = FakeMmServices::new();
        services.ready.set(false);
        let policy = RecordingPolicy::default();
        let monitor = EnforcingMonitor::with_policy(&services, &policy);

        monitor.notify(0x1000);
        monitor.confirm_registration(0x1000);
        assert_eq!(
            *policy.violations.borrow(),
            [AuditError::EnvironmentNotReady, AuditError::EnvironmentNotReady]
        );
        assert_eq!(services.installs.get(), 0);

        // Once the environment comes up, the monitor recovers on its own.
        services.ready.set(true);
        monitor.notify(0x1000);
        monitor.confirm_registration(0x1000);
        assert_eq!(policy.violations.borrow().len(), 2);
    }

    #[test]
    fn allocation_failure_reports_store_unavailable() {
        let services = FakeMmServices::new();
        services.fail_allocation.set(true);
        let policy = RecordingPolicy::default();
        let monitor = EnforcingMonitor::with_policy(&services, &policy);

        monitor.notify(0x1000);
        assert_eq!(*policy.violations.borrow(), [AuditError::StoreUnavailable]);
    }

    #[test]
    #[should_panic(expected = "SMI audit violation")]
    fn assert_and_halt_policy_halts_on_violation() {
        let services = FakeMmServices::new();
        let monitor = EnforcingMonitor::with_policy(&services, crate::policy::AssertAndHalt);
        monitor.confirm_registration(0x1000);
    }

    #[test]
    fn null_monitor_never_raises_and_never_touches_the_registry() {
        let monitor = NullMonitor::new();
        monitor.confirm_registration(0x1000);
        monitor.notify(0x1000);
        monitor.notify(0x2000);
        monitor.confirm_registration(0x3000);
        monitor.confirm_registration(0x3000);
    }

    #[test]
    fn monitors_are_interchangeable_behind_the_trait() {
        let services = FakeMmServices::new();
        let policy = RecordingPolicy::default();
        let enforcing = EnforcingMonitor::with_policy(&services, &policy);
        let null = NullMonitor::new();

        let monitors: [&dyn RegistrationMonitor; 2] = [&enforcing, &null];
        for monitor in monitors {
            monitor.notify(0x4000);
            monitor.confirm_registration(0x4000);
        }
        assert!(policy.violations.borrow().is_empty());
    }
}
