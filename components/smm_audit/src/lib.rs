//! SMI handler registration auditing for Management Mode (MM) environments
//!
//! This crate catches code that registers an SMI handler with a dispatcher without
//! going through the expected audit discipline. The contract is a strict alternating
//! protocol: immediately before calling the real registration API, the registering
//! code announces the handler with [`RegistrationMonitor::notify`]; the registration
//! path then calls [`RegistrationMonitor::confirm_registration`], which verifies the
//! just-registered handler matches the announced one and clears the pending state.
//!
//! ```text
//!              notify(h)                    confirm_registration(h)
//!   Empty ───────────────────▶ Pending(h) ───────────────────────▶ Empty
//!     ▲                            │
//!     │   confirm w/o notify,      │  notify while pending,
//!     │   or mismatched handler:   │  mismatched confirm:
//!     └── violation, state kept ◀──┘  violation, state kept
//! ```
//!
//! The pending notification lives in a single [`slot::RegistrationSlot`] installed in
//! the MM configuration table under [`slot::REGISTRATION_SLOT_GUID`], so it survives
//! across driver entry points within the same MM execution context. One slot is
//! sufficient because a notify/confirm pair is expected to complete before any other
//! registration occurs.
//!
//! Violations never gate the real registration: the dispatcher call proceeds
//! regardless. How a violation is surfaced is an injected [`ViolationPolicy`] —
//! [`AssertAndHalt`] for development, [`LogAndContinue`] for production — with
//! [`DefaultPolicy`] selecting between them the way a debug/release build split would.
//!
//! # Usage
//!
//! ```ignore
//! use smm_audit::{EnforcingMonitor, RegistrationMonitor};
//! use mm_services::StandardMmServices;
//!
//! let monitor = EnforcingMonitor::new(StandardMmServices::new(mmst));
//!
//! smm_audit::smi_register_notify!(monitor, my_mmi_handler);
//! let status = mmi_handler_register(my_mmi_handler, &guid, &mut handle);
//! smm_audit::smi_registration_detect!(monitor, my_mmi_handler);
//! ```
//!
//! When auditing is disabled, [`NullMonitor`] satisfies the same interface with both
//! operations as no-ops, so call sites need not change.
//!
//! # Concurrency
//!
//! MM executes single-threaded and non-reentrant; the slot read-modify-write
//! sequences rely on that. Sharing one monitor across concurrently executing
//! contexts is a precondition violation, not a supported configuration.
//!
//! ## License
//!
//! Copyright (c) Microsoft Corporation.
//!
//! SPDX-License-Identifier: Apache-2.0
//!

#![cfg_attr(not(test), no_std)]

pub mod error;
mod macros;
pub mod monitor;
pub mod policy;
pub mod slot;

#[cfg(test)]
pub(crate) mod test_support;

pub use error::AuditError;
pub use monitor::{EnforcingMonitor, NullMonitor, RegistrationMonitor};
pub use policy::{AssertAndHalt, DefaultPolicy, LogAndContinue, ViolationPolicy};
pub use slot::{HANDLER_ID_NONE, HandlerId, REGISTRATION_SLOT_GUID, RegistrationSlot};

// Re-exported for the expansion of the call-site macros.
#[doc(hidden)]
pub use log as __log;
