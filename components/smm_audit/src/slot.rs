//! Persistent notification slot
//!
//! The audit state is a single [`RegistrationSlot`] holding the handler most recently
//! announced but not yet confirmed registered. The slot lives in the MM configuration
//! table under [`REGISTRATION_SLOT_GUID`], created lazily on first use and never torn
//! down; it persists for the life of the MM execution context.
//!
//! ## License
//!
//! Copyright (c) Microsoft Corporation.
//!
//! SPDX-License-Identifier: Apache-2.0
//!

use core::cell::Cell;
use core::ptr::NonNull;

use mm_services::MmServices;
use r_efi::efi;
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

use crate::error::AuditError;

/// Opaque handler identity.
///
/// In practice this is the entry point address of the handler being registered, but
/// it is only ever compared for equality, never dereferenced.
pub type HandlerId = usize;

/// Sentinel meaning "no pending notification".
pub const HANDLER_ID_NONE: HandlerId = 0;

/// GUID under which the notification slot is installed in the MM configuration table:
/// `3C51E8A6-4B4F-4D22-8E9A-5F7C1D0BAA37`
pub const REGISTRATION_SLOT_GUID: efi::Guid =
    efi::Guid::from_fields(0x3c51e8a6, 0x4b4f, 0x4d22, 0x8e, 0x9a, &[0x5f, 0x7c, 0x1d, 0x0b, 0xaa, 0x37]);

/// Persistent audit state: the one handler announced but not yet confirmed.
///
/// Zero-initialized on creation; a zero `notified_handler` means empty. The
/// configuration table registry only provides the backing storage and never
/// interprets the contents.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromBytes, IntoBytes, Immutable, KnownLayout)]
pub struct RegistrationSlot {
    /// The handler most recently notified but not yet confirmed registered.
    pub notified_handler: HandlerId,
}

impl RegistrationSlot {
    /// A slot with no pending notification.
    pub const fn empty() -> Self {
        Self { notified_handler: HANDLER_ID_NONE }
    }

    /// Whether no notification is pending.
    pub fn is_empty(&self) -> bool {
        self.notified_handler == HANDLER_ID_NONE
    }

    /// The pending handler, if a notification is outstanding.
    pub fn pending(&self) -> Option<HandlerId> {
        if self.is_empty() { None } else { Some(self.notified_handler) }
    }
}

/// Resolves the process-wide [`RegistrationSlot`], creating it on first access.
///
/// The resolved pointer is cached locally after the first success, so later calls
/// skip the registry lookup entirely. There is no teardown; the cached handle is
/// valid for the life of the execution context.
pub struct SlotAccessor<S: MmServices> {
    services: S,
    cached: Cell<Option<NonNull<RegistrationSlot>>>,
}

impl<S: MmServices> SlotAccessor<S> {
    /// Creates an accessor over the given configuration table services.
    pub const fn new(services: S) -> Self {
        Self { services, cached: Cell::new(None) }
    }

    /// Returns the slot, installing a zero-initialized one into the configuration
    /// table registry on the first successful call.
    ///
    /// A second call returns the same underlying slot without re-zeroing it.
    pub fn get_or_create(&self) -> Result<NonNull<RegistrationSlot>, AuditError> {
        if let Some(slot) = self.cached.get() {
            return Ok(slot);
        }
        let slot = self.find_or_create()?;
        self.cached.set(Some(slot));
        Ok(slot)
    }

    fn find_or_create(&self) -> Result<NonNull<RegistrationSlot>, AuditError> {
        if let Some(existing) = self.services.find_configuration_table(&REGISTRATION_SLOT_GUID)? {
            return Ok(existing.cast());
        }

        let size = core::mem::size_of::<RegistrationSlot>();
        let block = self.services.allocate_pool(size)?;
        let slot = block.cast::<RegistrationSlot>();
        // SAFETY: block is a freshly allocated, exclusively owned region of at
        // least `size` bytes, and RegistrationSlot has no alignment requirement
        // beyond what the pool allocator provides.
        unsafe { slot.as_ptr().write(RegistrationSlot::empty()) };

        if let Err(error) = self.services.install_configuration_table(&REGISTRATION_SLOT_GUID, block, size) {
            self.services.free_pool(block);
            return Err(error.into());
        }
        Ok(slot)
    }
}
