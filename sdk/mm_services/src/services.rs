//! MM configuration table and pool services.
//!
//! [`MmServices`] is the seam between components that need persistent GUID-identified
//! storage and the ambient MM system table. [`StandardMmServices`] calls through the
//! raw table; tests substitute an in-memory implementation.
//!
//! ## License
//!
//! Copyright (c) Microsoft Corporation.
//!
//! SPDX-License-Identifier: Apache-2.0
//!

use core::ffi::c_void;
use core::ptr::NonNull;

use r_efi::efi;

use crate::system_table::{MM_RUNTIME_SERVICES_DATA, MmSystemTable};

/// Errors surfaced by the ambient MM service table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceError {
    /// The MM system table has not been published to this execution context yet.
    EnvironmentNotReady,
    /// Pool allocation or configuration table installation failed.
    StoreUnavailable,
}

/// Configuration table registry services consumed by MM components.
///
/// This is the subset of `EFI_MM_SYSTEM_TABLE` needed to get-or-create a persistent,
/// GUID-identified block: lookup, allocation, installation, and cleanup on failure.
pub trait MmServices {
    /// Looks up a configuration table entry by GUID.
    ///
    /// Returns `Ok(None)` when no entry carries `guid`, and
    /// [`ServiceError::EnvironmentNotReady`] when the registry itself is absent.
    fn find_configuration_table(&self, guid: &efi::Guid) -> Result<Option<NonNull<c_void>>, ServiceError>;

    /// Allocates `size` bytes of pool memory that persists for the life of the
    /// MM environment. The contents are not initialized.
    fn allocate_pool(&self, size: usize) -> Result<NonNull<c_void>, ServiceError>;

    /// Installs `table` into the configuration table registry under `guid`.
    fn install_configuration_table(
        &self,
        guid: &efi::Guid,
        table: NonNull<c_void>,
        size: usize,
    ) -> Result<(), ServiceError>;

    /// Returns a pool allocation obtained from [`Self::allocate_pool`].
    fn free_pool(&self, buffer: NonNull<c_void>);
}

/// [`MmServices`] implementation backed by the raw `EFI_MM_SYSTEM_TABLE` pointer
/// (the `gSmst`/`gMmst` global in C firmware).
///
/// A null table pointer is a valid input: every operation reports
/// [`ServiceError::EnvironmentNotReady`] until the platform publishes the table.
///
/// MM executes single-threaded and non-reentrant; callers must not share one
/// instance across concurrently executing contexts.
#[derive(Debug, Clone, Copy)]
pub struct StandardMmServices {
    mmst: *const MmSystemTable,
}

impl StandardMmServices {
    /// Creates a wrapper over the ambient MM system table pointer.
    pub const fn new(mmst: *const MmSystemTable) -> Self {
        Self { mmst }
    }

    fn table(&self) -> Result<&MmSystemTable, ServiceError> {
        if self.mmst.is_null() {
            log::error!(target: "mm_services", "MM system table is not available");
            return Err(ServiceError::EnvironmentNotReady);
        }
        // SAFETY: the pointer is non-null per the check above, and the platform
        // guarantees the published table stays valid for the life of the MM
        // environment.
        Ok(unsafe { &*self.mmst })
    }
}

impl MmServices for StandardMmServices {
    fn find_configuration_table(&self, guid: &efi::Guid) -> Result<Option<NonNull<c_void>>, ServiceError> {
        let mmst = self.table()?;
        if mmst.mm_configuration_table.is_null() {
            return Ok(None);
        }
        for index in 0..mmst.number_of_table_entries {
            // SAFETY: the MM core guarantees entries 0..number_of_table_entries
            // are valid elements of the configuration table array.
            let entry = unsafe { &*mmst.mm_configuration_table.add(index) };
            if entry.vendor_guid == *guid {
                return Ok(NonNull::new(entry.vendor_table));
            }
        }
        Ok(None)
    }

    fn allocate_pool(&self, size: usize) -> Result<NonNull<c_void>, ServiceError> {
        let mmst = self.table()?;
        let Some(allocate) = mmst.mm_allocate_pool else {
            return Err(ServiceError::StoreUnavailable);
        };
        let mut buffer: *mut c_void = core::ptr::null_mut();
        let status = allocate(MM_RUNTIME_SERVICES_DATA, size, &mut buffer);
        if status.is_error() {
            log::error!(target: "mm_services", "MM pool allocation of {size} bytes failed: {status:?}");
            return Err(ServiceError::StoreUnavailable);
        }
        NonNull::new(buffer).ok_or(ServiceError::StoreUnavailable)
    }

    fn install_configuration_table(
        &self,
        guid: &efi::Guid,
        table: NonNull<c_void>,
        size: usize,
    ) -> Result<(), ServiceError> {
        let mmst = self.table()?;
        let Some(install) = mmst.mm_install_configuration_table else {
            return Err(ServiceError::StoreUnavailable);
        };
        let status = install(self.mmst, guid, table.as_ptr(), size);
        if status.is_error() {
            log::error!(target: "mm_services", "MM configuration table install failed: {status:?}");
            return Err(ServiceError::StoreUnavailable);
        }
        Ok(())
    }

    fn free_pool(&self, buffer: NonNull<c_void>) {
        if let Ok(mmst) = self.table()
            && let Some(free) = mmst.mm_free_pool
        {
            let _ = free(buffer.as_ptr());
        }
    }
}
