//! In-memory test doubles for the MM configuration table registry and the
//! violation policy.
//!
//! ## License
//!
//! Copyright (c) Microsoft Corporation.
//!
//! SPDX-License-Identifier: Apache-2.0
//!

extern crate std;

use core::cell::{Cell, RefCell};
use core::ffi::c_void;
use core::ptr::NonNull;
use std::boxed::Box;
use std::vec::Vec;

use mm_services::{MmServices, ServiceError};
use r_efi::efi;

use crate::error::AuditError;
use crate::policy::ViolationPolicy;

/// In-memory stand-in for the MM configuration table registry.
///
/// Allocations are leaked for the duration of the test so installed blocks stay
/// valid however long the test holds pointers into them. Fresh allocations are
/// filled with `0xA5` to catch callers that skip zero-initialization.
pub struct FakeMmServices {
    tables: RefCell<Vec<(efi::Guid, NonNull<c_void>)>>,
    /// Mirrors whether the ambient system table has been published.
    pub ready: Cell<bool>,
    /// Forces the next allocations to fail.
    pub fail_allocation: Cell<bool>,
    /// Forces the next installs to fail.
    pub fail_install: Cell<bool>,
    /// Number of successful allocations.
    pub allocations: Cell<usize>,
    /// Number of successful table installs.
    pub installs: Cell<usize>,
    /// Blocks handed back through `free_pool`.
    pub frees: RefCell<Vec<NonNull<c_void>>>,
}

impl FakeMmServices {
    pub fn new() -> Self {
        Self {
            tables: RefCell::new(Vec::new()),
            ready: Cell::new(true),
            fail_allocation: Cell::new(false),
            fail_install: Cell::new(false),
            allocations: Cell::new(0),
            installs: Cell::new(0),
            frees: RefCell::new(Vec::new()),
        }
    }

    /// The block installed under `guid`, if any.
    pub fn installed_table(&self, guid: &efi::Guid) -> Option<NonNull<c_void>> {
        self.tables.borrow().iter().find(|(vendor_guid, _)| vendor_guid == guid).map(|(_, table)| *table)
    }
}

impl MmServices for &FakeMmServices {
    fn find_configuration_table(&self, guid: &efi::Guid) -> Result<Option<NonNull<c_void>>, ServiceError> {
        if !self.ready.get() {
            return Err(ServiceError::EnvironmentNotReady);
        }
        Ok(self.installed_table(guid))
    }

    fn allocate_pool(&self, size: usize) -> Result<NonNull<c_void>, ServiceError> {
        if !self.ready.get() {
            return Err(ServiceError::EnvironmentNotReady);
        }
        if self.fail_allocation.get() {
            return Err(ServiceError::StoreUnavailable);
        }
        let block = Box::leak(vec![0xA5u8; size.max(1)].into_boxed_slice());
        self.allocations.set(self.allocations.get() + 1);
        Ok(NonNull::new(block.as_mut_ptr() as *mut c_void).unwrap())
    }

    fn install_configuration_table(
        &self,
        guid: &efi::Guid,
        table: NonNull<c_void>,
        _size: usize,
    ) -> Result<(), ServiceError> {
        if !self.ready.get() {
            return Err(ServiceError::EnvironmentNotReady);
        }
        if self.fail_install.get() {
            return Err(ServiceError::StoreUnavailable);
        }
        self.tables.borrow_mut().push((*guid, table));
        self.installs.set(self.installs.get() + 1);
        Ok(())
    }

    fn free_pool(&self, buffer: NonNull<c_void>) {
        self.frees.borrow_mut().push(buffer);
    }
}

/// Policy that records every reported violation for later inspection.
#[derive(Default)]
pub struct RecordingPolicy {
    pub violations: RefCell<Vec<AuditError>>,
}

impl ViolationPolicy for RecordingPolicy {
    fn report(&self, violation: AuditError) {
        self.violations.borrow_mut().push(violation);
    }
}
