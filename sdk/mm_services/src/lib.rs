//! Management Mode (MM) service abstractions
//!
//! This crate provides the PI (Platform Initialization) Management Mode system table
//! definitions and a narrow service trait over the portions of that table used for
//! configuration table management: lookup, pool allocation, and installation.
//!
//! Components that need persistent, GUID-identified storage inside the MM environment
//! consume the [`MmServices`] trait rather than the raw table, so they can be unit
//! tested against an in-memory implementation. [`StandardMmServices`] is the
//! production implementation backed by the ambient `EFI_MM_SYSTEM_TABLE` pointer.
//!
//! ## License
//!
//! Copyright (c) Microsoft Corporation.
//!
//! SPDX-License-Identifier: Apache-2.0
//!

#![cfg_attr(not(test), no_std)]

pub mod services;
pub mod system_table;

pub use services::{MmServices, ServiceError, StandardMmServices};
pub use system_table::{MmConfigurationTable, MmSystemTable};
