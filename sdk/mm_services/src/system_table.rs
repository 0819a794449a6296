//! PI Management Mode System Table Definitions
//!
//! `#[repr(C)]` definitions for `EFI_MM_SYSTEM_TABLE` and its supporting types, per the
//! PI specification. Only the configuration table and pool services are exercised by
//! this workspace; the remaining members are declared so that field offsets match the
//! table published by real MM firmware.
//!
//! All function pointer members are `Option` so that an all-zero table is a valid
//! (if useless) value, matching firmware tables that leave unimplemented services null.
//!
//! ## License
//!
//! Copyright (c) Microsoft Corporation.
//!
//! SPDX-License-Identifier: Apache-2.0
//!

use core::ffi::c_void;
use r_efi::efi;

/// Memory type passed to the MM pool allocator (`EFI_MEMORY_TYPE`).
pub type MmMemoryType = u32;

/// `EfiRuntimeServicesData`, the pool type used for allocations that persist for the
/// life of the MM environment.
pub const MM_RUNTIME_SERVICES_DATA: MmMemoryType = 6;

/// `EFI_CONFIGURATION_TABLE` entry as published in the MM configuration table array.
///
/// The MM core never interprets `vendor_table`; it is an opaque block owned by
/// whichever component installed the entry.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct MmConfigurationTable {
    /// GUID identifying the owner and format of `vendor_table`.
    pub vendor_guid: efi::Guid,
    /// Opaque pointer to the installed block.
    pub vendor_table: *mut c_void,
}

/// `EFI_MM_INSTALL_CONFIGURATION_TABLE`
pub type MmInstallConfigurationTable = extern "efiapi" fn(
    system_table: *const MmSystemTable,
    guid: *const efi::Guid,
    table: *mut c_void,
    table_size: usize,
) -> efi::Status;

/// `EFI_ALLOCATE_POOL` as exposed through the MM system table.
pub type MmAllocatePool =
    extern "efiapi" fn(pool_type: MmMemoryType, size: usize, buffer: *mut *mut c_void) -> efi::Status;

/// `EFI_FREE_POOL` as exposed through the MM system table.
pub type MmFreePool = extern "efiapi" fn(buffer: *mut c_void) -> efi::Status;

/// `EFI_ALLOCATE_PAGES` as exposed through the MM system table.
pub type MmAllocatePages = extern "efiapi" fn(
    allocate_type: u32,
    memory_type: MmMemoryType,
    pages: usize,
    memory: *mut u64,
) -> efi::Status;

/// `EFI_FREE_PAGES` as exposed through the MM system table.
pub type MmFreePages = extern "efiapi" fn(memory: u64, pages: usize) -> efi::Status;

/// Procedure run on an application processor by [`MmStartupThisAp`].
pub type MmApProcedure = extern "efiapi" fn(buffer: *mut c_void);

/// `EFI_MM_STARTUP_THIS_AP`
pub type MmStartupThisAp = extern "efiapi" fn(
    procedure: Option<MmApProcedure>,
    cpu_number: usize,
    proc_arguments: *mut c_void,
) -> efi::Status;

/// One direction of `EFI_MM_CPU_IO` access (read or write).
pub type MmIoAccessFn = extern "efiapi" fn(
    this: *const MmCpuIoProtocol,
    width: u32,
    address: u64,
    count: usize,
    buffer: *mut c_void,
) -> efi::Status;

/// `EFI_MM_IO_ACCESS`
#[repr(C)]
#[derive(Clone, Copy)]
pub struct MmIoAccess {
    pub read: Option<MmIoAccessFn>,
    pub write: Option<MmIoAccessFn>,
}

/// `EFI_MM_CPU_IO_PROTOCOL`
#[repr(C)]
#[derive(Clone, Copy)]
pub struct MmCpuIoProtocol {
    pub mem: MmIoAccess,
    pub io: MmIoAccess,
}

/// `EFI_INSTALL_PROTOCOL_INTERFACE`
pub type MmInstallProtocolInterface = extern "efiapi" fn(
    handle: *mut efi::Handle,
    protocol: *const efi::Guid,
    interface_type: u32,
    interface: *mut c_void,
) -> efi::Status;

/// `EFI_UNINSTALL_PROTOCOL_INTERFACE`
pub type MmUninstallProtocolInterface =
    extern "efiapi" fn(handle: efi::Handle, protocol: *const efi::Guid, interface: *mut c_void) -> efi::Status;

/// `EFI_HANDLE_PROTOCOL`
pub type MmHandleProtocol =
    extern "efiapi" fn(handle: efi::Handle, protocol: *const efi::Guid, interface: *mut *mut c_void) -> efi::Status;

/// Callback signature for [`MmRegisterProtocolNotify`].
pub type MmNotifyFn =
    extern "efiapi" fn(protocol: *const efi::Guid, interface: *mut c_void, handle: efi::Handle) -> efi::Status;

/// `EFI_MM_REGISTER_PROTOCOL_NOTIFY`
pub type MmRegisterProtocolNotify = extern "efiapi" fn(
    protocol: *const efi::Guid,
    function: Option<MmNotifyFn>,
    registration: *mut *mut c_void,
) -> efi::Status;

/// `EFI_LOCATE_HANDLE`
pub type MmLocateHandle = extern "efiapi" fn(
    search_type: u32,
    protocol: *const efi::Guid,
    search_key: *mut c_void,
    buffer_size: *mut usize,
    buffer: *mut efi::Handle,
) -> efi::Status;

/// `EFI_LOCATE_PROTOCOL`
pub type MmLocateProtocol = extern "efiapi" fn(
    protocol: *const efi::Guid,
    registration: *mut c_void,
    interface: *mut *mut c_void,
) -> efi::Status;

/// `EFI_MM_HANDLER_ENTRY_POINT`, the signature of a registered MMI handler.
pub type MmiHandlerFn = extern "efiapi" fn(
    dispatch_handle: efi::Handle,
    context: *const c_void,
    comm_buffer: *mut c_void,
    comm_buffer_size: *mut usize,
) -> efi::Status;

/// `EFI_MM_INTERRUPT_MANAGE`
pub type MmiManage = extern "efiapi" fn(
    handler_type: *const efi::Guid,
    context: *const c_void,
    comm_buffer: *mut c_void,
    comm_buffer_size: *mut usize,
) -> efi::Status;

/// `EFI_MM_INTERRUPT_REGISTER`
pub type MmiHandlerRegister = extern "efiapi" fn(
    handler: MmiHandlerFn,
    handler_type: *const efi::Guid,
    dispatch_handle: *mut efi::Handle,
) -> efi::Status;

/// `EFI_MM_INTERRUPT_UNREGISTER`
pub type MmiHandlerUnregister = extern "efiapi" fn(dispatch_handle: efi::Handle) -> efi::Status;

/// `EFI_MM_SYSTEM_TABLE`
///
/// The table published by the MM core and handed to MM drivers at entry. Field order
/// and member types follow the PI specification so this definition can overlay the
/// table produced by C firmware.
#[repr(C)]
pub struct MmSystemTable {
    /// Standard EFI table header.
    pub hdr: efi::TableHeader,
    /// Null-terminated UCS-2 vendor string.
    pub mm_firmware_vendor: *const efi::Char16,
    /// Vendor-specific firmware revision.
    pub mm_firmware_revision: u32,
    /// Installs or removes an entry in the MM configuration table.
    pub mm_install_configuration_table: Option<MmInstallConfigurationTable>,
    /// CPU I/O services for the MM environment.
    pub mm_io: MmCpuIoProtocol,
    /// Allocates pool memory from MMRAM.
    pub mm_allocate_pool: Option<MmAllocatePool>,
    /// Returns pool memory to MMRAM.
    pub mm_free_pool: Option<MmFreePool>,
    /// Allocates page memory from MMRAM.
    pub mm_allocate_pages: Option<MmAllocatePages>,
    /// Returns page memory to MMRAM.
    pub mm_free_pages: Option<MmFreePages>,
    /// Runs a procedure on another processor inside MM.
    pub mm_startup_this_ap: Option<MmStartupThisAp>,
    /// Zero-based number of the processor executing the current MMI.
    pub currently_executing_cpu: usize,
    /// Number of processors known to the MM environment.
    pub number_of_cpus: usize,
    /// Per-CPU save state sizes.
    pub cpu_save_state_size: *mut usize,
    /// Per-CPU save state pointers.
    pub cpu_save_state: *mut *mut c_void,
    /// Number of valid entries in [`Self::mm_configuration_table`].
    pub number_of_table_entries: usize,
    /// Array of GUID/pointer configuration table entries.
    pub mm_configuration_table: *mut MmConfigurationTable,
    /// Protocol installation service.
    pub mm_install_protocol_interface: Option<MmInstallProtocolInterface>,
    /// Protocol removal service.
    pub mm_uninstall_protocol_interface: Option<MmUninstallProtocolInterface>,
    /// Protocol lookup by handle.
    pub mm_handle_protocol: Option<MmHandleProtocol>,
    /// Protocol installation notification service.
    pub mm_register_protocol_notify: Option<MmRegisterProtocolNotify>,
    /// Handle enumeration service.
    pub mm_locate_handle: Option<MmLocateHandle>,
    /// Protocol lookup service.
    pub mm_locate_protocol: Option<MmLocateProtocol>,
    /// Synchronous MMI dispatch.
    pub mmi_manage: Option<MmiManage>,
    /// Root and GUIDed MMI handler registration.
    pub mmi_handler_register: Option<MmiHandlerRegister>,
    /// MMI handler removal.
    pub mmi_handler_unregister: Option<MmiHandlerUnregister>,
}
