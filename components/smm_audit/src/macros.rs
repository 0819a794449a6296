//! Call-site instrumentation macros
//!
//! These wrap the two monitor operations with debug log lines that tie the audit
//! events back to the source location doing the registration. They are pure
//! logging plus delegation; the monitor operations are the actual contract.
//!
//! Use [`smi_register_notify!`](crate::smi_register_notify) (or the `_with_context`
//! variant) immediately before handing a handler to a dispatcher, and
//! [`smi_registration_detect!`](crate::smi_registration_detect) in the registration
//! path once the dispatcher accepts it. Judgement can be used about granularity,
//! so long as notifies and detections correlate 1:1.
//!
//! ## License
//!
//! Copyright (c) Microsoft Corporation.
//!
//! SPDX-License-Identifier: Apache-2.0
//!

/// Announces `handler` to the monitor, logging the handler symbol and call site.
///
/// ```ignore
/// smm_audit::smi_register_notify!(monitor, my_mmi_handler);
/// mmi_handler_register(my_mmi_handler, &guid, &mut handle);
/// ```
#[macro_export]
macro_rules! smi_register_notify {
    ($monitor:expr, $handler:expr) => {{
        $crate::__log::debug!(
            target: "smi_audit",
            "<SMI-AUDIT> SMI-REGISTER-NOTIFY - HANDLER: {}() [0x{:X}]",
            stringify!($handler),
            $handler as usize
        );
        $crate::__log::debug!(target: "smi_audit", "<SMI-AUDIT>   REGISTERED AT: {}:{}", file!(), line!());
        {
            use $crate::monitor::RegistrationMonitor as _;
            $monitor.notify($handler as usize);
        }
    }};
}

/// Like [`smi_register_notify!`](crate::smi_register_notify), additionally logging a
/// context value associated with the registration (a dispatch context, child GUID,
/// or similar).
#[macro_export]
macro_rules! smi_register_notify_with_context {
    ($monitor:expr, $handler:expr, $context:expr) => {{
        $crate::__log::debug!(
            target: "smi_audit",
            "<SMI-AUDIT> SMI-REGISTER-NOTIFY - HANDLER: {}() [0x{:X}], CONTEXT: {:?}",
            stringify!($handler),
            $handler as usize,
            $context
        );
        $crate::__log::debug!(target: "smi_audit", "<SMI-AUDIT>   REGISTERED AT: {}:{}", file!(), line!());
        {
            use $crate::monitor::RegistrationMonitor as _;
            $monitor.notify($handler as usize);
        }
    }};
}

/// Reports a just-completed registration of `handler` to the monitor, logging the
/// detection site.
#[macro_export]
macro_rules! smi_registration_detect {
    ($monitor:expr, $handler:expr) => {{
        $crate::__log::debug!(
            target: "smi_audit",
            "<SMI-AUDIT> SMI-REGISTRATION-DETECT - HANDLER: [0x{:X}]",
            $handler as usize
        );
        $crate::__log::debug!(target: "smi_audit", "<SMI-AUDIT>   DETECTED AT: {}:{}", file!(), line!());
        {
            use $crate::monitor::RegistrationMonitor as _;
            $monitor.confirm_registration($handler as usize);
        }
    }};
}
