// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

use std::sync::{atomic::AtomicBool, atomic::Ordering};

#[doc(hidden)]
pub use log as _log;

#[macro_export]
macro_rules! info {
    ($msg:literal, $($arg:tt)+) => {
        flexprep_log::_log::info!(target: concat!("flexprep.rust::", module_path!()), $msg, $($arg)+);
    };
    ($msg:literal) => {
        flexprep_log::_log::info!(target: concat!("flexprep.rust::", module_path!()), $msg);
    };
}

#[macro_export]
macro_rules! warn {
    ($msg:literal, $($arg:tt)+) => {
        flexprep_log::_log::warn!(target: concat!("flexprep.rust::", module_path!()), $msg, $($arg)+);
    };
    ($msg:literal) => {
        flexprep_log::_log::warn!(target: concat!("flexprep.rust::", module_path!()), $msg);
    };
}

/// Log a diagnostic message at info level if diagnostics logging is enabled.
#[macro_export]
macro_rules! diagnostic {
    ($msg:literal, $($arg:tt)+) => {
        if flexprep_log::is_diagnostics_enabled() {
             flexprep_log::_log::info!(target: concat!("flexprep.rust::", module_path!()), $msg, $($arg)+);
        }
    };
    ($msg:literal) => {
        if flexprep_log::is_diagnostics_enabled() {
            flexprep_log::_log::info!(target: concat!("flexprep.rust::", module_path!()), $msg);
        }
    };
}

static DIAGNOSTICS_ENABLED: AtomicBool = AtomicBool::new(false);

#[inline]
pub fn is_diagnostics_enabled() -> bool {
    DIAGNOSTICS_ENABLED.load(Ordering::Acquire)
}

/// Initialize the logging.
///
/// This function is meant to be called once at the start of the program to
/// set up the logging configuration.
/// Currently the function does not set up any concrete logger.
pub fn init_logging(with_diagnostics: bool) {
    DIAGNOSTICS_ENABLED.store(with_diagnostics, Ordering::Release);
}
