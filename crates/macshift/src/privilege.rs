//! Up-front privilege check.
//!
//! Changing a hardware address needs root. The check is advisory: the
//! controller still attempts the change and relies on command results and
//! verification to report the real outcome.

/// Check if the process runs with effective UID 0.
pub fn is_root() -> bool {
    unsafe { libc::geteuid() == 0 }
}
