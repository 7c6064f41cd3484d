//! Pinning the log writer thread to a CPU core.
//!
//! Hosts that dedicate cores to hot paths can keep the disk-bound writer off
//! them by pinning it elsewhere. Wraps the `core_affinity` crate.
//!
//! Nothing here logs through `tracing`: these functions run on the writer
//! thread, and a record emitted there would loop back into its own queue.

use thiserror::Error;

/// Why a pinning request was not honoured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AffinityError {
    /// The core id does not exist on this host.
    #[error("CPU core {core_id} not available (system has {cores} cores)")]
    Unavailable { core_id: usize, cores: usize },
    /// The OS rejected the request.
    #[error("failed to bind thread to CPU core {core_id}")]
    Rejected { core_id: usize },
}

/// Bind the current thread to the specified CPU core.
pub fn bind_to_core(core_id: usize) -> Result<(), AffinityError> {
    let core_ids = core_affinity::get_core_ids().unwrap_or_default();
    let Some(core) = core_ids.get(core_id) else {
        return Err(AffinityError::Unavailable { core_id, cores: core_ids.len() });
    };
    if core_affinity::set_for_current(*core) { Ok(()) } else { Err(AffinityError::Rejected { core_id }) }
}

/// Bind the current thread if a non-negative core is configured.
///
/// `None` and negative ids mean "no affinity" and always succeed.
pub fn maybe_bind(core_id: Option<i32>) -> Result<(), AffinityError> {
    match core_id {
        Some(id) if id >= 0 => bind_to_core(id as usize),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_affinity_is_ok() {
        assert_eq!(maybe_bind(None), Ok(()));
        assert_eq!(maybe_bind(Some(-1)), Ok(()));
    }

    #[test]
    fn out_of_range_core_is_reported() {
        let err = bind_to_core(usize::MAX).unwrap_err();
        assert!(matches!(err, AffinityError::Unavailable { core_id: usize::MAX, .. }));
        assert!(err.to_string().contains("not available"));
        assert_eq!(AffinityError::Rejected { core_id: 3 }.to_string(), "failed to bind thread to CPU core 3");
    }
}
