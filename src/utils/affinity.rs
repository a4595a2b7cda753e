// ============================================================================
// CPU Affinity
// Keeps an engine worker on one core so its book stays cache-hot
// ============================================================================

/// Pin the current thread to a specific CPU core.
///
/// Returns `false` when the core does not exist or the OS refused.
#[cfg(feature = "numa")]
pub fn pin_current_thread_to_core(core_id: usize) -> bool {
    core_affinity::get_core_ids()
        .unwrap_or_default()
        .into_iter()
        .find(|id| id.id == core_id)
        .map(core_affinity::set_for_current)
        .unwrap_or(false)
}

/// All core IDs usable for pinning
#[cfg(feature = "numa")]
pub fn available_cores() -> Vec<usize> {
    core_affinity::get_core_ids()
        .unwrap_or_default()
        .into_iter()
        .map(|id| id.id)
        .collect()
}

/// No-op without the `numa` feature.
#[cfg(not(feature = "numa"))]
pub fn pin_current_thread_to_core(_core_id: usize) -> bool {
    false
}

#[cfg(not(feature = "numa"))]
pub fn available_cores() -> Vec<usize> {
    let cpus = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    (0..cpus).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_available_cores_not_empty() {
        assert!(!available_cores().is_empty());
    }

    #[test]
    fn test_pin_to_missing_core_fails() {
        assert!(!pin_current_thread_to_core(usize::MAX));
    }
}
