use crate::{core::error::AtopError, logs::stats::AcceleratorCounts};

/// Hardware perf counters for the driver named `driver`.
///
/// No counter backend exists for any supported driver yet.
pub fn perf(driver: &str) -> Result<AcceleratorCounts, AtopError> {
    Err(AtopError::NotImplemented {
        what: format!("perf counters for driver '{driver}'"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_perf_is_not_implemented() {
        let err = perf("kgsl").unwrap_err();
        assert!(matches!(err, AtopError::NotImplemented { .. }));
        assert_eq!(
            err.to_string(),
            "perf counters for driver 'kgsl' is not implemented"
        );
    }
}
