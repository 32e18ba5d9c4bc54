//! CPU core-set split between the application container and everything else.
//!
//! Pinning the service under test to its own cores keeps the load generator
//! and collector from stealing cycles and skewing the overhead comparison.
//! On an N-core machine the upper half goes to the application and the lower
//! half to the support containers, e.g. "3-5" and "0-2" on a 6-core box.

use std::thread;

/// Cpuset string for the service-under-test container.
pub fn application_cores() -> String {
    split(core_count()).0
}

/// Cpuset string for the load generator and collector containers.
pub fn non_application_cores() -> String {
    split(core_count()).1
}

fn core_count() -> usize {
    thread::available_parallelism().map(|n| n.get()).unwrap_or(1)
}

fn split(count: usize) -> (String, String) {
    if count < 2 {
        // Nothing to split; contention is unavoidable on a single core.
        return ("0".to_string(), "0".to_string());
    }
    let app = format!("{}-{}", count / 2, count - 1);
    let other = format!("0-{}", count / 2 - 1);
    (app, other)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_six_cores() {
        assert_eq!(split(6), ("3-5".to_string(), "0-2".to_string()));
    }

    #[test]
    fn test_split_two_cores() {
        assert_eq!(split(2), ("1-1".to_string(), "0-0".to_string()));
    }

    #[test]
    fn test_split_single_core() {
        assert_eq!(split(1), ("0".to_string(), "0".to_string()));
    }
}
