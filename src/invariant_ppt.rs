//! Runtime invariant tracking for image operators.
//!
//! Operators call [`assert_invariant!`] on the properties they rely on (buffer
//! length matches the declared shape, kernel weights sum to one). Every check
//! is recorded per thread so a test can later assert with [`contract_test`]
//! that the operators it exercised actually verified their contracts.
//!
//! ```rust,ignore
//! use crabblur::invariant_ppt::contract_test;
//!
//! #[test]
//! fn contract_blur() {
//!     let _ = crabblur::ops::blur::gaussian_blur(&src, &mut dst, 1.0);
//!     contract_test("blur", &["Gaussian kernel weights must sum to one"]);
//! }
//! ```

use std::cell::RefCell;
use std::collections::HashMap;
use std::thread_local;

thread_local! {
    static INVARIANT_LOG: RefCell<HashMap<String, u64>> = RefCell::new(HashMap::new());
}

/// Assert an invariant and record that it was checked.
///
/// # Panics
/// Panics if the condition is false. Only use this for internal
/// consistency, never for validating caller input.
#[macro_export]
macro_rules! assert_invariant {
    ($condition:expr, $message:expr) => {
        $crate::invariant_ppt::__assert_invariant_impl($condition, $message, None)
    };
    ($condition:expr, $message:expr, $context:expr) => {
        $crate::invariant_ppt::__assert_invariant_impl($condition, $message, Some($context))
    };
}

#[doc(hidden)]
pub fn __assert_invariant_impl(condition: bool, message: &str, context: Option<&str>) {
    INVARIANT_LOG.with(|log| {
        *log.borrow_mut().entry(message.to_string()).or_insert(0) += 1;
    });

    if !condition {
        let ctx = context.unwrap_or("unknown");
        panic!("INVARIANT VIOLATION [{}]: {}", ctx, message);
    }
}

/// Number of times the given invariant was checked on this thread.
pub fn invariant_check_count(message: &str) -> u64 {
    INVARIANT_LOG.with(|log| log.borrow().get(message).copied().unwrap_or(0))
}

/// Verify that every listed invariant was checked at least once.
///
/// # Panics
/// Panics listing the invariants that were never checked.
pub fn contract_test(test_name: &str, required_invariants: &[&str]) {
    let missing: Vec<&str> = required_invariants
        .iter()
        .copied()
        .filter(|invariant| invariant_check_count(invariant) == 0)
        .collect();

    if !missing.is_empty() {
        panic!(
            "CONTRACT FAILURE [{}]: The following invariants were not checked:\n  - {}",
            test_name,
            missing.join("\n  - ")
        );
    }
}

pub fn clear_invariant_log() {
    INVARIANT_LOG.with(|log| log.borrow_mut().clear());
}
