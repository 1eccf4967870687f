//! Contract tests: the operators must actually verify the invariants they
//! depend on while doing real work.

use crabblur::invariant_ppt::{clear_invariant_log, contract_test, invariant_check_count};
use crabblur::ops::{gaussian_blur, gaussian_kernel_1d, stitch_images, StitchOptions};
use crabblur::testing::{checkerboard, gradient};

const KERNEL_SUMS_TO_ONE: &str = "Gaussian kernel weights must sum to one";
const BUFFER_LENGTH: &str = "Buffer length must equal width * height * channels";

#[test]
fn contract_gaussian_blur() {
    clear_invariant_log();
    let src = checkerboard(16, 16, 2);
    let mut dst = src.clone();
    gaussian_blur(&src, &mut dst, 1.5).unwrap();

    contract_test("gaussian_blur", &[KERNEL_SUMS_TO_ONE, BUFFER_LENGTH]);
}

#[test]
fn contract_kernel_for_many_sigmas() {
    clear_invariant_log();
    for sigma in [0.1, 0.5, 1.0, 3.3, 10.0] {
        let kernel = gaussian_kernel_1d(sigma);
        assert_eq!(kernel.len() % 2, 1);
    }
    assert_eq!(invariant_check_count(KERNEL_SUMS_TO_ONE), 5);
}

#[test]
fn contract_stitch() {
    clear_invariant_log();
    let tiles = vec![gradient(5, 3), gradient(5, 3)];
    let options = StitchOptions {
        overlap: 1,
        ..StitchOptions::default()
    };
    stitch_images(&tiles, &options).unwrap();

    contract_test("stitch", &[BUFFER_LENGTH]);
}
