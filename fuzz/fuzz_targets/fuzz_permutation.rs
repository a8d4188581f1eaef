#![no_main]

use libfuzzer_sys::fuzz_target;
use tpose_opt::Permutation;

fuzz_target!(|data: &[u8]| {
    let axes: Vec<i64> = data.iter().map(|&b| i64::from(b as i8)).collect();
    // Arbitrary axis lists must be rejected, never panic.
    let Ok(perm) = Permutation::from_i64(&axes) else {
        return;
    };
    let round_trip = perm.clone().inverted().inverted();
    assert_eq!(round_trip, perm);
    let composed = perm.apply(perm.inverse_slice());
    assert!(composed.iter().enumerate().all(|(i, &axis)| i == axis));
});
