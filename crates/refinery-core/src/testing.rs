//! Mock implementations of the engine's injectable ports, gated behind the
//! `testing` feature, so downstream crates can stub the engine's randomness
//! without depending on its internals.

use crate::rng::RandomSource;
use mockall::mock;

mock! {
    pub RandomSource {}

    impl RandomSource for RandomSource {
        fn uniform_range(&mut self, min: f64, max: f64) -> f64;
        fn choose_index(&mut self, len: usize) -> usize;
    }
}
