//! Round pairing: shuffle ready players, pair them off consecutively

use rand::seq::SliceRandom;
use rand::Rng;

use crate::core::types::OwnerId;

/// Shuffle `ready` and pair neighbours as (bottom, top). An odd player out sits the round out.
pub fn make_pairs<R: Rng + ?Sized>(ready: &[OwnerId], rng: &mut R) -> Vec<(OwnerId, OwnerId)> {
    let mut ids = ready.to_vec();
    ids.shuffle(rng);
    ids.chunks_exact(2).map(|pair| (pair[0], pair[1])).collect()
}
