//! Program derived address search.
//!
//! Pure functions of (seeds, program id); no shared state. Results match the
//! runtime's `create_program_address` / `find_program_address` byte for byte.

use sha2::{Digest, Sha256};
use solana_program::pubkey::Pubkey;

use crate::constants::{MAX_SEEDS, MAX_SEED_LEN, PDA_MARKER};
use crate::error::ResolveError;

/// `sha256(seeds ‖ program_id ‖ "ProgramDerivedAddress")`, accepted only off the curve.
pub fn create_program_address(
    seeds: &[&[u8]],
    program_id: &Pubkey,
) -> Result<Pubkey, ResolveError> {
    if seeds.len() > MAX_SEEDS || seeds.iter().any(|seed| seed.len() > MAX_SEED_LEN) {
        return Err(ResolveError::MaxSeedLengthExceeded);
    }

    let mut hasher = Sha256::new();
    for seed in seeds {
        hasher.update(seed);
    }
    hasher.update(program_id.as_ref());
    hasher.update(PDA_MARKER);
    let address = Pubkey::new_from_array(hasher.finalize().into());

    if address.is_on_curve() {
        return Err(ResolveError::AddressDerivationExhausted);
    }
    Ok(address)
}

/// Try bumps 255 down to 0 and return the first off-curve address.
pub fn find_program_address(
    seeds: &[&[u8]],
    program_id: &Pubkey,
) -> Result<(Pubkey, u8), ResolveError> {
    // The bump occupies one seed slot.
    if seeds.len() >= MAX_SEEDS {
        return Err(ResolveError::MaxSeedLengthExceeded);
    }

    for bump in (0..=u8::MAX).rev() {
        let bump_seed = [bump];
        let mut candidate: Vec<&[u8]> = Vec::with_capacity(seeds.len() + 1);
        candidate.extend_from_slice(seeds);
        candidate.push(&bump_seed);

        match create_program_address(&candidate, program_id) {
            Ok(address) => return Ok((address, bump)),
            Err(ResolveError::AddressDerivationExhausted) => continue,
            Err(e) => return Err(e),
        }
    }
    Err(ResolveError::AddressDerivationExhausted)
}
