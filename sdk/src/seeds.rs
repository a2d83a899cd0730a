//! Seed configurations packed into an entry's 32-byte address config.
//!
//! Layout per seed (tag byte first):
//!   1 = Literal         `[1, len, bytes..]`
//!   2 = InstructionArg  `[2, offset, length]`
//!   3 = AccountKey      `[3, index]`
//!   4 = AccountData     `[4, account_index, data_offset, data_length]`
//!
//! A zero tag ends the list; everything after it is ignored.

use crate::constants::*;
use crate::error::ResolveError;

/// One component of an entry's seed sequence.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum SeedConfig {
    /// Raw bytes used verbatim.
    Literal { bytes: Vec<u8> },
    /// `instruction_data[offset..offset + length]`.
    InstructionArg { offset: u8, length: u8 },
    /// The address of an already-known account.
    AccountKey { index: u8 },
    /// `data[data_offset..data_offset + data_length]` of an already-known account.
    AccountData {
        account_index: u8,
        data_offset: u8,
        data_length: u8,
    },
}

impl SeedConfig {
    pub fn literal(bytes: &[u8]) -> Self {
        Self::Literal {
            bytes: bytes.to_vec(),
        }
    }

    pub fn tag(&self) -> u8 {
        match self {
            Self::Literal { .. } => SEED_LITERAL,
            Self::InstructionArg { .. } => SEED_INSTRUCTION_ARG,
            Self::AccountKey { .. } => SEED_ACCOUNT_KEY,
            Self::AccountData { .. } => SEED_ACCOUNT_DATA,
        }
    }

    /// Bytes this seed occupies inside an address config, tag included.
    pub fn packed_len(&self) -> usize {
        match self {
            Self::Literal { bytes } => 2 + bytes.len(),
            Self::InstructionArg { .. } => 3,
            Self::AccountKey { .. } => 2,
            Self::AccountData { .. } => 4,
        }
    }

    fn pack_into(&self, out: &mut Vec<u8>) -> Result<(), ResolveError> {
        out.push(self.tag());
        match self {
            Self::Literal { bytes } => {
                if bytes.len() > MAX_LITERAL_SEED_LEN {
                    return Err(ResolveError::MalformedExtraMetas("literal seed too long"));
                }
                out.push(bytes.len() as u8);
                out.extend_from_slice(bytes);
            }
            Self::InstructionArg { offset, length } => out.extend_from_slice(&[*offset, *length]),
            Self::AccountKey { index } => out.push(*index),
            Self::AccountData {
                account_index,
                data_offset,
                data_length,
            } => out.extend_from_slice(&[*account_index, *data_offset, *data_length]),
        }
        Ok(())
    }
}

/// Pack seeds into a zero-filled address config.
pub fn pack_address_config(
    seeds: &[SeedConfig],
) -> Result<[u8; ADDRESS_CONFIG_SIZE], ResolveError> {
    let mut packed = Vec::with_capacity(ADDRESS_CONFIG_SIZE);
    for seed in seeds {
        seed.pack_into(&mut packed)?;
    }
    if packed.len() > ADDRESS_CONFIG_SIZE {
        return Err(ResolveError::MalformedExtraMetas(
            "seed configs exceed the address config",
        ));
    }
    let mut config = [0u8; ADDRESS_CONFIG_SIZE];
    config[..packed.len()].copy_from_slice(&packed);
    Ok(config)
}

/// Unpack seeds from an address config, stopping at the first zero tag.
pub fn unpack_address_config(
    config: &[u8; ADDRESS_CONFIG_SIZE],
) -> Result<Vec<SeedConfig>, ResolveError> {
    let mut seeds = Vec::new();
    let mut rest: &[u8] = config;

    while let Some((&tag, payload)) = rest.split_first() {
        let (seed, consumed) = match tag {
            SEED_UNINITIALIZED => break,
            SEED_LITERAL => {
                let (&len, tail) = payload
                    .split_first()
                    .ok_or(ResolveError::MalformedExtraMetas("literal seed missing length"))?;
                let bytes = tail
                    .get(..len as usize)
                    .ok_or(ResolveError::MalformedExtraMetas("literal seed truncated"))?;
                (SeedConfig::literal(bytes), 1 + len as usize)
            }
            SEED_INSTRUCTION_ARG => {
                let [offset, length] = take::<2>(payload)?;
                (SeedConfig::InstructionArg { offset, length }, 2)
            }
            SEED_ACCOUNT_KEY => {
                let [index] = take::<1>(payload)?;
                (SeedConfig::AccountKey { index }, 1)
            }
            SEED_ACCOUNT_DATA => {
                let [account_index, data_offset, data_length] = take::<3>(payload)?;
                (
                    SeedConfig::AccountData {
                        account_index,
                        data_offset,
                        data_length,
                    },
                    3,
                )
            }
            _ => return Err(ResolveError::MalformedExtraMetas("unknown seed tag")),
        };
        seeds.push(seed);
        rest = &payload[consumed..];
    }

    Ok(seeds)
}

fn take<const N: usize>(payload: &[u8]) -> Result<[u8; N], ResolveError> {
    payload
        .get(..N)
        .and_then(|bytes| <[u8; N]>::try_from(bytes).ok())
        .ok_or(ResolveError::MalformedExtraMetas("seed config truncated"))
}
