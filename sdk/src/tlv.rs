//! TLV codec for the descriptor account published by a gating program.
//!
//! Account layout (possibly several records, zero padding after the last):
//!   [type: 8][length: u32 LE][value: length bytes]
//!
//! List value:
//!   [count: u32 LE][count × 35-byte entry]

use sha2::{Digest, Sha256};

use crate::account::{ExtraAccountMetaEntry, PodExtraAccountMeta};
use crate::constants::*;
use crate::error::ResolveError;

// ── Type Tags ───────────────────────────────────────────────────────────────

/// Types that carry the 8-byte tag of the TLV record they own.
pub trait Discriminate {
    const DISCRIMINATOR: [u8; DISCRIMINATOR_LENGTH];
}

/// Gating instruction invoked before a permissionless thaw.
pub struct CanThawPermissionless;

impl Discriminate for CanThawPermissionless {
    const DISCRIMINATOR: [u8; DISCRIMINATOR_LENGTH] = CAN_THAW_PERMISSIONLESS_DISCRIMINATOR;
}

/// Gating instruction invoked before a permissionless freeze.
pub struct CanFreezePermissionless;

impl Discriminate for CanFreezePermissionless {
    const DISCRIMINATOR: [u8; DISCRIMINATOR_LENGTH] = CAN_FREEZE_PERMISSIONLESS_DISCRIMINATOR;
}

/// First 8 bytes of `sha256(input)`.
pub fn hash_discriminator(input: &str) -> [u8; DISCRIMINATOR_LENGTH] {
    let digest = Sha256::digest(input.as_bytes());
    let mut out = [0u8; DISCRIMINATOR_LENGTH];
    out.copy_from_slice(&digest[..DISCRIMINATOR_LENGTH]);
    out
}

// ── Extra Account Meta List ─────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExtraAccountMetaList {
    pub discriminator: [u8; DISCRIMINATOR_LENGTH],
    pub entries: Vec<ExtraAccountMetaEntry>,
}

impl ExtraAccountMetaList {
    pub fn new(
        discriminator: [u8; DISCRIMINATOR_LENGTH],
        entries: Vec<ExtraAccountMetaEntry>,
    ) -> Result<Self, ResolveError> {
        if entries.len() > MAX_EXTRA_ACCOUNT_METAS {
            return Err(ResolveError::MalformedExtraMetas("too many extra account metas"));
        }
        Ok(Self {
            discriminator,
            entries,
        })
    }

    /// Length of the list value for `count` entries.
    pub fn value_len(count: usize) -> usize {
        LIST_COUNT_SIZE + count * EXTRA_ACCOUNT_META_SIZE
    }

    /// Account size needed to hold a single list of `count` entries.
    pub fn size_of(count: usize) -> usize {
        TLV_HEADER_SIZE + Self::value_len(count)
    }

    /// The TLV length field written for this list.
    pub fn length(&self) -> u32 {
        Self::value_len(self.entries.len()) as u32
    }

    pub fn count(&self) -> usize {
        self.entries.len()
    }

    pub fn pack(&self) -> Result<Vec<u8>, ResolveError> {
        if self.entries.len() > MAX_EXTRA_ACCOUNT_METAS {
            return Err(ResolveError::MalformedExtraMetas("too many extra account metas"));
        }
        let mut data = Vec::with_capacity(Self::size_of(self.entries.len()));
        data.extend_from_slice(&self.discriminator);
        data.extend_from_slice(&self.length().to_le_bytes());
        data.extend_from_slice(&(self.entries.len() as u32).to_le_bytes());
        for entry in &self.entries {
            data.extend_from_slice(bytemuck::bytes_of(&entry.pack()?));
        }
        Ok(data)
    }

    /// Find and decode the record tagged `discriminator`.
    ///
    /// An all-zero tag ends the record walk. Any record whose header or value
    /// runs past the account data, or a missing record, is malformed.
    pub fn unpack(
        data: &[u8],
        discriminator: &[u8; DISCRIMINATOR_LENGTH],
    ) -> Result<Self, ResolveError> {
        let mut offset = 0usize;

        while offset < data.len() {
            let rest = &data[offset..];
            if rest.iter().take(DISCRIMINATOR_LENGTH).all(|b| *b == 0) {
                break;
            }

            let header = rest
                .get(..TLV_HEADER_SIZE)
                .ok_or(ResolveError::MalformedExtraMetas("truncated TLV header"))?;
            let (tag, length) = header.split_at(DISCRIMINATOR_LENGTH);
            let length = read_u32(length)? as usize;

            let value = rest
                .get(TLV_HEADER_SIZE..TLV_HEADER_SIZE + length)
                .ok_or(ResolveError::MalformedExtraMetas(
                    "declared length exceeds account data",
                ))?;

            if tag == discriminator {
                return Self::unpack_value(*discriminator, value);
            }
            offset += TLV_HEADER_SIZE + length;
        }

        Err(ResolveError::MalformedExtraMetas(
            "no extra account metas for this instruction",
        ))
    }

    fn unpack_value(
        discriminator: [u8; DISCRIMINATOR_LENGTH],
        value: &[u8],
    ) -> Result<Self, ResolveError> {
        let count = value
            .get(..LIST_COUNT_SIZE)
            .ok_or(ResolveError::MalformedExtraMetas("missing entry count"))
            .and_then(read_u32)? as usize;
        if count > MAX_EXTRA_ACCOUNT_METAS {
            return Err(ResolveError::MalformedExtraMetas("too many extra account metas"));
        }
        if value.len() != Self::value_len(count) {
            return Err(ResolveError::MalformedExtraMetas(
                "declared length does not match entry count",
            ));
        }

        let pods: &[PodExtraAccountMeta] = bytemuck::try_cast_slice(&value[LIST_COUNT_SIZE..])
            .map_err(|_| ResolveError::MalformedExtraMetas("invalid entry records"))?;
        let entries = pods
            .iter()
            .map(ExtraAccountMetaEntry::unpack)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            discriminator,
            entries,
        })
    }
}

/// Entries for `discriminator` from a descriptor account.
///
/// A missing account means the gating program requires no extra accounts.
pub fn decode_extra_metas(
    account_data: Option<&[u8]>,
    discriminator: &[u8; DISCRIMINATOR_LENGTH],
) -> Result<Vec<ExtraAccountMetaEntry>, ResolveError> {
    match account_data {
        None => Ok(Vec::new()),
        Some(data) => Ok(ExtraAccountMetaList::unpack(data, discriminator)?.entries),
    }
}

fn read_u32(bytes: &[u8]) -> Result<u32, ResolveError> {
    <[u8; 4]>::try_from(bytes)
        .map(u32::from_le_bytes)
        .map_err(|_| ResolveError::MalformedExtraMetas("truncated length field"))
}
