//! Extra account meta entries — one 35-byte record per required account.
//!
//! Record layout:
//!   0      discriminator
//!   1..33  address config
//!   33     is_signer
//!   34     is_writable
//!
//! Discriminator values:
//!   0        literal address
//!   1        PDA of the gating program
//!   2        address read from instruction or account data
//!   128 + i  PDA of the program at account index `i`

use bytemuck::{Pod, Zeroable};
use solana_program::pubkey::Pubkey;

use crate::constants::*;
use crate::error::ResolveError;
use crate::meta::AccountRole;
use crate::seeds::{pack_address_config, unpack_address_config, SeedConfig};

// ── Packed Record ───────────────────────────────────────────────────────────

/// Zero-copy view of one packed entry.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Pod, Zeroable)]
pub struct PodExtraAccountMeta {
    pub discriminator: u8,
    pub address_config: [u8; ADDRESS_CONFIG_SIZE],
    pub is_signer: u8,
    pub is_writable: u8,
}

// ── Address Configs ─────────────────────────────────────────────────────────

/// Where a 32-byte address is read from for `AddressConfig::KeyFromData`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum KeyDataConfig {
    /// `instruction_data[offset..offset + 32]`.
    InstructionArg { offset: u8 },
    /// `data[data_offset..data_offset + 32]` of an already-known account.
    AccountData { account_index: u8, data_offset: u8 },
}

/// How an entry's address is obtained.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum AddressConfig {
    LiteralAddress(Pubkey),
    /// PDA under the program that owns the descriptor.
    SelfProgramSeeds(Vec<SeedConfig>),
    /// PDA under the program found at `program_index` in the known accounts.
    ExternalProgramSeeds {
        program_index: u8,
        seeds: Vec<SeedConfig>,
    },
    KeyFromData(KeyDataConfig),
}

/// A decoded entry: address config plus the role flags of the resolved account.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ExtraAccountMetaEntry {
    pub address_config: AddressConfig,
    pub is_signer: bool,
    pub is_writable: bool,
}

impl ExtraAccountMetaEntry {
    pub fn new_with_pubkey(pubkey: &Pubkey, is_signer: bool, is_writable: bool) -> Self {
        Self {
            address_config: AddressConfig::LiteralAddress(*pubkey),
            is_signer,
            is_writable,
        }
    }

    pub fn new_with_seeds(
        seeds: &[SeedConfig],
        is_signer: bool,
        is_writable: bool,
    ) -> Result<Self, ResolveError> {
        pack_address_config(seeds)?;
        Ok(Self {
            address_config: AddressConfig::SelfProgramSeeds(seeds.to_vec()),
            is_signer,
            is_writable,
        })
    }

    pub fn new_external_pda_with_seeds(
        program_index: u8,
        seeds: &[SeedConfig],
        is_signer: bool,
        is_writable: bool,
    ) -> Result<Self, ResolveError> {
        if program_index >= ENTRY_EXTERNAL_PROGRAM_BASE {
            return Err(ResolveError::MalformedExtraMetas(
                "external program index out of range",
            ));
        }
        pack_address_config(seeds)?;
        Ok(Self {
            address_config: AddressConfig::ExternalProgramSeeds {
                program_index,
                seeds: seeds.to_vec(),
            },
            is_signer,
            is_writable,
        })
    }

    pub fn new_with_key_data(key_data: KeyDataConfig, is_signer: bool, is_writable: bool) -> Self {
        Self {
            address_config: AddressConfig::KeyFromData(key_data),
            is_signer,
            is_writable,
        }
    }

    pub fn role(&self) -> AccountRole {
        AccountRole::from_flags(self.is_signer, self.is_writable)
    }

    /// Seeds carried by this entry; empty for literal and key-from-data entries.
    pub fn seeds(&self) -> &[SeedConfig] {
        match &self.address_config {
            AddressConfig::SelfProgramSeeds(seeds)
            | AddressConfig::ExternalProgramSeeds { seeds, .. } => seeds,
            AddressConfig::LiteralAddress(_) | AddressConfig::KeyFromData(_) => &[],
        }
    }

    /// Indices of the accounts whose data this entry reads.
    pub fn data_account_indices(&self) -> Vec<u8> {
        match &self.address_config {
            AddressConfig::KeyFromData(KeyDataConfig::AccountData { account_index, .. }) => {
                vec![*account_index]
            }
            _ => self
                .seeds()
                .iter()
                .filter_map(|seed| match seed {
                    SeedConfig::AccountData { account_index, .. } => Some(*account_index),
                    _ => None,
                })
                .collect(),
        }
    }

    pub fn pack(&self) -> Result<PodExtraAccountMeta, ResolveError> {
        let (discriminator, address_config) = match &self.address_config {
            AddressConfig::LiteralAddress(pubkey) => (ENTRY_LITERAL_ADDRESS, pubkey.to_bytes()),
            AddressConfig::SelfProgramSeeds(seeds) => {
                (ENTRY_SELF_PROGRAM_SEEDS, pack_address_config(seeds)?)
            }
            AddressConfig::ExternalProgramSeeds {
                program_index,
                seeds,
            } => {
                let discriminator = ENTRY_EXTERNAL_PROGRAM_BASE
                    .checked_add(*program_index)
                    .ok_or(ResolveError::MalformedExtraMetas(
                        "external program index out of range",
                    ))?;
                (discriminator, pack_address_config(seeds)?)
            }
            AddressConfig::KeyFromData(key_data) => {
                (ENTRY_KEY_FROM_DATA, pack_key_data_config(key_data))
            }
        };
        Ok(PodExtraAccountMeta {
            discriminator,
            address_config,
            is_signer: self.is_signer as u8,
            is_writable: self.is_writable as u8,
        })
    }

    pub fn unpack(pod: &PodExtraAccountMeta) -> Result<Self, ResolveError> {
        let address_config = match pod.discriminator {
            ENTRY_LITERAL_ADDRESS => {
                AddressConfig::LiteralAddress(Pubkey::new_from_array(pod.address_config))
            }
            ENTRY_SELF_PROGRAM_SEEDS => {
                AddressConfig::SelfProgramSeeds(unpack_address_config(&pod.address_config)?)
            }
            ENTRY_KEY_FROM_DATA => {
                AddressConfig::KeyFromData(unpack_key_data_config(&pod.address_config)?)
            }
            d if d >= ENTRY_EXTERNAL_PROGRAM_BASE => AddressConfig::ExternalProgramSeeds {
                program_index: d - ENTRY_EXTERNAL_PROGRAM_BASE,
                seeds: unpack_address_config(&pod.address_config)?,
            },
            _ => {
                return Err(ResolveError::MalformedExtraMetas(
                    "unknown address config discriminator",
                ))
            }
        };
        Ok(Self {
            address_config,
            is_signer: pod.is_signer != 0,
            is_writable: pod.is_writable != 0,
        })
    }
}

// ── Key-From-Data Codec ─────────────────────────────────────────────────────

fn pack_key_data_config(key_data: &KeyDataConfig) -> [u8; ADDRESS_CONFIG_SIZE] {
    let mut config = [0u8; ADDRESS_CONFIG_SIZE];
    match key_data {
        KeyDataConfig::InstructionArg { offset } => {
            config[..2].copy_from_slice(&[KEY_DATA_INSTRUCTION_ARG, *offset]);
        }
        KeyDataConfig::AccountData {
            account_index,
            data_offset,
        } => {
            config[..3].copy_from_slice(&[KEY_DATA_ACCOUNT_DATA, *account_index, *data_offset]);
        }
    }
    config
}

fn unpack_key_data_config(
    config: &[u8; ADDRESS_CONFIG_SIZE],
) -> Result<KeyDataConfig, ResolveError> {
    match config[0] {
        KEY_DATA_INSTRUCTION_ARG => Ok(KeyDataConfig::InstructionArg { offset: config[1] }),
        KEY_DATA_ACCOUNT_DATA => Ok(KeyDataConfig::AccountData {
            account_index: config[1],
            data_offset: config[2],
        }),
        _ => Err(ResolveError::MalformedExtraMetas("unknown key data tag")),
    }
}
