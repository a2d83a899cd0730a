//! Wire-format sizes, tags, and discriminators for extra account meta lists.

// ── TLV Layout ──────────────────────────────────────────────────────────────

/// Width of a TLV type tag (and of an instruction discriminator).
pub const DISCRIMINATOR_LENGTH: usize = 8;

/// Width of the little-endian TLV value-length field.
pub const TLV_LENGTH_SIZE: usize = 4;

/// Type tag + length field.
pub const TLV_HEADER_SIZE: usize = DISCRIMINATOR_LENGTH + TLV_LENGTH_SIZE;

/// Width of the little-endian entry count that opens every list value.
pub const LIST_COUNT_SIZE: usize = 4;

/// Packed size of one entry: discriminator + address config + signer + writable.
pub const EXTRA_ACCOUNT_META_SIZE: usize = 1 + ADDRESS_CONFIG_SIZE + 1 + 1;

/// Width of the address config carried by every entry.
pub const ADDRESS_CONFIG_SIZE: usize = 32;

/// Upper bound on entries in a single list.
pub const MAX_EXTRA_ACCOUNT_METAS: usize = 32;

// ── Entry Discriminators ────────────────────────────────────────────────────

pub const ENTRY_LITERAL_ADDRESS: u8 = 0;
pub const ENTRY_SELF_PROGRAM_SEEDS: u8 = 1;
pub const ENTRY_KEY_FROM_DATA: u8 = 2;
/// `ENTRY_EXTERNAL_PROGRAM_BASE + i` derives under the program at account index `i`.
pub const ENTRY_EXTERNAL_PROGRAM_BASE: u8 = 1 << 7;

// ── Seed Tags ───────────────────────────────────────────────────────────────

pub const SEED_UNINITIALIZED: u8 = 0;
pub const SEED_LITERAL: u8 = 1;
pub const SEED_INSTRUCTION_ARG: u8 = 2;
pub const SEED_ACCOUNT_KEY: u8 = 3;
pub const SEED_ACCOUNT_DATA: u8 = 4;

/// A literal seed carries its tag and length byte inside the 32-byte config.
pub const MAX_LITERAL_SEED_LEN: usize = ADDRESS_CONFIG_SIZE - 2;

// Key-from-data tags
pub const KEY_DATA_INSTRUCTION_ARG: u8 = 1;
pub const KEY_DATA_ACCOUNT_DATA: u8 = 2;

// ── Program Derived Addresses ───────────────────────────────────────────────

/// Domain separator appended after the program id when hashing PDA candidates.
pub const PDA_MARKER: &[u8] = b"ProgramDerivedAddress";

/// Max seeds per derivation, bump included.
pub const MAX_SEEDS: usize = 16;

/// Max length of a single seed.
pub const MAX_SEED_LEN: usize = 32;

// ── Gating Instruction Discriminators ───────────────────────────────────────

pub const CAN_THAW_PERMISSIONLESS_HASH_INPUT: &str =
    "efficient-allow-block-list-standard:can-thaw-permissionless";
pub const CAN_FREEZE_PERMISSIONLESS_HASH_INPUT: &str =
    "efficient-allow-block-list-standard:can-freeze-permissionless";

/// First 8 bytes of `sha256(CAN_THAW_PERMISSIONLESS_HASH_INPUT)`.
pub const CAN_THAW_PERMISSIONLESS_DISCRIMINATOR: [u8; DISCRIMINATOR_LENGTH] =
    [8, 175, 169, 129, 137, 74, 61, 241];

/// First 8 bytes of `sha256(CAN_FREEZE_PERMISSIONLESS_HASH_INPUT)`.
pub const CAN_FREEZE_PERMISSIONLESS_DISCRIMINATOR: [u8; DISCRIMINATOR_LENGTH] =
    [214, 141, 109, 75, 248, 1, 45, 29];
