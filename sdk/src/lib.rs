//! Freeze Gate SDK — resolves the extra accounts a gating program requires for
//! permissionless freeze and thaw of token accounts.
//!
//! The gating program publishes a descriptor account holding a TLV-encoded list
//! of extra account metas, one list per instruction type. Resolving a list
//! walks its entries in order, turning each into a concrete address from
//! literal keys, instruction data, earlier accounts, or their on-chain data.

pub mod account;
pub mod constants;
pub mod context;
pub mod error;
pub mod fetch;
pub mod meta;
pub mod pda;
pub mod resolver;
pub mod rpc;
pub mod seeds;
pub mod tlv;

pub use account::{AddressConfig, ExtraAccountMetaEntry, KeyDataConfig, PodExtraAccountMeta};
pub use error::{ConfigError, FetchError, ResolveError};
pub use fetch::{AccountDataResult, AccountFetcher, MemoryAccountFetcher};
pub use meta::{
    add_extra_account_metas_to_instruction, resolve_extra_metas,
    resolve_extra_metas_with_discriminator, AccountRole, ResolvedAccountMeta,
};
pub use pda::{create_program_address, find_program_address};
pub use rpc::{RpcAccountFetcher, RpcFetchConfig};
pub use seeds::SeedConfig;
pub use tlv::{
    decode_extra_metas, hash_discriminator, CanFreezePermissionless, CanThawPermissionless,
    Discriminate, ExtraAccountMetaList,
};
