//! Meta assembler — base accounts followed by every resolved extra account.
//!
//! Entry point for callers building a gated freeze/thaw:
//!
//!   1. Build the gating instruction's base accounts and payload.
//!   2. `resolve_extra_metas::<CanThawPermissionless, _>(fetcher, descriptor, base, data, gating_program)`
//!   3. Append everything after the base accounts to the outer instruction.

use solana_program::{
    instruction::{AccountMeta, Instruction},
    pubkey::Pubkey,
};
use tracing::debug;

use crate::account::ExtraAccountMetaEntry;
use crate::constants::DISCRIMINATOR_LENGTH;
use crate::context::ResolutionContext;
use crate::error::ResolveError;
use crate::fetch::AccountFetcher;
use crate::tlv::{decode_extra_metas, Discriminate};

// ── Roles ───────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AccountRole {
    Readonly,
    Writable,
    ReadonlySigner,
    WritableSigner,
}

impl AccountRole {
    pub fn from_flags(is_signer: bool, is_writable: bool) -> Self {
        match (is_signer, is_writable) {
            (false, false) => Self::Readonly,
            (false, true) => Self::Writable,
            (true, false) => Self::ReadonlySigner,
            (true, true) => Self::WritableSigner,
        }
    }

    pub fn is_signer(self) -> bool {
        matches!(self, Self::ReadonlySigner | Self::WritableSigner)
    }

    pub fn is_writable(self) -> bool {
        matches!(self, Self::Writable | Self::WritableSigner)
    }
}

/// An address together with the privileges it is passed with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ResolvedAccountMeta {
    pub address: Pubkey,
    pub role: AccountRole,
}

impl ResolvedAccountMeta {
    pub fn new(address: Pubkey, role: AccountRole) -> Self {
        Self { address, role }
    }

    pub fn readonly(address: Pubkey) -> Self {
        Self::new(address, AccountRole::Readonly)
    }

    pub fn writable(address: Pubkey) -> Self {
        Self::new(address, AccountRole::Writable)
    }
}

impl From<ResolvedAccountMeta> for AccountMeta {
    fn from(meta: ResolvedAccountMeta) -> Self {
        AccountMeta {
            pubkey: meta.address,
            is_signer: meta.role.is_signer(),
            is_writable: meta.role.is_writable(),
        }
    }
}

impl From<&AccountMeta> for ResolvedAccountMeta {
    fn from(meta: &AccountMeta) -> Self {
        Self::new(
            meta.pubkey,
            AccountRole::from_flags(meta.is_signer, meta.is_writable),
        )
    }
}

// ── Resolution ──────────────────────────────────────────────────────────────

/// Resolve the extra accounts listed under `T`'s record in the descriptor account.
///
/// Returns `base_metas` followed by one meta per entry, in descriptor order.
/// A missing descriptor account yields `base_metas` unchanged.
///
/// # Errors
/// Whatever the decoder, resolver, deriver, or fetch port reports; the call
/// stops at the first error.
pub async fn resolve_extra_metas<T: Discriminate, F: AccountFetcher>(
    fetcher: &F,
    descriptor_address: &Pubkey,
    base_metas: &[ResolvedAccountMeta],
    instruction_data: &[u8],
    program_id: &Pubkey,
) -> Result<Vec<ResolvedAccountMeta>, ResolveError> {
    resolve_extra_metas_with_discriminator(
        fetcher,
        &T::DISCRIMINATOR,
        descriptor_address,
        base_metas,
        instruction_data,
        program_id,
    )
    .await
}

/// `resolve_extra_metas` with an explicit TLV type tag.
pub async fn resolve_extra_metas_with_discriminator<F: AccountFetcher>(
    fetcher: &F,
    discriminator: &[u8; DISCRIMINATOR_LENGTH],
    descriptor_address: &Pubkey,
    base_metas: &[ResolvedAccountMeta],
    instruction_data: &[u8],
    program_id: &Pubkey,
) -> Result<Vec<ResolvedAccountMeta>, ResolveError> {
    let mut context = ResolutionContext::new(fetcher, base_metas, instruction_data, program_id);

    let descriptor = context.cache.get(descriptor_address).await?;
    if descriptor.is_none() {
        debug!(%descriptor_address, "no descriptor account, no extra accounts required");
    }
    let entries = decode_extra_metas(descriptor, discriminator)?;
    debug!(%descriptor_address, entries = entries.len(), "decoded extra account metas");

    prefetch_independent(&mut context, &entries).await?;

    for entry in &entries {
        context.resolve_entry(entry).await?;
    }

    Ok(context.into_metas())
}

/// Resolve against an instruction's own accounts, data, and program, then
/// append the extra accounts to it.
pub async fn add_extra_account_metas_to_instruction<T: Discriminate, F: AccountFetcher>(
    instruction: &mut Instruction,
    fetcher: &F,
    descriptor_address: &Pubkey,
) -> Result<(), ResolveError> {
    let base_metas: Vec<ResolvedAccountMeta> =
        instruction.accounts.iter().map(Into::into).collect();

    let resolved = resolve_extra_metas::<T, F>(
        fetcher,
        descriptor_address,
        &base_metas,
        &instruction.data,
        &instruction.program_id,
    )
    .await?;

    instruction.accounts.extend(
        resolved
            .into_iter()
            .skip(base_metas.len())
            .map(AccountMeta::from),
    );
    Ok(())
}

/// Data accounts that sit among the base accounts have no dependency on any
/// entry, so they can be fetched together before the ordered pass.
async fn prefetch_independent<F: AccountFetcher>(
    context: &mut ResolutionContext<'_, F>,
    entries: &[ExtraAccountMetaEntry],
) -> Result<(), ResolveError> {
    let base_len = context.known.len();
    let addresses: Vec<Pubkey> = entries
        .iter()
        .flat_map(ExtraAccountMetaEntry::data_account_indices)
        .map(usize::from)
        .filter(|index| *index < base_len)
        .filter_map(|index| context.known.key(index).ok())
        .collect();
    context.cache.prefetch(addresses).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_from_flags() {
        assert_eq!(AccountRole::from_flags(false, false), AccountRole::Readonly);
        assert_eq!(AccountRole::from_flags(false, true), AccountRole::Writable);
        assert_eq!(AccountRole::from_flags(true, false), AccountRole::ReadonlySigner);
        assert_eq!(AccountRole::from_flags(true, true), AccountRole::WritableSigner);
    }

    #[test]
    fn test_account_meta_conversion() {
        let key = Pubkey::new_unique();
        for (is_signer, is_writable) in [(false, false), (false, true), (true, false), (true, true)] {
            let meta = AccountMeta {
                pubkey: key,
                is_signer,
                is_writable,
            };
            let resolved = ResolvedAccountMeta::from(&meta);
            assert_eq!(AccountMeta::from(resolved), meta);
        }
    }
}
