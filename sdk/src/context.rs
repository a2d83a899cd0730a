//! Per-call resolution state: known accounts, payload, program, and fetch cache.

use std::collections::HashMap;

use futures_util::future::try_join_all;
use solana_program::pubkey::Pubkey;
use tracing::trace;

use crate::error::ResolveError;
use crate::fetch::AccountFetcher;
use crate::meta::ResolvedAccountMeta;

// ── Known Accounts ──────────────────────────────────────────────────────────

/// Append-only list of base accounts followed by the entries resolved so far.
///
/// Reads past the end report `UnresolvedSeedReference`, which is how forward
/// references are rejected.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct KnownAccounts {
    metas: Vec<ResolvedAccountMeta>,
}

impl KnownAccounts {
    pub fn new(base_metas: &[ResolvedAccountMeta]) -> Self {
        Self {
            metas: base_metas.to_vec(),
        }
    }

    pub fn len(&self) -> usize {
        self.metas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.metas.is_empty()
    }

    pub fn get(&self, index: usize) -> Result<&ResolvedAccountMeta, ResolveError> {
        self.metas
            .get(index)
            .ok_or(ResolveError::UnresolvedSeedReference {
                index,
                known: self.metas.len(),
            })
    }

    pub fn key(&self, index: usize) -> Result<Pubkey, ResolveError> {
        self.get(index).map(|meta| meta.address)
    }

    pub fn push(&mut self, meta: ResolvedAccountMeta) {
        self.metas.push(meta);
    }

    pub fn as_slice(&self) -> &[ResolvedAccountMeta] {
        &self.metas
    }

    pub fn into_inner(self) -> Vec<ResolvedAccountMeta> {
        self.metas
    }
}

// ── Account Cache ───────────────────────────────────────────────────────────

/// Fetches each address at most once for the lifetime of the cache.
pub struct AccountCache<'f, F> {
    fetcher: &'f F,
    accounts: HashMap<Pubkey, Option<Vec<u8>>>,
}

impl<'f, F: AccountFetcher> AccountCache<'f, F> {
    pub fn new(fetcher: &'f F) -> Self {
        Self {
            fetcher,
            accounts: HashMap::new(),
        }
    }

    pub fn is_cached(&self, address: &Pubkey) -> bool {
        self.accounts.contains_key(address)
    }

    /// `None` if the account does not exist.
    pub async fn get(&mut self, address: &Pubkey) -> Result<Option<&[u8]>, ResolveError> {
        if self.accounts.contains_key(address) {
            trace!(%address, "account cache hit");
        } else {
            trace!(%address, "fetching account");
            let data = self.fetcher.fetch(*address).await?;
            self.accounts.insert(*address, data);
        }
        Ok(self.accounts.get(address).and_then(|data| data.as_deref()))
    }

    pub async fn require(&mut self, address: &Pubkey) -> Result<&[u8], ResolveError> {
        self.get(address)
            .await?
            .ok_or(ResolveError::AccountNotFound(*address))
    }

    /// Fetch every uncached address concurrently.
    pub async fn prefetch(
        &mut self,
        addresses: impl IntoIterator<Item = Pubkey>,
    ) -> Result<(), ResolveError> {
        let mut pending: Vec<Pubkey> = Vec::new();
        for address in addresses {
            if !self.accounts.contains_key(&address) && !pending.contains(&address) {
                pending.push(address);
            }
        }
        if pending.is_empty() {
            return Ok(());
        }

        trace!(count = pending.len(), "prefetching accounts");
        let fetcher = self.fetcher;
        let results = try_join_all(pending.iter().map(|address| fetcher.fetch(*address))).await?;
        self.accounts.extend(pending.into_iter().zip(results));
        Ok(())
    }
}

// ── Resolution Context ──────────────────────────────────────────────────────

/// Everything one resolution call reads from. Nothing outlives the call.
pub struct ResolutionContext<'a, F> {
    pub(crate) known: KnownAccounts,
    pub(crate) instruction_data: &'a [u8],
    pub(crate) program_id: &'a Pubkey,
    pub(crate) cache: AccountCache<'a, F>,
}

impl<'a, F: AccountFetcher> ResolutionContext<'a, F> {
    pub fn new(
        fetcher: &'a F,
        base_metas: &[ResolvedAccountMeta],
        instruction_data: &'a [u8],
        program_id: &'a Pubkey,
    ) -> Self {
        Self {
            known: KnownAccounts::new(base_metas),
            instruction_data,
            program_id,
            cache: AccountCache::new(fetcher),
        }
    }

    pub fn known(&self) -> &KnownAccounts {
        &self.known
    }

    pub fn instruction_data(&self) -> &[u8] {
        self.instruction_data
    }

    pub fn program_id(&self) -> &Pubkey {
        self.program_id
    }

    pub fn cache_mut(&mut self) -> &mut AccountCache<'a, F> {
        &mut self.cache
    }

    pub fn into_metas(self) -> Vec<ResolvedAccountMeta> {
        self.known.into_inner()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::MemoryAccountFetcher;

    #[test]
    fn test_known_accounts_bounds() {
        let a = ResolvedAccountMeta::readonly(Pubkey::new_unique());
        let mut known = KnownAccounts::new(&[a]);
        assert_eq!(known.key(0).unwrap(), a.address);
        assert_eq!(
            known.key(1),
            Err(ResolveError::UnresolvedSeedReference { index: 1, known: 1 })
        );

        let b = ResolvedAccountMeta::writable(Pubkey::new_unique());
        known.push(b);
        assert_eq!(known.key(1).unwrap(), b.address);
        assert_eq!(known.as_slice(), &[a, b]);
    }

    #[tokio::test]
    async fn test_cache_fetches_once() {
        let present = Pubkey::new_unique();
        let absent = Pubkey::new_unique();
        let fetcher = MemoryAccountFetcher::new().with_account(present, vec![4, 5]);
        let mut cache = AccountCache::new(&fetcher);

        assert_eq!(cache.get(&present).await.unwrap(), Some(&[4u8, 5][..]));
        assert_eq!(cache.require(&present).await.unwrap(), &[4u8, 5][..]);
        assert_eq!(cache.get(&absent).await.unwrap(), None);
        assert_eq!(
            cache.require(&absent).await,
            Err(ResolveError::AccountNotFound(absent))
        );

        assert_eq!(fetcher.fetch_count(&present), 1);
        assert_eq!(fetcher.fetch_count(&absent), 1);
    }

    #[tokio::test]
    async fn test_prefetch_skips_cached_and_duplicates() {
        let a = Pubkey::new_unique();
        let b = Pubkey::new_unique();
        let fetcher = MemoryAccountFetcher::new()
            .with_account(a, vec![1])
            .with_account(b, vec![2]);
        let mut cache = AccountCache::new(&fetcher);

        cache.get(&a).await.unwrap();
        cache.prefetch([a, b, b]).await.unwrap();
        assert!(cache.is_cached(&b));
        assert_eq!(cache.require(&b).await.unwrap(), &[2u8][..]);

        assert_eq!(fetcher.fetch_count(&a), 1);
        assert_eq!(fetcher.fetch_count(&b), 1);
    }
}
