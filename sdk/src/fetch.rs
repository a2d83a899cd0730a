//! Account fetch port — how the resolver reads account existence and data.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Mutex;

use solana_program::pubkey::Pubkey;

use crate::error::FetchError;

/// `Ok(None)` means the account does not exist.
pub type AccountDataResult = Result<Option<Vec<u8>>, FetchError>;

/// Reads an account's data. Retries and cancellation belong to the implementor.
pub trait AccountFetcher: Send + Sync {
    fn fetch(&self, address: Pubkey) -> impl Future<Output = AccountDataResult> + Send;
}

/// Any `Fn(Pubkey) -> Future<Output = AccountDataResult>` closure is a fetch port.
impl<F, Fut> AccountFetcher for F
where
    F: Fn(Pubkey) -> Fut + Send + Sync,
    Fut: Future<Output = AccountDataResult> + Send,
{
    fn fetch(&self, address: Pubkey) -> impl Future<Output = AccountDataResult> + Send {
        self(address)
    }
}

// ── In-Memory Fetcher ───────────────────────────────────────────────────────

/// Fetch port over a fixed account map.
///
/// Also useful for mocking accounts that are created in the same transaction
/// and therefore do not exist on chain yet. Every fetch is recorded.
#[derive(Debug, Default)]
pub struct MemoryAccountFetcher {
    accounts: HashMap<Pubkey, Vec<u8>>,
    fetched: Mutex<Vec<Pubkey>>,
}

impl MemoryAccountFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_account(mut self, address: Pubkey, data: Vec<u8>) -> Self {
        self.insert(address, data);
        self
    }

    pub fn insert(&mut self, address: Pubkey, data: Vec<u8>) {
        self.accounts.insert(address, data);
    }

    /// Addresses fetched so far, in request order.
    pub fn fetched(&self) -> Vec<Pubkey> {
        self.fetched
            .lock()
            .map(|log| log.clone())
            .unwrap_or_default()
    }

    pub fn fetch_count(&self, address: &Pubkey) -> usize {
        self.fetched().iter().filter(|a| *a == address).count()
    }
}

impl AccountFetcher for MemoryAccountFetcher {
    fn fetch(&self, address: Pubkey) -> impl Future<Output = AccountDataResult> + Send {
        let result = self
            .fetched
            .lock()
            .map(|mut log| log.push(address))
            .map_err(|_| FetchError::new("fetch log poisoned"))
            .map(|()| self.accounts.get(&address).cloned());
        std::future::ready(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_fetcher_records_requests() {
        let present = Pubkey::new_unique();
        let absent = Pubkey::new_unique();
        let fetcher = MemoryAccountFetcher::new().with_account(present, vec![1, 2, 3]);

        assert_eq!(fetcher.fetch(present).await.unwrap(), Some(vec![1, 2, 3]));
        assert_eq!(fetcher.fetch(absent).await.unwrap(), None);
        assert_eq!(fetcher.fetched(), vec![present, absent]);
        assert_eq!(fetcher.fetch_count(&present), 1);
    }

    #[tokio::test]
    async fn test_closure_is_fetcher() {
        let target = Pubkey::new_unique();
        let fetcher = move |address: Pubkey| async move {
            if address == target {
                Ok(Some(vec![9]))
            } else {
                Err(FetchError::new("rpc unavailable"))
            }
        };

        assert_eq!(fetcher.fetch(target).await.unwrap(), Some(vec![9]));
        assert_eq!(
            fetcher.fetch(Pubkey::new_unique()).await,
            Err(FetchError::new("rpc unavailable"))
        );
    }
}
