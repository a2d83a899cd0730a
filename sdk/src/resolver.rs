//! Seed resolver — turns an entry's seed configs into bytes and the bytes into
//! an address.

use solana_program::pubkey::Pubkey;
use tracing::debug;

use crate::account::{AddressConfig, ExtraAccountMetaEntry, KeyDataConfig};
use crate::context::ResolutionContext;
use crate::error::ResolveError;
use crate::fetch::AccountFetcher;
use crate::meta::ResolvedAccountMeta;
use crate::pda::find_program_address;
use crate::seeds::SeedConfig;

impl<'a, F: AccountFetcher> ResolutionContext<'a, F> {
    /// Bytes for one seed. Account references must already be known.
    pub async fn resolve_seed(&mut self, seed: &SeedConfig) -> Result<Vec<u8>, ResolveError> {
        match seed {
            SeedConfig::Literal { bytes } => Ok(bytes.clone()),
            SeedConfig::InstructionArg { offset, length } => {
                instruction_slice(self.instruction_data, *offset as usize, *length as usize)
                    .map(<[u8]>::to_vec)
            }
            SeedConfig::AccountKey { index } => {
                Ok(self.known.key(*index as usize)?.to_bytes().to_vec())
            }
            SeedConfig::AccountData {
                account_index,
                data_offset,
                data_length,
            } => {
                let address = self.known.key(*account_index as usize)?;
                let data = self.cache.require(&address).await?;
                account_slice(&address, data, *data_offset as usize, *data_length as usize)
                    .map(<[u8]>::to_vec)
            }
        }
    }

    /// The entry's seed sequence, one byte string per seed, in slot order.
    pub async fn resolve_seeds(
        &mut self,
        seeds: &[SeedConfig],
    ) -> Result<Vec<Vec<u8>>, ResolveError> {
        let mut resolved = Vec::with_capacity(seeds.len());
        for seed in seeds {
            resolved.push(self.resolve_seed(seed).await?);
        }
        Ok(resolved)
    }

    pub async fn resolve_address(&mut self, config: &AddressConfig) -> Result<Pubkey, ResolveError> {
        match config {
            AddressConfig::LiteralAddress(address) => Ok(*address),
            AddressConfig::SelfProgramSeeds(seeds) => {
                let seeds = self.resolve_seeds(seeds).await?;
                derive_address(&seeds, self.program_id)
            }
            AddressConfig::ExternalProgramSeeds {
                program_index,
                seeds,
            } => {
                let program_id = self.known.key(*program_index as usize)?;
                let seeds = self.resolve_seeds(seeds).await?;
                derive_address(&seeds, &program_id)
            }
            AddressConfig::KeyFromData(KeyDataConfig::InstructionArg { offset }) => {
                let bytes = instruction_slice(self.instruction_data, *offset as usize, 32)?;
                Ok(pubkey_from_slice(bytes))
            }
            AddressConfig::KeyFromData(KeyDataConfig::AccountData {
                account_index,
                data_offset,
            }) => {
                let address = self.known.key(*account_index as usize)?;
                let data = self.cache.require(&address).await?;
                let bytes = account_slice(&address, data, *data_offset as usize, 32)?;
                Ok(pubkey_from_slice(bytes))
            }
        }
    }

    /// Resolve an entry and append it to the known accounts.
    pub async fn resolve_entry(
        &mut self,
        entry: &ExtraAccountMetaEntry,
    ) -> Result<ResolvedAccountMeta, ResolveError> {
        let address = self.resolve_address(&entry.address_config).await?;
        let meta = ResolvedAccountMeta::new(address, entry.role());
        debug!(
            index = self.known.len(),
            %address,
            role = ?meta.role,
            "resolved extra account meta"
        );
        self.known.push(meta);
        Ok(meta)
    }
}

fn derive_address(seeds: &[Vec<u8>], program_id: &Pubkey) -> Result<Pubkey, ResolveError> {
    let seeds: Vec<&[u8]> = seeds.iter().map(Vec::as_slice).collect();
    find_program_address(&seeds, program_id).map(|(address, _bump)| address)
}

fn instruction_slice(data: &[u8], offset: usize, length: usize) -> Result<&[u8], ResolveError> {
    let end = offset + length;
    data.get(offset..end).ok_or(ResolveError::SeedOutOfBounds {
        end,
        len: data.len(),
    })
}

fn account_slice<'d>(
    address: &Pubkey,
    data: &'d [u8],
    offset: usize,
    length: usize,
) -> Result<&'d [u8], ResolveError> {
    let end = offset + length;
    data.get(offset..end)
        .ok_or(ResolveError::AccountDataOutOfBounds {
            address: *address,
            end,
            len: data.len(),
        })
}

/// Callers slice exactly 32 bytes.
fn pubkey_from_slice(bytes: &[u8]) -> Pubkey {
    let mut key = [0u8; 32];
    key.copy_from_slice(bytes);
    Pubkey::new_from_array(key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::MemoryAccountFetcher;

    #[tokio::test]
    async fn test_literal_and_instruction_seeds() {
        let fetcher = MemoryAccountFetcher::new();
        let program_id = Pubkey::new_unique();
        let data = [10u8, 11, 12, 13];
        let mut context = ResolutionContext::new(&fetcher, &[], &data, &program_id);

        assert_eq!(
            context.resolve_seed(&SeedConfig::literal(b"abc")).await.unwrap(),
            b"abc".to_vec()
        );
        assert_eq!(
            context
                .resolve_seed(&SeedConfig::InstructionArg { offset: 1, length: 3 })
                .await
                .unwrap(),
            vec![11, 12, 13]
        );
        assert_eq!(
            context
                .resolve_seed(&SeedConfig::InstructionArg { offset: 2, length: 3 })
                .await,
            Err(ResolveError::SeedOutOfBounds { end: 5, len: 4 })
        );
        assert!(fetcher.fetched().is_empty());
    }

    #[tokio::test]
    async fn test_account_key_seed_reads_known_accounts() {
        let fetcher = MemoryAccountFetcher::new();
        let program_id = Pubkey::new_unique();
        let base = [ResolvedAccountMeta::readonly(Pubkey::new_unique())];
        let mut context = ResolutionContext::new(&fetcher, &base, &[], &program_id);

        assert_eq!(
            context
                .resolve_seed(&SeedConfig::AccountKey { index: 0 })
                .await
                .unwrap(),
            base[0].address.to_bytes().to_vec()
        );
        assert_eq!(
            context
                .resolve_seed(&SeedConfig::AccountKey { index: 1 })
                .await,
            Err(ResolveError::UnresolvedSeedReference { index: 1, known: 1 })
        );
    }

    #[tokio::test]
    async fn test_account_data_seed_bounds() {
        let holder = Pubkey::new_unique();
        let missing = Pubkey::new_unique();
        let fetcher = MemoryAccountFetcher::new().with_account(holder, vec![0, 1, 2, 3]);
        let program_id = Pubkey::new_unique();
        let base = [
            ResolvedAccountMeta::readonly(holder),
            ResolvedAccountMeta::readonly(missing),
        ];
        let mut context = ResolutionContext::new(&fetcher, &base, &[], &program_id);

        let seed = SeedConfig::AccountData {
            account_index: 0,
            data_offset: 2,
            data_length: 2,
        };
        assert_eq!(context.resolve_seed(&seed).await.unwrap(), vec![2, 3]);

        let seed = SeedConfig::AccountData {
            account_index: 0,
            data_offset: 3,
            data_length: 2,
        };
        assert_eq!(
            context.resolve_seed(&seed).await,
            Err(ResolveError::AccountDataOutOfBounds {
                address: holder,
                end: 5,
                len: 4,
            })
        );

        let seed = SeedConfig::AccountData {
            account_index: 1,
            data_offset: 0,
            data_length: 1,
        };
        assert_eq!(
            context.resolve_seed(&seed).await,
            Err(ResolveError::AccountNotFound(missing))
        );
        assert_eq!(fetcher.fetch_count(&holder), 1);
    }

    #[tokio::test]
    async fn test_key_from_instruction_data() {
        let fetcher = MemoryAccountFetcher::new();
        let program_id = Pubkey::new_unique();
        let embedded = Pubkey::new_unique();
        let mut data = vec![0xaa];
        data.extend_from_slice(embedded.as_ref());
        let mut context = ResolutionContext::new(&fetcher, &[], &data, &program_id);

        let config = AddressConfig::KeyFromData(KeyDataConfig::InstructionArg { offset: 1 });
        assert_eq!(context.resolve_address(&config).await.unwrap(), embedded);

        let config = AddressConfig::KeyFromData(KeyDataConfig::InstructionArg { offset: 2 });
        assert_eq!(
            context.resolve_address(&config).await,
            Err(ResolveError::SeedOutOfBounds { end: 34, len: 33 })
        );
    }

    #[tokio::test]
    async fn test_resolve_entry_extends_known_accounts() {
        let fetcher = MemoryAccountFetcher::new();
        let program_id = Pubkey::new_unique();
        let base = [ResolvedAccountMeta::readonly(Pubkey::new_unique())];
        let mut context = ResolutionContext::new(&fetcher, &base, &[], &program_id);

        let literal = Pubkey::new_unique();
        let first = ExtraAccountMetaEntry::new_with_pubkey(&literal, false, true);
        context.resolve_entry(&first).await.unwrap();

        // The second entry may reference the first.
        let second =
            ExtraAccountMetaEntry::new_with_seeds(&[SeedConfig::AccountKey { index: 1 }], true, false)
                .unwrap();
        let meta = context.resolve_entry(&second).await.unwrap();

        let (expected, _) = Pubkey::find_program_address(&[literal.as_ref()], &program_id);
        assert_eq!(meta, ResolvedAccountMeta::new(expected, crate::meta::AccountRole::ReadonlySigner));
        assert_eq!(context.known().len(), 3);
    }
}
