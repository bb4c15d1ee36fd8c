//! The in-process ledger cache.
//!
//! The dashboard is read-heavy and the ledger changes slowly, so every
//! handler reads through this cache instead of hitting PostgreSQL directly.
//! Entries live for the configured TTL and are reloaded on the first access
//! after expiry; expiry is the only invalidation rule.

use configuration::CacheSettings;
use core_types::{AccountSnapshot, TradeRecord};
use database::{DbError, LedgerRepository};
use moka::future::Cache;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

// Each cache holds a single dataset, so a constant key is all we need.
const TRADES_KEY: &str = "ledger:trades";
const ACCOUNT_KEY: &str = "ledger:account_history";

/// TTL-bounded copies of the two ledger datasets.
///
/// Values are `Arc`ed so concurrent handlers share one fetched copy instead
/// of cloning record vectors per request.
#[derive(Clone)]
pub struct LedgerCache {
    trades: Cache<&'static str, Arc<Vec<TradeRecord>>>,
    snapshots: Cache<&'static str, Arc<Vec<AccountSnapshot>>>,
}

impl LedgerCache {
    pub fn new(settings: &CacheSettings) -> Self {
        let trades = Cache::builder()
            .max_capacity(settings.max_entries)
            .time_to_live(Duration::from_secs(settings.ttl_secs))
            .build();

        let snapshots = Cache::builder()
            .max_capacity(settings.max_entries)
            .time_to_live(Duration::from_secs(settings.ttl_secs))
            .build();

        Self { trades, snapshots }
    }

    /// The full trade ledger, newest entry first, at most `ttl_secs` old.
    pub async fn trade_records(
        &self,
        repo: &LedgerRepository,
    ) -> Result<Arc<Vec<TradeRecord>>, DbError> {
        Self::get_or_fetch(&self.trades, TRADES_KEY, || repo.fetch_trade_records()).await
    }

    /// The account snapshot series, oldest first, at most `ttl_secs` old.
    pub async fn account_history(
        &self,
        repo: &LedgerRepository,
    ) -> Result<Arc<Vec<AccountSnapshot>>, DbError> {
        Self::get_or_fetch(&self.snapshots, ACCOUNT_KEY, || repo.fetch_account_history()).await
    }

    /// Consults the cache, falling through to `load` and back-filling on a
    /// miss. Failed loads are never cached; the next access retries.
    async fn get_or_fetch<T, F, Fut>(
        cache: &Cache<&'static str, Arc<Vec<T>>>,
        key: &'static str,
        load: F,
    ) -> Result<Arc<Vec<T>>, DbError>
    where
        T: Send + Sync + 'static,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<T>, DbError>>,
    {
        if let Some(hit) = cache.get(key).await {
            return Ok(hit);
        }

        let fresh = Arc::new(load().await?);
        cache.insert(key, Arc::clone(&fresh)).await;
        Ok(fresh)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use rust_decimal_macros::dec;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn snapshot(balance: rust_decimal::Decimal) -> AccountSnapshot {
        AccountSnapshot {
            timestamp: Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap(),
            balance,
            equity: balance,
            unrealized_pnl: dec!(0),
        }
    }

    fn test_cache(ttl_secs: u64) -> LedgerCache {
        LedgerCache::new(&CacheSettings {
            ttl_secs,
            max_entries: 4,
        })
    }

    #[tokio::test]
    async fn a_fresh_entry_is_served_without_reloading() {
        let cache = test_cache(60);
        let loads = AtomicUsize::new(0);

        let load = || async {
            loads.fetch_add(1, Ordering::SeqCst);
            Ok(vec![snapshot(dec!(100))])
        };

        let first = LedgerCache::get_or_fetch(&cache.snapshots, ACCOUNT_KEY, load).await.unwrap();
        let second = LedgerCache::get_or_fetch(&cache.snapshots, ACCOUNT_KEY, load).await.unwrap();

        assert_eq!(loads.load(Ordering::SeqCst), 1);
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[tokio::test]
    async fn an_expired_entry_is_reloaded() {
        let cache = test_cache(1);
        let loads = AtomicUsize::new(0);

        let load = || async {
            let n = loads.fetch_add(1, Ordering::SeqCst);
            Ok(vec![snapshot(rust_decimal::Decimal::from(n))])
        };

        let first = LedgerCache::get_or_fetch(&cache.snapshots, ACCOUNT_KEY, load).await.unwrap();
        tokio::time::sleep(Duration::from_millis(1100)).await;
        let second = LedgerCache::get_or_fetch(&cache.snapshots, ACCOUNT_KEY, load).await.unwrap();

        assert_eq!(loads.load(Ordering::SeqCst), 2);
        assert!(!Arc::ptr_eq(&first, &second));
    }

    #[tokio::test]
    async fn a_failed_load_is_retried_on_the_next_access() {
        let cache = test_cache(60);
        let loads = AtomicUsize::new(0);

        let failing = || async {
            loads.fetch_add(1, Ordering::SeqCst);
            Err(DbError::ConnectionConfigError("ledger offline".to_string()))
        };
        let result = LedgerCache::get_or_fetch(&cache.snapshots, ACCOUNT_KEY, failing).await;
        assert!(result.is_err());

        let healthy = || async {
            loads.fetch_add(1, Ordering::SeqCst);
            Ok(vec![snapshot(dec!(5))])
        };
        let recovered =
            LedgerCache::get_or_fetch(&cache.snapshots, ACCOUNT_KEY, healthy).await.unwrap();

        assert_eq!(loads.load(Ordering::SeqCst), 2);
        assert_eq!(recovered.len(), 1);
    }
}
