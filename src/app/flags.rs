use std::{collections::HashMap, sync::Arc};

use tokio::sync::OnceCell;

use super::repositories::FlagSource;

pub const ENABLE_CATEGORIES: &str = "enableCategories";

/// Answers feature flag lookups from a configuration fetched once, on the
/// first lookup. A failed fetch is not remembered, so the next lookup tries
/// again.
pub struct FeatureFlagService {
    source: Arc<dyn FlagSource>,
    activated: OnceCell<HashMap<String, bool>>,
}

impl FeatureFlagService {
    pub fn new(source: Arc<dyn FlagSource>) -> Self {
        Self {
            source,
            activated: OnceCell::new(),
        }
    }

    /// Flags absent from the activated configuration are disabled.
    pub async fn is_enabled(&self, flag: &str) -> anyhow::Result<bool> {
        let flags = self
            .activated
            .get_or_try_init(|| async {
                let flags = self.source.fetch_and_activate().await?;
                log::info!("Activated {} feature flags", flags.len());
                Ok::<_, anyhow::Error>(flags)
            })
            .await?;

        Ok(flags.get(flag).copied().unwrap_or(false))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;

    /// Fails the first `failures` fetches, then serves `flags`.
    struct CountingSource {
        fetches: AtomicUsize,
        failures: usize,
        flags: HashMap<String, bool>,
    }

    impl CountingSource {
        fn new(failures: usize, flags: &[(&str, bool)]) -> Self {
            Self {
                fetches: AtomicUsize::new(0),
                failures,
                flags: flags.iter().map(|(k, v)| (k.to_string(), *v)).collect(),
            }
        }
    }

    #[async_trait]
    impl FlagSource for CountingSource {
        async fn fetch_and_activate(&self) -> anyhow::Result<HashMap<String, bool>> {
            let attempt = self.fetches.fetch_add(1, Ordering::SeqCst);

            if attempt < self.failures {
                return Err(anyhow::anyhow!("remote config unreachable"));
            }

            Ok(self.flags.clone())
        }
    }

    #[tokio::test]
    async fn fetches_once_and_answers_from_cache() {
        let source = Arc::new(CountingSource::new(0, &[(ENABLE_CATEGORIES, true), ("beta", false)]));
        let flags = FeatureFlagService::new(source.clone());

        assert!(flags.is_enabled(ENABLE_CATEGORIES).await.unwrap());
        assert!(!flags.is_enabled("beta").await.unwrap());
        assert!(!flags.is_enabled("unknown").await.unwrap());

        assert_eq!(source.fetches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failed_fetch_is_retried_on_next_lookup() {
        let source = Arc::new(CountingSource::new(1, &[(ENABLE_CATEGORIES, true)]));
        let flags = FeatureFlagService::new(source.clone());

        assert!(flags.is_enabled(ENABLE_CATEGORIES).await.is_err());
        assert!(flags.is_enabled(ENABLE_CATEGORIES).await.unwrap());

        assert_eq!(source.fetches.load(Ordering::SeqCst), 2);
    }
}
