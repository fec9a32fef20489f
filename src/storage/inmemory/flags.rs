use std::collections::HashMap;

use async_trait::async_trait;

use crate::app::repositories::FlagSource;

/// Flags fixed at startup, e.g. from the `FEATURE_FLAGS` environment variable.
pub struct StaticFlagSource {
    flags: HashMap<String, bool>,
}

impl StaticFlagSource {
    pub fn new(flags: HashMap<String, bool>) -> Self {
        Self { flags }
    }

    /// Parses `name` and `name=true|false` entries separated by commas.
    /// A bare name enables the flag.
    pub fn parse(spec: &str) -> anyhow::Result<Self> {
        let mut flags = HashMap::new();

        for entry in spec.split(',').map(str::trim).filter(|e| !e.is_empty()) {
            let (name, enabled) = match entry.split_once('=') {
                Some((name, value)) => {
                    let enabled = value.trim().parse::<bool>().map_err(|_| {
                        anyhow::anyhow!("invalid value for feature flag {}: {}", name, value)
                    })?;
                    (name.trim(), enabled)
                }
                None => (entry, true),
            };

            flags.insert(name.to_string(), enabled);
        }

        Ok(Self::new(flags))
    }
}

#[async_trait]
impl FlagSource for StaticFlagSource {
    async fn fetch_and_activate(&self) -> anyhow::Result<HashMap<String, bool>> {
        Ok(self.flags.clone())
    }
}
