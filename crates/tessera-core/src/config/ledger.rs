//! Ledger configuration
//!
//! Loaded from TOML or JSON, then overridden by `TESSERA_*` environment
//! variables:
//!
//! | variable | effect |
//! |----------|--------|
//! | `TESSERA_ITEM_IDS` | comma separated item ids, replaces `item_ids` |
//! | `TESSERA_ITEM_COUNT` | sets `item_count` (ids `1..=n`) |
//! | `TESSERA_ENTROPY_MODE` | `weak` or `os` |
//! | `TESSERA_ENTROPY_SEED` | 64 hex chars seeding the weak source |
//! | `TESSERA_FUSION_CAP` | lowers the fusion cap below the item count |

use super::traits::ConfigValidation;
use crate::identifiers::ItemId;
use crate::TesseraError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;

const ENV_PREFIX: &str = "TESSERA_";

/// Largest item set a configuration may describe
pub const MAX_ITEMS: u64 = 1 << 20;

/// Which entropy handler backs fragment issuance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntropyMode {
    /// Deterministic hash of seed, bound and salt. Predictable.
    #[default]
    Weak,
    /// Operating system randomness
    Os,
}

impl std::str::FromStr for EntropyMode {
    type Err = TesseraError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "weak" => Ok(EntropyMode::Weak),
            "os" => Ok(EntropyMode::Os),
            other => Err(TesseraError::config(format!(
                "unknown entropy mode '{other}', expected 'weak' or 'os'"
            ))),
        }
    }
}

/// Entropy handler selection
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EntropyConfig {
    /// Handler kind
    pub mode: EntropyMode,
    /// Hex-encoded 32 byte seed for the weak handler
    pub seed: Option<String>,
}

impl EntropyConfig {
    /// Decode the configured seed, if any
    pub fn seed_bytes(&self) -> Result<Option<[u8; 32]>, TesseraError> {
        let Some(seed) = &self.seed else {
            return Ok(None);
        };
        let bytes = hex::decode(seed.trim())
            .map_err(|e| TesseraError::config(format!("entropy seed is not hex: {e}")))?;
        let seed: [u8; 32] = bytes.try_into().map_err(|bytes: Vec<u8>| {
            TesseraError::config(format!(
                "entropy seed must be 32 bytes, got {}",
                bytes.len()
            ))
        })?;
        Ok(Some(seed))
    }
}

impl ConfigValidation for EntropyConfig {
    fn validate(&self) -> Result<(), TesseraError> {
        if self.mode == EntropyMode::Os && self.seed.is_some() {
            return Err(TesseraError::config(
                "entropy seed only applies to the weak entropy mode",
            ));
        }
        self.seed_bytes().map(|_| ())
    }
}

/// Full ledger configuration
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LedgerConfig {
    /// Explicit item ids
    pub item_ids: Vec<u64>,
    /// Shorthand for item ids `1..=item_count`
    pub item_count: Option<u64>,
    /// Maximum derived units; defaults to the item count and may only lower it
    pub fusion_cap: Option<u64>,
    /// Entropy handler selection
    pub entropy: EntropyConfig,
    /// Forward committed events to `tracing`
    pub emit_tracing_events: bool,
}

impl LedgerConfig {
    /// Configuration for item ids `1..=count`
    pub fn with_item_count(count: u64) -> Self {
        Self {
            item_count: Some(count),
            ..Self::default()
        }
    }

    /// Configuration for an explicit list of item ids
    pub fn with_item_ids(ids: impl IntoIterator<Item = u64>) -> Self {
        Self {
            item_ids: ids.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Number of items this configuration describes, without building the list
    pub fn item_len(&self) -> u64 {
        match (self.item_ids.is_empty(), self.item_count) {
            (true, Some(count)) => count,
            _ => self.item_ids.len() as u64,
        }
    }

    /// Item ids this configuration describes, in configured order. Call
    /// after `validate`; an unchecked `item_count` may be arbitrarily large.
    pub fn resolved_item_ids(&self) -> Vec<ItemId> {
        match (self.item_ids.is_empty(), self.item_count) {
            (true, Some(count)) => (1..=count).map(ItemId::new).collect(),
            _ => self.item_ids.iter().copied().map(ItemId::new).collect(),
        }
    }

    /// Load a configuration file. `.json` files are parsed as JSON, anything
    /// else as TOML. The result is not validated.
    pub fn load_from_file(path: &Path) -> Result<Self, TesseraError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            TesseraError::config(format!("failed to read {}: {e}", path.display()))
        })?;

        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        if is_json {
            Ok(serde_json::from_str(&content)?)
        } else {
            Ok(toml::from_str(&content)?)
        }
    }

    /// Load a file, apply process environment overrides and validate.
    pub fn load(path: &Path) -> Result<Self, TesseraError> {
        let mut config = Self::load_from_file(path)?;
        config.merge_with_env()?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `TESSERA_*` overrides from the process environment
    pub fn merge_with_env(&mut self) -> Result<(), TesseraError> {
        self.merge_with_vars(std::env::vars())
    }

    /// Apply `TESSERA_*` overrides from an explicit variable list
    pub fn merge_with_vars<I, K, V>(&mut self, vars: I) -> Result<(), TesseraError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        for (key, value) in vars {
            let Some(key) = key.as_ref().strip_prefix(ENV_PREFIX) else {
                continue;
            };
            let value = value.as_ref();
            match key {
                "ITEM_IDS" => {
                    self.item_ids = parse_id_list(value)?;
                    self.item_count = None;
                }
                "ITEM_COUNT" => {
                    let count = value.trim().parse::<u64>().map_err(|e| {
                        TesseraError::config(format!("TESSERA_ITEM_COUNT: {e}"))
                    })?;
                    self.item_ids.clear();
                    self.item_count = Some(count);
                }
                "FUSION_CAP" => {
                    let cap = value.trim().parse::<u64>().map_err(|e| {
                        TesseraError::config(format!("TESSERA_FUSION_CAP: {e}"))
                    })?;
                    self.fusion_cap = Some(cap);
                }
                "ENTROPY_MODE" => self.entropy.mode = value.parse()?,
                "ENTROPY_SEED" => self.entropy.seed = Some(value.trim().to_string()),
                _ => {}
            }
        }
        Ok(())
    }
}

fn parse_id_list(value: &str) -> Result<Vec<u64>, TesseraError> {
    value
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse::<u64>()
                .map_err(|e| TesseraError::config(format!("TESSERA_ITEM_IDS '{part}': {e}")))
        })
        .collect()
}

impl ConfigValidation for LedgerConfig {
    fn validate(&self) -> Result<(), TesseraError> {
        if !self.item_ids.is_empty() && self.item_count.is_some() {
            return Err(TesseraError::config(
                "set either item_ids or item_count, not both",
            ));
        }

        let len = self.item_len();
        if len == 0 {
            return Err(TesseraError::config("at least one item id is required"));
        }
        if len > MAX_ITEMS {
            return Err(TesseraError::config(format!(
                "{len} items exceeds the maximum of {MAX_ITEMS}"
            )));
        }

        let ids = self.resolved_item_ids();

        let mut seen = BTreeSet::new();
        for id in &ids {
            if id.value() == 0 {
                return Err(TesseraError::config("item ids must be positive"));
            }
            if !seen.insert(*id) {
                return Err(TesseraError::config(format!("duplicate item id {}", id.value())));
            }
        }

        if let Some(cap) = self.fusion_cap {
            if cap == 0 || cap > ids.len() as u64 {
                return Err(TesseraError::config(format!(
                    "fusion_cap {cap} must be between 1 and the item count {}",
                    ids.len()
                )));
            }
        }

        self.entropy.validate()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn item_count_expands_to_range() {
        let config = LedgerConfig::with_item_count(3);
        assert_eq!(
            config.resolved_item_ids(),
            vec![ItemId::new(1), ItemId::new(2), ItemId::new(3)]
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn empty_item_set_is_rejected() {
        assert!(LedgerConfig::default().validate().is_err());
        assert!(LedgerConfig::with_item_count(0).validate().is_err());
    }

    #[test]
    fn oversized_item_count_is_a_config_error() {
        let err = LedgerConfig::with_item_count(u64::MAX).validate().unwrap_err();
        assert!(matches!(err, TesseraError::Config { .. }));

        let mut config = LedgerConfig::default();
        config
            .merge_with_vars([("TESSERA_ITEM_COUNT", (MAX_ITEMS + 1).to_string())])
            .unwrap();
        assert!(config.validate().is_err());

        assert!(LedgerConfig::with_item_count(MAX_ITEMS).validate().is_ok());
    }

    #[test]
    fn zero_and_duplicate_ids_are_rejected() {
        assert!(LedgerConfig::with_item_ids([1, 0, 2]).validate().is_err());
        assert!(LedgerConfig::with_item_ids([1, 2, 1]).validate().is_err());
        assert!(LedgerConfig::with_item_ids([5, 9, 1]).validate().is_ok());
    }

    #[test]
    fn ids_and_count_are_mutually_exclusive() {
        let config = LedgerConfig {
            item_ids: vec![1, 2],
            item_count: Some(2),
            ..LedgerConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn fusion_cap_may_only_lower_supply() {
        let mut config = LedgerConfig::with_item_count(3);
        config.fusion_cap = Some(2);
        assert!(config.validate().is_ok());
        config.fusion_cap = Some(4);
        assert!(config.validate().is_err());
        config.fusion_cap = Some(0);
        assert!(config.validate().is_err());

        config.merge_with_vars([("TESSERA_FUSION_CAP", "1")]).unwrap();
        assert_eq!(config.fusion_cap, Some(1));
    }

    #[test]
    fn seed_must_be_32_hex_bytes() {
        let mut config = LedgerConfig::with_item_count(1);
        config.entropy.seed = Some("abcd".into());
        assert!(config.validate().is_err());

        config.entropy.seed = Some("zz".repeat(32));
        assert!(config.validate().is_err());

        config.entropy.seed = Some("01".repeat(32));
        assert!(config.validate().is_ok());
        assert_eq!(config.entropy.seed_bytes().unwrap(), Some([1u8; 32]));

        config.entropy.mode = EntropyMode::Os;
        assert!(config.validate().is_err());
    }

    #[test]
    fn env_overrides_replace_file_values() {
        let mut config = LedgerConfig::with_item_ids([1, 2, 3]);
        config
            .merge_with_vars([
                ("TESSERA_ITEM_COUNT", "5"),
                ("TESSERA_ENTROPY_MODE", "OS"),
                ("UNRELATED", "ignored"),
            ])
            .unwrap();
        assert!(config.item_ids.is_empty());
        assert_eq!(config.item_count, Some(5));
        assert_eq!(config.entropy.mode, EntropyMode::Os);

        config
            .merge_with_vars([("TESSERA_ITEM_IDS", "7, 8,9")])
            .unwrap();
        assert_eq!(config.item_ids, vec![7, 8, 9]);
        assert_eq!(config.item_count, None);
    }

    #[test]
    fn bad_env_values_fail() {
        let mut config = LedgerConfig::default();
        assert!(config
            .merge_with_vars([("TESSERA_ITEM_IDS", "1,two")])
            .is_err());
        assert!(config
            .merge_with_vars([("TESSERA_ENTROPY_MODE", "quantum")])
            .is_err());
    }

    #[test]
    fn loads_toml_and_json_files() {
        let dir = tempfile::tempdir().unwrap();

        let toml_path = dir.path().join("ledger.toml");
        let mut file = std::fs::File::create(&toml_path).unwrap();
        writeln!(
            file,
            "item_ids = [1, 2, 3, 4, 5]\nemit_tracing_events = true\n\n[entropy]\nmode = \"weak\"\nseed = \"{}\"",
            "ab".repeat(32)
        )
        .unwrap();
        let config = LedgerConfig::load_from_file(&toml_path).unwrap();
        assert_eq!(config.item_ids, vec![1, 2, 3, 4, 5]);
        assert!(config.emit_tracing_events);
        assert_eq!(config.entropy.seed_bytes().unwrap(), Some([0xab; 32]));

        let json_path = dir.path().join("ledger.json");
        std::fs::write(&json_path, r#"{"item_count": 4, "entropy": {"mode": "os"}}"#).unwrap();
        let config = LedgerConfig::load_from_file(&json_path).unwrap();
        assert_eq!(config.resolved_item_ids().len(), 4);
        assert_eq!(config.entropy.mode, EntropyMode::Os);
    }

    #[test]
    fn unknown_fields_and_missing_files_fail() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.toml");
        std::fs::write(&path, "items = [1]").unwrap();
        assert!(LedgerConfig::load_from_file(&path).is_err());
        assert!(LedgerConfig::load_from_file(&dir.path().join("missing.toml")).is_err());
    }
}
