// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Layered configuration loading with Figment.
//!
//! Lookup order: compiled defaults, `/etc/herald/herald.toml`,
//! `$XDG_CONFIG_HOME/herald/herald.toml`, `./herald.toml`, then `HERALD_*`
//! environment variables.

#![allow(clippy::result_large_err)] // figment::Error is external

use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::HeraldConfig;

/// Name of the config file looked up in each directory.
pub const CONFIG_FILE_NAME: &str = "herald.toml";

/// Top-level sections, used to map `HERALD_<SECTION>_<KEY>` variables.
const SECTIONS: &[&str] = &[
    "app",
    "storage",
    "rules",
    "responder",
    "accounts",
    "tasks",
    "work_cycle",
];

/// Candidate config files, lowest precedence first.
pub fn config_file_candidates() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from("/etc/herald").join(CONFIG_FILE_NAME)];
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("herald").join(CONFIG_FILE_NAME));
    }
    paths.push(PathBuf::from(CONFIG_FILE_NAME));
    paths
}

/// Builds the full layered Figment without extracting it.
pub fn build_figment() -> Figment {
    let mut figment = Figment::new().merge(Serialized::defaults(HeraldConfig::default()));
    for path in config_file_candidates() {
        figment = figment.merge(Toml::file(path));
    }
    figment.merge(env_provider())
}

/// Loads configuration from the standard hierarchy with env var overrides.
pub fn load_config() -> Result<HeraldConfig, figment::Error> {
    build_figment().extract()
}

/// Loads configuration from an explicit file, still honoring env vars.
pub fn load_config_from_path(path: &Path) -> Result<HeraldConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(HeraldConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Loads configuration from a TOML string over the compiled defaults.
pub fn load_config_from_str(toml_content: &str) -> Result<HeraldConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(HeraldConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Renders the effective configuration as TOML.
pub fn to_toml(config: &HeraldConfig) -> Result<String, toml::ser::Error> {
    toml::to_string_pretty(config)
}

/// `HERALD_RESPONDER_SEND_PACING_MS` maps to `responder.send_pacing_ms`.
///
/// Splitting on every underscore would break keys such as `send_pacing_ms`,
/// so only the first known section prefix is turned into a dot.
fn env_provider() -> Env {
    Env::prefixed("HERALD_").map(|key| map_env_key(key.as_str()).into())
}

/// figment hands over the key in its original case, e.g. `RESPONDER_SEND_PACING_MS`.
fn map_env_key(key: &str) -> String {
    let key = key.to_ascii_lowercase();
    // Longest section names first so `work_cycle_` wins over a shorter match.
    let mut sections: Vec<&str> = SECTIONS.to_vec();
    sections.sort_by_key(|s| std::cmp::Reverse(s.len()));
    for section in sections {
        if let Some(rest) = key.strip_prefix(section).and_then(|r| r.strip_prefix('_')) {
            return format!("{section}.{rest}");
        }
    }
    key
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_keys_map_to_sections() {
        assert_eq!(
            map_env_key("RESPONDER_SEND_PACING_MS"),
            "responder.send_pacing_ms"
        );
        assert_eq!(map_env_key("WORK_CYCLE_INTERVAL_SECS"), "work_cycle.interval_secs");
        assert_eq!(map_env_key("ACCOUNTS_DEFAULT_2FA"), "accounts.default_2fa");
        assert_eq!(map_env_key("UNRELATED"), "unrelated");
    }

    #[test]
    fn uppercase_env_vars_override_sections() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("HERALD_RESPONDER_SEND_PACING_MS", "2500");
            jail.set_env("HERALD_WORK_CYCLE_INTERVAL_SECS", "90");
            let config: HeraldConfig = Figment::new()
                .merge(Serialized::defaults(HeraldConfig::default()))
                .merge(env_provider())
                .extract()?;
            assert_eq!(config.responder.send_pacing_ms, 2500);
            assert_eq!(config.work_cycle.interval_secs, 90);
            Ok(())
        });
    }

    #[test]
    fn local_file_has_highest_file_precedence() {
        let candidates = config_file_candidates();
        assert_eq!(candidates.last(), Some(&PathBuf::from("herald.toml")));
    }
}
