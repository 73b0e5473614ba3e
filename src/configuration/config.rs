#[cfg(test)]
#[path = "config_test.rs"]
mod tests;

use anyhow::Result;
use clap::ArgMatches;
use dashmap::DashMap;
use once_cell::sync::Lazy;
use strum::EnumIter;
use strum::IntoEnumIterator;
use tokio::fs;

static CONFIG: Lazy<DashMap<String, String>> = Lazy::new(DashMap::new);

#[derive(Clone, Copy, Eq, PartialEq, EnumIter, strum::Display)]
#[strum(serialize_all = "kebab-case")]
pub enum ConfigKey {
    ApiUrl,
    ConfigFile,
    StateDir,
}

pub struct Config {}

impl Config {
    pub fn get(key: ConfigKey) -> String {
        if let Some(val) = CONFIG.get(&key.to_string()) {
            return val.to_string();
        }

        return "".to_string();
    }

    pub fn set(key: ConfigKey, value: &str) {
        CONFIG.insert(key.to_string(), value.to_string());
    }

    pub fn default(key: ConfigKey) -> String {
        let res = match key {
            ConfigKey::ApiUrl => "http://localhost:8000".to_string(),
            ConfigKey::ConfigFile => dirs::config_dir()
                .unwrap()
                .join("courier/config.toml")
                .to_string_lossy()
                .to_string(),
            ConfigKey::StateDir => dirs::data_dir()
                .unwrap()
                .join("courier")
                .to_string_lossy()
                .to_string(),
        };

        return res;
    }

    /// Loads defaults, then the TOML config file, then command line
    /// arguments, each layer overriding the previous one.
    pub async fn load(matches: &ArgMatches) -> Result<()> {
        for key in ConfigKey::iter() {
            Config::set(key, &Config::default(key));
        }

        let mut config_file = Config::default(ConfigKey::ConfigFile);
        if let Some(arg_config_file) = matches.get_one::<String>(&ConfigKey::ConfigFile.to_string())
        {
            config_file = arg_config_file.to_string();
        }

        let config_path = std::path::PathBuf::from(config_file);
        if config_path.exists() {
            let toml_str = fs::read_to_string(config_path).await?;
            let doc = toml_str.parse::<toml_edit::Document>()?;

            for key in ConfigKey::iter() {
                if let Some(val) = doc.get(&key.to_string()) {
                    if let Some(val_str) = val.as_str() {
                        if val_str.is_empty() {
                            continue;
                        }
                        Config::set(key, val_str);
                    }
                }
            }
        }

        for key in ConfigKey::iter() {
            if let Ok(Some(val)) = matches.try_get_one::<String>(&key.to_string()) {
                if val.is_empty() {
                    continue;
                }
                Config::set(key, val);
            }
        }

        tracing::debug!(
            api_url = Config::get(ConfigKey::ApiUrl),
            state_dir = Config::get(ConfigKey::StateDir),
            "config"
        );

        return Ok(());
    }

    pub fn serialize_default() -> String {
        let toml_str = ConfigKey::iter()
            .filter_map(|key| {
                let description = match key {
                    ConfigKey::ApiUrl => "Base URL of the messaging platform backend.",
                    ConfigKey::StateDir => "Directory holding the persisted session.",
                    ConfigKey::ConfigFile => return None,
                };

                let val = Config::default(key);
                return Some(format!("# {description}\n{key} = \"{val}\""));
            })
            .collect::<Vec<String>>()
            .join("\n\n");

        return toml_str;
    }
}
