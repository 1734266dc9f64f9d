//! # Configuration de pmovirt
//!
//! Configuration YAML en trois couches, de la plus faible à la plus forte :
//! les valeurs par défaut embarquées, le fichier `config.yaml` du répertoire
//! de configuration, puis les variables `PMOVIRT_CONFIG__SECTION__KEY`.
//! Les clés sont insensibles à la casse.
//!
//! ```no_run
//! use pmoconfig::get_config;
//!
//! let config = get_config();
//! let api_url = config.get_api_url()?;
//! config.set_api_timeout_secs(60)?;
//! # Ok::<(), anyhow::Error>(())
//! ```

use anyhow::{Context, Result, anyhow};
use dirs::home_dir;
use lazy_static::lazy_static;
use serde_yaml::{Mapping, Number, Value};
use std::{
    env, fs,
    path::{Path, PathBuf},
    sync::{Arc, Mutex, MutexGuard},
};
use tracing::{debug, info};

const DEFAULT_CONFIG: &str = include_str!("pmovirt.yaml");
const CONFIG_FILE_NAME: &str = "config.yaml";

lazy_static! {
    static ref CONFIG: Arc<Config> =
        Arc::new(Config::load_config("").expect("Failed to load pmovirt configuration"));
}

const ENV_CONFIG_DIR: &str = "PMOVIRT_CONFIG";
const ENV_PREFIX: &str = "PMOVIRT_CONFIG__";
const CONFIG_DIR_NAME: &str = ".pmovirt";

const DEFAULT_API_URL: &str = "http://localhost/api";
const DEFAULT_API_TIMEOUT_SECS: u64 = 30;
const DEFAULT_LOG_MIN_LEVEL: &str = "INFO";

macro_rules! impl_u64_config {
    ($getter:ident, $setter:ident, $path:expr, $default:expr) => {
        pub fn $getter(&self) -> Result<u64> {
            let value = match self.get_value($path) {
                Ok(Value::Number(n)) => n.as_u64(),
                Ok(Value::String(s)) => s.trim().parse().ok(),
                _ => return Ok($default),
            };
            Ok(value.unwrap_or_else(|| {
                tracing::warn!(key = %$path.join("."), default = $default, "Invalid number, using default");
                $default
            }))
        }

        pub fn $setter(&self, value: u64) -> Result<()> {
            self.set_value($path, Value::Number(Number::from(value)))
        }
    };
}

macro_rules! impl_string_config {
    ($getter:ident, $setter:ident, $path:expr, $default:expr) => {
        pub fn $getter(&self) -> Result<String> {
            Ok(match self.get_value($path) {
                Ok(Value::String(s)) if !s.trim().is_empty() => s,
                _ => $default.to_string(),
            })
        }

        pub fn $setter(&self, value: &str) -> Result<()> {
            self.set_value($path, Value::String(value.to_string()))
        }
    };
}

/// Configuration persistée de pmovirt.
///
/// Chaque modification passe par [`Config::set_value`] et réécrit
/// immédiatement `config.yaml`.
#[derive(Debug)]
pub struct Config {
    config_dir: PathBuf,
    path: PathBuf,
    data: Mutex<Value>,
}

impl Clone for Config {
    fn clone(&self) -> Self {
        let data = match self.data.lock() {
            Ok(data) => data.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        };
        Self {
            config_dir: self.config_dir.clone(),
            path: self.path.clone(),
            data: Mutex::new(data),
        }
    }
}

impl Config {
    /// Candidate directories, most specific first.
    fn candidate_dirs(directory: &str) -> Vec<PathBuf> {
        let mut candidates = Vec::new();
        if !directory.is_empty() {
            candidates.push(PathBuf::from(directory));
        }
        if let Ok(from_env) = env::var(ENV_CONFIG_DIR) {
            candidates.push(PathBuf::from(from_env));
        }
        candidates.push(PathBuf::from(CONFIG_DIR_NAME));
        if let Some(home) = home_dir() {
            candidates.push(home.join(CONFIG_DIR_NAME));
        }
        candidates
    }

    /// Répertoire de configuration retenu, créé si besoin.
    ///
    /// Ordre de recherche : `directory` s'il n'est pas vide, puis la variable
    /// `PMOVIRT_CONFIG`, puis `.pmovirt` dans le répertoire courant, puis
    /// `.pmovirt` dans le répertoire personnel. Les deux premiers sont pris
    /// tels quels ; les suivants seulement s'ils existent déjà. À défaut,
    /// `.pmovirt` est créé dans le répertoire courant.
    pub fn config_dir(directory: &str) -> Result<PathBuf> {
        let explicit = usize::from(!directory.is_empty()) + usize::from(env::var_os(ENV_CONFIG_DIR).is_some());
        let candidates = Self::candidate_dirs(directory);
        let chosen = candidates
            .iter()
            .enumerate()
            .find(|(rank, dir)| *rank < explicit || dir.is_dir())
            .map(|(_, dir)| dir.clone())
            .unwrap_or_else(|| PathBuf::from(CONFIG_DIR_NAME));

        Self::ensure_writable_dir(&chosen)?;
        Ok(chosen)
    }

    fn ensure_writable_dir(dir: &Path) -> Result<()> {
        fs::create_dir_all(dir).with_context(|| format!("Cannot create {}", dir.display()))?;
        if !dir.is_dir() {
            return Err(anyhow!("{} is not a directory", dir.display()));
        }
        let marker = dir.join(".write_test");
        fs::write(&marker, b"")
            .and_then(|_| fs::remove_file(&marker))
            .with_context(|| format!("{} is not writable", dir.display()))
    }

    /// Charge la configuration depuis `directory` (vide pour la recherche
    /// par défaut), applique les surcharges d'environnement et réécrit le
    /// fichier fusionné.
    pub fn load_config(directory: &str) -> Result<Self> {
        let config_dir = Self::config_dir(directory)?;
        let path = config_dir.join(CONFIG_FILE_NAME);
        info!(config_dir = %config_dir.display(), "Using config directory");

        let mut data: Value = serde_yaml::from_str(DEFAULT_CONFIG)?;
        match fs::read_to_string(&path) {
            Ok(text) => {
                info!(config_file = %path.display(), "Loaded config file");
                let external: Value = serde_yaml::from_str(&text)
                    .with_context(|| format!("Invalid YAML in {}", path.display()))?;
                overlay(&mut data, external);
            }
            Err(_) => info!(config_file = %path.display(), "No config file, using embedded defaults"),
        }
        normalize_keys(&mut data);
        Self::apply_env_overrides(&mut data);

        let config = Config {
            config_dir,
            path,
            data: Mutex::new(data),
        };
        config.save()?;
        Ok(config)
    }

    /// Directory holding `config.yaml`.
    pub fn dir(&self) -> &Path {
        &self.config_dir
    }

    fn lock(&self) -> Result<MutexGuard<'_, Value>> {
        self.data
            .lock()
            .map_err(|_| anyhow!("Configuration lock poisoned"))
    }

    pub fn save(&self) -> Result<()> {
        let yaml = serde_yaml::to_string(&*self.lock()?)?;
        fs::write(&self.path, yaml).with_context(|| format!("Cannot write {}", self.path.display()))
    }

    /// Stores `value` under `path` (e.g. `&["api", "url"]`) and saves.
    pub fn set_value(&self, path: &[&str], value: Value) -> Result<()> {
        insert_at(&mut *self.lock()?, path, value)?;
        self.save()
    }

    /// Value stored under `path`, or an error naming the missing segment.
    pub fn get_value(&self, path: &[&str]) -> Result<Value> {
        let data = self.lock()?;
        let mut node = &*data;
        for (depth, key) in path.iter().enumerate() {
            let Value::Mapping(map) = node else {
                return Err(anyhow!("{} is not a section", path[..depth].join(".")));
            };
            node = map
                .get(key.to_lowercase().as_str())
                .ok_or_else(|| anyhow!("Path {} does not exist", path[..=depth].join(".")))?;
        }
        Ok(node.clone())
    }

    fn apply_env_overrides(data: &mut Value) {
        let mut overrides: Vec<(String, String)> = env::vars()
            .filter_map(|(key, value)| Some((key.strip_prefix(ENV_PREFIX)?.to_string(), value)))
            .collect();
        overrides.sort();

        for (key, raw) in overrides {
            let path: Vec<&str> = key.split("__").collect();
            let value = serde_yaml::from_str(&raw).unwrap_or(Value::String(raw.clone()));
            match insert_at(data, &path, value) {
                Ok(()) => debug!(key = %key, "Applied environment override"),
                Err(e) => debug!(key = %key, error = %e, "Skipped environment override"),
            }
        }
    }

    impl_string_config!(get_api_url, set_api_url, &["api", "url"], DEFAULT_API_URL);

    impl_u64_config!(
        get_api_timeout_secs,
        set_api_timeout_secs,
        &["api", "timeout_secs"],
        DEFAULT_API_TIMEOUT_SECS
    );

    impl_string_config!(
        get_log_min_level,
        set_log_min_level,
        &["logger", "min_level"],
        DEFAULT_LOG_MIN_LEVEL
    );
}

/// Returns the global configuration, loaded on first access.
///
/// # Panics
///
/// Panics on first access if no configuration directory can be prepared or
/// the configuration file cannot be parsed.
pub fn get_config() -> Arc<Config> {
    CONFIG.clone()
}

/// Inserts `value` at `path`, creating intermediate sections.
fn insert_at(root: &mut Value, path: &[&str], value: Value) -> Result<()> {
    let Some((last, parents)) = path.split_last() else {
        *root = value;
        return Ok(());
    };
    let mut node = root;
    for key in parents {
        let Value::Mapping(map) = node else {
            return Err(anyhow!("{key}: parent is not a section"));
        };
        node = map
            .entry(Value::String(key.to_lowercase()))
            .or_insert_with(|| Value::Mapping(Mapping::new()));
    }
    match node {
        Value::Mapping(map) => {
            map.insert(Value::String(last.to_lowercase()), value);
            Ok(())
        }
        _ => Err(anyhow!("{last}: parent is not a section")),
    }
}

/// Lays `upper` over `base`: sections are merged key by key, anything else
/// is replaced.
fn overlay(base: &mut Value, upper: Value) {
    match (base, upper) {
        (Value::Mapping(base_map), Value::Mapping(upper_map)) => {
            for (key, value) in upper_map {
                match base_map.get_mut(&key) {
                    Some(existing) => overlay(existing, value),
                    None => {
                        base_map.insert(key, value);
                    }
                }
            }
        }
        (slot, value) => *slot = value,
    }
}

fn normalize_keys(value: &mut Value) {
    match value {
        Value::Mapping(map) => {
            let entries = std::mem::take(map);
            for (key, mut child) in entries {
                normalize_keys(&mut child);
                let key = match key {
                    Value::String(s) => Value::String(s.to_lowercase()),
                    other => other,
                };
                map.insert(key, child);
            }
        }
        Value::Sequence(items) => items.iter_mut().for_each(normalize_keys),
        _ => {}
    }
}
