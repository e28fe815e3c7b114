use sea_orm::{DatabaseConnection, EntityTrait};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};
use tracing::warn;

use crate::entities::site_config;
use crate::error::StoreError;

/// Site-wide configuration, resolved as a three-layer cascade: hardcoded
/// defaults, overridden by `config.json`, overridden by `site_config` rows.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub store: StoreSection,
    pub contact: ContactSection,
    pub social: SocialSection,
    pub about: AboutSection,
    pub janitor: JanitorSection,
    pub server: ServerSection,
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig {
            store: StoreSection::default(),
            contact: ContactSection::default(),
            social: SocialSection::default(),
            about: AboutSection::default(),
            janitor: JanitorSection::default(),
            server: ServerSection::default(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreSection {
    pub name: String,
    pub title: String,
    pub description: String,
}

impl Default for StoreSection {
    fn default() -> Self {
        StoreSection {
            name: "Fashion Store".to_owned(),
            title: "Fashion Store - Online Clothing Store".to_owned(),
            description: "Your reliable partner in the world of fashion. \
                          Quality clothing at affordable prices."
                .to_owned(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactSection {
    pub phone: String,
    pub email: String,
    pub address: AddressSection,
}

impl Default for ContactSection {
    fn default() -> Self {
        ContactSection {
            phone: "+7 (800) 123-45-67".to_owned(),
            email: "info@fashionstore.ru".to_owned(),
            address: AddressSection::default(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct AddressSection {
    pub city: String,
    pub street: String,
    pub full: String,
}

impl Default for AddressSection {
    fn default() -> Self {
        AddressSection {
            city: "Tashkent".to_owned(),
            street: "Example Street, 1".to_owned(),
            full: "Tashkent, Example Street, 1".to_owned(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct SocialSection {
    pub instagram: String,
    pub facebook: String,
    pub twitter: String,
    pub vk: String,
}

impl Default for SocialSection {
    fn default() -> Self {
        SocialSection {
            instagram: "#".to_owned(),
            facebook: "#".to_owned(),
            twitter: "#".to_owned(),
            vk: "#".to_owned(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct AboutSection {
    pub title: String,
    pub description: String,
}

impl Default for AboutSection {
    fn default() -> Self {
        AboutSection {
            title: "About Us".to_owned(),
            description: "We are a modern fashion store.".to_owned(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct JanitorSection {
    /// Carts idle for at least this many days are eligible for cleanup.
    pub cart_ttl_days: i64,
    /// Minimum seconds between two sweeps.
    pub sweep_interval_secs: u64,
}

impl Default for JanitorSection {
    fn default() -> Self {
        JanitorSection {
            cart_ttl_days: 30,
            sweep_interval_secs: 3600,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    pub bind: String,
}

impl Default for ServerSection {
    fn default() -> Self {
        ServerSection {
            bind: "0.0.0.0:3000".to_owned(),
        }
    }
}

/// Shared, explicitly injected configuration handle. Handlers read a snapshot
/// with [`ConfigHandle::get`]; the admin API triggers [`ConfigHandle::reload`]
/// after editing either layer.
#[derive(Clone, Debug)]
pub struct ConfigHandle {
    inner: Arc<RwLock<StoreConfig>>,
    path: PathBuf,
}

impl ConfigHandle {
    /// Builds the handle from defaults and `config.json`. Database overrides
    /// apply on the first [`reload`](Self::reload) once a connection exists.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let mut root = defaults_value();
        merge_file_layer(&mut root, &path);
        let config = deserialize_or_default(root);

        ConfigHandle {
            inner: Arc::new(RwLock::new(config)),
            path,
        }
    }

    pub fn get(&self) -> StoreConfig {
        self.inner.read().expect("config lock poisoned").clone()
    }

    /// Re-reads `config.json` and the `site_config` table, replacing the
    /// shared snapshot with the merged result.
    pub async fn reload(&self, db: &DatabaseConnection) -> Result<StoreConfig, StoreError> {
        let mut root = defaults_value();
        merge_file_layer(&mut root, &self.path);

        let rows = site_config::Entity::find().all(db).await?;
        for row in rows {
            let section: Value = match serde_json::from_str(&row.value) {
                Ok(value) => value,
                Err(err) => {
                    warn!(section = %row.section, error = %err, "Skipping malformed site_config row");
                    continue;
                }
            };
            if let Some(map) = root.as_object_mut() {
                let slot = map.entry(row.section.clone()).or_insert(Value::Null);
                merge(slot, &section);
            }
        }

        let config = deserialize_or_default(root);
        *self.inner.write().expect("config lock poisoned") = config.clone();
        Ok(config)
    }
}

fn defaults_value() -> Value {
    serde_json::to_value(StoreConfig::default()).expect("default config serializes")
}

fn merge_file_layer(root: &mut Value, path: &std::path::Path) {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(_) => return, //missing file means defaults
    };
    match serde_json::from_str::<Value>(&raw) {
        Ok(file_value) => merge(root, &file_value),
        Err(err) => {
            warn!(path = %path.display(), error = %err, "Ignoring unparsable config.json");
        }
    }
}

fn deserialize_or_default(root: Value) -> StoreConfig {
    match serde_json::from_value(root) {
        Ok(config) => config,
        Err(err) => {
            warn!(error = %err, "Merged configuration did not deserialize, using defaults");
            StoreConfig::default()
        }
    }
}

/// Recursive JSON merge: objects merge key-wise, everything else overwrites.
fn merge(base: &mut Value, overlay: &Value) {
    match (base, overlay) {
        (Value::Object(base_map), Value::Object(overlay_map)) => {
            for (key, value) in overlay_map {
                merge(base_map.entry(key.clone()).or_insert(Value::Null), value);
            }
        }
        (slot, value) => *slot = value.clone(),
    }
}
