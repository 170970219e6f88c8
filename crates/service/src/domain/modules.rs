use std::collections::BTreeMap;

use serde::de::Error as _;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

const MODULES: &[(&str, &str)] = &[
    ("package_tour", "Package Tour"),
    ("rent_car", "Rent Car"),
    ("blog", "Blog"),
    ("attractions", "Attractions"),
    ("gallery", "Gallery"),
    ("office", "Office"),
];

const DEFAULT_ICON: &str = "-";

/// Display metadata for a feature module. On the wire it is a one-entry
/// map keyed by the module key: `{"blog": {"name": "Blog", "icon": "-"}}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleDescriptor {
    pub key: String,
    pub name: String,
    pub icon: String,
}

#[derive(Serialize)]
struct ModuleInfoRef<'a> {
    name: &'a str,
    icon: &'a str,
}

#[derive(Deserialize)]
struct ModuleInfo {
    name: String,
    #[serde(default)]
    icon: String,
}

impl Serialize for ModuleDescriptor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(&self.key, &ModuleInfoRef { name: &self.name, icon: &self.icon })?;
        map.end()
    }
}

impl<'de> Deserialize<'de> for ModuleDescriptor {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let mut entries = BTreeMap::<String, ModuleInfo>::deserialize(deserializer)?.into_iter();
        match (entries.next(), entries.next()) {
            (Some((key, info)), None) => Ok(Self { key, name: info.name, icon: info.icon }),
            _ => Err(D::Error::custom("module descriptor must hold exactly one key")),
        }
    }
}

pub fn describe(key: &str) -> Option<ModuleDescriptor> {
    MODULES.iter().find(|(k, _)| *k == key).map(|(k, name)| ModuleDescriptor {
        key: k.to_string(),
        name: name.to_string(),
        icon: DEFAULT_ICON.to_string(),
    })
}

/// Ordered module keys as enabled on a domain.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModuleKeys(Vec<String>);

impl ModuleKeys {
    /// Split the stored comma form; blanks and repeats are dropped.
    pub fn parse(stored: &str) -> Self {
        let mut keys: Vec<String> = Vec::new();
        for key in stored.split(',').map(str::trim).filter(|k| !k.is_empty()) {
            if !keys.iter().any(|k| k == key) {
                keys.push(key.to_string());
            }
        }
        Self(keys)
    }

    pub fn to_stored(&self) -> String {
        self.0.join(",")
    }

    /// Unknown keys contribute nothing.
    pub fn descriptors(&self) -> Vec<ModuleDescriptor> {
        self.0.iter().filter_map(|k| describe(k)).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}
