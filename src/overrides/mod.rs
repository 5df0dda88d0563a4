//! Per-tenant and per-subscription value substitution.
//!
//! Overrides are loaded once from a directory of YAML files and are
//! read-only afterwards. Resolution is a fold over an override's rules
//! in file order: the first rule whose matchers all accept the entity
//! wins, otherwise the override's default applies.

use crate::error::{Error, Result};
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap, HashSet};

mod read;

pub use read::read_from_dir;


/// Name of the map override pinning Linux node image versions per distro.
pub const LINUX_NODE_IMAGE_VERSION: &str = "linux-node-image-version";

/// Attribute of an [`Entity`] that a matcher can test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityField {
    SubscriptionId,
    TenantId,
}

impl EntityField {
    /// Case-insensitive lookup of a matcher `field` value.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "subscriptionid" => Some(EntityField::SubscriptionId),
            "tenantid" => Some(EntityField::TenantId),
            _ => None,
        }
    }
}

/// Request-time dispatch key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Entity {
    pub subscription_id: String,
    pub tenant_id: String,
}

impl Entity {
    pub fn new(subscription_id: impl Into<String>, tenant_id: impl Into<String>) -> Self {
        Self {
            subscription_id: subscription_id.into(),
            tenant_id: tenant_id.into(),
        }
    }

    pub fn field(&self, field: EntityField) -> &str {
        match field {
            EntityField::SubscriptionId => &self.subscription_id,
            EntityField::TenantId => &self.tenant_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Matcher {
    pub field: EntityField,
    pub raw_values: Vec<String>,
    pub values: HashSet<String>,
}

impl Matcher {
    pub fn matches(&self, entity: &Entity) -> bool {
        self.values.contains(entity.field(self.field))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Rule {
    pub matchers: Vec<Matcher>,
    pub value: String,
    pub map_value: BTreeMap<String, String>,
}

impl Rule {
    pub fn satisfied_by(&self, entity: &Entity) -> bool {
        self.matchers.iter().all(|m| m.matches(entity))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Override {
    pub rules: Vec<Rule>,
    pub default_value: String,
    pub default_map_value: BTreeMap<String, String>,
}

impl Override {
    fn first_match(&self, entity: &Entity) -> Option<&Rule> {
        self.rules.iter().find(|rule| rule.satisfied_by(entity))
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawMatcher {
    field: String,
    #[serde(default)]
    values: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawRule {
    #[serde(default)]
    matchers: Vec<RawMatcher>,
    #[serde(default)]
    value: String,
    #[serde(default)]
    map_value: BTreeMap<String, String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawOverride {
    #[serde(default)]
    rules: Vec<RawRule>,
    #[serde(default)]
    default_value: String,
    #[serde(default)]
    default_map_value: BTreeMap<String, String>,
}

impl TryFrom<RawMatcher> for Matcher {
    type Error = Error;

    fn try_from(raw: RawMatcher) -> Result<Self> {
        let field = EntityField::from_name(&raw.field)
            .ok_or_else(|| Error::UnknownMatcherField(raw.field.clone()))?;
        let values = raw.values.iter().cloned().collect();
        Ok(Matcher {
            field,
            raw_values: raw.values,
            values,
        })
    }
}

impl TryFrom<RawOverride> for Override {
    type Error = Error;

    fn try_from(raw: RawOverride) -> Result<Self> {
        let rules = raw
            .rules
            .into_iter()
            .map(|rule| {
                Ok(Rule {
                    matchers: rule
                        .matchers
                        .into_iter()
                        .map(Matcher::try_from)
                        .collect::<Result<_>>()?,
                    value: rule.value,
                    map_value: rule.map_value,
                })
            })
            .collect::<Result<_>>()?;
        Ok(Override {
            rules,
            default_value: raw.default_value,
            default_map_value: raw.default_map_value,
        })
    }
}

/// All overrides keyed by name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overrides {
    pub overrides: HashMap<String, Override>,
}

impl Overrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.overrides.is_empty()
    }

    pub fn get_string(&self, name: &str, entity: &Entity) -> String {
        match self.overrides.get(name) {
            Some(o) => o
                .first_match(entity)
                .map(|rule| rule.value.clone())
                .unwrap_or_else(|| o.default_value.clone()),
            None => String::new(),
        }
    }

    pub fn get_map(&self, name: &str, entity: &Entity) -> BTreeMap<String, String> {
        match self.overrides.get(name) {
            Some(o) => o
                .first_match(entity)
                .map(|rule| rule.map_value.clone())
                .unwrap_or_else(|| o.default_map_value.clone()),
            None => BTreeMap::new(),
        }
    }

    /// Distro name to SIG image version pins for `entity`.
    pub fn linux_node_image_version(&self, entity: &Entity) -> BTreeMap<String, String> {
        self.get_map(LINUX_NODE_IMAGE_VERSION, entity)
    }
}
