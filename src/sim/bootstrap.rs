//! Bootstrap payload: the JSON configuration embedded in a rendered page that
//! seeds the simulator.
//!
//! Host settings are untrusted, so [`Bootstrap::from_value`] keeps only the
//! well-formed parts instead of rejecting the whole payload.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;

use super::coerce::stringify;
use super::effect::EffectSet;
use crate::error::WebCeeError;

/// Global the page assigns the payload to.
pub const BOOTSTRAP_GLOBAL: &str = "__WEBCEE_SIM_BOOTSTRAP__";

pub const DEFAULT_POLL_INTERVAL_MS: u64 = 100;

pub type EffectTable = BTreeMap<String, EffectSet>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bootstrap {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poll_interval_ms: Option<f64>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub initial_data: BTreeMap<String, String>,
    /// Handler name -> effect(s).
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub handler_effects: EffectTable,
    /// Model key -> effect(s) run after that key is updated.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub model_update_effects: EffectTable,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub lists: BTreeMap<String, Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_trigger_log: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_model_update_log: Option<bool>,
}

impl Bootstrap {
    /// Build from arbitrary JSON, dropping malformed entries.
    pub fn from_value(value: &Value) -> Self {
        let Some(obj) = value.as_object() else {
            if !value.is_null() {
                log::warn!("ignoring non-object simulation bootstrap");
            }
            return Self::default();
        };

        Self {
            poll_interval_ms: obj.get("pollIntervalMs").and_then(Value::as_f64),
            initial_data: coerce_initial_data(obj.get("initialData")),
            handler_effects: coerce_effect_table(obj.get("handlerEffects"), "handlerEffects"),
            model_update_effects: coerce_effect_table(
                obj.get("modelUpdateEffects"),
                "modelUpdateEffects",
            ),
            lists: coerce_lists(obj.get("lists")),
            on_trigger_log: obj.get("onTriggerLog").and_then(Value::as_bool),
            on_model_update_log: obj.get("onModelUpdateLog").and_then(Value::as_bool),
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self, WebCeeError> {
        let value: Value = serde_json::from_str(json)?;
        Ok(Self::from_value(&value))
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, WebCeeError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| WebCeeError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// Poll interval in whole milliseconds, at least 1.
    pub fn poll_interval(&self) -> u64 {
        match self.poll_interval_ms {
            Some(ms) if ms.is_finite() => ms.max(1.0).round() as u64,
            _ => DEFAULT_POLL_INTERVAL_MS,
        }
    }

    /// JSON safe to inline in a `<script>` block.
    pub fn to_inline_json(&self) -> String {
        let json = serde_json::to_string(self).unwrap_or_else(|e| {
            log::warn!("failed to serialize simulation bootstrap: {}", e);
            "{}".to_string()
        });
        json.replace("</", "<\\/")
    }

    /// The single inline script that hands the payload to the page.
    pub fn to_script_tag(&self) -> String {
        format!(
            "<script>window.{} = {};</script>",
            BOOTSTRAP_GLOBAL,
            self.to_inline_json()
        )
    }
}

fn coerce_initial_data(value: Option<&Value>) -> BTreeMap<String, String> {
    let Some(obj) = value.and_then(Value::as_object) else {
        return BTreeMap::new();
    };
    obj.iter().map(|(k, v)| (k.clone(), stringify(v))).collect()
}

fn coerce_lists(value: Option<&Value>) -> BTreeMap<String, Vec<Value>> {
    let Some(obj) = value.and_then(Value::as_object) else {
        return BTreeMap::new();
    };
    let mut out = BTreeMap::new();
    for (name, list) in obj {
        match list {
            Value::Array(items) => {
                out.insert(name.clone(), items.clone());
            }
            _ => log::warn!("dropping list '{}': not an array", name),
        }
    }
    out
}

fn coerce_effect_table(value: Option<&Value>, field: &str) -> EffectTable {
    let Some(obj) = value.and_then(Value::as_object) else {
        return EffectTable::new();
    };
    let mut out = EffectTable::new();
    for (name, entry) in obj {
        let valid = match entry {
            Value::Array(items) => items.iter().all(is_valid_effect),
            other => is_valid_effect(other),
        };
        if !valid {
            log::warn!("dropping {} entry '{}': malformed effect", field, name);
            continue;
        }
        match serde_json::from_value::<EffectSet>(entry.clone()) {
            Ok(set) => {
                out.insert(name.clone(), set);
            }
            Err(e) => log::warn!("dropping {} entry '{}': {}", field, name, e),
        }
    }
    out
}

/// Structural check of one effect object, before typed deserialization.
fn is_valid_effect(value: &Value) -> bool {
    let Some(obj) = value.as_object() else {
        return false;
    };
    if !obj.get("key").is_some_and(Value::is_string) {
        return false;
    }
    match obj.get("type").and_then(Value::as_str) {
        Some("set") => obj.contains_key("val"),
        Some("setTemplate") => obj.get("template").is_some_and(Value::is_string),
        Some("inc") => matches!(obj.get("by"), None | Some(Value::Number(_))),
        Some("toggle") => true,
        _ => false,
    }
}
