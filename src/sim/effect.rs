//! Declarative Store mutations run by handlers and model-update hooks.

use lazy_static::lazy_static;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::coerce::{number_to_string, stringify, to_number};
use super::store::Store;

lazy_static! {
    static ref TEMPLATE_VAR_RE: Regex = Regex::new(r"\$\{(val|arg|key|len|reversed)\}").unwrap();
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Effect {
    Set {
        key: String,
        val: Value,
    },
    SetTemplate {
        key: String,
        template: String,
    },
    Inc {
        key: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        by: Option<f64>,
    },
    Toggle {
        key: String,
    },
    /// Any other `type`; applying it does nothing.
    #[serde(other)]
    Unrecognized,
}

/// What a handler or hook is configured with: one effect or an ordered list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EffectSet {
    One(Effect),
    Many(Vec<Effect>),
}

impl EffectSet {
    pub fn effects(&self) -> &[Effect] {
        match self {
            EffectSet::One(effect) => std::slice::from_ref(effect),
            EffectSet::Many(effects) => effects,
        }
    }
}

impl From<Effect> for EffectSet {
    fn from(effect: Effect) -> Self {
        EffectSet::One(effect)
    }
}

impl From<Vec<Effect>> for EffectSet {
    fn from(effects: Vec<Effect>) -> Self {
        EffectSet::Many(effects)
    }
}

/// Per-invocation values available to `setTemplate`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Context {
    pub val: String,
    pub arg: String,
    pub key: String,
}

impl Context {
    /// Context of a model-update hook for `key` receiving `val`.
    pub fn for_update(key: &str, val: &str) -> Self {
        Self {
            val: val.to_string(),
            arg: String::new(),
            key: key.to_string(),
        }
    }

    /// Context of an event handler invoked with `arg`.
    pub fn for_trigger(arg: &str) -> Self {
        Self {
            val: String::new(),
            arg: arg.to_string(),
            key: String::new(),
        }
    }
}

impl Effect {
    pub fn apply(&self, store: &mut Store, ctx: &Context) {
        match self {
            Effect::Set { key, val } => store.set(key.as_str(), stringify(val)),
            Effect::SetTemplate { key, template } => {
                store.set(key.as_str(), render_template(template, ctx));
            }
            Effect::Inc { key, by } => {
                let prev = store.get(key).map(to_number).unwrap_or(0.0);
                let delta = by.filter(|d| d.is_finite()).unwrap_or(1.0);
                store.set(key.as_str(), number_to_string(prev + delta));
            }
            Effect::Toggle { key } => {
                let next = if store.get(key) == Some("true") { "false" } else { "true" };
                store.set(key.as_str(), next);
            }
            Effect::Unrecognized => {}
        }
    }
}

impl EffectSet {
    /// Apply every effect in order against the same store and context.
    pub fn apply(&self, store: &mut Store, ctx: &Context) {
        for effect in self.effects() {
            effect.apply(store, ctx);
        }
    }
}

/// Substitute `${val}`, `${arg}`, `${key}`, `${len}` and `${reversed}`.
/// Other `${...}` sequences are left as written.
pub fn render_template(template: &str, ctx: &Context) -> String {
    TEMPLATE_VAR_RE
        .replace_all(template, |caps: &Captures| match &caps[1] {
            "val" => ctx.val.clone(),
            "arg" => ctx.arg.clone(),
            "key" => ctx.key.clone(),
            "len" => ctx.val.chars().count().to_string(),
            "reversed" => ctx.val.chars().rev().collect(),
            _ => String::new(),
        })
        .into_owned()
}
