//! Authoring diagnostics built on top of [`crate::analyze`].
//!
//! The host supplies the handler names and data keys it found in the companion
//! native project; an empty set switches the matching resolution check off.

#[cfg(feature = "napi")]
use napi_derive::napi;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::analyze::{analyze, ByteRange};
use crate::ast::{NodeKind, PropertyCall};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    pub range: ByteRange,
}

impl Diagnostic {
    fn error(range: ByteRange, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            message: message.into(),
            range,
        }
    }

    fn warning(range: ByteRange, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            message: message.into(),
            range,
        }
    }
}

/// Symbols indexed from the companion native project.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSymbols {
    #[serde(default)]
    pub event_handlers: HashSet<String>,
    #[serde(default)]
    pub data_keys: HashSet<String>,
}

/// Diagnostics for `source`, in analysis order.
///
/// The `wce_bind` placement warning accepts slider and progress as well as
/// text and input. Its message reads `wce_bind() should be used inside a
/// bindable component (...)`, not the older `wce_bind() is typically used
/// inside wce_text() or wce_input() block`; hosts matching on message text
/// need the new wording.
pub fn lint(source: &str, symbols: &ProjectSymbols) -> Vec<Diagnostic> {
    let analysis = analyze(source);
    let len = source.len();
    let mut diagnostics = Vec::new();

    if analysis.brace_delta != 0 {
        let message = if analysis.brace_delta > 0 {
            "Missing closing brace(s)"
        } else {
            "Extra closing brace(s)"
        };
        diagnostics.push(Diagnostic::error(ByteRange::new(0, 1).clamp(len), message));
    }

    for unknown in &analysis.unknown_calls {
        diagnostics.push(Diagnostic::warning(
            unknown.range.clamp(len),
            format!("Unknown WebCee call: {}", unknown.name),
        ));
    }

    for usage in &analysis.props {
        let call_range = usage.call_range.clamp(len);
        let value_range = usage.value_range.map(|r| r.clamp(len)).unwrap_or(call_range);
        let value = usage.value.as_deref().filter(|v| !v.is_empty());

        match usage.name {
            PropertyCall::OnClick => {
                if usage.in_component != NodeKind::Button {
                    diagnostics.push(Diagnostic::warning(
                        call_range,
                        "wce_on_click() should be used inside wce_button() block",
                    ));
                }
                if let Some(handler) = value {
                    if !symbols.event_handlers.is_empty() && !symbols.event_handlers.contains(handler) {
                        diagnostics.push(Diagnostic::warning(
                            value_range,
                            format!("on_click handler not found in C project: {}", handler),
                        ));
                    }
                }
            }
            PropertyCall::Bind => {
                if !usage.in_component.is_bindable() {
                    diagnostics.push(Diagnostic::warning(
                        call_range,
                        "wce_bind() should be used inside a bindable component (text, input, slider, progress)",
                    ));
                }
                if let Some(key) = value {
                    if !symbols.data_keys.is_empty() && !symbols.data_keys.contains(key) {
                        diagnostics.push(Diagnostic::warning(
                            value_range,
                            format!("bind key not found in C project: {}", key),
                        ));
                    }
                }
            }
            PropertyCall::Css => {}
        }
    }

    diagnostics
}

#[cfg(feature = "napi")]
#[napi]
pub fn lint_native(source: String, symbols_json: String) -> napi::Result<serde_json::Value> {
    let symbols: ProjectSymbols = if symbols_json.trim().is_empty() {
        ProjectSymbols::default()
    } else {
        serde_json::from_str(&symbols_json).map_err(|e| napi::Error::from_reason(e.to_string()))?
    };
    serde_json::to_value(lint(&source, &symbols)).map_err(|e| napi::Error::from_reason(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn symbols(handlers: &[&str], keys: &[&str]) -> ProjectSymbols {
        ProjectSymbols {
            event_handlers: handlers.iter().map(|s| s.to_string()).collect(),
            data_keys: keys.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_clean_document_has_no_diagnostics() {
        let source = r#"
            wce_card("c") {
                wce_text("") { wce_bind("count"); }
                wce_button("Go") { wce_on_click("inc"); }
            }
        "#;
        assert!(lint(source, &symbols(&["inc"], &["count"])).is_empty());
    }

    #[test]
    fn test_brace_errors() {
        let missing = lint("wce_card() {", &ProjectSymbols::default());
        assert_eq!(missing.len(), 1);
        assert_eq!(missing[0].severity, Severity::Error);
        assert_eq!(missing[0].message, "Missing closing brace(s)");
        assert_eq!(missing[0].range, ByteRange::new(0, 1));

        let extra = lint("}", &ProjectSymbols::default());
        assert_eq!(extra[0].message, "Extra closing brace(s)");
    }

    #[test]
    fn test_misplaced_properties_warn() {
        let diags = lint(
            r#"wce_card("x") { wce_on_click("go"); wce_bind("k"); }"#,
            &ProjectSymbols::default(),
        );
        assert_eq!(diags.len(), 2);
        assert!(diags.iter().all(|d| d.severity == Severity::Warning));
        assert!(diags[0].message.starts_with("wce_on_click()"));
        assert!(diags[1].message.starts_with("wce_bind()"));
    }

    #[test]
    fn test_unresolved_symbols_point_at_value() {
        let source = r#"wce_button("b") { wce_on_click("nope"); }"#;
        let diags = lint(source, &symbols(&["inc"], &[]));
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].message, "on_click handler not found in C project: nope");
        assert_eq!(&source[diags[0].range.start..diags[0].range.end], "\"nope\"");
    }

    #[test]
    fn test_unknown_call_warning() {
        let diags = lint(r#"wce_frobnicate("y");"#, &ProjectSymbols::default());
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].message, "Unknown WebCee call: wce_frobnicate");
    }

    #[test]
    fn test_unresolved_bind_key_points_at_value() {
        let source = r#"wce_text() { wce_bind("missing"); }"#;
        let diags = lint(source, &symbols(&[], &["count"]));
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].severity, Severity::Warning);
        assert_eq!(diags[0].message, "bind key not found in C project: missing");
        assert_eq!(&source[diags[0].range.start..diags[0].range.end], "\"missing\"");
    }

    #[test]
    fn test_bind_inside_slider_and_progress_is_placed_correctly() {
        let source = r#"
            wce_slider() { wce_bind("level"); }
            wce_progress() { wce_bind("level"); }
            wce_input("n") { wce_bind("level"); }
        "#;
        assert!(lint(source, &symbols(&[], &["level"])).is_empty());
    }
}
