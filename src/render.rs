//! Render Module
//!
//! Compiles a parsed document into a standalone HTML page: one element per
//! node, `wce-bind` attributes for bound values, a banner listing parse errors,
//! and the simulator bootstrap payload.

#[cfg(feature = "napi")]
use napi_derive::napi;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::ast::{Node, NodeKind};
use crate::parse::{parse_document, ParseError};
use crate::sim::bootstrap::Bootstrap;

/// At most this many errors are listed in the banner; the count shows all.
pub const MAX_BANNER_ERRORS: usize = 20;

const BASE_STYLES: &str = r#"  body{font-family:-apple-system,BlinkMacSystemFont,'Segoe UI',Roboto,sans-serif;margin:0;padding:20px;background:#f0f2f5;}
  .container{max-width:800px;margin:0 auto;}
  .row{display:flex;flex-wrap:wrap;margin:-10px;}
  .col{flex:1;padding:10px;min-width:200px;}
  .card{background:white;border-radius:8px;padding:20px;box-shadow:0 2px 4px rgba(0,0,0,0.1);margin-bottom:20px;}
  button{background:#007bff;color:white;border:none;padding:8px 16px;border-radius:4px;cursor:pointer;font-size:14px;}
  button:hover{background:#0056b3;}
  input{padding:8px;border:1px solid #ddd;border-radius:4px;width:100%;box-sizing:border-box;}
  .wce-errors{margin:0 0 16px 0;padding:12px 14px;border-radius:10px;background:#fff3cd;color:#664d03;border:1px solid #ffecb5;}
  .wce-errors__title{font-weight:700;margin-bottom:6px;}
  .wce-errors__list{margin:0;padding-left:18px;}
  .wce-errors__list li{font-family:ui-monospace,SFMono-Regular,Menlo,Monaco,Consolas,'Liberation Mono','Courier New',monospace;font-size:12px;line-height:1.4;}
  .bind-hint{opacity:.6;font-family:ui-monospace,SFMono-Regular,Menlo,Monaco,Consolas,'Liberation Mono','Courier New',monospace;}"#;

// ═══════════════════════════════════════════════════════════════════════════════
// INPUT/OUTPUT TYPES
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderOptions {
    /// URL of the page-side runtime script, emitted after the bootstrap.
    #[serde(default)]
    pub runtime_script_src: Option<String>,
    #[serde(default, deserialize_with = "lenient_bootstrap")]
    pub sim_bootstrap: Option<Bootstrap>,
}

fn lenient_bootstrap<'de, D>(deserializer: D) -> Result<Option<Bootstrap>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.map(|v| Bootstrap::from_value(&v)))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderOutput {
    pub html: String,
    /// Raw parse error messages, in order.
    pub errors: Vec<String>,
}

// ═══════════════════════════════════════════════════════════════════════════════
// NAPI EXPORTS
// ═══════════════════════════════════════════════════════════════════════════════

#[cfg(feature = "napi")]
#[napi]
pub fn render_to_html_native(source: String, options_json: String) -> napi::Result<serde_json::Value> {
    let options: RenderOptions = if options_json.trim().is_empty() {
        RenderOptions::default()
    } else {
        serde_json::from_str(&options_json).map_err(|e| napi::Error::from_reason(e.to_string()))?
    };
    serde_json::to_value(render_to_html(&source, &options))
        .map_err(|e| napi::Error::from_reason(e.to_string()))
}

// ═══════════════════════════════════════════════════════════════════════════════
// DOCUMENT
// ═══════════════════════════════════════════════════════════════════════════════

pub fn render_to_html(source: &str, options: &RenderOptions) -> RenderOutput {
    let parsed = parse_document(source);

    let mut body = String::new();
    render_children(&parsed.root, &mut body);

    let banner = error_banner(source, &parsed.errors);
    let bootstrap = options
        .sim_bootstrap
        .as_ref()
        .map(Bootstrap::to_script_tag)
        .unwrap_or_else(|| Bootstrap::default().to_script_tag());
    let runtime_tag = options
        .runtime_script_src
        .as_deref()
        .filter(|src| !src.is_empty())
        .map(|src| format!("<script src=\"{}\"></script>", escape_attr(src)))
        .unwrap_or_default();

    let html = format!(
        "<!doctype html>
<html>
<head>
<meta charset=\"utf-8\" />
<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\" />
<title>WebCee Preview</title>
<style>
{BASE_STYLES}
</style>
</head>
<body>
{banner}
<div id=\"app\">{body}</div>
{bootstrap}
{runtime_tag}
</body>
</html>"
    );

    log::debug!(
        "rendered {} bytes with {} parse error(s)",
        html.len(),
        parsed.errors.len()
    );

    RenderOutput {
        html,
        errors: parsed.errors.into_iter().map(|e| e.message).collect(),
    }
}

fn error_banner(source: &str, errors: &[ParseError]) -> String {
    if errors.is_empty() {
        return String::new();
    }
    let items: String = errors
        .iter()
        .take(MAX_BANNER_ERRORS)
        .map(|e| format!("<li>{}</li>", escape_html(&format_parse_error(source, e))))
        .collect();
    format!(
        "<div class=\"wce-errors\">\n  <div class=\"wce-errors__title\">Parse errors ({})</div>\n  <ul class=\"wce-errors__list\">{}</ul>\n</div>",
        errors.len(),
        items
    )
}

// ═══════════════════════════════════════════════════════════════════════════════
// NODES
// ═══════════════════════════════════════════════════════════════════════════════

fn render_children(node: &Node, out: &mut String) {
    for child in &node.children {
        render_node(child, out);
    }
}

fn render_node(node: &Node, out: &mut String) {
    let style = node
        .style
        .as_deref()
        .map(|s| format!(" style=\"{}\"", escape_attr(s)))
        .unwrap_or_default();
    let bind = node
        .bind
        .as_deref()
        .filter(|b| !b.is_empty())
        .map(|b| format!(" wce-bind=\"{}\"", escape_attr(b)))
        .unwrap_or_default();
    let label = node.label.as_deref().filter(|l| !l.is_empty());

    match node.kind {
        kind if kind.is_structural() => {
            out.push_str(&format!("<div class=\"{}\"{}>", kind, style));
            render_children(node, out);
            out.push_str("</div>");
        }
        NodeKind::Text => {
            let text = label.map(escape_html).unwrap_or_default();
            if bind.is_empty() {
                out.push_str(&format!("<span{}>{}</span>", style, text));
            } else {
                let hint = if label.is_some() { "" } else { " class=\"bind-hint\"" };
                out.push_str(&format!("<span{}{}{}>{}</span>", hint, bind, style, text));
            }
        }
        NodeKind::Button => {
            let text = label.map(escape_html).unwrap_or_else(|| "Button".to_string());
            let onclick = node
                .on_click
                .as_deref()
                .filter(|h| !h.is_empty())
                .map(|h| format!(" onclick=\"{}\"", escape_attr(&format!("trigger('{}')", escape_js(h)))))
                .unwrap_or_default();
            out.push_str(&format!("<button{}{}>{}</button>", style, onclick, text));
        }
        NodeKind::Input => {
            let placeholder = label
                .map(|l| format!(" placeholder=\"{}\"", escape_attr(l)))
                .unwrap_or_default();
            out.push_str(&format!("<input type=\"text\"{}{}{} />", style, placeholder, bind));
        }
        NodeKind::Slider => {
            out.push_str(&format!("<input type=\"range\" min=\"0\" max=\"100\"{}{} />", style, bind));
        }
        NodeKind::Progress => {
            out.push_str(&format!("<progress max=\"100\" value=\"0\"{}{}></progress>", style, bind));
        }
        _ => {
            out.push_str(&format!(
                "<div class=\"card\"{}><div class=\"bind-hint\">Unknown node</div>",
                style
            ));
            render_children(node, out);
            out.push_str("</div>");
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// ESCAPING & POSITIONS
// ═══════════════════════════════════════════════════════════════════════════════

pub fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

pub fn escape_attr(s: &str) -> String {
    escape_html(s).replace('"', "&quot;")
}

/// Escape for a single-quoted JavaScript string literal.
pub fn escape_js(s: &str) -> String {
    s.replace('\\', "\\\\").replace('\'', "\\'")
}

/// `L{line}:C{col} {message}`, both 1-based.
pub fn format_parse_error(source: &str, error: &ParseError) -> String {
    let (line, col) = offset_to_line_col(source, error.at);
    format!("L{}:C{} {}", line + 1, col + 1, error.message)
}

/// Zero-based line and column (in characters) of a byte offset. Offsets past
/// the end are clamped.
pub fn offset_to_line_col(source: &str, offset: usize) -> (usize, usize) {
    let mut end = offset.min(source.len());
    while !source.is_char_boundary(end) {
        end -= 1;
    }
    let before = &source[..end];
    let line = before.matches('\n').count();
    let line_start = before.rfind('\n').map(|i| i + 1).unwrap_or(0);
    (line, before[line_start..].chars().count())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body_of(html: &str) -> &str {
        let start = html.find("<div id=\"app\">").unwrap() + "<div id=\"app\">".len();
        let end = html.find("</div>\n<script>").unwrap();
        &html[start..end]
    }

    fn render(source: &str) -> RenderOutput {
        render_to_html(source, &RenderOptions::default())
    }

    #[test]
    fn test_button_with_handler() {
        let out = render(r#"wce_button("Go") { wce_on_click("doit"); }"#);
        assert!(out.errors.is_empty());
        assert_eq!(body_of(&out.html), r#"<button onclick="trigger('doit')">Go</button>"#);
    }

    #[test]
    fn test_button_defaults_and_escaping() {
        let out = render(r#"wce_button() { wce_on_click("it's\"x"); }"#);
        assert_eq!(
            body_of(&out.html),
            r#"<button onclick="trigger('it\'s&quot;x')">Button</button>"#
        );
    }

    #[test]
    fn test_layout_and_styles() {
        let out = render(
            r#"wce_row() { wce_css("gap: 4px"); wce_col() { wce_card() { wce_panel(); } } }"#,
        );
        assert_eq!(
            body_of(&out.html),
            r#"<div class="row" style="gap: 4px"><div class="col"><div class="card"><div class="panel"></div></div></div></div>"#
        );
    }

    #[test]
    fn test_bound_elements() {
        let out = render(
            r#"
            wce_text("<b>") ;
            wce_text() { wce_bind("count"); }
            wce_text("Hi") { wce_bind("greet"); }
            wce_input("Your \"name\"") { wce_bind("name"); }
            wce_slider() { wce_bind("level"); }
            wce_progress() { wce_bind("pct"); }
            "#,
        );
        assert_eq!(
            body_of(&out.html),
            concat!(
                "<span>&lt;b&gt;</span>",
                r#"<span class="bind-hint" wce-bind="count"></span>"#,
                r#"<span wce-bind="greet">Hi</span>"#,
                r#"<input type="text" placeholder="Your &quot;name&quot;" wce-bind="name" />"#,
                r#"<input type="range" min="0" max="100" wce-bind="level" />"#,
                r#"<progress max="100" value="0" wce-bind="pct"></progress>"#,
            )
        );
    }

    #[test]
    fn test_unknown_node() {
        let out = render(r#"wce_frobnicate("y") { wce_text("in"); }"#);
        assert_eq!(
            body_of(&out.html),
            r#"<div class="card"><div class="bind-hint">Unknown node</div><span>in</span></div>"#
        );
    }

    #[test]
    fn test_error_banner() {
        let out = render("wce_text(\"a\");\nwce_card(\"x\") {");
        assert_eq!(out.errors, vec!["Expected '}'".to_string()]);
        assert!(out.html.contains("Parse errors (1)"));
        assert!(out.html.contains("<li>L2:C16 Expected '}'</li>"));
    }

    #[test]
    fn test_banner_lists_at_most_twenty() {
        let source = "wce_card() {".repeat(25);
        let out = render(&source);
        assert_eq!(out.errors.len(), 25);
        assert!(out.html.contains("Parse errors (25)"));
        assert_eq!(out.html.matches("<li>").count(), MAX_BANNER_ERRORS);
    }

    #[test]
    fn test_no_banner_without_errors() {
        let out = render(r#"wce_text("ok");"#);
        assert!(!out.html.contains("wce-errors\">"));
    }

    #[test]
    fn test_bootstrap_and_runtime_script() {
        let options: RenderOptions = serde_json::from_str(
            r#"{"runtimeScriptSrc": "runtime.js?a=1&b=2", "simBootstrap": {"initialData": {"x": 1}}}"#,
        )
        .unwrap();
        let out = render_to_html("", &options);
        assert!(out
            .html
            .contains(r#"<script>window.__WEBCEE_SIM_BOOTSTRAP__ = {"initialData":{"x":"1"}};</script>"#));
        assert!(out.html.contains(r#"<script src="runtime.js?a=1&amp;b=2"></script>"#));

        let plain = render("");
        assert!(plain.html.contains("window.__WEBCEE_SIM_BOOTSTRAP__ = {};"));
        assert!(!plain.html.contains("<script src="));
    }

    #[test]
    fn test_offset_to_line_col() {
        let source = "ab\nçd\n";
        assert_eq!(offset_to_line_col(source, 0), (0, 0));
        assert_eq!(offset_to_line_col(source, 3), (1, 0));
        assert_eq!(offset_to_line_col(source, 5), (1, 1));
        assert_eq!(offset_to_line_col(source, 4), (1, 0));
        assert_eq!(offset_to_line_col(source, 999), (2, 0));
    }
}
