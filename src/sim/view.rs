//! Bound elements of a rendered page and how they follow the Store.

use crate::ast::{Node, NodeKind};
use crate::sim::coerce::to_number;
use crate::sim::store::Store;

/// How a bound element displays its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    /// Text content (`<span wce-bind>`).
    Text,
    /// User-editable value (`<input>`), never overwritten while focused.
    Editable,
    /// Numeric progress bar (`<progress>`), only accepts finite numbers.
    Progress,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BoundElement {
    pub key: String,
    pub kind: ElementKind,
    pub text: String,
    pub value: String,
    pub progress: f64,
    /// Visual "unbound" marker, present until the first value arrives.
    pub bind_hint: bool,
    pub focused: bool,
}

impl BoundElement {
    pub fn new(key: &str, kind: ElementKind) -> Self {
        Self {
            key: key.to_string(),
            kind,
            text: String::new(),
            value: String::new(),
            progress: 0.0,
            bind_hint: false,
            focused: false,
        }
    }

    fn show(&mut self, value: &str) {
        match self.kind {
            ElementKind::Editable => {
                if !self.focused && self.value != value {
                    self.value = value.to_string();
                }
            }
            ElementKind::Progress => {
                let n = to_number(value);
                if n.is_finite() {
                    self.progress = n;
                }
            }
            ElementKind::Text => {
                self.text = value.to_string();
                self.bind_hint = false;
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct View {
    elements: Vec<BoundElement>,
}

impl View {
    pub fn new(elements: Vec<BoundElement>) -> Self {
        Self { elements }
    }

    /// Collect the bound elements the renderer emits for `root`, in document order.
    pub fn from_document(root: &Node) -> Self {
        let mut elements = Vec::new();
        root.walk(&mut |node: &Node| {
            let Some(key) = node.bind.as_deref().filter(|k| !k.is_empty()) else {
                return;
            };
            let element = match node.kind {
                NodeKind::Text => {
                    let mut el = BoundElement::new(key, ElementKind::Text);
                    el.text = node.label.clone().unwrap_or_default();
                    el.bind_hint = node.label.is_none();
                    el
                }
                NodeKind::Input => BoundElement::new(key, ElementKind::Editable),
                NodeKind::Slider => {
                    // A range input starts at the middle of its 0..100 bounds.
                    let mut el = BoundElement::new(key, ElementKind::Editable);
                    el.value = "50".to_string();
                    el
                }
                NodeKind::Progress => BoundElement::new(key, ElementKind::Progress),
                _ => return,
            };
            elements.push(element);
        });
        Self { elements }
    }

    pub fn elements(&self) -> &[BoundElement] {
        &self.elements
    }

    pub fn element(&self, index: usize) -> Option<&BoundElement> {
        self.elements.get(index)
    }

    pub fn element_mut(&mut self, index: usize) -> Option<&mut BoundElement> {
        self.elements.get_mut(index)
    }

    /// Index of the first element bound to `key`.
    pub fn find(&self, key: &str) -> Option<usize> {
        self.elements.iter().position(|el| el.key == key)
    }

    /// Move input focus to `index` (or clear it with `None`).
    pub fn focus(&mut self, index: Option<usize>) {
        for (i, el) in self.elements.iter_mut().enumerate() {
            el.focused = Some(i) == index;
        }
    }

    /// Show the current Store values. Keys missing from the Store leave
    /// their elements untouched.
    pub fn refresh(&mut self, store: &Store) {
        for el in &mut self.elements {
            if let Some(value) = store.get(&el.key) {
                el.show(value);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse_document;

    fn view_of(source: &str) -> View {
        View::from_document(&parse_document(source).root)
    }

    #[test]
    fn test_from_document_collects_bindings() {
        let view = view_of(
            r#"
            wce_text("") { wce_bind("a"); }
            wce_text("label") { wce_bind("b"); }
            wce_input("type") { wce_bind("c"); }
            wce_slider() { wce_bind("d"); }
            wce_progress() { wce_bind("e"); }
            wce_button("x") { wce_bind("ignored"); }
            wce_text("plain");
            "#,
        );
        let keys: Vec<&str> = view.elements().iter().map(|e| e.key.as_str()).collect();
        assert_eq!(keys, vec!["a", "b", "c", "d", "e"]);
        assert!(view.elements()[0].bind_hint);
        assert!(!view.elements()[1].bind_hint);
        assert_eq!(view.elements()[1].text, "label");
        assert_eq!(view.elements()[3].kind, ElementKind::Editable);
        assert_eq!(view.elements()[4].kind, ElementKind::Progress);
    }

    #[test]
    fn test_refresh_rules() {
        let mut view = view_of(
            r#"
            wce_text() { wce_bind("t"); }
            wce_input() { wce_bind("i"); }
            wce_progress() { wce_bind("p"); }
            wce_text("keep") { wce_bind("absent"); }
            "#,
        );
        let mut store = Store::new();
        store.set("t", "hello");
        store.set("i", "typed");
        store.set("p", "40");
        view.refresh(&store);

        assert_eq!(view.elements()[0].text, "hello");
        assert!(!view.elements()[0].bind_hint);
        assert_eq!(view.elements()[1].value, "typed");
        assert_eq!(view.elements()[2].progress, 40.0);
        assert_eq!(view.elements()[3].text, "keep");

        store.set("p", "lots");
        view.refresh(&store);
        assert_eq!(view.elements()[2].progress, 40.0);
    }

    #[test]
    fn test_focused_input_is_not_overwritten() {
        let mut view = view_of(r#"wce_input() { wce_bind("i"); }"#);
        view.focus(Some(0));
        view.element_mut(0).unwrap().value = "half-typ".to_string();

        let mut store = Store::new();
        store.set("i", "server");
        view.refresh(&store);
        assert_eq!(view.elements()[0].value, "half-typ");

        view.focus(None);
        view.refresh(&store);
        assert_eq!(view.elements()[0].value, "server");
    }
}
