//! The simulated page: a [`Session`] answering API calls, the [`View`] it
//! keeps in sync, and a poll timer driven by a virtual clock.

use serde_json::{Map, Value};

use super::api::{encode_component, Request, Response};
use super::bootstrap::Bootstrap;
use super::coerce::stringify;
use super::session::Session;
use super::store::Store;
use super::view::{ElementKind, View};
use crate::parse::parse_document;

#[derive(Debug, Clone)]
pub struct Runtime {
    session: Session,
    view: View,
    poll_interval_ms: u64,
    clock_ms: u64,
}

impl Runtime {
    pub fn new(bootstrap: &Bootstrap, view: View) -> Self {
        Self {
            session: Session::new(bootstrap),
            view,
            poll_interval_ms: bootstrap.poll_interval(),
            clock_ms: 0,
        }
    }

    /// Parse `source` and simulate the page it renders to. Parse errors do
    /// not stop the simulation; whatever tree was recovered is used.
    pub fn from_source(source: &str, bootstrap: &Bootstrap) -> Self {
        let parsed = parse_document(source);
        Self::new(bootstrap, View::from_document(&parsed.root))
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn store(&self) -> &Store {
        self.session.store()
    }

    pub fn view(&self) -> &View {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut View {
        &mut self.view
    }

    pub fn poll_interval_ms(&self) -> u64 {
        self.poll_interval_ms
    }

    /// Seed editable bindings, paint the initial values, then pull once.
    pub fn boot(&mut self) {
        let editable: Vec<String> = self
            .view
            .elements()
            .iter()
            .filter(|el| el.kind == ElementKind::Editable)
            .map(|el| el.key.clone())
            .collect();
        let store = self.session.store_mut();
        for key in editable {
            if !store.contains(&key) {
                store.set(key, "");
            }
        }
        self.view.refresh(self.session.store());
        self.sync();
    }

    /// Send a request the way the page would. Requests outside the API
    /// prefix are not answered.
    pub fn fetch(&mut self, req: &Request) -> Option<Response> {
        let handled = self.session.dispatch(req)?;
        if handled.refresh_view {
            self.view.refresh(self.session.store());
        }
        Some(handled.response)
    }

    /// A button press: post the trigger, then pull fresh data regardless of
    /// the outcome.
    pub fn trigger(&mut self, event: &str, arg: Option<&str>) -> Option<Response> {
        let mut url = format!("/api/trigger?event={}", encode_component(event));
        if let Some(arg) = arg.filter(|a| !a.is_empty()) {
            url.push_str("&arg=");
            url.push_str(&encode_component(arg));
        }
        let response = self.fetch(&Request::post(&url));
        self.sync();
        response
    }

    /// Pull `/api/data` and write every entry back into the Store.
    pub fn sync(&mut self) {
        let Some(response) = self.fetch(&Request::get("/api/data")) else {
            return;
        };
        if !response.is_success() {
            log::debug!("sync skipped: status {}", response.status);
            return;
        }
        let data: Map<String, Value> = match serde_json::from_str(&response.body) {
            Ok(data) => data,
            Err(e) => {
                log::debug!("sync skipped: {}", e);
                return;
            }
        };
        let store = self.session.store_mut();
        for (key, value) in &data {
            store.set(key.as_str(), stringify(value));
        }
        self.view.refresh(self.session.store());
    }

    /// The user edited the element at `index` and committed the change.
    pub fn change(&mut self, index: usize, value: &str) {
        let Some(el) = self.view.element_mut(index) else {
            return;
        };
        if el.kind != ElementKind::Editable {
            return;
        }
        el.value = value.to_string();
        let url = format!(
            "/api/update?key={}&val={}",
            encode_component(&el.key),
            encode_component(value)
        );
        if let Some(response) = self.fetch(&Request::post(&url)) {
            if !response.is_success() {
                log::debug!("update for '{}' failed: {}", url, response.body);
            }
        }
    }

    /// Move the virtual clock forward, running one sync per elapsed poll
    /// interval. Returns the number of syncs run.
    pub fn advance(&mut self, ms: u64) -> u64 {
        let before = self.clock_ms / self.poll_interval_ms;
        self.clock_ms = self.clock_ms.saturating_add(ms);
        let ticks = self.clock_ms / self.poll_interval_ms - before;
        for _ in 0..ticks {
            self.sync();
        }
        ticks
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const PAGE: &str = r#"
        wce_container() {
            wce_text("") { wce_bind("count"); }
            wce_input("Name") { wce_bind("name"); }
            wce_progress() { wce_bind("pct"); }
            wce_text() { wce_bind("greeting"); }
            wce_button("+") { wce_on_click("inc"); }
        }
    "#;

    fn runtime() -> Runtime {
        let bootstrap = Bootstrap::from_value(&json!({
            "pollIntervalMs": 50,
            "initialData": {"count": "3", "pct": "10"},
            "handlerEffects": {
                "inc": {"type": "inc", "key": "count", "by": 2},
                "greet": {"type": "setTemplate", "key": "greeting", "template": "hi ${arg}"}
            },
            "modelUpdateEffects": {
                "name": {"type": "setTemplate", "key": "greeting", "template": "hello ${val}"}
            }
        }));
        let mut rt = Runtime::from_source(PAGE, &bootstrap);
        rt.boot();
        rt
    }

    #[test]
    fn test_boot_seeds_and_paints() {
        let rt = runtime();
        assert_eq!(rt.store().get("name"), Some(""));
        assert_eq!(rt.store().get("greeting"), None);
        assert_eq!(rt.view().elements()[0].text, "3");
        assert_eq!(rt.view().elements()[2].progress, 10.0);
        assert!(rt.view().elements()[3].bind_hint);
    }

    #[test]
    fn test_trigger_refreshes_view() {
        let mut rt = runtime();
        let response = rt.trigger("inc", None).unwrap();
        assert_eq!(response, Response::ok());
        assert_eq!(rt.store().get("count"), Some("5"));
        assert_eq!(rt.view().elements()[0].text, "5");

        rt.trigger("greet", Some("a b&c"));
        assert_eq!(rt.store().get("greeting"), Some("hi a b&c"));
    }

    #[test]
    fn test_change_posts_update_and_runs_hook() {
        let mut rt = runtime();
        let input = rt.view().find("name").unwrap();
        rt.change(input, "ada");
        assert_eq!(rt.store().get("name"), Some("ada"));
        assert_eq!(rt.store().get("greeting"), Some("hello ada"));
        assert_eq!(rt.view().elements()[3].text, "hello ada");
    }

    #[test]
    fn test_update_without_val_does_not_mutate() {
        let mut rt = runtime();
        let before = rt.store().clone();
        let response = rt.fetch(&Request::post("/api/update?key=count")).unwrap();
        assert_eq!(response.status, 400);
        assert_eq!(response.body, "Missing params");
        assert_eq!(rt.store(), &before);
    }

    #[test]
    fn test_non_api_requests_pass_through() {
        let mut rt = runtime();
        assert!(rt.fetch(&Request::get("/style.css")).is_none());
    }

    #[test]
    fn test_advance_runs_one_sync_per_interval() {
        let mut rt = runtime();
        assert_eq!(rt.poll_interval_ms(), 50);
        assert_eq!(rt.advance(20), 0);
        assert_eq!(rt.advance(30), 1);
        assert_eq!(rt.advance(125), 2);

        rt.session.store_mut().set("count", "42");
        rt.advance(50);
        assert_eq!(rt.view().elements()[0].text, "42");
    }

    #[test]
    fn test_poll_keeps_focused_input() {
        let mut rt = runtime();
        let input = rt.view().find("name").unwrap();
        rt.view_mut().focus(Some(input));
        rt.view_mut().element_mut(input).unwrap().value = "typing".to_string();
        rt.session.store_mut().set("name", "remote");
        rt.advance(50);
        assert_eq!(rt.view().elements()[input].value, "typing");
    }
}
