//! Simulated backend state and the local request dispatcher.

use serde_json::Value;
use std::collections::BTreeMap;

use super::api::{Request, Response};
use super::bootstrap::{Bootstrap, EffectTable};
use super::effect::Context;
use super::store::Store;

/// Outcome of a handled request. Mutating endpoints ask the caller to refresh
/// the view once all effects have been applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Handled {
    pub response: Response,
    pub refresh_view: bool,
}

impl Handled {
    fn reply(response: Response) -> Self {
        Self {
            response,
            refresh_view: false,
        }
    }

    fn mutated(response: Response) -> Self {
        Self {
            response,
            refresh_view: true,
        }
    }
}

/// Owns the Store and the effect tables for the lifetime of a simulated page.
#[derive(Debug, Clone)]
pub struct Session {
    store: Store,
    handler_effects: EffectTable,
    model_update_effects: EffectTable,
    lists: BTreeMap<String, Vec<Value>>,
    log_triggers: bool,
    log_model_updates: bool,
}

impl Session {
    pub fn new(bootstrap: &Bootstrap) -> Self {
        Self {
            store: Store::from_map(bootstrap.initial_data.clone()),
            handler_effects: bootstrap.handler_effects.clone(),
            model_update_effects: bootstrap.model_update_effects.clone(),
            lists: bootstrap.lists.clone(),
            log_triggers: bootstrap.on_trigger_log != Some(false),
            log_model_updates: bootstrap.on_model_update_log != Some(false),
        }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut Store {
        &mut self.store
    }

    /// Answer a request under the API prefix. Anything else is not ours and
    /// returns `None` so the caller can pass it through.
    pub fn dispatch(&mut self, req: &Request) -> Option<Handled> {
        if !req.is_api() {
            return None;
        }
        log::debug!("dispatch {} {}", req.method, req.path);

        let handled = match (req.method.as_str(), req.path.as_str()) {
            ("GET", "/api/data") => Handled::reply(Response::json(self.store.to_json(), 200)),
            ("POST", "/api/update") => match (req.param("key"), req.param("val")) {
                (Some(key), Some(val)) if !key.is_empty() => {
                    self.update(key, val);
                    Handled::mutated(Response::ok())
                }
                _ => Handled::reply(Response::text("Missing params", 400)),
            },
            ("POST", "/api/trigger") => match req.param("event") {
                Some(event) if !event.is_empty() => {
                    self.trigger(event, req.param("arg").unwrap_or(""));
                    Handled::mutated(Response::ok())
                }
                _ => Handled::reply(Response::text("Missing event param", 400)),
            },
            ("GET", "/api/list") => match req.param("name") {
                Some(name) if !name.is_empty() => {
                    Handled::reply(Response::json(self.list_json(name), 200))
                }
                _ => Handled::reply(Response::text("Missing name param", 400)),
            },
            _ => Handled::reply(Response::not_found()),
        };
        Some(handled)
    }

    /// Set `key` and run its model-update hook.
    pub fn update(&mut self, key: &str, val: &str) {
        self.store.set(key, val);
        if let Some(hook) = self.model_update_effects.get(key) {
            hook.apply(&mut self.store, &Context::for_update(key, val));
        }
        if self.log_model_updates {
            log::info!(
                "[WebCee Sim] model update: {} = {}",
                key,
                self.store.get(key).unwrap_or_default()
            );
        }
    }

    /// Run the effects configured for an event handler. Unknown handlers do nothing.
    pub fn trigger(&mut self, event: &str, arg: &str) {
        if let Some(effects) = self.handler_effects.get(event) {
            effects.apply(&mut self.store, &Context::for_trigger(arg));
        }
        if self.log_triggers {
            log::info!("[WebCee Sim] trigger: {} {}", event, arg);
        }
    }

    fn list_json(&self, name: &str) -> String {
        let items = self.lists.get(name).map(Vec::as_slice).unwrap_or(&[]);
        serde_json::to_string(items).unwrap_or_else(|_| "[]".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn session() -> Session {
        Session::new(&Bootstrap::from_value(&json!({
            "initialData": {"count": "3", "name": ""},
            "handlerEffects": {
                "inc": {"type": "inc", "key": "count", "by": 2},
                "greet": {"type": "setTemplate", "key": "msg", "template": "hi ${arg}"}
            },
            "modelUpdateEffects": {
                "name": [
                    {"type": "setTemplate", "key": "nameLen", "template": "${len}"},
                    {"type": "setTemplate", "key": "echo", "template": "${key}=${reversed}"}
                ]
            },
            "lists": {"items": [{"id": 1}, "two"]}
        })))
    }

    #[test]
    fn test_data_is_stable() {
        let mut s = session();
        let a = s.dispatch(&Request::get("/api/data")).unwrap();
        let b = s.dispatch(&Request::get("/api/data")).unwrap();
        assert_eq!(a.response.status, 200);
        assert_eq!(a.response.content_type, "application/json");
        assert_eq!(a.response.body, b.response.body);
        assert!(!a.refresh_view);
    }

    #[test]
    fn test_update_runs_hook() {
        let mut s = session();
        let handled = s.dispatch(&Request::post("/api/update?key=name&val=abc")).unwrap();
        assert_eq!(handled.response, Response::ok());
        assert!(handled.refresh_view);
        assert_eq!(s.store().get("name"), Some("abc"));
        assert_eq!(s.store().get("nameLen"), Some("3"));
        assert_eq!(s.store().get("echo"), Some("name=cba"));
    }

    #[test]
    fn test_update_missing_val_is_rejected() {
        let mut s = session();
        let before = s.store().clone();
        let handled = s.dispatch(&Request::post("/api/update?key=count")).unwrap();
        assert_eq!(handled.response.status, 400);
        assert_eq!(handled.response.body, "Missing params");
        assert_eq!(s.store(), &before);

        let empty_key = s.dispatch(&Request::post("/api/update?key=&val=1")).unwrap();
        assert_eq!(empty_key.response.status, 400);
    }

    #[test]
    fn test_update_with_empty_val_is_allowed() {
        let mut s = session();
        let handled = s.dispatch(&Request::post("/api/update?key=count&val=")).unwrap();
        assert_eq!(handled.response.status, 200);
        assert_eq!(s.store().get("count"), Some(""));
    }

    #[test]
    fn test_trigger() {
        let mut s = session();
        s.dispatch(&Request::post("/api/trigger?event=inc")).unwrap();
        assert_eq!(s.store().get("count"), Some("5"));

        s.dispatch(&Request::post("/api/trigger?event=greet&arg=bob")).unwrap();
        assert_eq!(s.store().get("msg"), Some("hi bob"));

        let unknown = s.dispatch(&Request::post("/api/trigger?event=nobody")).unwrap();
        assert_eq!(unknown.response.status, 200);

        let missing = s.dispatch(&Request::post("/api/trigger")).unwrap();
        assert_eq!(missing.response.status, 400);
        assert_eq!(missing.response.body, "Missing event param");
    }

    #[test]
    fn test_lists() {
        let mut s = session();
        let found = s.dispatch(&Request::get("/api/list?name=items")).unwrap();
        assert_eq!(found.response.body, r#"[{"id":1},"two"]"#);

        let missing = s.dispatch(&Request::get("/api/list?name=missing")).unwrap();
        assert_eq!(missing.response.status, 200);
        assert_eq!(missing.response.body, "[]");

        let no_name = s.dispatch(&Request::get("/api/list")).unwrap();
        assert_eq!(no_name.response.status, 400);
        assert_eq!(no_name.response.body, "Missing name param");
    }

    #[test]
    fn test_routing_edges() {
        let mut s = session();
        assert!(s.dispatch(&Request::get("/index.html")).is_none());
        let wrong_method = s.dispatch(&Request::post("/api/data")).unwrap();
        assert_eq!(wrong_method.response.status, 404);
        let unknown = s.dispatch(&Request::get("/api/nope")).unwrap();
        assert_eq!(unknown.response, Response::not_found());
    }
}
