//! Behavioral simulator for the backend a rendered page talks to.
//!
//! A [`Session`] holds the key/value [`Store`] and answers the `/api/*`
//! endpoints; a [`Runtime`] pairs it with the page's bound elements and the
//! polling loop. Everything is seeded from a [`Bootstrap`] payload.

pub mod api;
pub mod bootstrap;
pub mod coerce;
pub mod effect;
pub mod runtime;
pub mod session;
pub mod store;
pub mod view;

pub use api::{Request, Response};
pub use bootstrap::{Bootstrap, BOOTSTRAP_GLOBAL};
pub use effect::{Context, Effect, EffectSet};
pub use runtime::Runtime;
pub use session::{Handled, Session};
pub use store::Store;
pub use view::{BoundElement, ElementKind, View};
