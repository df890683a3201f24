//! Kanboard → Slack notification core.
//!
//! Events come in with a kind and a payload; the [`dispatcher::Notifier`]
//! resolves where they go, renders them and hands them to a transport.

pub mod attachment;
pub mod destination;
pub mod dispatcher;
pub mod error;
pub mod escape;
pub mod links;
pub mod renderer;
pub mod store;
pub mod titles;
pub mod transport;

pub use dispatcher::Notifier;
pub use error::NotifyError;
pub use renderer::ActorContext;
