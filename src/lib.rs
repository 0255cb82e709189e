//! Client-side session core for the Storyhaven therapeutic storytelling app
//!
//! Two independent, UI-framework-agnostic state modules:
//!
//! - [`monitor`]: real-time monitoring store — bounded telemetry histories
//!   with rule-based alert generation and alert/settings lifecycle.
//! - [`conversation`]: the guided character-creation dialogue as a pure
//!   state machine (Elm Architecture: event in, new state + effects out).
//!
//! [`runtime`] executes the effects against an injected
//! [`runtime::ConversationBackend`]; [`backend`] provides the production
//! HTTP implementation. Each store is an explicit, independently
//! instantiable container: no singletons, no shared mutable state.

pub mod backend;
pub mod conversation;
pub mod monitor;
pub mod runtime;
