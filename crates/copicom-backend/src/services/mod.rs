//! Backend service handlers for frontend-driven requests.
//!
//! This module groups async request handlers that operate on the shared
//! `AppContext`, perform side effects (network, storage), and emit list
//! updates, routes or toasts back to the frontend.

pub mod config_service;
pub mod navigation_service;
pub mod notification_service;
pub mod push_service;

/// Represents a type that is used in all handlers as an application context.
pub(crate) type AppContextHandle = std::sync::Arc<crate::app::AppContext>;
