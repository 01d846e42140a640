//! Backend runtime entry point and public API surface.
//!
//! This crate owns the backend lifecycle: it keeps the reconciled
//! notification list, persists it on the device, turns push events into
//! list changes or routes, and talks to the remote API.

pub mod api;
mod app;
pub mod config;
pub mod navigation;
pub mod reconcile;
pub mod router;
mod runtime;
mod services;
mod state;
pub mod store;

pub use crate::runtime::{run, serve};
