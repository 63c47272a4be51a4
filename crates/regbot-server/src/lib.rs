//! regbot server library.
//!
//! HTTP backend for the registration approval flow:
//! - Static site (entry documents and public assets)
//! - Registration API backed by the file record store
//! - Telegram notifier with inline approve/reject buttons
//! - Webhook receiving the admin's decisions

pub mod api;
pub mod assets;
pub mod notifier;
pub mod routes;
pub mod telegram;
pub mod webhook;
