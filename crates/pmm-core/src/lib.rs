//! Core types, access rules, and actions for the PM-Master task manager.
//!
//! This crate is deliberately free of HTTP and database dependencies. Storage
//! backends implement [`store::WorkspaceStore`] and
//! [`identity::IdentityStore`]; the HTTP layer calls into [`actions`] and
//! [`views`] with an explicit store handle.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod access;
pub mod actions;
pub mod dashboard;
pub mod deadline;
pub mod error;
pub mod form;
pub mod guest;
pub mod identity;
pub mod project;
pub mod store;
pub mod task;
pub mod user;
pub mod views;

pub use error::{Error, Result};
