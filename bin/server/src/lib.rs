//! Web server for the ghostwriter delegated-casting platform.
//!
//! Wires the library crates together: authentication strategies and
//! sessions from `ghostwriter-access`, the authorization gate from
//! `ghostwriter-authz`, the Farcaster service clients and lookup cache
//! from `ghostwriter-farcaster`, all over sqlx/Postgres repositories.

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod response;
pub mod routes;
