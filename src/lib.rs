//! Slateboard collaboration server library.
//! This crate exposes internal modules for integration testing.
//! The binary entry point is in main.rs.

pub mod audit;
pub mod config;
pub mod db;
pub mod ids;
pub mod rooms;
pub mod routes;
pub mod state;
pub mod validate;
pub mod ws;
