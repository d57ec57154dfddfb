//! relevance-ranking - Journalist recommendations for press releases
//!
//! This crate ranks journalists by how closely their published articles match
//! a set of press releases and explains each recommendation with a generated
//! motivation. It includes the hosted embedding, vector index and completion
//! clients, a SQLite document store, and the ranking pipeline itself.

pub mod app;
pub mod config;
pub mod domain;
pub mod providers;
pub mod services;
pub mod storage;

pub use app::App;
