//! Pokedex gallery TUI backed by PokeAPI.
//!
//! This library exposes the app's modules for testing.

pub mod action;
pub mod api;
pub mod components;
pub mod effect;
pub mod locale;
pub mod reducer;
pub mod state;
