//! Shopping list core library
//!
//! Task storage, suggestion tracking and ranking for the shopping list
//! app, exposed as a library for front ends and tests.

pub mod app;
pub mod config;
pub mod database;
pub mod error;
pub mod services;
