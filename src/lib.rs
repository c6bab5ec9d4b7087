pub mod app;
pub mod auth;
pub mod config;
pub mod error;
pub mod extract;
pub mod pages;
pub mod recipes;
pub mod state;
pub mod store;
