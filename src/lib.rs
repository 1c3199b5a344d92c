pub mod components;
pub mod config;
pub mod error;
pub mod handlers;
pub mod session;
pub mod shutdown;
pub mod startup;
pub mod utils;
pub mod web;
