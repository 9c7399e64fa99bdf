#![doc = "The `tasklane` library crate."]
#![doc = ""]
#![doc = "Domain models, the sealed bearer-token session layer, repositories, services,"]
#![doc = "routing configuration and error handling for the tasklane API. The binary"]
#![doc = "(`main.rs`) composes them through `startup` and serves them with actix-web."]

pub mod auth;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;
pub mod startup;
