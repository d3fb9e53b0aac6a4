#![doc = "The `taskkeeper` library crate."]
#![doc = ""]
#![doc = "User registration, login and stateless bearer-token authentication for the"]
#![doc = "taskkeeper backend: token codec, credential store, authentication service,"]
#![doc = "request authenticator and route policy, plus the HTTP routes that expose them."]
#![doc = "The binary (`main.rs`) wires these into an actix-web server."]

pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod routes;
pub mod store;

pub use crate::error::AppError;
