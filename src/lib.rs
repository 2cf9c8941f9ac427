pub mod config;
pub mod context;
pub mod db;
pub mod environment;
pub mod errors;
pub mod form;
pub mod identity;
pub mod io;
pub mod modal;
pub mod routes;
pub mod song;
pub mod store;
pub mod workflow;

#[cfg(test)]
pub(crate) mod testing;
