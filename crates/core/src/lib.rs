pub mod classify;
pub mod config;
pub mod data;
pub mod history;
pub mod model;
pub mod query;
pub mod scale;
pub mod state;
pub mod store;
pub mod table;
pub mod views;

#[cfg(test)]
mod fixtures;
