pub mod app;
pub mod cli;
pub mod config;
pub mod criteria;
pub mod fetcher;
pub mod notify;
pub mod output;
pub mod pagination;
pub mod query;
pub mod reconcile;
pub mod resource;
pub mod utils;
pub mod view;

#[cfg(test)]
mod tests;
