pub mod config;
pub mod controller;
pub mod error;
pub mod installer;
pub mod service;
pub mod signal;
pub mod worker;

#[cfg(test)]
pub(crate) mod testing;
