//! Gale Exchange Connectors
//!
//! Live adapters for the execution-layer ports. Currently one venue:
//! the BingX perpetual swap REST API.

#![warn(clippy::all)]

pub mod bingx_rest;

pub use bingx_rest::BingxRestClient;
