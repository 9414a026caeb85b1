// folio-gateway - cached Gemini prompt gateway for a portfolio site
// Author: kelexine (https://github.com/kelexine)

pub mod cache;
pub mod cli;
pub mod config;
pub mod error;
pub mod gateway;
pub mod gemini;
pub mod metrics;
pub mod server;
pub mod utils;
