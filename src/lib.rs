//! covidmap - COVID-19 per-country statistics service
//!
//! Loads the global time-series and daily snapshot CSV files into a
//! relational store and serves per-country daily increases over HTTP.
//!
//! # Architecture
//! - `ingestion`: CSV parsing, reshaping and idempotent persistence
//! - `storage`: SeaORM backend (SQLite, MySQL, PostgreSQL) and domain models
//! - `services`: Daily-increase aggregation and the date catalog
//! - `api`: HTTP services and middleware
//! - `config`: Configuration management
//! - `runtime`: Execution modes (server, import, config generation)
//! - `system`: Logging

pub mod api;
pub mod cli;
pub mod config;
pub mod errors;
pub mod ingestion;
pub mod runtime;
pub mod services;
pub mod storage;
pub mod system;
