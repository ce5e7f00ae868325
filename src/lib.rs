//! RepoMind CLI - layered configuration and local-HTTP embeddings
//!
//! This crate provides the core functionality for the `repomind` CLI tool.
//!
//! # Architecture
//!
//! - [`cli`] - Command-line interface using clap
//! - [`config`] - Layered configuration resolution (defaults → file → env)
//! - [`embeddings`] - Embedding provider and health client for the local
//!   embedding server
//! - [`error`] - Error types and handling

#![forbid(unsafe_code)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod cli;
pub mod config;
pub mod embeddings;
pub mod error;

pub use error::{Error, Result};
