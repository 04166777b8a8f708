//! Concierge core library — message envelopes, the Lex-backed adapter, and the
//! HTTP and Lambda front ends used by the CLI.

pub mod adapter;
pub mod config;
pub mod envelope;
pub mod event;
pub mod gateway;
pub mod init;
pub mod lambda;
pub mod service;
