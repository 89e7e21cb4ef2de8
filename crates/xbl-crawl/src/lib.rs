//! xbl-crawl - breadth-first crawler for the Xbox Live friends graph.
//!
//! Starting from one gamertag, the crawler resolves it to an XUID through the
//! OpenXBL API, fetches its friends, appends them to an output file and
//! queues them for expansion in turn. The crate provides both the `xbl-crawl`
//! binary and a library for driving crawls against other backends.

#![forbid(unsafe_code)]

pub mod config;
pub mod crawler;
pub mod domain;
pub mod error;
pub mod frontier;
pub mod output;
pub mod remote;
pub mod sink;

// Public CLI module (needed by binary)
pub mod cli;
