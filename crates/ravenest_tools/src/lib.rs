//! # Ravenest Development Tools
//!
//! Command-line tools for development:
//! - Content config checker

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod check;
