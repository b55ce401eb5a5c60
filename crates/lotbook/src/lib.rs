//! Lot accounting CLI.
//!
//! This crate provides the `lotbook` command-line tool, which works over
//! JSON lot files (an array of lot records):
//!
//! - `lotbook basis`: Cost basis of a disposal
//! - `lotbook compare`: FIFO, LIFO and HIFO side by side
//! - `lotbook dispose`: Apply a disposal and print the updated lots
//! - `lotbook validate`: Audit a lot file
//! - `lotbook average`: Weighted average unit cost of the open lots
//! - `lotbook holding`: Short-term / long-term classification
//! - `lotbook gain`: Gain or loss on a disposal
//!
//! # Example Usage
//!
//! ```bash
//! lotbook basis lots.json --asset BTC --quantity 1.0 --method HIFO
//! lotbook compare lots.json --asset BTC --quantity 1.0 --as-of 2023-12-31
//! lotbook validate lots.json --format json
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod cmd;
