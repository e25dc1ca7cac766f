#![doc = include_str!("doc.md")]

pub mod algorithm;
pub mod config;
pub mod error;
pub mod model;
pub mod request;

pub mod util;

pub mod testing;
