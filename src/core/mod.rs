//! Core conversion logic: encoding detection, output naming and errors.

pub mod converter;
pub mod encoding_resolver;
pub mod error;
pub mod output_naming;
