//! Utility modules for the codec layer, file I/O and clipboard access.

pub mod clipboard;
pub mod encoding;
pub mod file_helper;
