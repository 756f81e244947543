//! Utility functions for formatting values for display.

pub mod format;

pub use format::{format_expiry, mask_token, truncate_string};
