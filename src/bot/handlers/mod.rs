//! Discord interaction handlers
//!
//! This module provides handlers for non-command interactions such as autocomplete.

/// Autocomplete handlers for command parameters
pub mod autocomplete;
