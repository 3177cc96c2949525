//! Flutter bridge for the listsync core.

pub mod api;
