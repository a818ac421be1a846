//! Flutter bridge crate for Hapit core.

pub mod api;
