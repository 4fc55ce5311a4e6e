//! Flutter bridge crate for the taskboard core.
//!
//! Only `api` is scanned by the FRB code generator.

pub mod api;
