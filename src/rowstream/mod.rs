//! Core modules for decoding collector record files into rows.

pub mod codec;
pub mod datasource;
pub mod registry;
pub mod row;
