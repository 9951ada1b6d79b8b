//! Request, response and model types shared by the folio crates.

pub mod api;
pub mod models;
