pub mod client;

pub use client::{CatalogueClient, CatalogueResult, HttpCatalogueClient};
