pub mod app;
mod deserializers;
pub mod error;
pub mod pagination;
pub mod routes;
