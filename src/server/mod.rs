pub mod config;
mod http_layers;
mod records;
pub mod server;
pub mod state;

pub use config::ServerConfig;
pub use http_layers::*;
pub(self) use records::make_record_routes;
pub use server::{make_app, run_server};
