//! Port traits decoupling the domain from configuration and storage.

pub mod config_port;
pub mod store_port;
