//! HTTP surface of the relay: configuration, middleware, lifecycle, and
//! route handlers.

pub mod config;
pub mod handlers;
pub mod middleware;
pub mod module;
pub mod shutdown;

pub use config::NetworkConfig;
pub use module::NetworkModule;
pub use shutdown::ShutdownSignal;
