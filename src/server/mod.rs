//! # Módulo del Servidor
//! src/server/mod.rs
//!
//! Servidor TCP concurrente:
//! 1. `tcp`: bind, thread `accept` y parada (`Server`, `ServerHandle`)
//! 2. `pool`: pool fijo de workers con cola FIFO
//! 3. `connection`: una conexión de punta a punta (request -> respuesta)

pub mod connection;
pub mod pool;
pub mod tcp;

// Re-exportar para facilitar el uso
pub use connection::ConnectionHandler;
pub use pool::{PoolClosed, WorkerPool};
pub use tcp::{Server, ServerHandle};
