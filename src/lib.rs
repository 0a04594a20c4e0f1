//! # Webroot Server
//! src/lib.rs
//!
//! Servidor de archivos HTTP/1.0 concurrente implementado desde cero sobre
//! sockets TCP: un directorio (webroot) se publica en un puerto, los
//! directorios se listan como HTML y los archivos se mandan tal cual.
//!
//! ## Arquitectura
//!
//! - `http`: parsing de requests y serialización de respuestas
//! - `fs`: resolución segura de paths, listados y envío de archivos
//! - `server`: listener, pool de workers y manejo de cada conexión
//! - `events`: eventos de conexión y de log hacia quien esté mirando
//! - `config`: configuración desde CLI y variables de entorno
//! - `logging`: logger del proceso
//!
//! ## Ejemplo de uso
//!
//! ```no_run
//! use std::sync::Arc;
//! use webroot_server::config::ServerConfig;
//! use webroot_server::events::ChannelSink;
//! use webroot_server::server::Server;
//!
//! let (sink, events) = ChannelSink::new();
//! let mut handle = Server::start(ServerConfig::new(8080, "/srv/www"), Arc::new(sink))
//!     .expect("Error al iniciar servidor");
//!
//! for event in events.iter().take(10) {
//!     println!("{:?}", event);
//! }
//! handle.stop();
//! ```

pub mod config;
pub mod error;
pub mod events;
pub mod fs;
pub mod http;
pub mod logging;
pub mod server;
