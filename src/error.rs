//! # Errores de Arranque
//! src/error.rs
//!
//! Errores que puede devolver `Server::start`. Son síncronos y sólo afectan
//! a esa llamada: un servidor que ya está corriendo nunca los ve. Los
//! errores de cada conexión se quedan dentro de la conexión.

use std::io;
use std::path::PathBuf;

/// Error al validar la configuración o al levantar el servidor
#[derive(Debug)]
pub enum StartError {
    /// Puerto fuera de 1024-65535 (0 se acepta como "puerto efímero")
    InvalidPort(u16),

    /// El webroot no existe o no es un directorio
    InvalidRoot { path: PathBuf, reason: String },

    /// El pool necesita al menos un worker
    InvalidWorkers,

    /// No se pudo hacer bind (puerto en uso, permisos, ...)
    Bind { addr: String, source: io::Error },

    /// No se pudo crear un thread del servidor
    Spawn(io::Error),
}

impl std::fmt::Display for StartError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StartError::InvalidPort(port) => {
                write!(f, "Invalid port {}: use a port between 1024 and 65535", port)
            }
            StartError::InvalidRoot { path, reason } => {
                write!(f, "Invalid webroot '{}': {}", path.display(), reason)
            }
            StartError::InvalidWorkers => write!(f, "Workers must be >= 1"),
            StartError::Bind { addr, source } => {
                write!(f, "Could not bind to {}: {}", addr, source)
            }
            StartError::Spawn(err) => write!(f, "Could not spawn server thread: {}", err),
        }
    }
}

impl std::error::Error for StartError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StartError::Bind { source, .. } => Some(source),
            StartError::Spawn(err) => Some(err),
            _ => None,
        }
    }
}
