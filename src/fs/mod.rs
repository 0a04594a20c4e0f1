//! # Módulo de Filesystem
//! src/fs/mod.rs
//!
//! Todo lo que toca el webroot. El servidor sólo lee: nunca escribe sobre
//! los archivos que sirve.
//!
//! - `resolver`: URL -> path dentro del webroot (o Forbidden / NotFound)
//! - `listing`: HTML del listado de un directorio
//! - `sender`: respuesta 200 con el contenido de un archivo
//! - `mime`: tabla estática de Content-Type

pub mod listing;
pub mod mime;
pub mod resolver;
pub mod sender;

pub use listing::{format_size, render, DirectoryEntry};
pub use mime::content_type_for;
pub use resolver::{resolve, ResolvedTarget};
pub use sender::send;
