//! # Envío de Archivos
//! src/fs/sender.rs
//!
//! Arma la respuesta 200 para un archivo: abre el archivo, toma el tamaño de
//! sus metadatos y deja el `File` como body para que `Response::write_to`
//! lo copie al socket por bloques. Nunca se carga el archivo entero en
//! memoria.

use super::mime::content_type_for;
use crate::http::{Response, StatusCode};
use std::fs::File;
use std::io;
use std::path::Path;

/// Construye la respuesta para servir `path`
///
/// Headers: `Content-Type` según la tabla de extensiones, `Content-Length`
/// con el tamaño exacto y `Content-Disposition: inline`.
pub fn send(path: &Path) -> io::Result<Response> {
    let file = File::open(path)?;
    // Metadatos del handle abierto: es el mismo archivo que se va a leer
    let len = file.metadata()?.len();

    let disposition = match path.file_name() {
        Some(name) => format!(
            "inline; filename=\"{}\"",
            header_safe(&name.to_string_lossy())
        ),
        None => "inline".to_string(),
    };

    Ok(Response::new(StatusCode::Ok)
        .with_header("Content-Type", content_type_for(path))
        .with_header("Content-Disposition", &disposition)
        .with_file(file, len))
}

/// Reemplaza lo que rompería el header (comillas, barras, controles)
fn header_safe(name: &str) -> String {
    name.chars()
        .map(|c| if c == '"' || c == '\\' || c.is_control() { '_' } else { c })
        .collect()
}
