//! # Construcción y Escritura de Respuestas HTTP
//! src/http/response.rs
//!
//! API para construir respuestas y serializarlas directamente sobre el
//! socket. El body puede ser un buffer en memoria o un archivo abierto que
//! se transmite por bloques.
//!
//! ## Formato de una respuesta
//!
//! ```text
//! HTTP/1.0 200 OK\r\n
//! Content-Type: text/html; charset=utf-8\r\n
//! Content-Length: 12\r\n
//! Connection: close\r\n
//! Server: webroot-server/1.0\r\n
//! \r\n
//! <h1>hi</h1>\n
//! ```
//!
//! Toda respuesta sale con `Content-Type`, `Content-Length`,
//! `Connection: close` y `Server`. El `Content-Length` se calcula antes de
//! escribir el primer byte y siempre coincide con los bytes del body.
//!
//! ## Ejemplo de uso
//!
//! ```
//! use webroot_server::http::{Response, StatusCode};
//!
//! let mut response = Response::new(StatusCode::Ok)
//!     .with_header("Content-Type", "text/plain")
//!     .with_body("Hello");
//!
//! let mut socket = Vec::new();
//! response.write_to(&mut socket).unwrap();
//! assert!(socket.ends_with(b"\r\n\r\nHello"));
//! ```

use super::StatusCode;
use std::fs::File;
use std::io::{self, Read, Write};

/// Versión que se anuncia en la status line
pub const HTTP_VERSION: &str = "HTTP/1.0";

/// Valor del header `Server`
pub const SERVER_NAME: &str = "webroot-server/1.0";

/// Content-Type por defecto si nadie lo fijó
const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Cuerpo de una respuesta
#[derive(Debug)]
pub enum Body {
    /// Body completo en memoria
    Bytes(Vec<u8>),

    /// Archivo que se copia al socket; `len` viene del `stat()` previo
    File { file: File, len: u64 },
}

impl Body {
    /// Longitud del body en bytes, conocida antes de escribir
    pub fn len(&self) -> u64 {
        match self {
            Body::Bytes(bytes) => bytes.len() as u64,
            Body::File { len, .. } => *len,
        }
    }

    /// Verifica si el body está vacío
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Representa una respuesta HTTP completa
#[derive(Debug)]
pub struct Response {
    /// Código de estado HTTP
    status: StatusCode,

    /// Headers en orden de inserción
    headers: Vec<(String, String)>,

    /// Cuerpo de la respuesta
    body: Body,
}

impl Response {
    /// Crea una nueva respuesta con el código de estado especificado
    ///
    /// Por defecto no tiene headers y el body está vacío.
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: Body::Bytes(Vec::new()),
        }
    }

    /// Agrega un header a la respuesta (versión builder)
    ///
    /// Si el header ya existe se reemplaza su valor sin cambiar su posición.
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.add_header(name, value);
        self
    }

    /// Agrega o reemplaza un header (versión mutable)
    ///
    /// La comparación de nombres no distingue mayúsculas.
    pub fn add_header(&mut self, name: &str, value: &str) {
        match self
            .headers
            .iter_mut()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(name))
        {
            Some((_, existing_value)) => *existing_value = value.to_string(),
            None => self.headers.push((name.to_string(), value.to_string())),
        }
    }

    /// Establece el cuerpo desde un string y fija `Content-Length`
    pub fn with_body(self, body: &str) -> Self {
        self.with_body_bytes(body.as_bytes().to_vec())
    }

    /// Establece el cuerpo desde bytes y fija `Content-Length`
    pub fn with_body_bytes(mut self, body: Vec<u8>) -> Self {
        self.body = Body::Bytes(body);
        self.sync_content_length();
        self
    }

    /// Usa un archivo abierto como cuerpo
    ///
    /// `len` debe venir de los metadatos del archivo; es lo que se anuncia
    /// en `Content-Length` y exactamente lo que se va a copiar.
    pub fn with_file(mut self, file: File, len: u64) -> Self {
        self.body = Body::File { file, len };
        self.sync_content_length();
        self
    }

    /// Crea una respuesta HTML
    pub fn html(status: StatusCode, body: Vec<u8>) -> Self {
        Self::new(status)
            .with_header("Content-Type", "text/html; charset=utf-8")
            .with_body_bytes(body)
    }

    /// Crea una página de error HTML con el código numérico y el mensaje
    ///
    /// # Ejemplo
    /// ```
    /// use webroot_server::http::{Response, StatusCode};
    ///
    /// let response = Response::error_page(StatusCode::Forbidden, "Forbidden");
    /// assert_eq!(response.status(), StatusCode::Forbidden);
    /// assert_eq!(response.header("Content-Type"), Some("text/html; charset=utf-8"));
    /// ```
    pub fn error_page(status: StatusCode, message: &str) -> Self {
        let code = status.as_u16();
        let message = html_escape::encode_text(message);
        let body = format!(
            r#"<!DOCTYPE html>
<html>
<head>
<meta charset="UTF-8">
<title>Error {code}</title>
<style>
body {{ font-family: Arial, sans-serif; margin: 40px; background: #ffe6e6; }}
.container {{ background: white; padding: 20px; border-radius: 10px; text-align: center; }}
.error-code {{ font-size: 4em; color: #c0392b; margin: 0; }}
</style>
</head>
<body>
<div class="container">
<h1 class="error-code">{code}</h1>
<h2>{message}</h2>
<p>The server could not complete your request.</p>
<p><a href="/">Back to the home page</a></p>
</div>
</body>
</html>
"#
        );
        Self::html(status, body.into_bytes())
    }

    /// Escribe la respuesta completa sobre `out` y hace flush
    ///
    /// Antes del primer byte se completan los headers obligatorios. Retorna
    /// los bytes de body escritos. Si el archivo entrega menos bytes de los
    /// anunciados se corta con `UnexpectedEof`: mejor abortar la conexión que
    /// mandar un `Content-Length` falso.
    ///
    /// Cerrar el socket queda a cargo del llamador.
    pub fn write_to<W: Write>(&mut self, out: &mut W) -> io::Result<u64> {
        let head = self.head_bytes();
        out.write_all(&head)?;

        let expected = self.body.len();
        let written = match &mut self.body {
            Body::Bytes(bytes) => {
                out.write_all(bytes)?;
                bytes.len() as u64
            }
            Body::File { file, len } => io::copy(&mut file.take(*len), out)?,
        };

        if written != expected {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("body ended after {} of {} bytes", written, expected),
            ));
        }

        out.flush()?;
        Ok(written)
    }

    /// Serializa status line y headers (sin body)
    ///
    /// Completa primero los headers que toda respuesta debe llevar.
    pub fn head_bytes(&mut self) -> Vec<u8> {
        self.add_common_headers();

        let mut result = Vec::new();

        // 1. Status line
        let status_line = format!(
            "{} {} {}\r\n",
            HTTP_VERSION,
            self.status.as_u16(),
            self.status.reason_phrase()
        );
        result.extend_from_slice(status_line.as_bytes());

        // 2. Headers en orden de inserción
        for (name, value) in &self.headers {
            result.extend_from_slice(format!("{}: {}\r\n", name, value).as_bytes());
        }

        // 3. Línea vacía que separa headers del body
        result.extend_from_slice(b"\r\n");

        result
    }

    /// Agrega los headers obligatorios que falten
    fn add_common_headers(&mut self) {
        if self.header("Content-Type").is_none() {
            self.add_header("Content-Type", DEFAULT_CONTENT_TYPE);
        }
        self.sync_content_length();
        self.add_header("Connection", "close");
        self.add_header("Server", SERVER_NAME);
    }

    fn sync_content_length(&mut self) {
        let len = self.body.len().to_string();
        self.add_header("Content-Length", &len);
    }

    /// Obtiene el código de estado de la respuesta
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Obtiene los headers en orden
    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// Obtiene el valor de un header
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Longitud del body que se va a anunciar
    pub fn content_length(&self) -> u64 {
        self.body.len()
    }

    /// Obtiene el body si está en memoria
    pub fn body_bytes(&self) -> Option<&[u8]> {
        match &self.body {
            Body::Bytes(bytes) => Some(bytes),
            Body::File { .. } => None,
        }
    }
}
