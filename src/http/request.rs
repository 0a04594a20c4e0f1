//! # Parsing de Requests HTTP/1.x
//! src/http/request.rs
//!
//! Parser escrito a mano que lee directamente del socket (a través de un
//! `BufRead`). Sólo consume la request line y los headers; el body nunca se
//! lee porque el servidor únicamente sirve `GET`.
//!
//! ## Formato de un Request
//!
//! ```text
//! GET /docs/index.html HTTP/1.0\r\n
//! Host: localhost:8080\r\n
//! User-Agent: curl/7.68.0\r\n
//! \r\n
//! ```
//!
//! ## Reglas
//!
//! 1. **Request Line**: `METHOD SP PATH SP VERSION`, separada por espacios
//!    simples. Menos de 3 partes es un error.
//! 2. **Headers**: `Name: Value`, se parte en el primer `:`. Las líneas sin
//!    `:` se ignoran. Si una clave se repite gana la primera.
//! 3. **Empty Line**: termina los headers.
//!
//! Los bytes que no son UTF-8 válido se convierten con reemplazo; el parser
//! nunca falla por eso.

use std::collections::HashMap;
use std::io::{self, BufRead, Cursor, Read};

/// Longitud máxima de una línea (request line o header), sin el `\r\n`
pub const MAX_LINE_LEN: usize = 8 * 1024;

/// Número máximo de líneas de headers que se leen
pub const MAX_HEADERS: usize = 100;

/// Métodos HTTP
///
/// El parser acepta cualquier verbo; decidir cuál se sirve es trabajo del
/// handler de la conexión (los desconocidos terminan en 405, no en 400).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Method {
    GET,
    HEAD,
    POST,
    PUT,
    DELETE,
    OPTIONS,
    /// Cualquier otro token
    Other(String),
}

impl Method {
    /// Convierte el primer token de la request line en un método
    fn from_token(s: &str) -> Self {
        match s {
            "GET" => Method::GET,
            "HEAD" => Method::HEAD,
            "POST" => Method::POST,
            "PUT" => Method::PUT,
            "DELETE" => Method::DELETE,
            "OPTIONS" => Method::OPTIONS,
            other => Method::Other(other.to_string()),
        }
    }

    /// Convierte el método a string
    pub fn as_str(&self) -> &str {
        match self {
            Method::GET => "GET",
            Method::HEAD => "HEAD",
            Method::POST => "POST",
            Method::PUT => "PUT",
            Method::DELETE => "DELETE",
            Method::OPTIONS => "OPTIONS",
            Method::Other(s) => s,
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Representa un request HTTP parseado
#[derive(Debug, Clone)]
pub struct Request {
    /// Método HTTP
    method: Method,

    /// Path tal como vino en la request line (con query string si la hay)
    raw_path: String,

    /// Versión HTTP (ej: "HTTP/1.0")
    version: String,

    /// Headers HTTP (ej: {"Host": "localhost:8080"})
    headers: HashMap<String, String>,
}

/// Errores que pueden ocurrir durante el parsing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// No llegó request line (EOF inmediato o línea vacía)
    EmptyRequest,

    /// La request line tiene menos de 3 partes
    InvalidRequestLine,

    /// Una línea excede `MAX_LINE_LEN` o hay más de `MAX_HEADERS` headers
    TooLarge,

    /// Error de I/O leyendo del socket (incluye timeouts de lectura)
    Io(io::ErrorKind),
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseError::EmptyRequest => write!(f, "Empty request"),
            ParseError::InvalidRequestLine => write!(f, "Invalid request line format"),
            ParseError::TooLarge => write!(f, "Request head too large"),
            ParseError::Io(kind) => write!(f, "I/O error while reading request: {}", kind),
        }
    }
}

impl std::error::Error for ParseError {}

impl From<io::Error> for ParseError {
    fn from(err: io::Error) -> Self {
        ParseError::Io(err.kind())
    }
}

impl Request {
    /// Lee y parsea un request desde un stream con buffer
    ///
    /// Consume la request line y los headers hasta la línea vacía (o EOF).
    /// Lo que venga después queda sin leer en el reader.
    ///
    /// # Ejemplo
    ///
    /// ```
    /// use std::io::BufReader;
    /// use webroot_server::http::Request;
    ///
    /// let raw: &[u8] = b"GET /index.html HTTP/1.0\r\nHost: localhost\r\n\r\n";
    /// let mut reader = BufReader::new(raw);
    /// let request = Request::read_from(&mut reader).unwrap();
    ///
    /// assert_eq!(request.raw_path(), "/index.html");
    /// assert_eq!(request.header("Host"), Some("localhost"));
    /// ```
    pub fn read_from<R: BufRead>(reader: &mut R) -> Result<Self, ParseError> {
        // 1. Request line
        let line = match read_line(reader)? {
            Some(line) if !line.is_empty() => line,
            _ => return Err(ParseError::EmptyRequest),
        };
        let (method, raw_path, version) = Self::parse_request_line(&line)?;

        // 2. Headers hasta la línea vacía
        let headers = Self::read_headers(reader)?;

        Ok(Request {
            method,
            raw_path,
            version,
            headers,
        })
    }

    /// Parsea un request completo desde bytes
    ///
    /// # Ejemplo
    ///
    /// ```
    /// use webroot_server::http::Request;
    ///
    /// let request = Request::parse(b"GET / HTTP/1.0\r\n\r\n").unwrap();
    /// assert_eq!(request.path(), "/");
    /// ```
    pub fn parse(buffer: &[u8]) -> Result<Self, ParseError> {
        Self::read_from(&mut Cursor::new(buffer))
    }

    /// Parsea la request line
    ///
    /// Formato: `GET /path HTTP/1.0`. Se parte en espacios simples; los
    /// tokens vacíos del final no cuentan.
    fn parse_request_line(line: &str) -> Result<(Method, String, String), ParseError> {
        let mut parts: Vec<&str> = line.split(' ').collect();
        while parts.last() == Some(&"") {
            parts.pop();
        }

        if parts.len() < 3 {
            return Err(ParseError::InvalidRequestLine);
        }

        Ok((
            Method::from_token(parts[0]),
            parts[1].to_string(),
            parts[2].to_string(),
        ))
    }

    /// Lee los headers HTTP
    ///
    /// Cada header tiene formato `Name: Value`.
    fn read_headers<R: BufRead>(reader: &mut R) -> Result<HashMap<String, String>, ParseError> {
        let mut headers = HashMap::new();
        let mut count = 0;

        while let Some(line) = read_line(reader)? {
            // La línea vacía marca el fin de los headers
            if line.is_empty() {
                break;
            }

            count += 1;
            if count > MAX_HEADERS {
                return Err(ParseError::TooLarge);
            }

            // Sin ':' no es un header; se ignora
            if let Some(colon_pos) = line.find(':') {
                let name = line[..colon_pos].trim();
                if name.is_empty() {
                    continue;
                }
                let value = line[colon_pos + 1..].trim();
                headers
                    .entry(name.to_string())
                    .or_insert_with(|| value.to_string());
            }
        }

        Ok(headers)
    }

    // === Métodos públicos para acceder a los campos ===

    /// Obtiene el método HTTP del request
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Obtiene el path tal como vino en la request line
    pub fn raw_path(&self) -> &str {
        &self.raw_path
    }

    /// Obtiene el path sin query string ni fragmento
    pub fn path(&self) -> &str {
        let end = self
            .raw_path
            .find(&['?', '#'][..])
            .unwrap_or(self.raw_path.len());
        &self.raw_path[..end]
    }

    /// Obtiene la versión HTTP
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Obtiene todos los headers
    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    /// Obtiene un header específico (la clave distingue mayúsculas)
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(|s| s.as_str())
    }
}

/// Lee una línea terminada en `\n` (con o sin `\r`)
///
/// Retorna `None` en EOF. Una última línea sin terminador también cuenta.
fn read_line<R: BufRead>(reader: &mut R) -> Result<Option<String>, ParseError> {
    let mut buf = Vec::new();
    let limit = MAX_LINE_LEN as u64 + 2;
    let read = reader.by_ref().take(limit).read_until(b'\n', &mut buf)?;

    if read == 0 {
        return Ok(None);
    }

    if buf.last() == Some(&b'\n') {
        buf.pop();
        if buf.last() == Some(&b'\r') {
            buf.pop();
        }
    }

    if buf.len() > MAX_LINE_LEN {
        return Err(ParseError::TooLarge);
    }

    Ok(Some(String::from_utf8_lossy(&buf).into_owned()))
}
