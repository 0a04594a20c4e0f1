//! # Módulo HTTP
//!
//! Implementa el subconjunto de HTTP/1.x que necesita el servidor de
//! archivos, desde cero y sin librerías de alto nivel:
//!
//! - Parsing de la request line y headers
//! - Construcción y escritura de responses (incluyendo bodies de archivo)
//! - Códigos de estado
//!
//! ## Subconjunto soportado
//!
//! - Una request por conexión (`Connection: close` siempre)
//! - Sin chunked transfer encoding: el `Content-Length` se conoce antes
//! - El body del request nunca se lee
//!
//! ### Formato de Request
//!
//! ```text
//! GET /docs/ HTTP/1.0\r\n
//! Header-Name: Header-Value\r\n
//! \r\n
//! ```

pub mod request;   // Parsing de HTTP requests
pub mod response;  // Construcción y escritura de HTTP responses
pub mod status;    // Códigos de estado HTTP

// Re-exportamos los tipos principales para facilitar su uso
pub use request::{Method, ParseError, Request};
pub use response::{Body, Response};
pub use status::StatusCode;
