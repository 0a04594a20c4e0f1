//! # Códigos de Estado HTTP
//! src/http/status.rs
//!
//! Códigos de estado que emite el servidor de archivos. Son pocos porque
//! el servidor sólo sabe servir archivos y listados:
//!
//! - **2xx**: Éxito (200 OK)
//! - **4xx**: Error del cliente (400, 403, 404, 405)

/// Representa los códigos de estado HTTP que soporta nuestro servidor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusCode {
    /// 200 OK - Se sirvió un archivo o un listado
    Ok = 200,

    /// 400 Bad Request - Request line ausente o malformada
    BadRequest = 400,

    /// 403 Forbidden - El path intenta salir del webroot
    Forbidden = 403,

    /// 404 File Not Found - El path no existe dentro del webroot
    NotFound = 404,

    /// 405 Method Not Allowed - Sólo se sirve GET
    MethodNotAllowed = 405,
}

impl StatusCode {
    /// Convierte el código a su valor numérico
    ///
    /// # Ejemplo
    /// ```
    /// use webroot_server::http::StatusCode;
    /// assert_eq!(StatusCode::Forbidden.as_u16(), 403);
    /// ```
    pub fn as_u16(&self) -> u16 {
        *self as u16
    }

    /// Retorna el texto de razón (reason phrase) asociado al código
    ///
    /// El 404 conserva el texto histórico del servidor, "File Not Found".
    ///
    /// # Ejemplo
    /// ```
    /// use webroot_server::http::StatusCode;
    /// assert_eq!(StatusCode::Ok.reason_phrase(), "OK");
    /// assert_eq!(StatusCode::NotFound.reason_phrase(), "File Not Found");
    /// ```
    pub fn reason_phrase(&self) -> &'static str {
        match self {
            StatusCode::Ok => "OK",
            StatusCode::BadRequest => "Bad Request",
            StatusCode::Forbidden => "Forbidden",
            StatusCode::NotFound => "File Not Found",
            StatusCode::MethodNotAllowed => "Method Not Allowed",
        }
    }

    /// Verifica si el código indica éxito (2xx)
    pub fn is_success(&self) -> bool {
        matches!(self, StatusCode::Ok)
    }

    /// Verifica si el código indica error del cliente (4xx)
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.as_u16())
    }
}

impl std::fmt::Display for StatusCode {
    /// Formato: "200 OK"
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.as_u16(), self.reason_phrase())
    }
}
