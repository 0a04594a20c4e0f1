//! # Eventos del Servidor
//! src/events/mod.rs
//!
//! El servidor no sabe quién lo está mirando. Todo lo que pasa (una
//! conexión que llega, una respuesta enviada, una línea de log) se publica
//! como un `ServerEvent` en un `EventSink`. La CLI se suscribe con un
//! `ChannelSink`; los tests usan un `EventRecorder`.
//!
//! Los sinks se llaman desde los workers, así que tienen que ser
//! `Send + Sync` y no pueden bloquear por mucho tiempo.

pub mod sinks;

pub use sinks::{ChannelSink, EventRecorder, NullSink};

use chrono::{DateTime, Local};
use log::Level;
use serde::Serialize;
use std::sync::Arc;

/// Estado de una conexión en el momento del evento
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "detail", rename_all = "snake_case")]
pub enum EventStatus {
    /// Request parseada, todavía sin respuesta
    Received,

    /// Respuesta escrita completa con este código
    Completed(u16),

    /// La conexión terminó sin poder escribir la respuesta
    Failed(String),
}

/// Una fila de la tabla de conexiones
#[derive(Debug, Clone, Serialize)]
pub struct ConnectionEvent {
    pub client_address: String,
    pub method: String,
    pub path: String,
    pub status: EventStatus,
    pub timestamp: DateTime<Local>,
}

impl ConnectionEvent {
    pub fn new(client_address: &str, method: &str, path: &str, status: EventStatus) -> Self {
        Self {
            client_address: client_address.to_string(),
            method: method.to_string(),
            path: path.to_string(),
            status,
            timestamp: Local::now(),
        }
    }

    /// Código HTTP si la conexión terminó con respuesta
    pub fn status_code(&self) -> Option<u16> {
        match self.status {
            EventStatus::Completed(code) => Some(code),
            _ => None,
        }
    }
}

/// Todo lo que el servidor publica hacia afuera
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerEvent {
    Connection(ConnectionEvent),
    Log {
        level: Level,
        message: String,
        timestamp: DateTime<Local>,
    },
}

impl ServerEvent {
    pub fn log(level: Level, message: impl Into<String>) -> Self {
        ServerEvent::Log {
            level,
            message: message.into(),
            timestamp: Local::now(),
        }
    }

    /// Serializa el evento como una línea JSON (sin `\n` final)
    pub fn to_json_line(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Destino de los eventos del servidor
pub trait EventSink: Send + Sync {
    fn emit(&self, event: ServerEvent);
}

impl<T: EventSink + ?Sized> EventSink for Arc<T> {
    fn emit(&self, event: ServerEvent) {
        (**self).emit(event)
    }
}

/// Publica en el sink y en `log` a la vez
///
/// Las líneas de log van a los dos lados: al logger del proceso (con su
/// nivel) y al sink como `ServerEvent::Log`, que es lo que ve la CLI en
/// modo JSON.
#[derive(Clone)]
pub struct EventReporter {
    sink: Arc<dyn EventSink>,
}

impl EventReporter {
    pub fn new(sink: Arc<dyn EventSink>) -> Self {
        Self { sink }
    }

    pub fn connection(&self, event: ConnectionEvent) {
        self.sink.emit(ServerEvent::Connection(event));
    }

    pub fn log(&self, level: Level, message: String) {
        log::log!(level, "{}", message);
        self.sink.emit(ServerEvent::log(level, message));
    }

    pub fn info(&self, message: String) {
        self.log(Level::Info, message);
    }

    pub fn warn(&self, message: String) {
        self.log(Level::Warn, message);
    }

    pub fn error(&self, message: String) {
        self.log(Level::Error, message);
    }
}

impl std::fmt::Debug for EventReporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventReporter").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_event_json() {
        let event = ServerEvent::Connection(ConnectionEvent::new(
            "127.0.0.1",
            "GET",
            "/index.html",
            EventStatus::Completed(200),
        ));

        let json: serde_json::Value =
            serde_json::from_str(&event.to_json_line().unwrap()).unwrap();
        assert_eq!(json["type"], "connection");
        assert_eq!(json["client_address"], "127.0.0.1");
        assert_eq!(json["method"], "GET");
        assert_eq!(json["path"], "/index.html");
        assert_eq!(json["status"]["state"], "completed");
        assert_eq!(json["status"]["detail"], 200);
        assert!(json["timestamp"].is_string());
    }

    #[test]
    fn test_received_and_failed_json() {
        let received = serde_json::to_value(EventStatus::Received).unwrap();
        assert_eq!(received["state"], "received");
        assert!(received.get("detail").is_none());

        let failed = serde_json::to_value(EventStatus::Failed("broken pipe".into())).unwrap();
        assert_eq!(failed["state"], "failed");
        assert_eq!(failed["detail"], "broken pipe");
    }

    #[test]
    fn test_log_event_json() {
        let event = ServerEvent::log(Level::Warn, "Error 404: File Not Found");
        let line = event.to_json_line().unwrap();

        assert!(!line.contains('\n'));
        let json: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(json["type"], "log");
        assert_eq!(json["level"], "WARN");
        assert_eq!(json["message"], "Error 404: File Not Found");
    }

    #[test]
    fn test_status_code() {
        let done = ConnectionEvent::new("a", "GET", "/", EventStatus::Completed(404));
        let open = ConnectionEvent::new("a", "GET", "/", EventStatus::Received);
        assert_eq!(done.status_code(), Some(404));
        assert_eq!(open.status_code(), None);
    }

    #[test]
    fn test_reporter_mirrors_into_sink() {
        let recorder = EventRecorder::new();
        let reporter = EventReporter::new(Arc::new(recorder.clone()));

        reporter.info("Server started on port 8080".to_string());
        reporter.connection(ConnectionEvent::new("a", "GET", "/", EventStatus::Received));

        let events = recorder.events();
        assert_eq!(events.len(), 2);
        match &events[0] {
            ServerEvent::Log { level, message, .. } => {
                assert_eq!(*level, Level::Info);
                assert_eq!(message, "Server started on port 8080");
            }
            other => panic!("unexpected event {:?}", other),
        }
        assert!(matches!(events[1], ServerEvent::Connection(_)));
    }
}
