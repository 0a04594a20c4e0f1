//! # Sinks de Eventos
//! src/events/sinks.rs
//!
//! - `ChannelSink`: manda cada evento por un `mpsc` a un suscriptor
//! - `EventRecorder`: guarda todo en memoria (tests, resúmenes)
//! - `NullSink`: descarta

use super::{ConnectionEvent, EventSink, EventStatus, ServerEvent};
use std::collections::HashMap;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Sink sobre un canal `mpsc`
///
/// Si el receptor ya no existe los eventos se descartan: el servidor no
/// depende de que alguien esté escuchando.
pub struct ChannelSink {
    sender: Mutex<Sender<ServerEvent>>,
}

impl ChannelSink {
    /// Crea el sink y el receptor del otro lado
    pub fn new() -> (Self, Receiver<ServerEvent>) {
        let (sender, receiver) = mpsc::channel();
        (
            Self {
                sender: Mutex::new(sender),
            },
            receiver,
        )
    }
}

impl EventSink for ChannelSink {
    fn emit(&self, event: ServerEvent) {
        let sender = self.sender.lock().unwrap_or_else(PoisonError::into_inner);
        let _ = sender.send(event);
    }
}

/// Recorder en memoria, thread-safe
///
/// Clonarlo comparte el mismo buffer.
#[derive(Clone, Default)]
pub struct EventRecorder {
    inner: Arc<Mutex<Vec<ServerEvent>>>,
}

impl EventRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<ServerEvent>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Copia de todos los eventos registrados, en orden de llegada
    pub fn events(&self) -> Vec<ServerEvent> {
        self.lock().clone()
    }

    /// Sólo los eventos de conexión
    pub fn connection_events(&self) -> Vec<ConnectionEvent> {
        self.lock()
            .iter()
            .filter_map(|event| match event {
                ServerEvent::Connection(conn) => Some(conn.clone()),
                ServerEvent::Log { .. } => None,
            })
            .collect()
    }

    /// Sólo los mensajes de log
    pub fn log_messages(&self) -> Vec<String> {
        self.lock()
            .iter()
            .filter_map(|event| match event {
                ServerEvent::Log { message, .. } => Some(message.clone()),
                ServerEvent::Connection(_) => None,
            })
            .collect()
    }

    /// Conexiones terminadas por código de estado
    pub fn status_counts(&self) -> HashMap<u16, u64> {
        let mut counts = HashMap::new();
        for event in self.connection_events() {
            if let Some(code) = event.status_code() {
                *counts.entry(code).or_insert(0) += 1;
            }
        }
        counts
    }

    /// Conexiones que terminaron (con respuesta o con error)
    pub fn finished_connections(&self) -> usize {
        self.connection_events()
            .iter()
            .filter(|event| event.status != EventStatus::Received)
            .count()
    }
}

impl EventSink for EventRecorder {
    fn emit(&self, event: ServerEvent) {
        self.lock().push(event);
    }
}

/// Descarta todo
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&self, _event: ServerEvent) {}
}
