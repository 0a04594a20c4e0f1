//! # Manejo de una Conexión
//! src/server/connection.rs
//!
//! Una conexión = un request = una respuesta. El handler avanza por una
//! máquina de estados explícita:
//!
//! ```text
//! ReadingRequest ──> Resolving ──┬──> ServingDirectory ──┐
//!        │                       ├──> ServingFile ───────┼──> Closed
//!        └───────────────────────┴──> SendingError ──────┘
//! ```
//!
//! Los estados de servicio pueden caer en `SendingError` (por ejemplo un
//! directorio que no se puede leer termina en 403). Ningún error de una
//! conexión sale de acá: todo termina en una respuesta o en un evento
//! `Failed`.

use crate::events::{ConnectionEvent, EventReporter, EventStatus};
use crate::fs::{self as webroot, ResolvedTarget};
use crate::http::{Method, Request, Response, StatusCode};
use log::debug;
use percent_encoding::percent_decode_str;
use std::io::{self, BufReader, Read};
use std::net::{Shutdown, TcpStream};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Tiempo máximo esperando que el cliente cierre después de la respuesta
const LINGER_TIMEOUT: Duration = Duration::from_millis(250);

/// Máximo de bytes descartados al cerrar
const LINGER_MAX_BYTES: u64 = 64 * 1024;

/// Valor de `method`/`path` en eventos de requests que no se pudieron parsear
const UNKNOWN: &str = "-";

enum State {
    ReadingRequest,
    Resolving(Request),
    ServingDirectory { dir: PathBuf, url_path: String },
    ServingFile(PathBuf),
    SendingError(StatusCode),
    Closed(Outcome),
}

/// Cómo terminó la conexión
#[derive(Debug)]
enum Outcome {
    Sent(StatusCode),
    Aborted(io::Error),
}

/// Datos de la conexión que se reportan en los eventos
struct Exchange {
    client: String,
    method: String,
    path: String,
}

/// Atiende conexiones contra un webroot ya canonicalizado
#[derive(Debug)]
pub struct ConnectionHandler {
    root: PathBuf,
    read_timeout: Option<Duration>,
    write_timeout: Option<Duration>,
    reporter: EventReporter,
}

impl ConnectionHandler {
    pub fn new(
        root: PathBuf,
        read_timeout: Option<Duration>,
        write_timeout: Option<Duration>,
        reporter: EventReporter,
    ) -> Self {
        Self {
            root,
            read_timeout,
            write_timeout,
            reporter,
        }
    }

    /// Atiende una conexión completa y la cierra
    pub fn handle(&self, stream: TcpStream) {
        let client = stream
            .peer_addr()
            .map(|addr| addr.ip().to_string())
            .unwrap_or_else(|_| "unknown".to_string());

        if let Err(e) = stream
            .set_read_timeout(self.read_timeout)
            .and_then(|_| stream.set_write_timeout(self.write_timeout))
        {
            debug!("Could not set socket timeouts for {}: {}", client, e);
        }

        let mut exchange = Exchange {
            client,
            method: UNKNOWN.to_string(),
            path: UNKNOWN.to_string(),
        };
        let mut reader = BufReader::new(&stream);
        let mut state = State::ReadingRequest;

        let outcome = loop {
            state = match state {
                State::ReadingRequest => self.read_request(&mut reader, &mut exchange),
                State::Resolving(request) => self.route(&request),
                State::ServingDirectory { dir, url_path } => {
                    self.serve_directory(&stream, dir, &url_path)
                }
                State::ServingFile(file) => self.serve_file(&stream, file),
                State::SendingError(status) => self.send_error(&stream, status),
                State::Closed(outcome) => break outcome,
            };
        };

        let status = match outcome {
            Outcome::Sent(status) => EventStatus::Completed(status.as_u16()),
            Outcome::Aborted(e) => {
                self.reporter
                    .warn(format!("Connection with {} failed: {}", exchange.client, e));
                EventStatus::Failed(e.to_string())
            }
        };
        self.reporter.connection(ConnectionEvent::new(
            &exchange.client,
            &exchange.method,
            &exchange.path,
            status,
        ));

        drop(reader);
        close(stream);
    }

    fn read_request(&self, reader: &mut BufReader<&TcpStream>, exchange: &mut Exchange) -> State {
        match Request::read_from(reader) {
            Ok(request) => {
                exchange.method = request.method().to_string();
                exchange.path = request.raw_path().to_string();

                self.reporter.info(format!(
                    "{} {} from {}",
                    exchange.method, exchange.path, exchange.client
                ));
                self.reporter.connection(ConnectionEvent::new(
                    &exchange.client,
                    &exchange.method,
                    &exchange.path,
                    EventStatus::Received,
                ));
                State::Resolving(request)
            }
            Err(e) => {
                debug!("Bad request from {}: {}", exchange.client, e);
                State::SendingError(StatusCode::BadRequest)
            }
        }
    }

    /// Decide qué se responde, sin escribir nada todavía
    fn route(&self, request: &Request) -> State {
        // Sólo GET; el resto no toca el filesystem
        if !matches!(request.method(), Method::GET) {
            return State::SendingError(StatusCode::MethodNotAllowed);
        }

        match webroot::resolve(&self.root, request.raw_path()) {
            ResolvedTarget::Directory(dir) => State::ServingDirectory {
                dir,
                url_path: percent_decode_str(request.path())
                    .decode_utf8_lossy()
                    .into_owned(),
            },
            ResolvedTarget::File(file) => State::ServingFile(file),
            ResolvedTarget::Forbidden => State::SendingError(StatusCode::Forbidden),
            ResolvedTarget::NotFound => State::SendingError(StatusCode::NotFound),
        }
    }

    fn serve_directory(&self, stream: &TcpStream, dir: PathBuf, url_path: &str) -> State {
        let is_root = dir == self.root;

        let body = match webroot::render(&dir, url_path, is_root) {
            Ok(body) => body,
            Err(e) => {
                debug!("Could not list {}: {}", dir.display(), e);
                return State::SendingError(StatusCode::Forbidden);
            }
        };

        self.reporter
            .info(format!("Directory listing: {}", display_name(&dir, &self.root)));
        write_response(stream, Response::html(StatusCode::Ok, body))
    }

    fn serve_file(&self, stream: &TcpStream, file: PathBuf) -> State {
        let response = match webroot::send(&file) {
            Ok(response) => response,
            Err(e) => {
                debug!("Could not open {}: {}", file.display(), e);
                return State::SendingError(StatusCode::Forbidden);
            }
        };

        let size = response.content_length();
        let state = write_response(stream, response);
        if let State::Closed(Outcome::Sent(_)) = state {
            self.reporter.info(format!(
                "File sent: {} ({})",
                display_name(&file, &self.root),
                webroot::format_size(size)
            ));
        }
        state
    }

    fn send_error(&self, stream: &TcpStream, status: StatusCode) -> State {
        self.reporter
            .warn(format!("Error {}: {}", status.as_u16(), status.reason_phrase()));
        write_response(stream, Response::error_page(status, status.reason_phrase()))
    }
}

fn write_response(stream: &TcpStream, mut response: Response) -> State {
    let status = response.status();
    let mut writer = stream;
    match response.write_to(&mut writer) {
        Ok(_) => State::Closed(Outcome::Sent(status)),
        Err(e) => State::Closed(Outcome::Aborted(e)),
    }
}

/// Path relativo al webroot para los logs
fn display_name(path: &Path, root: &Path) -> String {
    match path.strip_prefix(root) {
        Ok(relative) if relative.as_os_str().is_empty() => "/".to_string(),
        Ok(relative) => format!("/{}", relative.display()),
        Err(_) => path.display().to_string(),
    }
}

/// Cierra la escritura y descarta lo que el cliente haya dejado sin leer
///
/// Cerrar con datos pendientes en el buffer de recepción manda un RST, y
/// el cliente puede perder la respuesta.
fn close(stream: TcpStream) {
    if stream.shutdown(Shutdown::Write).is_err() {
        return;
    }
    if stream.set_read_timeout(Some(LINGER_TIMEOUT)).is_ok() {
        let _ = io::copy(&mut (&stream).take(LINGER_MAX_BYTES), &mut io::sink());
    }
}
