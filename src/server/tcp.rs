//! # Servidor TCP Concurrente
//! src/server/tcp.rs
//!
//! Arranque y parada del servidor. `Server::start` hace el bind de forma
//! síncrona (los errores vuelven al llamador) y después deja corriendo:
//!
//! - un thread `accept` que acepta conexiones y las encola en el pool
//! - `max_workers` workers que las atienden
//!
//! `ServerHandle::stop` levanta la bandera de parada, despierta al thread
//! `accept` con una conexión local y espera a que el pool termine lo que
//! tenía en curso.

use super::connection::ConnectionHandler;
use super::pool::WorkerPool;
use crate::config::ServerConfig;
use crate::error::StartError;
use crate::events::{EventReporter, EventSink};
use log::debug;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr, TcpListener, TcpStream};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Pausa después de un error de accept (por ejemplo, sin file descriptors)
const ACCEPT_BACKOFF: Duration = Duration::from_millis(50);

/// Timeout de la conexión que despierta al thread `accept`
const WAKE_TIMEOUT: Duration = Duration::from_secs(1);

/// Servidor de archivos sobre un webroot
pub struct Server;

impl Server {
    /// Valida la configuración, hace bind y arranca los threads
    ///
    /// # Ejemplo
    /// ```no_run
    /// use std::sync::Arc;
    /// use webroot_server::config::ServerConfig;
    /// use webroot_server::events::NullSink;
    /// use webroot_server::server::Server;
    ///
    /// let config = ServerConfig::new(8080, "/srv/www");
    /// let mut handle = Server::start(config, Arc::new(NullSink)).unwrap();
    /// println!("Listening on {}", handle.local_addr());
    /// handle.stop();
    /// ```
    pub fn start(config: ServerConfig, sink: Arc<dyn EventSink>) -> Result<ServerHandle, StartError> {
        config.validate()?;

        let root = config
            .root_dir
            .canonicalize()
            .map_err(|e| StartError::InvalidRoot {
                path: config.root_dir.clone(),
                reason: e.to_string(),
            })?;

        let address = config.address();
        let listener = TcpListener::bind(&address).map_err(|source| StartError::Bind {
            addr: address.clone(),
            source,
        })?;
        let local_addr = listener.local_addr().map_err(|source| StartError::Bind {
            addr: address.clone(),
            source,
        })?;

        let pool = WorkerPool::new(config.max_workers).map_err(StartError::Spawn)?;

        let reporter = EventReporter::new(sink);
        let handler = Arc::new(ConnectionHandler::new(
            root.clone(),
            config.read_timeout(),
            config.write_timeout(),
            reporter.clone(),
        ));
        let running = Arc::new(AtomicBool::new(true));

        let accept_thread = {
            let running = Arc::clone(&running);
            let reporter = reporter.clone();
            thread::Builder::new()
                .name("accept".to_string())
                .spawn(move || accept_loop(listener, pool, handler, running, reporter))
                .map_err(StartError::Spawn)?
        };

        reporter.info(format!("Server started on port {}", local_addr.port()));
        reporter.info(format!("Webroot: {}", root.display()));

        Ok(ServerHandle {
            local_addr,
            root,
            max_workers: config.max_workers,
            running,
            accept_thread: Some(accept_thread),
            reporter,
        })
    }
}

/// Acepta conexiones hasta que se baje la bandera `running`
fn accept_loop(
    listener: TcpListener,
    mut pool: WorkerPool,
    handler: Arc<ConnectionHandler>,
    running: Arc<AtomicBool>,
    reporter: EventReporter,
) {
    for stream in listener.incoming() {
        if !running.load(Ordering::SeqCst) {
            break;
        }

        match stream {
            Ok(stream) => {
                let handler = Arc::clone(&handler);
                if pool.submit(move || handler.handle(stream)).is_err() {
                    break;
                }
            }
            Err(e) => {
                reporter.error(format!("Error accepting connection: {}", e));
                thread::sleep(ACCEPT_BACKOFF);
            }
        }
    }

    drop(listener);
    debug!("Listener closed, draining {} queued connections", pool.queued());
    pool.shutdown();
}

/// Handle de un servidor corriendo
///
/// Al hacer drop se detiene el servidor.
pub struct ServerHandle {
    local_addr: SocketAddr,
    root: PathBuf,
    max_workers: usize,
    running: Arc<AtomicBool>,
    accept_thread: Option<JoinHandle<()>>,
    reporter: EventReporter,
}

impl ServerHandle {
    /// Dirección real en la que escucha (útil con puerto 0)
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn port(&self) -> u16 {
        self.local_addr.port()
    }

    /// Webroot canonicalizado
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn max_workers(&self) -> usize {
        self.max_workers
    }

    pub fn is_running(&self) -> bool {
        self.accept_thread.is_some() && self.running.load(Ordering::SeqCst)
    }

    /// Detiene el servidor
    ///
    /// Deja de aceptar conexiones, libera el puerto y espera a que terminen
    /// las conexiones en curso y las encoladas. Llamarlo de nuevo no hace
    /// nada.
    pub fn stop(&mut self) {
        let accept_thread = match self.accept_thread.take() {
            Some(thread) => thread,
            None => return,
        };

        self.running.store(false, Ordering::SeqCst);
        wake(self.local_addr);

        if accept_thread.join().is_err() {
            self.reporter.error("Accept thread terminated abnormally".to_string());
        }
        self.reporter.info("Server stopped".to_string());
    }

    /// Bloquea hasta que el thread `accept` termine por su cuenta
    pub fn wait(mut self) {
        if let Some(thread) = self.accept_thread.take() {
            let _ = thread.join();
        }
    }
}

impl Drop for ServerHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

impl std::fmt::Debug for ServerHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerHandle")
            .field("local_addr", &self.local_addr)
            .field("root", &self.root)
            .field("running", &self.is_running())
            .finish()
    }
}

/// Conecta al listener para que `accept` retorne y vea la bandera
fn wake(addr: SocketAddr) {
    let target = match addr.ip() {
        IpAddr::V4(ip) if ip.is_unspecified() => SocketAddr::new(Ipv4Addr::LOCALHOST.into(), addr.port()),
        IpAddr::V6(ip) if ip.is_unspecified() => SocketAddr::new(Ipv6Addr::LOCALHOST.into(), addr.port()),
        _ => addr,
    };

    if let Err(e) = TcpStream::connect_timeout(&target, WAKE_TIMEOUT) {
        debug!("Could not wake listener at {}: {}", target, e);
    }
}
