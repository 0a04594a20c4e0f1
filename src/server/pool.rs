//! # Pool de Workers
//! src/server/pool.rs
//!
//! Pool fijo de threads que atienden conexiones. Las conexiones aceptadas
//! se encolan en una `VecDeque` protegida por `Mutex` y los workers se
//! despiertan con un `Condvar`.
//!
//! - Nunca hay más de `size` trabajos corriendo a la vez
//! - Lo que no entra se queda en la cola (FIFO) hasta que un worker se libere
//! - Un trabajo que entra en pánico no se lleva al worker consigo
//! - `shutdown` deja de aceptar trabajos, termina los encolados y hace join

use log::{debug, error};
use std::collections::VecDeque;
use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};

type Job = Box<dyn FnOnce() + Send + 'static>;

/// El pool ya está cerrado y no acepta más trabajos
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolClosed;

impl std::fmt::Display for PoolClosed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "worker pool is shut down")
    }
}

impl std::error::Error for PoolClosed {}

struct QueueState {
    jobs: VecDeque<Job>,
    closed: bool,
}

struct Shared {
    state: Mutex<QueueState>,
    condvar: Condvar,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, QueueState> {
        // Los trabajos corren fuera del lock, así que un pánico no deja la
        // cola a medio modificar
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Pool de tamaño fijo
pub struct WorkerPool {
    shared: Arc<Shared>,
    workers: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    /// Crea el pool con `size` workers (al menos uno)
    ///
    /// Si falla la creación de algún thread, los que ya arrancaron se
    /// cierran antes de devolver el error.
    pub fn new(size: usize) -> io::Result<Self> {
        let size = size.max(1);
        let shared = Arc::new(Shared {
            state: Mutex::new(QueueState {
                jobs: VecDeque::new(),
                closed: false,
            }),
            condvar: Condvar::new(),
        });

        let mut pool = Self {
            shared,
            workers: Vec::with_capacity(size),
        };

        for i in 0..size {
            let name = format!("worker-{}", i);
            let shared = Arc::clone(&pool.shared);
            let spawned = thread::Builder::new()
                .name(name.clone())
                .spawn(move || worker_loop(name, shared));

            match spawned {
                Ok(handle) => pool.workers.push(handle),
                Err(e) => {
                    pool.shutdown();
                    return Err(e);
                }
            }
        }

        Ok(pool)
    }

    /// Encola un trabajo
    pub fn submit<F>(&self, job: F) -> Result<(), PoolClosed>
    where
        F: FnOnce() + Send + 'static,
    {
        let mut state = self.shared.lock();
        if state.closed {
            return Err(PoolClosed);
        }
        state.jobs.push_back(Box::new(job));
        drop(state);

        self.shared.condvar.notify_one();
        Ok(())
    }

    /// Trabajos esperando un worker libre
    pub fn queued(&self) -> usize {
        self.shared.lock().jobs.len()
    }

    /// Cierra el pool y espera a que terminen todos los trabajos
    ///
    /// Los trabajos ya encolados se ejecutan. Llamarlo más de una vez no
    /// hace nada.
    pub fn shutdown(&mut self) {
        self.shared.lock().closed = true;
        self.shared.condvar.notify_all();

        for handle in self.workers.drain(..) {
            if handle.join().is_err() {
                error!("Worker thread terminated abnormally");
            }
        }
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Loop principal de cada worker
fn worker_loop(name: String, shared: Arc<Shared>) {
    debug!("Worker {} started", name);

    loop {
        let job = {
            let mut state = shared.lock();
            loop {
                if let Some(job) = state.jobs.pop_front() {
                    break Some(job);
                }
                if state.closed {
                    break None;
                }
                state = shared
                    .condvar
                    .wait(state)
                    .unwrap_or_else(PoisonError::into_inner);
            }
        };

        match job {
            Some(job) => {
                if panic::catch_unwind(AssertUnwindSafe(job)).is_err() {
                    error!("Worker {}: connection handler panicked", name);
                }
            }
            None => break,
        }
    }

    debug!("Worker {} stopped", name);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::mpsc;
    use std::time::Duration;

    #[test]
    fn test_runs_all_jobs() {
        let mut pool = WorkerPool::new(4).unwrap();
        let counter = Arc::new(AtomicUsize::new(0));

        for _ in 0..50 {
            let counter = Arc::clone(&counter);
            pool.submit(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            })
            .unwrap();
        }

        pool.shutdown();
        assert_eq!(counter.load(Ordering::SeqCst), 50);
    }

    #[test]
    fn test_concurrency_is_bounded() {
        let mut pool = WorkerPool::new(2).unwrap();
        let active = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        for _ in 0..8 {
            let active = Arc::clone(&active);
            let peak = Arc::clone(&peak);
            pool.submit(move || {
                let now = active.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                thread::sleep(Duration::from_millis(30));
                active.fetch_sub(1, Ordering::SeqCst);
            })
            .unwrap();
        }

        pool.shutdown();
        assert!(peak.load(Ordering::SeqCst) <= 2);
        assert!(peak.load(Ordering::SeqCst) >= 1);
    }

    #[test]
    fn test_excess_jobs_wait_in_queue() {
        let pool = WorkerPool::new(1).unwrap();
        let (release_tx, release_rx) = mpsc::channel::<()>();
        let (started_tx, started_rx) = mpsc::channel::<()>();

        pool.submit(move || {
            started_tx.send(()).unwrap();
            release_rx.recv().unwrap();
        })
        .unwrap();
        started_rx.recv_timeout(Duration::from_secs(5)).unwrap();

        // El único worker está ocupado: estos dos quedan encolados
        pool.submit(|| {}).unwrap();
        pool.submit(|| {}).unwrap();
        assert_eq!(pool.queued(), 2);

        release_tx.send(()).unwrap();
        drop(pool);
    }

    #[test]
    fn test_fifo_order_with_single_worker() {
        let mut pool = WorkerPool::new(1).unwrap();
        let order = Arc::new(Mutex::new(Vec::new()));

        for i in 0..10 {
            let order = Arc::clone(&order);
            pool.submit(move || order.lock().unwrap().push(i)).unwrap();
        }

        pool.shutdown();
        assert_eq!(*order.lock().unwrap(), (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn test_submit_after_shutdown() {
        let mut pool = WorkerPool::new(2).unwrap();
        pool.shutdown();
        assert_eq!(pool.submit(|| {}), Err(PoolClosed));

        // Idempotente
        pool.shutdown();
    }

    #[test]
    fn test_panic_does_not_kill_worker() {
        let mut pool = WorkerPool::new(1).unwrap();
        let counter = Arc::new(AtomicUsize::new(0));

        pool.submit(|| panic!("boom")).unwrap();
        let after = Arc::clone(&counter);
        pool.submit(move || {
            after.fetch_add(1, Ordering::SeqCst);
        })
        .unwrap();

        pool.shutdown();
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_zero_size_still_runs_jobs() {
        let mut pool = WorkerPool::new(0).unwrap();
        let counter = Arc::new(AtomicUsize::new(0));

        let done = Arc::clone(&counter);
        pool.submit(move || {
            done.fetch_add(1, Ordering::SeqCst);
        })
        .unwrap();

        pool.shutdown();
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }
}
