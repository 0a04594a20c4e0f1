//! # Logging
//! src/logging.rs
//!
//! Logger del proceso sobre `fern`: una línea por mensaje, a stderr, con
//! hora local y nivel. Stdout queda libre para los eventos.

use chrono::Local;
use log::LevelFilter;

/// Instala el logger global
///
/// Sólo se puede llamar una vez por proceso.
pub fn init(level: LevelFilter) -> Result<(), log::SetLoggerError> {
    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{}] [{:<5}] {}",
                Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                message
            ))
        })
        .level(level)
        .chain(std::io::stderr())
        .apply()
}
