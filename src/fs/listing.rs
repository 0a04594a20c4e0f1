//! # Listado de Directorios
//! src/fs/listing.rs
//!
//! Genera la página HTML con los hijos inmediatos de un directorio.
//!
//! - No es recursivo
//! - Respeta el orden en que el filesystem entrega las entradas (no se
//!   ordena)
//! - Los directorios llevan `/` al final del link y del nombre
//! - Incluye `../` salvo en la raíz del webroot
//!
//! Los nombres salen tal cual del filesystem, así que se escapan antes de
//! meterlos en el HTML y se codifican con `%XX` dentro de los `href`.

use chrono::{DateTime, Local};
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use std::fmt::Write as _;
use std::fs;
use std::io;
use std::path::Path;

/// Caracteres que se codifican en los links (el `/` se deja pasar)
const HREF_ENCODE_SET: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'&')
    .add(b'\'')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Una entrada del listado, leída del filesystem al momento del request
#[derive(Debug, Clone)]
pub struct DirectoryEntry {
    /// Nombre tal como lo reporta el filesystem
    pub name: String,

    /// Tamaño en bytes (`None` para directorios o si no hay metadatos)
    pub size_bytes: Option<u64>,

    /// Última modificación en hora local
    pub modified: Option<DateTime<Local>>,

    /// Si la entrada es un directorio
    pub is_dir: bool,
}

/// Lee los hijos inmediatos de `dir` en el orden del filesystem
///
/// Si no se pueden leer los metadatos de una entrada igual se lista, sin
/// tamaño ni fecha.
pub fn read_entries(dir: &Path) -> io::Result<Vec<DirectoryEntry>> {
    let mut entries = Vec::new();

    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().into_owned();

        // Seguir symlinks; si el link está roto usar los datos del link mismo
        let meta = fs::metadata(entry.path())
            .or_else(|_| entry.metadata())
            .ok();

        let is_dir = meta.as_ref().map(|m| m.is_dir()).unwrap_or(false);
        let size_bytes = match &meta {
            Some(m) if !is_dir => Some(m.len()),
            _ => None,
        };
        let modified = meta
            .as_ref()
            .and_then(|m| m.modified().ok())
            .map(DateTime::<Local>::from);

        entries.push(DirectoryEntry {
            name,
            size_bytes,
            modified,
            is_dir,
        });
    }

    Ok(entries)
}

/// Formatea un tamaño en B, KB, MB o GB
///
/// Umbrales en 1024, un decimal a partir de KB.
///
/// # Ejemplo
/// ```
/// use webroot_server::fs::format_size;
///
/// assert_eq!(format_size(512), "512 B");
/// assert_eq!(format_size(1536), "1.5 KB");
/// ```
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes < KB {
        format!("{} B", bytes)
    } else if bytes < MB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else if bytes < GB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    }
}

/// Renderiza el listado HTML de `dir`
///
/// `url_path` es el path decodificado con el que se pidió el directorio;
/// se usa para el título y como base de los links, que son absolutos para
/// que funcionen aunque la URL no termine en `/`.
pub fn render(dir: &Path, url_path: &str, is_root: bool) -> io::Result<Vec<u8>> {
    let entries = read_entries(dir)?;
    Ok(render_entries(&entries, url_path, is_root).into_bytes())
}

/// Arma el HTML a partir de entradas ya leídas
pub fn render_entries(entries: &[DirectoryEntry], url_path: &str, is_root: bool) -> String {
    let base = if url_path.ends_with('/') {
        url_path.to_string()
    } else {
        format!("{}/", url_path)
    };
    let title = html_escape::encode_text(&base);

    let mut html = String::new();
    let _ = write!(
        html,
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="UTF-8">
<title>Index of {title}</title>
<style>
body {{ font-family: Arial, sans-serif; margin: 40px; background: #f5f5f5; }}
.container {{ background: white; padding: 20px; border-radius: 10px; }}
h1 {{ color: #333; border-bottom: 2px solid #007bff; padding-bottom: 10px; }}
table {{ width: 100%; border-collapse: collapse; margin-top: 20px; }}
th, td {{ padding: 12px; text-align: left; border-bottom: 1px solid #ddd; }}
th {{ background-color: #007bff; color: white; }}
.dir {{ color: #007bff; }}
.file {{ color: #28a745; }}
.size {{ text-align: right; }}
</style>
</head>
<body>
<div class="container">
<h1>Index of {title}</h1>
<table>
<tr><th>Name</th><th>Size</th><th>Modified</th><th>Type</th></tr>
"#
    );

    if !is_root {
        let _ = writeln!(
            html,
            r#"<tr><td colspan="4"><a href="{}" class="dir">../</a></td></tr>"#,
            href(parent_of(&base))
        );
    }

    for entry in entries {
        let (link, label, class, kind) = if entry.is_dir {
            (
                format!("{}{}/", base, entry.name),
                format!("{}/", entry.name),
                "dir",
                "Directory",
            )
        } else {
            (format!("{}{}", base, entry.name), entry.name.clone(), "file", "File")
        };
        let size = entry
            .size_bytes
            .map(format_size)
            .unwrap_or_else(|| "-".to_string());
        let modified = entry
            .modified
            .map(|m| m.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "-".to_string());

        let _ = writeln!(
            html,
            r#"<tr><td><a href="{}" class="{}">{}</a></td><td class="size">{}</td><td>{}</td><td>{}</td></tr>"#,
            href(&link),
            class,
            html_escape::encode_text(&label),
            size,
            modified,
            kind
        );
    }

    html.push_str("</table>\n</div>\n</body>\n</html>\n");
    html
}

/// Path del directorio padre, con `/` final (`/docs/sub/` -> `/docs/`)
fn parent_of(base: &str) -> &str {
    let trimmed = base.trim_end_matches('/');
    match trimmed.rfind('/') {
        Some(idx) => &base[..=idx],
        None => "/",
    }
}

fn href(path: &str) -> String {
    utf8_percent_encode(path, HREF_ENCODE_SET).to_string()
}
