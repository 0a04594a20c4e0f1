//! Tabla estática de Content-Type por extensión.

use std::path::Path;

/// Content-Type para extensiones que no están en la tabla
pub const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

static CONTENT_TYPES: &[(&str, &str)] = &[
    ("html", "text/html"),
    ("htm", "text/html"),
    ("css", "text/css"),
    ("js", "application/javascript"),
    ("png", "image/png"),
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("gif", "image/gif"),
    ("pdf", "application/pdf"),
    ("zip", "application/zip"),
    ("txt", "text/plain"),
];

/// Busca el Content-Type según la extensión (sin distinguir mayúsculas)
///
/// # Ejemplo
/// ```
/// use std::path::Path;
/// use webroot_server::fs::content_type_for;
///
/// assert_eq!(content_type_for(Path::new("a/b/photo.JPG")), "image/jpeg");
/// assert_eq!(content_type_for(Path::new("Makefile")), "application/octet-stream");
/// ```
pub fn content_type_for(path: &Path) -> &'static str {
    let extension = match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) => ext,
        None => return FALLBACK_CONTENT_TYPE,
    };

    CONTENT_TYPES
        .iter()
        .find(|(known, _)| known.eq_ignore_ascii_case(extension))
        .map(|(_, content_type)| *content_type)
        .unwrap_or(FALLBACK_CONTENT_TYPE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_extensions() {
        assert_eq!(content_type_for(Path::new("index.html")), "text/html");
        assert_eq!(content_type_for(Path::new("index.htm")), "text/html");
        assert_eq!(content_type_for(Path::new("style.css")), "text/css");
        assert_eq!(content_type_for(Path::new("app.js")), "application/javascript");
        assert_eq!(content_type_for(Path::new("logo.png")), "image/png");
        assert_eq!(content_type_for(Path::new("a.jpeg")), "image/jpeg");
        assert_eq!(content_type_for(Path::new("a.gif")), "image/gif");
        assert_eq!(content_type_for(Path::new("doc.pdf")), "application/pdf");
        assert_eq!(content_type_for(Path::new("bundle.zip")), "application/zip");
        assert_eq!(content_type_for(Path::new("notes.txt")), "text/plain");
    }

    #[test]
    fn test_unmapped_extensions() {
        assert_eq!(content_type_for(Path::new("data.bin")), FALLBACK_CONTENT_TYPE);
        assert_eq!(content_type_for(Path::new("archive.tar.gz")), FALLBACK_CONTENT_TYPE);
        assert_eq!(content_type_for(Path::new(".hidden")), FALLBACK_CONTENT_TYPE);
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(content_type_for(Path::new("INDEX.HTML")), "text/html");
        assert_eq!(content_type_for(Path::new("Readme.Txt")), "text/plain");
    }
}
