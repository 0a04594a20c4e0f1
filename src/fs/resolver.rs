//! # Resolución de Paths
//! src/fs/resolver.rs
//!
//! Traduce el path de la URL a un path del filesystem sin salir nunca del
//! webroot. Hay dos barreras:
//!
//! 1. **Sintáctica**: cualquier `..` en el path (crudo o decodificado) es
//!    `Forbidden`, exista o no algo en disco.
//! 2. **Canónica**: el path resultante se canonicaliza (symlinks incluidos) y
//!    tiene que quedar dentro de la raíz canonicalizada. Esto atrapa los
//!    escapes por symlink que la primera barrera no ve.
//!
//! No tiene efectos secundarios y no cachea nada: cada request se resuelve
//! contra el estado actual del filesystem.

use percent_encoding::percent_decode_str;
use std::fs;
use std::path::{Component, Path, PathBuf};

/// Resultado de mapear un path de URL al filesystem
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedTarget {
    /// Directorio existente dentro del webroot (path canónico)
    Directory(PathBuf),

    /// Archivo existente dentro del webroot (path canónico)
    File(PathBuf),

    /// No existe o no se puede acceder
    NotFound,

    /// Intento de salir del webroot
    Forbidden,
}

/// Resuelve `raw_path` contra `root`
///
/// # Ejemplo
///
/// ```
/// use webroot_server::fs::{resolve, ResolvedTarget};
///
/// let root = std::env::temp_dir();
/// assert_eq!(resolve(&root, "/../etc/passwd"), ResolvedTarget::Forbidden);
/// assert!(matches!(resolve(&root, "/"), ResolvedTarget::Directory(_)));
/// ```
pub fn resolve(root: &Path, raw_path: &str) -> ResolvedTarget {
    // Barrera sintáctica sobre el path tal como llegó
    if raw_path.contains("..") {
        return ResolvedTarget::Forbidden;
    }

    let root = match root.canonicalize() {
        Ok(root) => root,
        Err(_) => return ResolvedTarget::NotFound,
    };

    let relative = match decode_relative(raw_path) {
        Some(relative) => relative,
        None => return ResolvedTarget::Forbidden,
    };

    if relative.as_os_str().is_empty() {
        return ResolvedTarget::Directory(root);
    }

    let canonical = match root.join(&relative).canonicalize() {
        Ok(canonical) => canonical,
        Err(_) => return ResolvedTarget::NotFound,
    };

    // `Path::starts_with` compara por componentes, así que "/srv/www2" no
    // pasa por estar dentro de "/srv/www"
    if !canonical.starts_with(&root) {
        return ResolvedTarget::Forbidden;
    }

    match fs::metadata(&canonical) {
        Ok(meta) if meta.is_dir() => ResolvedTarget::Directory(canonical),
        Ok(_) => ResolvedTarget::File(canonical),
        Err(_) => ResolvedTarget::NotFound,
    }
}

/// Quita query string y fragmento, decodifica `%XX` y valida componentes
///
/// Retorna `None` si el resultado no es un path relativo limpio.
fn decode_relative(raw_path: &str) -> Option<PathBuf> {
    let end = raw_path.find(&['?', '#'][..]).unwrap_or(raw_path.len());
    let decoded = percent_decode_str(&raw_path[..end]).decode_utf8().ok()?;

    if decoded.contains("..") || decoded.contains('\0') || decoded.contains('\\') {
        return None;
    }

    let mut relative = PathBuf::new();
    for component in Path::new(decoded.trim_start_matches('/')).components() {
        match component {
            Component::Normal(segment) => relative.push(segment),
            Component::CurDir => {}
            Component::RootDir | Component::ParentDir | Component::Prefix(_) => return None,
        }
    }

    Some(relative)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    /// Webroot con `index.html` (12 bytes) y `docs/guide.txt`
    fn webroot() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("index.html"), b"<h1>hi</h1>\n").unwrap();
        fs::create_dir(dir.path().join("docs")).unwrap();
        fs::write(dir.path().join("docs").join("guide.txt"), b"guide").unwrap();
        dir
    }

    fn canonical(dir: &TempDir) -> PathBuf {
        dir.path().canonicalize().unwrap()
    }

    #[test]
    fn test_root_maps_to_root_directory() {
        let dir = webroot();
        assert_eq!(resolve(dir.path(), "/"), ResolvedTarget::Directory(canonical(&dir)));
        assert_eq!(resolve(dir.path(), ""), ResolvedTarget::Directory(canonical(&dir)));
        assert_eq!(resolve(dir.path(), "//"), ResolvedTarget::Directory(canonical(&dir)));
    }

    #[test]
    fn test_file_and_directory() {
        let dir = webroot();
        let root = canonical(&dir);

        assert_eq!(
            resolve(dir.path(), "/index.html"),
            ResolvedTarget::File(root.join("index.html"))
        );
        assert_eq!(
            resolve(dir.path(), "/docs"),
            ResolvedTarget::Directory(root.join("docs"))
        );
        assert_eq!(
            resolve(dir.path(), "/docs/"),
            ResolvedTarget::Directory(root.join("docs"))
        );
        assert_eq!(
            resolve(dir.path(), "/docs/./guide.txt"),
            ResolvedTarget::File(root.join("docs").join("guide.txt"))
        );
    }

    #[test]
    fn test_missing_is_not_found() {
        let dir = webroot();
        assert_eq!(resolve(dir.path(), "/missing.txt"), ResolvedTarget::NotFound);
        assert_eq!(resolve(dir.path(), "/docs/nope/deeper"), ResolvedTarget::NotFound);
        // Un archivo usado como directorio
        assert_eq!(resolve(dir.path(), "/index.html/x"), ResolvedTarget::NotFound);
    }

    #[test]
    fn test_dot_dot_is_forbidden_regardless_of_disk() {
        let dir = webroot();
        assert_eq!(resolve(dir.path(), "/../etc/passwd"), ResolvedTarget::Forbidden);
        assert_eq!(resolve(dir.path(), "/docs/../index.html"), ResolvedTarget::Forbidden);
        assert_eq!(resolve(dir.path(), "/.."), ResolvedTarget::Forbidden);
        // Cualquier aparición literal cuenta
        assert_eq!(resolve(dir.path(), "/notes..txt"), ResolvedTarget::Forbidden);
    }

    #[test]
    fn test_encoded_traversal_is_forbidden() {
        let dir = webroot();
        assert_eq!(resolve(dir.path(), "/%2e%2e/etc/passwd"), ResolvedTarget::Forbidden);
        assert_eq!(resolve(dir.path(), "/docs/%2E%2E/%2E%2E/x"), ResolvedTarget::Forbidden);
        assert_eq!(resolve(dir.path(), "/a%5Cb"), ResolvedTarget::Forbidden);
        assert_eq!(resolve(dir.path(), "/a%00b"), ResolvedTarget::Forbidden);
        // Bytes que no forman UTF-8
        assert_eq!(resolve(dir.path(), "/%ff%fe"), ResolvedTarget::Forbidden);
    }

    #[test]
    fn test_query_string_is_ignored() {
        let dir = webroot();
        assert_eq!(
            resolve(dir.path(), "/index.html?v=2#top"),
            ResolvedTarget::File(canonical(&dir).join("index.html"))
        );
    }

    #[test]
    fn test_percent_decoded_names() {
        let dir = webroot();
        fs::write(dir.path().join("my file.txt"), b"x").unwrap();

        assert_eq!(
            resolve(dir.path(), "/my%20file.txt"),
            ResolvedTarget::File(canonical(&dir).join("my file.txt"))
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_escape_is_forbidden() {
        let dir = webroot();
        let outside = TempDir::new().unwrap();
        fs::write(outside.path().join("secret.txt"), b"secret").unwrap();

        std::os::unix::fs::symlink(outside.path(), dir.path().join("escape")).unwrap();
        std::os::unix::fs::symlink(
            outside.path().join("secret.txt"),
            dir.path().join("secret-link.txt"),
        )
        .unwrap();

        assert_eq!(resolve(dir.path(), "/escape/secret.txt"), ResolvedTarget::Forbidden);
        assert_eq!(resolve(dir.path(), "/escape"), ResolvedTarget::Forbidden);
        assert_eq!(resolve(dir.path(), "/secret-link.txt"), ResolvedTarget::Forbidden);
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_inside_root_is_served() {
        let dir = webroot();
        std::os::unix::fs::symlink(
            dir.path().join("docs").join("guide.txt"),
            dir.path().join("guide-link.txt"),
        )
        .unwrap();

        assert_eq!(
            resolve(dir.path(), "/guide-link.txt"),
            ResolvedTarget::File(canonical(&dir).join("docs").join("guide.txt"))
        );
    }

    #[test]
    fn test_missing_root_is_not_found() {
        let dir = webroot();
        let gone = dir.path().join("does-not-exist");
        assert_eq!(resolve(&gone, "/"), ResolvedTarget::NotFound);
    }
}
