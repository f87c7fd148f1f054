//! External Resource Loading
//!
//! The parser never touches the filesystem or network itself. When a
//! DOCTYPE names external content it asks an injected `ResourceLoader`
//! for the bytes, first by public identifier, then by system identifier.
//! A failed or empty load is never fatal to the document.

use std::collections::HashMap;
use std::io;
use std::path::{Component, Path, PathBuf};

/// Capability to fetch external DTD content
///
/// Implementations must be reentrant: batch parsing may call a single
/// loader from several threads.
pub trait ResourceLoader: Send + Sync {
    /// Load the resource a system identifier (URI) points at
    fn load(&self, uri: &str) -> io::Result<Vec<u8>>;

    /// Load the resource registered for a public identifier
    fn load_public(&self, public_id: &str) -> io::Result<Vec<u8>> {
        Err(io::Error::new(
            io::ErrorKind::NotFound,
            format!("no catalog entry for public id {public_id:?}"),
        ))
    }
}

impl<L: ResourceLoader + ?Sized> ResourceLoader for &L {
    fn load(&self, uri: &str) -> io::Result<Vec<u8>> {
        (**self).load(uri)
    }

    fn load_public(&self, public_id: &str) -> io::Result<Vec<u8>> {
        (**self).load_public(public_id)
    }
}

fn not_found(what: &str, id: &str) -> io::Error {
    io::Error::new(io::ErrorKind::NotFound, format!("{what} {id:?} not found"))
}

/// In-memory catalog of system and public identifiers
#[derive(Debug, Clone, Default)]
pub struct MemoryLoader {
    system: HashMap<String, Vec<u8>>,
    public: HashMap<String, Vec<u8>>,
}

impl MemoryLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register content under a system identifier
    pub fn with_system(mut self, uri: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        self.system.insert(uri.into(), content.into());
        self
    }

    /// Register content under a public identifier
    pub fn with_public(mut self, id: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        self.public.insert(id.into(), content.into());
        self
    }
}

impl ResourceLoader for MemoryLoader {
    fn load(&self, uri: &str) -> io::Result<Vec<u8>> {
        self.system
            .get(uri)
            .cloned()
            .ok_or_else(|| not_found("system id", uri))
    }

    fn load_public(&self, public_id: &str) -> io::Result<Vec<u8>> {
        self.public
            .get(public_id)
            .cloned()
            .ok_or_else(|| not_found("public id", public_id))
    }
}

/// Resolves system identifiers as paths relative to a base directory
///
/// Absolute paths and `..` components are refused, so a document can
/// only reach files under the base.
#[derive(Debug, Clone)]
pub struct DirectoryLoader {
    base: PathBuf,
}

impl DirectoryLoader {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        DirectoryLoader { base: base.into() }
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    fn resolve(&self, uri: &str) -> io::Result<PathBuf> {
        let relative = Path::new(uri);
        let contained = relative
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
        if !contained {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!("system id {uri:?} escapes the base directory"),
            ));
        }
        Ok(self.base.join(relative))
    }
}

impl ResourceLoader for DirectoryLoader {
    fn load(&self, uri: &str) -> io::Result<Vec<u8>> {
        let path = self.resolve(uri)?;
        log::debug!(target: "glyphxml::loader", "reading {}", path.display());
        std::fs::read(path)
    }
}

#[cfg(feature = "loader-cache")]
pub use cached::CachedLoader;

#[cfg(feature = "loader-cache")]
mod cached {
    use super::ResourceLoader;
    use lru::LruCache;
    use std::io;
    use std::num::NonZeroUsize;
    use std::sync::Mutex;

    const DEFAULT_CAPACITY: usize = 32;

    #[derive(Debug, Clone, PartialEq, Eq, Hash)]
    enum Key {
        System(String),
        Public(String),
    }

    /// Memoizes an inner loader's successful loads
    ///
    /// Failures are not cached, so a missing resource is retried on the
    /// next request.
    pub struct CachedLoader<L> {
        inner: L,
        cache: Mutex<LruCache<Key, Vec<u8>>>,
    }

    impl<L: ResourceLoader> CachedLoader<L> {
        pub fn new(inner: L) -> Self {
            Self::with_capacity(inner, DEFAULT_CAPACITY)
        }

        /// A zero capacity is bumped to one entry
        pub fn with_capacity(inner: L, capacity: usize) -> Self {
            let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
            CachedLoader {
                inner,
                cache: Mutex::new(LruCache::new(capacity)),
            }
        }

        pub fn inner(&self) -> &L {
            &self.inner
        }

        /// Number of cached resources
        pub fn len(&self) -> usize {
            self.cache.lock().map(|cache| cache.len()).unwrap_or(0)
        }

        pub fn is_empty(&self) -> bool {
            self.len() == 0
        }

        fn get_or_load(
            &self,
            key: Key,
            load: impl FnOnce(&L) -> io::Result<Vec<u8>>,
        ) -> io::Result<Vec<u8>> {
            if let Ok(mut cache) = self.cache.lock() {
                if let Some(hit) = cache.get(&key) {
                    log::trace!(target: "glyphxml::loader", "cache hit for {key:?}");
                    return Ok(hit.clone());
                }
            }

            // Lock released while loading; a concurrent miss may load twice
            let content = load(&self.inner)?;
            if let Ok(mut cache) = self.cache.lock() {
                cache.put(key, content.clone());
            }
            Ok(content)
        }
    }

    impl<L: ResourceLoader> ResourceLoader for CachedLoader<L> {
        fn load(&self, uri: &str) -> io::Result<Vec<u8>> {
            self.get_or_load(Key::System(uri.to_string()), |inner| inner.load(uri))
        }

        fn load_public(&self, public_id: &str) -> io::Result<Vec<u8>> {
            self.get_or_load(Key::Public(public_id.to_string()), |inner| {
                inner.load_public(public_id)
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_loader() {
        let loader = MemoryLoader::new()
            .with_system("font.dtd", "<!ELEMENT font (glyph*)>")
            .with_public("-//FONT//EN", "<!ELEMENT font ANY>");
        assert_eq!(loader.load("font.dtd").unwrap(), b"<!ELEMENT font (glyph*)>");
        assert!(loader.load_public("-//FONT//EN").is_ok());
        assert_eq!(
            loader.load("other.dtd").unwrap_err().kind(),
            io::ErrorKind::NotFound
        );
    }

    #[test]
    fn test_default_load_public_is_not_found() {
        let loader = DirectoryLoader::new(".");
        assert_eq!(
            loader.load_public("-//X//EN").unwrap_err().kind(),
            io::ErrorKind::NotFound
        );
    }

    #[test]
    fn test_directory_loader_refuses_escapes() {
        let loader = DirectoryLoader::new("/nonexistent-base");
        assert_eq!(
            loader.load("../secret.dtd").unwrap_err().kind(),
            io::ErrorKind::PermissionDenied
        );
        assert_eq!(
            loader.load("/etc/passwd").unwrap_err().kind(),
            io::ErrorKind::PermissionDenied
        );
        assert_eq!(
            loader.load("sub/./font.dtd").unwrap_err().kind(),
            io::ErrorKind::NotFound
        );
    }

    #[test]
    fn test_directory_loader_reads_files() {
        let dir = std::env::temp_dir().join(format!("glyphxml-loader-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("font.dtd"), b"<!ELEMENT a (b*)>").unwrap();

        let loader = DirectoryLoader::new(&dir);
        assert_eq!(loader.load("font.dtd").unwrap(), b"<!ELEMENT a (b*)>");

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[cfg(feature = "loader-cache")]
    #[test]
    fn test_cached_loader() {
        use std::sync::atomic::{AtomicUsize, Ordering};

        struct Counting(AtomicUsize);

        impl ResourceLoader for Counting {
            fn load(&self, uri: &str) -> io::Result<Vec<u8>> {
                self.0.fetch_add(1, Ordering::SeqCst);
                if uri == "missing" {
                    return Err(io::Error::new(io::ErrorKind::NotFound, "missing"));
                }
                Ok(uri.as_bytes().to_vec())
            }
        }

        let loader = CachedLoader::with_capacity(Counting(AtomicUsize::new(0)), 2);
        assert_eq!(loader.load("a").unwrap(), b"a");
        assert_eq!(loader.load("a").unwrap(), b"a");
        assert_eq!(loader.inner().0.load(Ordering::SeqCst), 1);

        assert!(loader.load("missing").is_err());
        assert!(loader.load("missing").is_err());
        assert_eq!(loader.inner().0.load(Ordering::SeqCst), 3);
        assert_eq!(loader.len(), 1);
    }
}
