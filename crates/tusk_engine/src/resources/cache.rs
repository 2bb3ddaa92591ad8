//! Resource Cache - path-keyed asset storage with lifespans
//!
//! **SEPARATION OF CONCERNS**:
//! - ResourceCache: which assets are loaded, under which lifespan, and when they are released
//! - TypeHandler: how one kind of asset is produced and released
//! - GraphicsBackend: the GPU objects some handlers create
//!
//! The cache key is the resolved path alone. A second `load` of the same
//! path returns the cached value even if it names a different type tag or
//! lifespan; the first load decides both.
//!
//! **Ownership**: the [`Engine`](crate::Engine) owns the cache for the whole
//! run. Dropping a cache that still holds entries releases them.

use std::any::{type_name, Any};
use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};
use std::rc::Rc;

use super::{LoadArgs, ResourceError, TypeHandler};

/// Lifespan tag of resources that live until teardown
///
/// [`ResourceCache::clear_lifespan`] refuses to evict it.
pub const DEFAULT_LIFESPAN: &str = "";

/// One cached asset
struct CachedResource {
    value: Rc<dyn Any>,
    lifespan: String,
    type_tag: String,
}

/// Resource Cache - keyed store of loaded assets
///
/// - Type handlers are registered once per tag and never replaced
/// - At most one entry per resolved path
/// - Failed loads leave the cache untouched
pub struct ResourceCache {
    /// Root every relative path is resolved against
    data_root: PathBuf,

    /// Loader/cleaner pairs by type tag
    handlers: HashMap<String, TypeHandler>,

    /// Loaded assets by resolved path
    cache: HashMap<PathBuf, CachedResource>,
}

impl ResourceCache {
    /// Create an empty cache resolving paths against `data_root`
    pub fn new(data_root: impl Into<PathBuf>) -> Self {
        let data_root = data_root.into();
        log::info!("Creating ResourceCache with data root {}", data_root.display());
        Self {
            data_root,
            handlers: HashMap::new(),
            cache: HashMap::new(),
        }
    }

    /// Root directory relative paths are resolved against
    pub fn data_root(&self) -> &Path {
        &self.data_root
    }

    /// Register the loader/cleaner pair for a type tag
    ///
    /// # Errors
    /// [`ResourceError::DuplicateHandler`] if the tag already has a handler.
    pub fn register_type_handler(
        &mut self,
        type_tag: impl Into<String>,
        handler: TypeHandler,
    ) -> Result<(), ResourceError> {
        let type_tag = type_tag.into();
        if self.handlers.contains_key(&type_tag) {
            return Err(ResourceError::DuplicateHandler(type_tag));
        }

        log::debug!(
            "Registered resource type '{}' producing {}",
            type_tag,
            handler.value_type()
        );
        self.handlers.insert(type_tag, handler);
        Ok(())
    }

    /// Whether a handler exists for the type tag
    pub fn has_type_handler(&self, type_tag: &str) -> bool {
        self.handlers.contains_key(type_tag)
    }

    /// Load a resource without extra loader arguments
    ///
    /// See [`ResourceCache::load_with`].
    pub fn load<T: Any>(
        &mut self,
        type_tag: &str,
        path: impl AsRef<Path>,
        lifespan: &str,
    ) -> Result<Rc<T>, ResourceError> {
        self.load_with(type_tag, path, lifespan, &())
    }

    /// Load a resource, or return the cached one for the same resolved path
    ///
    /// # Arguments
    /// * `type_tag` - Registered handler to load with on a cache miss
    /// * `path` - Path relative to the data root (absolute paths are kept)
    /// * `lifespan` - Eviction group; [`DEFAULT_LIFESPAN`] lives until teardown
    /// * `extra` - Forwarded to the loader as [`LoadArgs`]
    ///
    /// # Errors
    /// * [`ResourceError::UnknownType`] - `type_tag` was never registered
    /// * [`ResourceError::TypeMismatch`] - the value for this path is not a
    ///   `T`, or on a miss the handler does not produce a `T`
    /// * Whatever the loader returns
    ///
    /// Nothing is cached when an error is returned.
    pub fn load_with<T: Any, A: Any>(
        &mut self,
        type_tag: &str,
        path: impl AsRef<Path>,
        lifespan: &str,
        extra: &A,
    ) -> Result<Rc<T>, ResourceError> {
        let handler = self
            .handlers
            .get(type_tag)
            .ok_or_else(|| ResourceError::UnknownType(type_tag.to_string()))?;

        let resolved = self.resolve(path.as_ref());

        if let Some(cached) = self.cache.get(&resolved) {
            log::trace!("Resource cache hit for {}", resolved.display());
            return downcast(Rc::clone(&cached.value), &resolved);
        }

        if !handler.produces::<T>() {
            return Err(ResourceError::TypeMismatch {
                path: resolved,
                expected: type_name::<T>(),
            });
        }

        let value = handler.load(&resolved, &LoadArgs::new(extra))?;
        log::debug!(
            "Loaded '{}' resource {} (lifespan '{}')",
            type_tag,
            resolved.display(),
            lifespan
        );

        self.cache.insert(
            resolved.clone(),
            CachedResource {
                value: Rc::clone(&value),
                lifespan: lifespan.to_string(),
                type_tag: type_tag.to_string(),
            },
        );

        downcast(value, &resolved)
    }

    /// Release and evict every resource in `lifespan`
    ///
    /// Returns the number of evicted entries. Every matching entry is evicted
    /// even when a cleaner fails.
    ///
    /// # Errors
    /// * [`ResourceError::InvalidArgument`] - `lifespan` is [`DEFAULT_LIFESPAN`]
    /// * [`ResourceError::CleanupFailed`] - one or more cleaners failed
    pub fn clear_lifespan(&mut self, lifespan: &str) -> Result<usize, ResourceError> {
        if lifespan == DEFAULT_LIFESPAN {
            return Err(ResourceError::InvalidArgument(
                "unable to clear the default resource lifespan".to_string(),
            ));
        }

        let mut doomed: Vec<PathBuf> = self
            .cache
            .iter()
            .filter(|(_, resource)| resource.lifespan == lifespan)
            .map(|(path, _)| path.clone())
            .collect();
        doomed.sort();

        let evicted: Vec<(PathBuf, CachedResource)> = doomed
            .into_iter()
            .filter_map(|path| self.cache.remove(&path).map(|resource| (path, resource)))
            .collect();
        let count = evicted.len();

        log::info!("Clearing lifespan '{}' ({} resource(s))", lifespan, count);
        self.release_all(evicted)?;
        Ok(count)
    }

    /// Release every cached resource and empty the cache
    ///
    /// Each cleaner runs exactly once. Calling this on an empty cache does
    /// nothing.
    ///
    /// # Errors
    /// [`ResourceError::CleanupFailed`] if any cleaner failed; the cache is
    /// empty regardless.
    pub fn cleanup(&mut self) -> Result<(), ResourceError> {
        if self.cache.is_empty() {
            return Ok(());
        }

        let mut evicted: Vec<(PathBuf, CachedResource)> = self.cache.drain().collect();
        evicted.sort_by(|a, b| a.0.cmp(&b.0));

        log::info!("Cleaning up {} cached resource(s)", evicted.len());
        self.release_all(evicted)
    }

    /// Release and evict a single resource
    ///
    /// Returns `false` if nothing was cached at that path.
    ///
    /// # Errors
    /// [`ResourceError::CleanupFailed`] if the cleaner failed; the entry is
    /// evicted regardless.
    pub fn evict(&mut self, path: impl AsRef<Path>) -> Result<bool, ResourceError> {
        let resolved = self.resolve(path.as_ref());
        match self.cache.remove(&resolved) {
            Some(resource) => {
                self.release_all(vec![(resolved, resource)])?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Whether a resource is cached for `path`
    pub fn contains(&self, path: impl AsRef<Path>) -> bool {
        self.cache.contains_key(&self.resolve(path.as_ref()))
    }

    /// Lifespan the resource at `path` was cached under
    pub fn lifespan_of(&self, path: impl AsRef<Path>) -> Option<&str> {
        self.cache
            .get(&self.resolve(path.as_ref()))
            .map(|resource| resource.lifespan.as_str())
    }

    /// Number of cached resources
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    /// Whether the cache holds nothing
    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    /// Resolve a path against the data root and normalize it
    pub fn resolve(&self, path: &Path) -> PathBuf {
        normalize(&self.data_root.join(path))
    }

    // ========================================================================
    // PRIVATE HELPER METHODS
    // ========================================================================

    /// Run cleaners for already-evicted entries, continuing past failures
    fn release_all(&self, evicted: Vec<(PathBuf, CachedResource)>) -> Result<(), ResourceError> {
        let mut failures = Vec::new();

        for (path, resource) in evicted {
            let Some(handler) = self.handlers.get(&resource.type_tag) else {
                continue;
            };
            if let Err(e) = handler.release(&*resource.value) {
                log::error!("Failed to clean up {}: {}", path.display(), e);
                failures.push(path.display().to_string());
            }
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(ResourceError::CleanupFailed(failures))
        }
    }
}

impl Drop for ResourceCache {
    fn drop(&mut self) {
        if let Err(e) = self.cleanup() {
            log::error!("Resource cleanup during drop failed: {}", e);
        }
    }
}

impl std::fmt::Debug for ResourceCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceCache")
            .field("data_root", &self.data_root)
            .field("handlers", &self.handlers.keys().collect::<Vec<_>>())
            .field("cached", &self.cache.len())
            .finish()
    }
}

fn downcast<T: Any>(value: Rc<dyn Any>, path: &Path) -> Result<Rc<T>, ResourceError> {
    value.downcast::<T>().map_err(|_| ResourceError::TypeMismatch {
        path: path.to_path_buf(),
        expected: type_name::<T>(),
    })
}

/// Lexically normalize a path: drop `.` and fold `..` into its parent
fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match normalized.components().next_back() {
                Some(Component::Normal(_)) => {
                    normalized.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => normalized.push(".."),
            },
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}
