//! Type handlers: per-type loader and cleaner pairs

use std::any::{type_name, Any, TypeId};
use std::fmt;
use std::path::Path;
use std::rc::Rc;

use super::ResourceError;

type ErasedLoader = Box<dyn Fn(&Path, &LoadArgs<'_>) -> Result<Rc<dyn Any>, ResourceError>>;
type ErasedCleaner = Box<dyn Fn(&dyn Any) -> Result<(), ResourceError>>;

/// Extra arguments forwarded from a `load_with` call to the loader
///
/// Loaders that expect arguments downcast them with [`LoadArgs::get`].
#[derive(Clone, Copy)]
pub struct LoadArgs<'a> {
    extra: &'a dyn Any,
}

impl<'a> LoadArgs<'a> {
    /// Wrap a caller-supplied argument value
    pub fn new<A: Any>(extra: &'a A) -> Self {
        Self { extra }
    }

    /// No extra arguments
    pub fn none() -> LoadArgs<'static> {
        LoadArgs { extra: &() }
    }

    /// Borrow the argument as `A`, if that is what the caller passed
    pub fn get<A: Any>(&self) -> Option<&'a A> {
        self.extra.downcast_ref::<A>()
    }

    /// Whether the caller passed no arguments
    pub fn is_empty(&self) -> bool {
        self.extra.is::<()>()
    }
}

impl fmt::Debug for LoadArgs<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadArgs")
            .field("empty", &self.is_empty())
            .finish()
    }
}

/// Loader and optional cleaner for one resource type tag
pub struct TypeHandler {
    loader: ErasedLoader,
    cleaner: Option<ErasedCleaner>,
    value_type: &'static str,
    value_type_id: TypeId,
}

impl TypeHandler {
    /// Handler whose values need no explicit release
    pub fn new<T, F>(loader: F) -> Self
    where
        T: Any,
        F: Fn(&Path, &LoadArgs<'_>) -> Result<T, ResourceError> + 'static,
    {
        Self {
            loader: Box::new(move |path: &Path, args: &LoadArgs<'_>| {
                loader(path, args).map(|value| Rc::new(value) as Rc<dyn Any>)
            }),
            cleaner: None,
            value_type: type_name::<T>(),
            value_type_id: TypeId::of::<T>(),
        }
    }

    /// Handler whose values are released by `cleaner` on eviction
    pub fn with_cleanup<T, F, C>(loader: F, cleaner: C) -> Self
    where
        T: Any,
        F: Fn(&Path, &LoadArgs<'_>) -> Result<T, ResourceError> + 'static,
        C: Fn(&T) -> Result<(), ResourceError> + 'static,
    {
        let mut handler = Self::new(loader);
        handler.cleaner = Some(Box::new(move |value: &dyn Any| match value.downcast_ref::<T>() {
            Some(value) => cleaner(value),
            None => Err(ResourceError::Loader(format!(
                "cleaner expected a {}",
                type_name::<T>()
            ))),
        }));
        handler
    }

    /// Name of the Rust type this handler produces
    pub const fn value_type(&self) -> &'static str {
        self.value_type
    }

    /// Whether this handler produces values of type `T`
    pub fn produces<T: Any>(&self) -> bool {
        self.value_type_id == TypeId::of::<T>()
    }

    /// Whether values of this type have a cleaner
    pub const fn has_cleanup(&self) -> bool {
        self.cleaner.is_some()
    }

    pub(super) fn load(&self, path: &Path, args: &LoadArgs<'_>) -> Result<Rc<dyn Any>, ResourceError> {
        (self.loader)(path, args)
    }

    pub(super) fn release(&self, value: &dyn Any) -> Result<(), ResourceError> {
        self.cleaner.as_ref().map_or(Ok(()), |cleaner| cleaner(value))
    }
}

impl fmt::Debug for TypeHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeHandler")
            .field("value_type", &self.value_type)
            .field("has_cleanup", &self.has_cleanup())
            .finish()
    }
}
