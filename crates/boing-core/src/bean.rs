use std::any::Any;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Type-erased access to the concrete value behind a trait object
pub trait AsAny {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// An object the engine can construct, wire and hand out.
///
/// Any `Send + Sync` type with a string form qualifies; what the engine may
/// do with it is described by its `TypeDescriptor`.
pub trait Bean: AsAny + fmt::Display + Send + Sync + 'static {}

impl<T: Any + fmt::Display + Send + Sync> Bean for T {}

impl dyn Bean {
    pub fn downcast_ref<T: Bean>(&self) -> Option<&T> {
        AsAny::as_any(self).downcast_ref::<T>()
    }

    pub fn downcast_mut<T: Bean>(&mut self) -> Option<&mut T> {
        AsAny::as_any_mut(self).downcast_mut::<T>()
    }
}

/// Capability: called once after every property of the instance is set
pub trait Initializable {
    fn init(&mut self) -> anyhow::Result<()>;
}

/// Capability: called once on teardown, in reverse construction order
pub trait Disposable {
    fn destroy(&mut self) -> anyhow::Result<()>;
}

/// Shared handle to an assembled object.
///
/// Cloning shares the object. Equality is identity.
#[derive(Clone)]
pub struct BeanRef {
    type_name: Arc<str>,
    inner: Arc<RwLock<dyn Bean>>,
}

impl BeanRef {
    pub fn new<T: Bean>(type_name: impl Into<Arc<str>>, bean: T) -> Self {
        BeanRef {
            type_name: type_name.into(),
            inner: Arc::new(RwLock::new(bean)),
        }
    }

    /// Registered type name of the object
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn read(&self) -> RwLockReadGuard<'_, dyn Bean> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn write(&self) -> RwLockWriteGuard<'_, dyn Bean> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Borrow the object as `T`; `None` if it is another type
    pub fn with<T: Bean, R>(&self, f: impl FnOnce(&T) -> R) -> Option<R> {
        let guard = self.read();
        guard.downcast_ref::<T>().map(f)
    }

    pub fn with_mut<T: Bean, R>(&self, f: impl FnOnce(&mut T) -> R) -> Option<R> {
        let mut guard = self.write();
        guard.downcast_mut::<T>().map(f)
    }

    pub fn ptr_eq(&self, other: &BeanRef) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl PartialEq for BeanRef {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl fmt::Debug for BeanRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BeanRef({} @ {:p})", self.type_name, Arc::as_ptr(&self.inner))
    }
}

impl fmt::Display for BeanRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let guard = self.read();
        fmt::Display::fmt(&*guard, f)
    }
}
