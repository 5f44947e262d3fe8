use super::slot::{join_slots, TypeSlot};
use crate::bean::{Bean, BeanRef, Disposable, Initializable};
use crate::error::InvocationError;
use crate::resolver::Args;
use indexmap::IndexMap;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

pub type ConstructorFn = Arc<dyn Fn(&Args) -> anyhow::Result<BeanRef> + Send + Sync>;
pub type SetterFn = Arc<dyn Fn(&mut dyn Bean, &Args) -> anyhow::Result<()> + Send + Sync>;
pub type HookFn = Arc<dyn Fn(&mut dyn Bean) -> anyhow::Result<()> + Send + Sync>;

/// An executable signature: ordered slots plus an opaque handle
pub struct Candidate<H> {
    label: String,
    slots: Vec<TypeSlot>,
    handle: H,
}

impl<H> Candidate<H> {
    pub fn new(label: impl Into<String>, slots: Vec<TypeSlot>, handle: H) -> Self {
        Candidate {
            label: label.into(),
            slots,
            handle,
        }
    }

    /// Human readable signature, e.g. `SimpleClass(byte, short)`
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn slots(&self) -> &[TypeSlot] {
        &self.slots
    }

    pub fn arity(&self) -> usize {
        self.slots.len()
    }

    pub fn handle(&self) -> &H {
        &self.handle
    }
}

impl<H> fmt::Debug for Candidate<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Candidate")
            .field("label", &self.label)
            .field("slots", &self.slots)
            .finish()
    }
}

/// Everything the engine knows about an assemblable type
pub struct TypeDescriptor {
    name: String,
    supertypes: Vec<String>,
    constructors: Vec<Candidate<ConstructorFn>>,
    setters: IndexMap<String, Vec<Candidate<SetterFn>>>,
    init: Option<HookFn>,
    destroy: Option<HookFn>,
}

impl TypeDescriptor {
    pub fn builder<T: Bean>(name: impl Into<String>) -> TypeBuilder<T> {
        TypeBuilder {
            descriptor: TypeDescriptor {
                name: name.into(),
                supertypes: Vec::new(),
                constructors: Vec::new(),
                setters: IndexMap::new(),
                init: None,
                destroy: None,
            },
            _marker: PhantomData,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared capability set used for reference assignability
    pub fn supertypes(&self) -> &[String] {
        &self.supertypes
    }

    pub fn constructors(&self) -> &[Candidate<ConstructorFn>] {
        &self.constructors
    }

    /// Setter overloads for a property
    pub fn setters(&self, property: &str) -> Option<&[Candidate<SetterFn>]> {
        self.setters.get(property).map(Vec::as_slice)
    }

    pub fn properties(&self) -> impl Iterator<Item = &str> {
        self.setters.keys().map(String::as_str)
    }

    pub fn init_hook(&self) -> Option<&HookFn> {
        self.init.as_ref()
    }

    pub fn destroy_hook(&self) -> Option<&HookFn> {
        self.destroy.as_ref()
    }
}

impl fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeDescriptor")
            .field("name", &self.name)
            .field("supertypes", &self.supertypes)
            .field("constructors", &self.constructors)
            .field("properties", &self.setters.keys().collect::<Vec<_>>())
            .field("init", &self.init.is_some())
            .field("destroy", &self.destroy.is_some())
            .finish()
    }
}

/// Typed construction of a [`TypeDescriptor`] for `T`
pub struct TypeBuilder<T> {
    descriptor: TypeDescriptor,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Bean> TypeBuilder<T> {
    /// Declare reference types `T` may be passed as
    pub fn assignable_to<I, S>(mut self, supertypes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.descriptor
            .supertypes
            .extend(supertypes.into_iter().map(Into::into));
        self
    }

    /// Add a constructor overload
    pub fn constructor<F>(mut self, slots: &[TypeSlot], construct: F) -> Self
    where
        F: Fn(&Args) -> anyhow::Result<T> + Send + Sync + 'static,
    {
        let slots = slots.to_vec();
        let label = format!("{}({})", self.descriptor.name, join_slots(&slots));
        let type_name: Arc<str> = Arc::from(self.descriptor.name.as_str());

        let handle: ConstructorFn =
            Arc::new(move |args: &Args| Ok(BeanRef::new(type_name.clone(), construct(args)?)));
        self.descriptor
            .constructors
            .push(Candidate::new(label, slots, handle));
        self
    }

    /// Add a setter overload for `property`
    pub fn setter<F>(mut self, property: &str, slot: impl Into<TypeSlot>, set: F) -> Self
    where
        F: Fn(&mut T, &Args) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        let slot = slot.into();
        let label = format!("{}.{}({})", self.descriptor.name, property, slot);
        let expected = self.descriptor.name.clone();

        let handle: SetterFn = Arc::new(move |bean: &mut dyn Bean, args: &Args| {
            let target = bean
                .downcast_mut::<T>()
                .ok_or_else(|| InvocationError::TargetMismatch {
                    expected: expected.clone(),
                })?;
            set(target, args)
        });
        self.descriptor
            .setters
            .entry(property.to_string())
            .or_default()
            .push(Candidate::new(label, vec![slot], handle));
        self
    }

    /// Call [`Initializable::init`] after property injection
    pub fn initializable(mut self) -> Self
    where
        T: Initializable,
    {
        let expected = self.descriptor.name.clone();
        self.descriptor.init = Some(Arc::new(move |bean: &mut dyn Bean| {
            bean.downcast_mut::<T>()
                .ok_or_else(|| InvocationError::TargetMismatch {
                    expected: expected.clone(),
                })?
                .init()
        }));
        self
    }

    /// Call [`Disposable::destroy`] on teardown
    pub fn disposable(mut self) -> Self
    where
        T: Disposable,
    {
        let expected = self.descriptor.name.clone();
        self.descriptor.destroy = Some(Arc::new(move |bean: &mut dyn Bean| {
            bean.downcast_mut::<T>()
                .ok_or_else(|| InvocationError::TargetMismatch {
                    expected: expected.clone(),
                })?
                .destroy()
        }));
        self
    }

    pub fn build(self) -> TypeDescriptor {
        self.descriptor
    }
}
