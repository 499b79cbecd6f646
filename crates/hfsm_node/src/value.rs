//! Type-erased values and node memory.
//!
//! Slot arguments, start inputs and default inputs travel through composite
//! nodes as [`Value`]s: clonable, `Send + Sync` boxes that remember the
//! concrete type they were created from. Each node's step-to-step state lives
//! in an owned [`Memory`] box.
//!
//! Both carry enough type information ([`TypeInfo`]) for builders to check
//! transition functions and default inputs once, at construction time.

use core::any::{Any, TypeId};
use core::fmt;

use downcast_rs::{DowncastSync, impl_downcast};

// ─────────────────────────────────────────────────────────────────────────────
// TypeInfo
// ─────────────────────────────────────────────────────────────────────────────

/// Runtime identity of a value type.
///
/// Equality and hashing only consider the [`TypeId`]; the name is kept for
/// error messages.
#[derive(Clone, Copy)]
pub struct TypeInfo {
    id: TypeId,
    name: &'static str,
}

impl TypeInfo {
    /// Returns the type information for `T`.
    #[must_use]
    pub fn of<T: 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: core::any::type_name::<T>(),
        }
    }

    /// Returns the type information for `()`, the "no arguments" type.
    #[must_use]
    pub fn unit() -> Self {
        Self::of::<()>()
    }

    /// Returns the [`TypeId`].
    #[must_use]
    pub fn id(&self) -> TypeId {
        self.id
    }

    /// Returns the type name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Returns `true` if this is `()`.
    #[must_use]
    pub fn is_unit(&self) -> bool {
        self.id == TypeId::of::<()>()
    }
}

impl PartialEq for TypeInfo {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeInfo {}

impl core::hash::Hash for TypeInfo {
    fn hash<H: core::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

impl fmt::Display for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Value
// ─────────────────────────────────────────────────────────────────────────────

/// Object-safe, clonable payload of a [`Value`].
///
/// Implemented for every `Clone + Send + Sync + 'static` type.
pub trait DynValue: DowncastSync {
    /// Clones the value into a new box.
    fn clone_boxed(&self) -> Box<dyn DynValue>;

    /// Returns the type information of the concrete type.
    fn type_info(&self) -> TypeInfo;
}

impl_downcast!(sync DynValue);

impl<T: Clone + Send + Sync + 'static> DynValue for T {
    fn clone_boxed(&self) -> Box<dyn DynValue> {
        Box::new(self.clone())
    }

    fn type_info(&self) -> TypeInfo {
        TypeInfo::of::<T>()
    }
}

/// A clonable, type-erased value.
///
/// # Example
///
/// ```
/// use hfsm_node::value::Value;
///
/// let value = Value::new(4_u32);
/// assert_eq!(value.downcast_ref::<u32>(), Some(&4));
/// assert!(value.downcast_ref::<i64>().is_none());
/// ```
pub struct Value {
    inner: Box<dyn DynValue>,
}

impl Value {
    /// Wraps a value.
    #[must_use]
    pub fn new<T: Clone + Send + Sync + 'static>(value: T) -> Self {
        Self {
            inner: Box::new(value),
        }
    }

    /// Returns the unit value, used when a slot or a start carries nothing.
    #[must_use]
    pub fn unit() -> Self {
        Self::new(())
    }

    /// Returns the type information of the wrapped value.
    #[must_use]
    pub fn type_info(&self) -> TypeInfo {
        self.inner.type_info()
    }

    /// Returns `true` if the wrapped value is `()`.
    #[must_use]
    pub fn is_unit(&self) -> bool {
        self.type_info().is_unit()
    }

    /// Returns `true` if the wrapped value is a `T`.
    #[must_use]
    pub fn is<T: Clone + Send + Sync + 'static>(&self) -> bool {
        self.inner.is::<T>()
    }

    /// Borrows the wrapped value as a `T`.
    #[must_use]
    pub fn downcast_ref<T: Clone + Send + Sync + 'static>(&self) -> Option<&T> {
        self.inner.downcast_ref::<T>()
    }

    /// Takes the wrapped value out as a `T`, giving the value back on a type
    /// mismatch.
    pub fn downcast<T: Clone + Send + Sync + 'static>(self) -> Result<T, Self> {
        match self.inner.downcast::<T>() {
            Ok(value) => Ok(*value),
            Err(inner) => Err(Self { inner }),
        }
    }
}

impl Clone for Value {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone_boxed(),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Value<{}>", self.type_info())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Memory
// ─────────────────────────────────────────────────────────────────────────────

/// A node's mutable, step-to-step state.
///
/// Created by `start`, mutated in place by `tick`, dropped when the owning
/// composite starts a different child.
pub struct Memory {
    inner: Box<dyn Any + Send>,
    type_name: &'static str,
}

impl Memory {
    /// Wraps a node's memory.
    #[must_use]
    pub fn new<T: Send + 'static>(memory: T) -> Self {
        Self {
            inner: Box::new(memory),
            type_name: core::any::type_name::<T>(),
        }
    }

    /// Memory of nodes that keep no state.
    #[must_use]
    pub fn empty() -> Self {
        Self::new(())
    }

    /// Returns the name of the wrapped type.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Returns `true` if the memory holds a `T`.
    #[must_use]
    pub fn is<T: 'static>(&self) -> bool {
        self.inner.is::<T>()
    }

    /// Borrows the memory as a `T`.
    #[must_use]
    pub fn downcast_ref<T: 'static>(&self) -> Option<&T> {
        self.inner.downcast_ref::<T>()
    }

    /// Mutably borrows the memory as a `T`.
    pub fn downcast_mut<T: 'static>(&mut self) -> Option<&mut T> {
        self.inner.downcast_mut::<T>()
    }
}

impl fmt::Debug for Memory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Memory<{}>", self.type_name)
    }
}
