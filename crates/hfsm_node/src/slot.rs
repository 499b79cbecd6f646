//! Slots: the named exit points a node signals through.

use core::fmt;

use crate::value::{TypeInfo, Value};

/// Name of a slot. Unique within the slots a node exposes.
pub type SlotKey = &'static str;

/// A fired slot: a key plus optional arguments.
///
/// A node returns a slot from `tick` to request leaving its current state.
/// The enclosing graph maps `(node, slot key)` to a transition; a slot with no
/// registered transition is inert.
#[derive(Clone)]
pub struct Slot {
    key: SlotKey,
    args: Option<Value>,
}

impl Slot {
    /// A slot without arguments.
    #[must_use]
    pub fn empty(key: SlotKey) -> Self {
        Self { key, args: None }
    }

    /// A slot carrying arguments.
    #[must_use]
    pub fn with_args<T: Clone + Send + Sync + 'static>(key: SlotKey, args: T) -> Self {
        Self::with_value(key, Value::new(args))
    }

    /// A slot carrying an already erased value. A unit value yields an empty
    /// slot.
    #[must_use]
    pub fn with_value(key: SlotKey, value: Value) -> Self {
        let args = if value.is_unit() { None } else { Some(value) };
        Self { key, args }
    }

    /// Returns the slot key.
    #[must_use]
    pub fn key(&self) -> SlotKey {
        self.key
    }

    /// Returns the erased arguments, if any.
    #[must_use]
    pub fn args(&self) -> Option<&Value> {
        self.args.as_ref()
    }

    /// Borrows the arguments as a `T`.
    #[must_use]
    pub fn args_as<T: Clone + Send + Sync + 'static>(&self) -> Option<&T> {
        self.args.as_ref().and_then(Value::downcast_ref::<T>)
    }

    /// Returns `true` if the slot carries no arguments.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.args.is_none()
    }

    /// Type of the carried arguments, `()` for an empty slot.
    #[must_use]
    pub fn value_type(&self) -> TypeInfo {
        self.args.as_ref().map_or_else(TypeInfo::unit, Value::type_info)
    }

    /// Consumes the slot, returning its arguments or the unit value.
    #[must_use]
    pub fn into_value(self) -> Value {
        self.args.unwrap_or_else(Value::unit)
    }
}

impl From<SlotKey> for Slot {
    fn from(key: SlotKey) -> Self {
        Self::empty(key)
    }
}

impl fmt::Debug for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.args {
            Some(args) => write!(f, "Slot({}, {:?})", self.key, args),
            None => write!(f, "Slot({})", self.key),
        }
    }
}

/// Declared shape of a slot: its key and the type of its arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotSpec {
    key: SlotKey,
    args: Option<TypeInfo>,
}

impl SlotSpec {
    /// A slot that carries no arguments.
    #[must_use]
    pub fn empty(key: SlotKey) -> Self {
        Self { key, args: None }
    }

    /// A slot carrying arguments of type `T`.
    #[must_use]
    pub fn with_args<T: 'static>(key: SlotKey) -> Self {
        Self::with_type(key, TypeInfo::of::<T>())
    }

    /// A slot carrying arguments of the given type. `()` yields an empty slot.
    #[must_use]
    pub fn with_type(key: SlotKey, args: TypeInfo) -> Self {
        let args = (!args.is_unit()).then_some(args);
        Self { key, args }
    }

    /// Returns the slot key.
    #[must_use]
    pub fn key(&self) -> SlotKey {
        self.key
    }

    /// Returns the argument type, `None` for an empty slot.
    #[must_use]
    pub fn args_type(&self) -> Option<TypeInfo> {
        self.args
    }

    /// Argument type, `()` for an empty slot.
    #[must_use]
    pub fn value_type(&self) -> TypeInfo {
        self.args.unwrap_or_else(TypeInfo::unit)
    }

    /// Returns `true` if `slot` has this key and shape.
    #[must_use]
    pub fn accepts(&self, slot: &Slot) -> bool {
        self.key == slot.key() && self.value_type() == slot.value_type()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_args_collapse_to_empty_slot() {
        let slot = Slot::with_args("Done", ());
        assert!(slot.is_empty());
        assert_eq!(slot.value_type(), TypeInfo::unit());
        assert!(SlotSpec::with_args::<()>("Done").args_type().is_none());
    }

    #[test]
    fn spec_accepts_matching_shape() {
        let spec = SlotSpec::with_args::<u32>("Go");
        assert!(spec.accepts(&Slot::with_args("Go", 4_u32)));
        assert!(!spec.accepts(&Slot::with_args("Go", 4_i64)));
        assert!(!spec.accepts(&Slot::empty("Go")));
        assert!(!spec.accepts(&Slot::with_args("Stop", 4_u32)));
        assert!(SlotSpec::empty("Stop").accepts(&"Stop".into()));
    }

    #[test]
    fn args_as_downcasts() {
        let slot = Slot::with_args("Go", 7_u8);
        assert_eq!(slot.args_as::<u8>(), Some(&7));
        assert_eq!(slot.args_as::<u16>(), None);
        assert_eq!(slot.into_value().downcast::<u8>().ok(), Some(7));
    }
}
