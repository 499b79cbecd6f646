//! Construction and runtime errors.

use core::fmt;

use crate::slot::SlotKey;
use crate::value::TypeInfo;

// ─────────────────────────────────────────────────────────────────────────────
// Runtime errors
// ─────────────────────────────────────────────────────────────────────────────

/// Errors raised while starting, ticking or aborting a node.
///
/// Errors from user logic travel unchanged up to the driver; the core never
/// retries or swallows them.
#[derive(Debug, thiserror::Error)]
pub enum NodeError {
    /// A node was started with an input of the wrong type.
    #[error("node '{node}' expected input of type {expected}, got {found}")]
    InputMismatch {
        /// Name of the node.
        node: String,
        /// Declared input type.
        expected: TypeInfo,
        /// Type actually received.
        found: TypeInfo,
    },

    /// A slot or transition function received arguments of the wrong type.
    #[error("slot '{slot}' carried arguments of type {found}, expected {expected}")]
    ArgsMismatch {
        /// Key of the slot.
        slot: SlotKey,
        /// Declared argument type.
        expected: TypeInfo,
        /// Type actually carried.
        found: TypeInfo,
    },

    /// A transition function produced a value of the wrong type.
    #[error("transition function produced {found}, expected {expected}")]
    OutputMismatch {
        /// Declared output type.
        expected: TypeInfo,
        /// Type actually produced.
        found: TypeInfo,
    },

    /// A node was handed memory it did not create.
    #[error("node '{node}' expected memory of type {expected}, got {found}")]
    MemoryMismatch {
        /// Name of the node.
        node: String,
        /// Memory type the node creates.
        expected: &'static str,
        /// Memory type received.
        found: &'static str,
    },

    /// A leaf fired a slot it never declared.
    #[error("node '{node}' fired undeclared slot '{slot}'")]
    UndeclaredSlot {
        /// Name of the node.
        node: String,
        /// Key of the fired slot.
        slot: SlotKey,
    },

    /// A graph's memory points at a node the graph does not contain.
    #[error("graph '{graph}' has no node '{node}'")]
    UnknownNode {
        /// Name of the graph.
        graph: String,
        /// Missing node key.
        node: String,
    },

    /// A switch director selected a key with no registered case.
    #[error("switch '{switch}' has no case for {case}")]
    UnknownCase {
        /// Name of the switch.
        switch: String,
        /// Debug rendering of the selected key.
        case: String,
    },

    /// User logic failed.
    #[error("{0}")]
    Failed(String),
}

impl NodeError {
    /// Creates a [`NodeError::Failed`] from a message.
    #[must_use]
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Construction errors
// ─────────────────────────────────────────────────────────────────────────────

/// What a key in a [`ValidationError`] names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyKind {
    /// A child node of a graph.
    Node,
    /// A slot.
    Slot,
    /// A transition.
    Transition,
    /// A switch case.
    Case,
}

impl fmt::Display for KeyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Node => f.write_str("node"),
            Self::Slot => f.write_str("slot"),
            Self::Transition => f.write_str("transition"),
            Self::Case => f.write_str("case"),
        }
    }
}

/// Coarse classification of a [`ValidationError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// A key was declared twice.
    DuplicateKey,
    /// Something refers to a key that does not exist.
    DanglingReference,
    /// Argument, input or output types do not line up.
    ArityMismatch,
    /// A required part was never provided.
    Incomplete,
}

/// Structural or type error found while building a node.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// A key was declared more than once.
    #[error("duplicate {kind} key '{key}'")]
    DuplicateKey {
        /// What the key names.
        kind: KeyKind,
        /// The duplicated key.
        key: String,
    },

    /// A `(node, slot)` pair already has a transition.
    #[error("slot '{slot}' of node '{node}' already has transition '{existing}', cannot add '{duplicate}'")]
    SlotAlreadyBound {
        /// Source node.
        node: &'static str,
        /// Source slot.
        slot: SlotKey,
        /// Transition registered first.
        existing: &'static str,
        /// Transition rejected.
        duplicate: &'static str,
    },

    /// A referenced key does not exist.
    #[error("'{referrer}' references unknown {kind} '{key}'")]
    DanglingReference {
        /// The transition or node making the reference.
        referrer: String,
        /// What the key should name.
        kind: KeyKind,
        /// The missing key.
        key: String,
    },

    /// Two types that must agree do not.
    #[error("{context}: expected {expected}, found {found}")]
    ArityMismatch {
        /// Where the mismatch occurs.
        context: String,
        /// Required type.
        expected: TypeInfo,
        /// Provided type.
        found: TypeInfo,
    },

    /// A node needs an input but nothing supplies one.
    #[error("node '{node}' needs an input of type {expected} but '{referrer}' provides neither a function nor a default")]
    MissingInput {
        /// The node being started.
        node: &'static str,
        /// Transition or start path that reaches it.
        referrer: String,
        /// Input type required.
        expected: TypeInfo,
    },

    /// A slot needs arguments but an external transition supplies none.
    #[error("slot '{slot}' carries {expected} but transition '{transition}' provides neither a function nor a default")]
    MissingSlotArgs {
        /// The graph slot.
        slot: SlotKey,
        /// The external transition.
        transition: &'static str,
        /// Argument type required.
        expected: TypeInfo,
    },

    /// A required part of a builder was never provided.
    #[error("{what} was never provided")]
    Missing {
        /// Description of the missing part.
        what: &'static str,
    },
}

impl ValidationError {
    /// Returns the coarse kind of this error.
    #[must_use]
    pub fn kind(&self) -> ValidationErrorKind {
        match self {
            Self::DuplicateKey { .. } | Self::SlotAlreadyBound { .. } => {
                ValidationErrorKind::DuplicateKey
            }
            Self::DanglingReference { .. } => ValidationErrorKind::DanglingReference,
            Self::ArityMismatch { .. } | Self::MissingInput { .. } | Self::MissingSlotArgs { .. } => {
                ValidationErrorKind::ArityMismatch
            }
            Self::Missing { .. } => ValidationErrorKind::Incomplete,
        }
    }
}

/// All validation errors found while building one node.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("failed to build '{name}': {}", render(.errors))]
pub struct BuildError {
    /// Name of the node being built.
    pub name: &'static str,
    /// Every problem found, in discovery order.
    pub errors: Vec<ValidationError>,
}

impl BuildError {
    /// Returns `Ok(())` if `errors` is empty.
    pub fn check(name: &'static str, errors: Vec<ValidationError>) -> Result<(), Self> {
        if errors.is_empty() {
            Ok(())
        } else {
            Err(Self { name, errors })
        }
    }

    /// Returns `true` if any error has the given kind.
    #[must_use]
    pub fn has_kind(&self, kind: ValidationErrorKind) -> bool {
        self.errors.iter().any(|error| error.kind() == kind)
    }
}

fn render(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
