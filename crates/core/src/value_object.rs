//! Value object trait: equality by value, not identity.
//!
//! Value objects are domain objects that have **no identity** - they are defined entirely
//! by their attribute values. Two value objects with the same values are considered equal.

/// Marker trait for value objects.
///
/// Value objects are **immutable** and **compared by value**. To "modify" one,
/// build a new one.
///
/// - **Value Object**: no identity (`Email("a@b.io")` equals any other `Email("a@b.io")`)
/// - **Entity**: has identity (two users with the same id are the same user)
///
/// ```ignore
/// impl ValueObject for Email {}
///
/// let a = Email::parse("ada@example.com")?;
/// let b = Email::parse("ada@EXAMPLE.com")?;
/// assert_eq!(a, b);
/// ```
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
