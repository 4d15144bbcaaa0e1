//! Entity trait: the capability an entity type needs to be listed

use crate::core::field::FieldValue;

/// Trait for entity types that can be listed through a specification.
///
/// Field names used by queries are resolved against the entity's metadata
/// table; the specification then reads values through [`Listable::field_value`].
/// This keeps field dispatch explicit instead of relying on runtime inspection.
///
/// # Example
///
/// ```rust,ignore
/// impl Listable for Product {
///     fn entity_type() -> &'static str {
///         "product"
///     }
///
///     fn field_value(&self, field: &str) -> Option<FieldValue> {
///         match field {
///             "id" => Some(FieldValue::Uuid(self.id)),
///             "name" => Some(FieldValue::String(self.name.clone())),
///             "discontinued" => Some(FieldValue::Boolean(self.discontinued)),
///             _ => None,
///         }
///     }
/// }
/// ```
pub trait Listable: Clone + Send + Sync + 'static {
    /// The entity type name metadata is registered under (e.g., "product")
    fn entity_type() -> &'static str;

    /// Get the value of a specific field by its canonical metadata name.
    ///
    /// Returning `None` means the entity has no value for the field; such an
    /// entity never satisfies a filter on it and sorts first.
    fn field_value(&self, field: &str) -> Option<FieldValue>;
}
