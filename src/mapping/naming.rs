//! Naming strategy
//!
//! Derives measurement, field and tag names from a record's schema. An
//! explicit, non-empty name given through a marker always wins; otherwise the
//! identifier is converted to snake_case.

use super::error::{MappingError, MappingResult};
use super::schema::{Member, Role, Schema};

/// Resolves wire names for records and their members
#[derive(Debug, Clone, Copy, Default)]
pub struct NamingStrategy;

impl NamingStrategy {
    pub fn new() -> Self {
        Self
    }

    /// Measurement name: the measurement marker value, or the type identifier in snake_case
    pub fn measurement_name<T>(&self, schema: &Schema<T>) -> MappingResult<String> {
        if schema.ident().trim().is_empty() {
            return Err(MappingError::InvalidArgument(
                "Record identifier cannot be blank".to_string(),
            ));
        }

        Ok(match schema.measurement_override() {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => to_snake_case(schema.ident()),
        })
    }

    /// Field name: the field marker value, or the member identifier in snake_case
    pub fn field_name<T>(&self, member: &Member<T>) -> MappingResult<String> {
        self.member_name(member, Role::Field)
    }

    /// Tag name: the tag marker value, or the member identifier in snake_case
    pub fn tag_name<T>(&self, member: &Member<T>) -> MappingResult<String> {
        self.member_name(member, Role::Tag)
    }

    fn member_name<T>(&self, member: &Member<T>, role: Role) -> MappingResult<String> {
        if member.ident().trim().is_empty() {
            return Err(MappingError::InvalidArgument(
                "Member identifier cannot be blank".to_string(),
            ));
        }

        // An override only counts when it was given through the matching marker
        match member.override_name() {
            Some(name) if member.role() == role && !name.is_empty() => Ok(name.to_string()),
            _ => Ok(to_snake_case(member.ident())),
        }
    }
}

/// Insert `_` before every uppercase letter except the first, then lowercase
pub fn to_snake_case(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 4);
    for (i, c) in value.chars().enumerate() {
        if i > 0 && c.is_uppercase() {
            out.push('_');
        }
        out.extend(c.to_lowercase());
    }
    out
}
