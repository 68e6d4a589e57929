//! Record ↔ point mapper
//!
//! Converts user records to points and back by walking the members declared
//! in their [`Schema`]. The mapper holds nothing but its naming strategy, so a
//! single instance can be shared freely between tasks.

use std::collections::BTreeMap;

use tracing::trace;

use super::error::{MappingError, MappingResult};
use super::naming::NamingStrategy;
use super::schema::{Access, Marker, Record, Schema};
use crate::domain::{FieldValue, Point};

/// Stateless converter between records and points
#[derive(Debug, Clone, Copy, Default)]
pub struct Mapper {
    naming: NamingStrategy,
}

impl Mapper {
    pub fn new(naming: NamingStrategy) -> Self {
        Self { naming }
    }

    pub fn naming(&self) -> &NamingStrategy {
        &self.naming
    }

    /// Measurement a record type is written to
    pub fn measurement_name<T: Record>(&self) -> MappingResult<String> {
        self.naming.measurement_name(&T::schema())
    }

    /// Convert a record to a point
    pub fn to_point<T: Record>(&self, record: &T) -> MappingResult<Point> {
        self.to_point_with(&T::schema(), record)
    }

    /// Convert a batch of records, building the schema once
    ///
    /// Stops at the first record that fails to convert.
    pub fn to_points<T: Record>(&self, records: &[T]) -> MappingResult<Vec<Point>> {
        let schema = T::schema();
        records
            .iter()
            .map(|record| self.to_point_with(&schema, record))
            .collect()
    }

    /// Convert a record to a point using an explicit schema
    pub fn to_point_with<T>(&self, schema: &Schema<T>, record: &T) -> MappingResult<Point> {
        let mut fields: BTreeMap<String, FieldValue> = BTreeMap::new();
        let mut tags: BTreeMap<String, String> = BTreeMap::new();

        for member in schema.members() {
            match &member.access {
                Access::Field(slot) => {
                    if let Some(value) = slot.read(record) {
                        fields.insert(self.naming.field_name(member)?, value);
                    }
                }
                Access::Tag(slot) => {
                    if let Some(value) = slot.read(record) {
                        tags.insert(self.naming.tag_name(member)?, value);
                    }
                }
                Access::Timestamp(_) | Access::Ignored => {}
            }
        }

        if fields.is_empty() {
            return Err(MappingError::MissingAnnotatedMember {
                record: schema.ident().to_string(),
                marker: Marker::Field,
            });
        }

        // Checked before any timestamp is read
        let mut stamps = schema.members().iter().filter_map(|m| match &m.access {
            Access::Timestamp(slot) => Some(slot),
            _ => None,
        });
        let timestamp = match (stamps.next(), stamps.next()) {
            (None, _) => None,
            (Some(slot), None) => slot.read(record),
            (Some(_), Some(_)) => {
                return Err(MappingError::DuplicateAnnotatedMembers {
                    record: schema.ident().to_string(),
                    marker: Marker::Timestamp,
                })
            }
        };

        trace!(
            record = schema.ident(),
            fields = fields.len(),
            tags = tags.len(),
            "Mapped record to point"
        );

        Ok(Point::builder()
            .timestamp(timestamp)
            .tags(tags)
            .fields(fields)
            .build())
    }

    /// Hydrate a record from a point
    pub fn from_point<T: Record>(&self, point: &Point) -> MappingResult<T> {
        self.from_point_with(&T::schema(), point)
    }

    /// Hydrate a batch of points, building the schema once
    pub fn from_points<T: Record>(&self, points: &[Point]) -> MappingResult<Vec<T>> {
        let schema = T::schema();
        points
            .iter()
            .map(|point| self.from_point_with(&schema, point))
            .collect()
    }

    /// Hydrate a record from a point using an explicit schema
    pub fn from_point_with<T>(&self, schema: &Schema<T>, point: &Point) -> MappingResult<T> {
        let mut record = schema
            .instantiate()
            .ok_or_else(|| MappingError::Instantiation(schema.ident().to_string()))?;

        for member in schema.members() {
            match &member.access {
                Access::Timestamp(slot) => slot.write(&mut record, point.timestamp()),
                Access::Field(slot) => {
                    let value = point.field(&self.naming.field_name(member)?);
                    if !slot.write(&mut record, value) {
                        return Err(mismatch(
                            member.ident(),
                            slot.type_name(),
                            value.map_or("null", FieldValue::type_name),
                        ));
                    }
                }
                Access::Tag(slot) => {
                    let value = point.tag(&self.naming.tag_name(member)?);
                    if !slot.write(&mut record, value) {
                        return Err(mismatch(member.ident(), slot.type_name(), "string"));
                    }
                }
                Access::Ignored => {}
            }
        }

        Ok(record)
    }
}

fn mismatch(member: &str, expected: &str, found: &str) -> MappingError {
    MappingError::InvalidAnnotatedType {
        member: member.to_string(),
        expected: expected.to_string(),
        found: found.to_string(),
    }
}
