//! Declarative record schemas
//!
//! A record type describes its serialisable members once, through a
//! [`Schema`] built in [`Record::schema`]. Each member gets one role
//! (timestamp, field, tag or ignored) and a getter/mutator lens pair, so the
//! mapper never needs runtime introspection.
//!
//! ```rust
//! use chrono::{DateTime, Utc};
//! use fluxline::mapping::{Record, Schema};
//!
//! #[derive(Default)]
//! struct CpuLoad {
//!     time: Option<DateTime<Utc>>,
//!     host: String,
//!     load: f64,
//! }
//!
//! impl Record for CpuLoad {
//!     fn schema() -> Schema<Self> {
//!         Schema::<Self>::new("CpuLoad")
//!             .measurement("cpu")
//!             .timestamp("time", |r| &r.time, |r| &mut r.time)
//!             .tag("host", |r| &r.host, |r| &mut r.host)
//!             .field("load", |r| &r.load, |r| &mut r.load)
//!             .default_constructor()
//!     }
//! }
//! ```

use chrono::{DateTime, Utc};
use std::fmt;

use crate::domain::FieldValue;

/// A type whose values can be mapped to and from points
pub trait Record: Sized {
    /// Describe the record's members
    fn schema() -> Schema<Self>;
}

/// Kind of marker attached to a record or one of its members
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Marker {
    Measurement,
    Timestamp,
    Field,
    Tag,
}

impl fmt::Display for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Marker::Measurement => write!(f, "Measurement"),
            Marker::Timestamp => write!(f, "Timestamp"),
            Marker::Field => write!(f, "Field"),
            Marker::Tag => write!(f, "Tag"),
        }
    }
}

/// Role a member plays when mapped to a point
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Timestamp,
    Field,
    Tag,
    Ignored,
}

// ============================================
// Member value types
// ============================================

/// Types that can be stored as a point field
///
/// Only numbers and booleans qualify; `Option<F>` maps `None` to an absent
/// field.
pub trait FieldType: Sized {
    /// Value to write, `None` when the member is null
    fn to_field_value(&self) -> Option<FieldValue>;

    /// Convert a point value back, `None` when the variant does not fit
    fn from_field_value(value: &FieldValue) -> Option<Self>;

    /// Value to assign when the point has no such field
    fn absent() -> Option<Self> {
        None
    }
}

macro_rules! integer_field_type {
    ($($t:ty),*) => {
        $(
            impl FieldType for $t {
                fn to_field_value(&self) -> Option<FieldValue> {
                    Some(FieldValue::Integer(i64::from(*self)))
                }

                fn from_field_value(value: &FieldValue) -> Option<Self> {
                    value.as_i64().and_then(|v| <$t>::try_from(v).ok())
                }
            }
        )*
    };
}

integer_field_type!(i8, i16, i32, i64, u8, u16, u32);

impl FieldType for f64 {
    fn to_field_value(&self) -> Option<FieldValue> {
        Some(FieldValue::Float(*self))
    }

    fn from_field_value(value: &FieldValue) -> Option<Self> {
        value.as_f64()
    }
}

impl FieldType for f32 {
    fn to_field_value(&self) -> Option<FieldValue> {
        Some(FieldValue::Float(f64::from(*self)))
    }

    fn from_field_value(value: &FieldValue) -> Option<Self> {
        value.as_f64().map(|v| v as f32)
    }
}

impl FieldType for bool {
    fn to_field_value(&self) -> Option<FieldValue> {
        Some(FieldValue::Boolean(*self))
    }

    fn from_field_value(value: &FieldValue) -> Option<Self> {
        value.as_bool()
    }
}

impl<F: FieldType> FieldType for Option<F> {
    fn to_field_value(&self) -> Option<FieldValue> {
        self.as_ref().and_then(F::to_field_value)
    }

    fn from_field_value(value: &FieldValue) -> Option<Self> {
        F::from_field_value(value).map(Some)
    }

    fn absent() -> Option<Self> {
        Some(None)
    }
}

/// Types that can be stored as a point tag
pub trait TagType: Sized {
    /// String form to write, `None` when the member is null
    fn to_tag_value(&self) -> Option<String>;

    /// Parse a tag back, `None` when the text does not fit
    fn from_tag_value(value: &str) -> Option<Self>;

    /// Value to assign when the point has no such tag
    fn absent() -> Option<Self> {
        None
    }
}

impl TagType for String {
    fn to_tag_value(&self) -> Option<String> {
        Some(self.clone())
    }

    fn from_tag_value(value: &str) -> Option<Self> {
        Some(value.to_string())
    }
}

macro_rules! parsed_tag_type {
    ($($t:ty),*) => {
        $(
            impl TagType for $t {
                fn to_tag_value(&self) -> Option<String> {
                    Some(self.to_string())
                }

                fn from_tag_value(value: &str) -> Option<Self> {
                    value.parse().ok()
                }
            }
        )*
    };
}

parsed_tag_type!(i8, i16, i32, i64, u8, u16, u32, u64, usize, f32, f64, bool, char);

impl<T: TagType> TagType for Option<T> {
    fn to_tag_value(&self) -> Option<String> {
        self.as_ref().and_then(T::to_tag_value)
    }

    fn from_tag_value(value: &str) -> Option<Self> {
        T::from_tag_value(value).map(Some)
    }

    fn absent() -> Option<Self> {
        Some(None)
    }
}

/// Types that can hold a point timestamp
pub trait TimestampType: Sized {
    fn to_timestamp(&self) -> Option<DateTime<Utc>>;

    /// Value to assign for the point's timestamp; `None` leaves the member untouched
    fn from_timestamp(value: Option<DateTime<Utc>>) -> Option<Self>;
}

impl TimestampType for DateTime<Utc> {
    fn to_timestamp(&self) -> Option<DateTime<Utc>> {
        Some(*self)
    }

    fn from_timestamp(value: Option<DateTime<Utc>>) -> Option<Self> {
        value
    }
}

impl TimestampType for Option<DateTime<Utc>> {
    fn to_timestamp(&self) -> Option<DateTime<Utc>> {
        *self
    }

    fn from_timestamp(value: Option<DateTime<Utc>>) -> Option<Self> {
        Some(value)
    }
}

// ============================================
// Accessors
// ============================================

/// Getter/mutator pair for one member
struct Lens<T, M> {
    get: fn(&T) -> &M,
    get_mut: fn(&mut T) -> &mut M,
}

pub(crate) trait FieldSlot<T>: Send + Sync {
    fn read(&self, record: &T) -> Option<FieldValue>;
    /// Returns false when the value does not fit the member type
    fn write(&self, record: &mut T, value: Option<&FieldValue>) -> bool;
    fn type_name(&self) -> &'static str;
}

pub(crate) trait TagSlot<T>: Send + Sync {
    fn read(&self, record: &T) -> Option<String>;
    fn write(&self, record: &mut T, value: Option<&str>) -> bool;
    fn type_name(&self) -> &'static str;
}

pub(crate) trait TimestampSlot<T>: Send + Sync {
    fn read(&self, record: &T) -> Option<DateTime<Utc>>;
    fn write(&self, record: &mut T, value: Option<DateTime<Utc>>);
}

impl<T, M: FieldType> FieldSlot<T> for Lens<T, M> {
    fn read(&self, record: &T) -> Option<FieldValue> {
        (self.get)(record).to_field_value()
    }

    fn write(&self, record: &mut T, value: Option<&FieldValue>) -> bool {
        let converted = match value {
            Some(v) => match M::from_field_value(v) {
                Some(converted) => Some(converted),
                None => return false,
            },
            None => M::absent(),
        };
        if let Some(converted) = converted {
            *(self.get_mut)(record) = converted;
        }
        true
    }

    fn type_name(&self) -> &'static str {
        std::any::type_name::<M>()
    }
}

impl<T, M: TagType> TagSlot<T> for Lens<T, M> {
    fn read(&self, record: &T) -> Option<String> {
        (self.get)(record).to_tag_value()
    }

    fn write(&self, record: &mut T, value: Option<&str>) -> bool {
        let converted = match value {
            Some(v) => match M::from_tag_value(v) {
                Some(converted) => Some(converted),
                None => return false,
            },
            None => M::absent(),
        };
        if let Some(converted) = converted {
            *(self.get_mut)(record) = converted;
        }
        true
    }

    fn type_name(&self) -> &'static str {
        std::any::type_name::<M>()
    }
}

impl<T, M: TimestampType> TimestampSlot<T> for Lens<T, M> {
    fn read(&self, record: &T) -> Option<DateTime<Utc>> {
        (self.get)(record).to_timestamp()
    }

    fn write(&self, record: &mut T, value: Option<DateTime<Utc>>) {
        if let Some(converted) = M::from_timestamp(value) {
            *(self.get_mut)(record) = converted;
        }
    }
}

pub(crate) enum Access<T> {
    Timestamp(Box<dyn TimestampSlot<T>>),
    Field(Box<dyn FieldSlot<T>>),
    Tag(Box<dyn TagSlot<T>>),
    Ignored,
}

/// One declared member of a record
pub struct Member<T> {
    ident: String,
    name: Option<String>,
    pub(crate) access: Access<T>,
}

impl<T> Member<T> {
    /// Identifier of the member in the record type
    pub fn ident(&self) -> &str {
        &self.ident
    }

    /// Explicit wire name given through the marker, if any
    pub fn override_name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn role(&self) -> Role {
        match self.access {
            Access::Timestamp(_) => Role::Timestamp,
            Access::Field(_) => Role::Field,
            Access::Tag(_) => Role::Tag,
            Access::Ignored => Role::Ignored,
        }
    }
}

impl<T> fmt::Debug for Member<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Member")
            .field("ident", &self.ident)
            .field("name", &self.name)
            .field("role", &self.role())
            .finish()
    }
}

// ============================================
// Schema
// ============================================

/// Member layout of a record type
pub struct Schema<T> {
    ident: String,
    measurement: Option<String>,
    members: Vec<Member<T>>,
    constructor: Option<fn() -> T>,
}

impl<T: 'static> Schema<T> {
    /// Start a schema for the type with the given identifier
    pub fn new(ident: impl Into<String>) -> Self {
        Self {
            ident: ident.into(),
            measurement: None,
            members: Vec::new(),
            constructor: None,
        }
    }

    /// Measurement marker: write to this measurement instead of the derived name
    pub fn measurement(mut self, name: impl Into<String>) -> Self {
        self.measurement = Some(name.into());
        self
    }

    /// Timestamp marker
    pub fn timestamp<M: TimestampType + 'static>(
        mut self,
        ident: impl Into<String>,
        get: fn(&T) -> &M,
        get_mut: fn(&mut T) -> &mut M,
    ) -> Self {
        self.members.push(Member {
            ident: ident.into(),
            name: None,
            access: Access::Timestamp(Box::new(Lens { get, get_mut })),
        });
        self
    }

    /// Field marker with a name derived from the identifier
    pub fn field<M: FieldType + 'static>(
        self,
        ident: impl Into<String>,
        get: fn(&T) -> &M,
        get_mut: fn(&mut T) -> &mut M,
    ) -> Self {
        self.push_field(ident.into(), None, get, get_mut)
    }

    /// Field marker with an explicit wire name
    pub fn field_named<M: FieldType + 'static>(
        self,
        ident: impl Into<String>,
        name: impl Into<String>,
        get: fn(&T) -> &M,
        get_mut: fn(&mut T) -> &mut M,
    ) -> Self {
        self.push_field(ident.into(), Some(name.into()), get, get_mut)
    }

    /// Tag marker with a name derived from the identifier
    pub fn tag<M: TagType + 'static>(
        self,
        ident: impl Into<String>,
        get: fn(&T) -> &M,
        get_mut: fn(&mut T) -> &mut M,
    ) -> Self {
        self.push_tag(ident.into(), None, get, get_mut)
    }

    /// Tag marker with an explicit wire name
    pub fn tag_named<M: TagType + 'static>(
        self,
        ident: impl Into<String>,
        name: impl Into<String>,
        get: fn(&T) -> &M,
        get_mut: fn(&mut T) -> &mut M,
    ) -> Self {
        self.push_tag(ident.into(), Some(name.into()), get, get_mut)
    }

    /// Declare a member that is never mapped
    pub fn ignored(mut self, ident: impl Into<String>) -> Self {
        self.members.push(Member {
            ident: ident.into(),
            name: None,
            access: Access::Ignored,
        });
        self
    }

    /// No-argument constructor used when hydrating records from points
    pub fn constructor(mut self, constructor: fn() -> T) -> Self {
        self.constructor = Some(constructor);
        self
    }

    /// Use `T::default` as the constructor
    pub fn default_constructor(self) -> Self
    where
        T: Default,
    {
        self.constructor(T::default)
    }

    fn push_field<M: FieldType + 'static>(
        mut self,
        ident: String,
        name: Option<String>,
        get: fn(&T) -> &M,
        get_mut: fn(&mut T) -> &mut M,
    ) -> Self {
        self.members.push(Member {
            ident,
            name,
            access: Access::Field(Box::new(Lens { get, get_mut })),
        });
        self
    }

    fn push_tag<M: TagType + 'static>(
        mut self,
        ident: String,
        name: Option<String>,
        get: fn(&T) -> &M,
        get_mut: fn(&mut T) -> &mut M,
    ) -> Self {
        self.members.push(Member {
            ident,
            name,
            access: Access::Tag(Box::new(Lens { get, get_mut })),
        });
        self
    }
}

impl<T> Schema<T> {
    /// Identifier of the record type
    pub fn ident(&self) -> &str {
        &self.ident
    }

    /// Measurement name given through the marker, if any
    pub fn measurement_override(&self) -> Option<&str> {
        self.measurement.as_deref()
    }

    /// Declared members in registration order
    pub fn members(&self) -> &[Member<T>] {
        &self.members
    }

    /// Create an empty record, `None` when no constructor is registered
    pub fn instantiate(&self) -> Option<T> {
        self.constructor.map(|ctor| ctor())
    }
}

impl<T> fmt::Debug for Schema<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema")
            .field("ident", &self.ident)
            .field("measurement", &self.measurement)
            .field("members", &self.members)
            .field("constructible", &self.constructor.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Sample {
        time: Option<DateTime<Utc>>,
        count: i32,
        label: Option<String>,
        cache: Vec<u8>,
    }

    fn sample_schema() -> Schema<Sample> {
        Schema::<Sample>::new("Sample")
            .timestamp("time", |s| &s.time, |s| &mut s.time)
            .field_named("count", "total", |s| &s.count, |s| &mut s.count)
            .tag("label", |s| &s.label, |s| &mut s.label)
            .ignored("cache")
    }

    #[test]
    fn test_member_roles_in_order() {
        let schema = sample_schema();
        let roles: Vec<Role> = schema.members().iter().map(Member::role).collect();
        assert_eq!(
            roles,
            vec![Role::Timestamp, Role::Field, Role::Tag, Role::Ignored]
        );
        assert_eq!(schema.members()[1].override_name(), Some("total"));
        assert_eq!(schema.members()[2].override_name(), None);
    }

    #[test]
    fn test_instantiate_requires_constructor() {
        assert!(sample_schema().instantiate().is_none());
        let schema = sample_schema().default_constructor();
        let sample = schema.instantiate().unwrap();
        assert!(sample.cache.is_empty());
    }

    #[test]
    fn test_integer_field_conversions() {
        assert_eq!(i32::from_field_value(&FieldValue::Integer(7)), Some(7));
        assert_eq!(i8::from_field_value(&FieldValue::Integer(300)), None);
        assert_eq!(u8::from_field_value(&FieldValue::Integer(-1)), None);
        assert_eq!(i64::from_field_value(&FieldValue::Float(1.0)), None);
        assert_eq!(f64::from_field_value(&FieldValue::Integer(2)), Some(2.0));
        assert_eq!(bool::from_field_value(&FieldValue::Integer(1)), None);
    }

    #[test]
    fn test_optional_members() {
        let none: Option<i64> = None;
        assert_eq!(none.to_field_value(), None);
        assert_eq!(Some(3i64).to_field_value(), Some(FieldValue::Integer(3)));
        assert_eq!(<Option<i64> as FieldType>::absent(), Some(None));
        assert_eq!(<i64 as FieldType>::absent(), None);

        let tag: Option<String> = None;
        assert_eq!(tag.to_tag_value(), None);
        assert_eq!(<Option<u32>>::from_tag_value("12"), Some(Some(12)));
        assert_eq!(<u32>::from_tag_value("twelve"), None);
    }

    #[test]
    fn test_lens_write_mismatch() {
        let schema = sample_schema();
        let mut sample = Sample::default();
        let Access::Field(slot) = &schema.members()[1].access else {
            panic!("expected field member");
        };
        assert!(slot.write(&mut sample, Some(&FieldValue::Integer(5))));
        assert_eq!(sample.count, 5);
        assert!(!slot.write(&mut sample, Some(&FieldValue::Boolean(true))));
        assert_eq!(sample.count, 5);
        // absent value leaves a plain member untouched
        assert!(slot.write(&mut sample, None));
        assert_eq!(sample.count, 5);
    }
}
