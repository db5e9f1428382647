//! Property schema: value types, read semantics, descriptors and the
//! closed property sets.
//!
//! Every key of every [`PropertySet`] has exactly one static
//! [`PropertyDescriptor`]. Descriptor lookup is an exhaustive `match`, so it
//! is total by construction; only the reverse lookup from a raw selector can
//! miss.

mod qualifier;
mod sets;
mod value;

use std::fmt;
use std::hash::Hash;

use crate::util::{Error, FourCc, Result};

pub use qualifier::Qualifier;
pub use sets::*;
pub use value::{ObjectRef, PropertyValue};

/// Element type of an array-valued property.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ElementType {
    UInt32,
    Float64,
    ObjectId,
    ClassId,
    ValueRange,
    ComponentDescription,
    FormatDescription,
}

impl ElementType {
    /// Encoded size of one element.
    #[inline]
    pub const fn num_bytes(self) -> usize {
        match self {
            Self::UInt32 | Self::ObjectId | Self::ClassId => 4,
            Self::Float64 => 8,
            Self::ValueRange => 16,
            Self::ComponentDescription => 20,
            Self::FormatDescription => REF_SIZE,
        }
    }

    /// The scalar value type of one element.
    pub const fn scalar(self) -> ValueType {
        match self {
            Self::UInt32 => ValueType::UInt32,
            Self::Float64 => ValueType::Float64,
            Self::ObjectId => ValueType::ObjectId,
            Self::ClassId => ValueType::ClassId,
            Self::ValueRange => ValueType::ValueRange,
            Self::ComponentDescription => ValueType::ComponentDescription,
            Self::FormatDescription => ValueType::FormatDescription,
        }
    }
}

/// Size of a reference handle in a host buffer.
pub const REF_SIZE: usize = 8;

/// How a value type travels through the host's byte-buffer protocol.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TypeKind {
    /// Fixed-size value decoded in place.
    Pod,
    /// Array of fixed-size values, length reported by the host.
    PodArray,
    /// Single reference handle.
    Ref,
    /// Array of reference handles, length reported by the host.
    RefArray,
    /// Variable-length record, length reported by the host.
    Dynamic,
    /// Paired input/output translation record; has no stored value.
    Function,
}

/// Closed set of property value types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ValueType {
    /// One-byte boolean
    Boolean,
    /// Four-byte boolean
    Boolean32,
    Int32,
    UInt32,
    UInt64,
    Float32,
    Float64,
    FourCc,
    ClassId,
    ObjectId,
    PropertyScope,
    PropertyElement,
    /// Process id
    Pid,
    ValueRange,
    PropertyAddress,
    /// Stream count followed by per-stream channel counts
    StreamConfiguration,
    StreamDeck,
    SmpteCallback,
    ScheduledOutputCallback,
    ComponentDescription,
    Time,
    Rect,
    String,
    FormatDescription,
    SampleBuffer,
    Clock,
    Array(ElementType),
    /// Paired translation record
    Translation,
}

impl ValueType {
    /// Transport kind of this type.
    pub const fn kind(self) -> TypeKind {
        match self {
            Self::String | Self::FormatDescription | Self::SampleBuffer | Self::Clock => TypeKind::Ref,
            Self::Array(ElementType::FormatDescription) => TypeKind::RefArray,
            Self::Array(_) => TypeKind::PodArray,
            Self::StreamConfiguration => TypeKind::Dynamic,
            Self::Translation => TypeKind::Function,
            _ => TypeKind::Pod,
        }
    }

    /// Statically known encoded size, `None` when the host reports it.
    pub const fn static_size(self) -> Option<usize> {
        let size = match self {
            Self::Boolean => 1,
            Self::Boolean32
            | Self::Int32
            | Self::UInt32
            | Self::Float32
            | Self::FourCc
            | Self::ClassId
            | Self::ObjectId
            | Self::PropertyScope
            | Self::PropertyElement
            | Self::Pid => 4,
            Self::UInt64 | Self::Float64 => 8,
            Self::PropertyAddress | Self::StreamDeck => 12,
            Self::ValueRange | Self::SmpteCallback | Self::ScheduledOutputCallback => 16,
            Self::ComponentDescription => 20,
            Self::Time => 24,
            Self::Rect => 32,
            Self::String | Self::FormatDescription | Self::SampleBuffer | Self::Clock => REF_SIZE,
            Self::Array(_) | Self::StreamConfiguration | Self::Translation => return None,
        };
        Some(size)
    }

    /// Name used in descriptions, e.g. `objectID` or `array<float64>`.
    pub fn name(self) -> String {
        match self {
            Self::Array(element) => format!("array<{}>", element.scalar().name()),
            _ => self.scalar_name().to_string(),
        }
    }

    fn scalar_name(self) -> &'static str {
        match self {
            Self::Boolean => "boolean",
            Self::Boolean32 => "boolean32",
            Self::Int32 => "int32",
            Self::UInt32 => "uint32",
            Self::UInt64 => "uint64",
            Self::Float32 => "float32",
            Self::Float64 => "float64",
            Self::FourCc => "fourCC",
            Self::ClassId => "classID",
            Self::ObjectId => "objectID",
            Self::PropertyScope => "propertyScope",
            Self::PropertyElement => "propertyElement",
            Self::Pid => "pid",
            Self::ValueRange => "audioValueRange",
            Self::PropertyAddress => "propertyAddress",
            Self::StreamConfiguration => "streamConfiguration",
            Self::StreamDeck => "streamDeck",
            Self::SmpteCallback => "smpteCallback",
            Self::ScheduledOutputCallback => "scheduledOutputCallback",
            Self::ComponentDescription => "componentDescription",
            Self::Time => "time",
            Self::Rect => "rect",
            Self::String => "string",
            Self::FormatDescription => "formatDescription",
            Self::SampleBuffer => "sampleBuffer",
            Self::Clock => "clock",
            Self::Array(_) => "array",
            Self::Translation => "audioValueTranslation",
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

/// Calling convention of a property, independent of its value type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ReadSemantics {
    /// Plain read.
    Read,
    /// The caller's input is overwritten in place by a device-side operation.
    MutatingRead,
    /// Input of the first type is translated into output of the second type.
    Translation(ValueType, ValueType),
    /// A qualifier of the given type is mandatory.
    QualifiedRead(ValueType),
    /// A qualifier of the given type narrows the result but may be omitted.
    OptionallyQualifiedRead(ValueType),
}

impl ReadSemantics {
    /// Qualifier type accepted by this convention, if any.
    pub const fn qualifier_type(self) -> Option<ValueType> {
        match self {
            Self::QualifiedRead(t) | Self::OptionallyQualifiedRead(t) => Some(t),
            _ => None,
        }
    }

    /// Whether a read without qualifier must be refused.
    #[inline]
    pub const fn requires_qualifier(self) -> bool {
        matches!(self, Self::QualifiedRead(_))
    }
}

/// Static description of one property key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PropertyDescriptor {
    pub selector: FourCc,
    pub value_type: ValueType,
    pub read_semantics: ReadSemantics,
}

impl PropertyDescriptor {
    #[inline]
    pub const fn new(selector: FourCc, value_type: ValueType, read_semantics: ReadSemantics) -> Self {
        Self { selector, value_type, read_semantics }
    }

    /// Descriptor with plain read semantics.
    #[inline]
    pub const fn read(selector: FourCc, value_type: ValueType) -> Self {
        Self::new(selector, value_type, ReadSemantics::Read)
    }
}

/// A property key: anything that resolves to a descriptor.
pub trait Property: Copy + fmt::Debug {
    /// The static descriptor of this key.
    fn descriptor(self) -> PropertyDescriptor;

    /// Key name for display.
    fn name(self) -> &'static str;

    #[inline]
    fn selector(self) -> FourCc {
        self.descriptor().selector
    }

    #[inline]
    fn value_type(self) -> ValueType {
        self.descriptor().value_type
    }

    #[inline]
    fn read_semantics(self) -> ReadSemantics {
        self.descriptor().read_semantics
    }
}

/// Ad-hoc keys for selectors outside the declared sets.
impl Property for PropertyDescriptor {
    #[inline]
    fn descriptor(self) -> PropertyDescriptor {
        self
    }

    fn name(self) -> &'static str {
        "custom"
    }
}

/// A closed, enumerable group of property keys.
pub trait PropertySet: Property + Eq + Hash + 'static {
    /// Name of the set, e.g. `Device`.
    const SET_NAME: &'static str;

    /// Every key, in declaration order.
    const ALL: &'static [Self];

    /// Reverse lookup of a key by selector.
    fn from_selector(selector: FourCc) -> Result<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|key| key.selector() == selector)
            .ok_or(Error::UnknownKey { set: Self::SET_NAME, selector })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_sizes() {
        assert_eq!(ValueType::Boolean.static_size(), Some(1));
        assert_eq!(ValueType::Boolean32.static_size(), Some(4));
        assert_eq!(ValueType::Time.static_size(), Some(24));
        assert_eq!(ValueType::String.static_size(), Some(REF_SIZE));
        assert_eq!(ValueType::Array(ElementType::ObjectId).static_size(), None);
        assert_eq!(ValueType::Translation.static_size(), None);
    }

    #[test]
    fn test_kinds() {
        assert_eq!(ValueType::UInt32.kind(), TypeKind::Pod);
        assert_eq!(ValueType::Array(ElementType::Float64).kind(), TypeKind::PodArray);
        assert_eq!(ValueType::Array(ElementType::FormatDescription).kind(), TypeKind::RefArray);
        assert_eq!(ValueType::Clock.kind(), TypeKind::Ref);
        assert_eq!(ValueType::StreamConfiguration.kind(), TypeKind::Dynamic);
        assert_eq!(ValueType::Translation.kind(), TypeKind::Function);
    }

    #[test]
    fn test_type_names() {
        assert_eq!(ValueType::ObjectId.to_string(), "objectID");
        assert_eq!(ValueType::Array(ElementType::ClassId).to_string(), "array<classID>");
    }

    #[test]
    fn test_element_sizes_match_scalars() {
        for element in [
            ElementType::UInt32,
            ElementType::Float64,
            ElementType::ObjectId,
            ElementType::ClassId,
            ElementType::ValueRange,
            ElementType::ComponentDescription,
            ElementType::FormatDescription,
        ] {
            assert_eq!(element.scalar().static_size(), Some(element.num_bytes()));
        }
    }

    #[test]
    fn test_semantics_qualifier() {
        assert!(ReadSemantics::QualifiedRead(ValueType::UInt32).requires_qualifier());
        assert!(!ReadSemantics::OptionallyQualifiedRead(ValueType::UInt32).requires_qualifier());
        assert_eq!(ReadSemantics::Read.qualifier_type(), None);
    }
}
