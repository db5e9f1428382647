//! Decoded property values and their byte encoding.
//!
//! Fixed-size values are read and written through `bytemuck`; the one
//! variable-length record (stream configuration) goes through `byteorder`.
//! Reference values travel as [`RefHandle`]s and are resolved through the
//! caller-supplied adopt/vend closures, which is how the registry plugs in
//! its host.

use byteorder::{NativeEndian, ReadBytesExt, WriteBytesExt};
use bytemuck::Pod;
use std::fmt;
use std::io::Cursor;
use std::sync::Arc;

use super::{ElementType, ValueType};
use crate::class::ClassId;
use crate::host::{Element, HostRef, ObjectId, OpaqueObject, PropertyAddress, RefHandle, Scope};
use crate::util::{
    read_pod, read_pod_array, CallbackRecord, ComponentDescription, Error, FourCc, Rect, Result,
    StreamDeck, Time, ValueRange,
};

/// Shared handle to an opaque host object. Compares by identity.
#[derive(Clone)]
pub struct ObjectRef(pub Arc<dyn OpaqueObject>);

impl ObjectRef {
    pub fn new(object: Arc<dyn OpaqueObject>) -> Self {
        Self(object)
    }

    pub fn type_name(&self) -> &str {
        self.0.type_name()
    }

    pub fn description(&self) -> String {
        self.0.description()
    }
}

impl PartialEq for ObjectRef {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(
            Arc::as_ptr(&self.0) as *const (),
            Arc::as_ptr(&other.0) as *const (),
        )
    }
}

impl fmt::Debug for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}>", self.0.type_name())
    }
}

/// A decoded property value, one variant per value type.
///
/// Both boolean encodings decode to [`PropertyValue::Boolean`].
#[derive(Clone, Debug, PartialEq)]
pub enum PropertyValue {
    Boolean(bool),
    Int32(i32),
    UInt32(u32),
    UInt64(u64),
    Float32(f32),
    Float64(f64),
    FourCc(FourCc),
    ClassId(ClassId),
    ObjectId(ObjectId),
    PropertyScope(Scope),
    PropertyElement(Element),
    Pid(i32),
    ValueRange(ValueRange),
    PropertyAddress(PropertyAddress),
    /// Channel count of each stream.
    StreamConfiguration(Vec<u32>),
    StreamDeck(StreamDeck),
    SmpteCallback(CallbackRecord),
    ScheduledOutputCallback(CallbackRecord),
    ComponentDescription(ComponentDescription),
    Time(Time),
    Rect(Rect),
    String(String),
    FormatDescription(ObjectRef),
    SampleBuffer(ObjectRef),
    Clock(ObjectRef),
    ArrayOfUInt32(Vec<u32>),
    ArrayOfFloat64(Vec<f64>),
    ArrayOfObjectId(Vec<ObjectId>),
    ArrayOfClassId(Vec<ClassId>),
    ArrayOfValueRange(Vec<ValueRange>),
    ArrayOfComponentDescription(Vec<ComponentDescription>),
    ArrayOfFormatDescription(Vec<ObjectRef>),
}

impl PropertyValue {
    /// Value type this variant decodes from.
    pub fn value_type(&self) -> ValueType {
        match self {
            Self::Boolean(_) => ValueType::Boolean,
            Self::Int32(_) => ValueType::Int32,
            Self::UInt32(_) => ValueType::UInt32,
            Self::UInt64(_) => ValueType::UInt64,
            Self::Float32(_) => ValueType::Float32,
            Self::Float64(_) => ValueType::Float64,
            Self::FourCc(_) => ValueType::FourCc,
            Self::ClassId(_) => ValueType::ClassId,
            Self::ObjectId(_) => ValueType::ObjectId,
            Self::PropertyScope(_) => ValueType::PropertyScope,
            Self::PropertyElement(_) => ValueType::PropertyElement,
            Self::Pid(_) => ValueType::Pid,
            Self::ValueRange(_) => ValueType::ValueRange,
            Self::PropertyAddress(_) => ValueType::PropertyAddress,
            Self::StreamConfiguration(_) => ValueType::StreamConfiguration,
            Self::StreamDeck(_) => ValueType::StreamDeck,
            Self::SmpteCallback(_) => ValueType::SmpteCallback,
            Self::ScheduledOutputCallback(_) => ValueType::ScheduledOutputCallback,
            Self::ComponentDescription(_) => ValueType::ComponentDescription,
            Self::Time(_) => ValueType::Time,
            Self::Rect(_) => ValueType::Rect,
            Self::String(_) => ValueType::String,
            Self::FormatDescription(_) => ValueType::FormatDescription,
            Self::SampleBuffer(_) => ValueType::SampleBuffer,
            Self::Clock(_) => ValueType::Clock,
            Self::ArrayOfUInt32(_) => ValueType::Array(ElementType::UInt32),
            Self::ArrayOfFloat64(_) => ValueType::Array(ElementType::Float64),
            Self::ArrayOfObjectId(_) => ValueType::Array(ElementType::ObjectId),
            Self::ArrayOfClassId(_) => ValueType::Array(ElementType::ClassId),
            Self::ArrayOfValueRange(_) => ValueType::Array(ElementType::ValueRange),
            Self::ArrayOfComponentDescription(_) => ValueType::Array(ElementType::ComponentDescription),
            Self::ArrayOfFormatDescription(_) => ValueType::Array(ElementType::FormatDescription),
        }
    }

    /// Whether this value can be written to a property of type `ty`.
    pub fn conforms_to(&self, ty: ValueType) -> bool {
        self.value_type() == ty || matches!((self, ty), (Self::Boolean(_), ValueType::Boolean32))
    }

    // === Accessors ===

    pub fn as_bool(&self) -> Option<bool> {
        match *self {
            Self::Boolean(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_u32(&self) -> Option<u32> {
        match *self {
            Self::UInt32(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_f32(&self) -> Option<f32> {
        match *self {
            Self::Float32(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Self::Float64(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_object_id(&self) -> Option<ObjectId> {
        match *self {
            Self::ObjectId(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_class_id(&self) -> Option<ClassId> {
        match *self {
            Self::ClassId(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_value_range(&self) -> Option<ValueRange> {
        match *self {
            Self::ValueRange(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_object_ids(&self) -> Option<&[ObjectId]> {
        match self {
            Self::ArrayOfObjectId(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_u32_array(&self) -> Option<&[u32]> {
        match self {
            Self::ArrayOfUInt32(v) => Some(v),
            _ => None,
        }
    }

    // === Encoding ===

    /// Encode for a property of type `ty`. Reference values are handed to
    /// `vend` in exchange for the handle written into the buffer.
    pub fn encode(&self, ty: ValueType, mut vend: impl FnMut(HostRef) -> RefHandle) -> Result<Vec<u8>> {
        if !self.conforms_to(ty) {
            return Err(Error::TypeMismatch { expected: ty.name(), actual: self.value_type().name() });
        }
        let mut handle = |r: HostRef| pod_bytes(&vend(r));
        let bytes = match (self, ty) {
            (Self::Boolean(v), ValueType::Boolean) => vec![u8::from(*v)],
            (Self::Boolean(v), _) => pod_bytes(&u32::from(*v)),
            (Self::Int32(v) | Self::Pid(v), _) => pod_bytes(v),
            (Self::UInt32(v), _) => pod_bytes(v),
            (Self::UInt64(v), _) => pod_bytes(v),
            (Self::Float32(v), _) => pod_bytes(v),
            (Self::Float64(v), _) => pod_bytes(v),
            (Self::FourCc(v), _) => pod_bytes(v),
            (Self::ClassId(v), _) => pod_bytes(v),
            (Self::ObjectId(v), _) => pod_bytes(v),
            (Self::PropertyScope(v), _) => pod_bytes(v),
            (Self::PropertyElement(v), _) => pod_bytes(v),
            (Self::ValueRange(v), _) => pod_bytes(v),
            (Self::PropertyAddress(v), _) => pod_bytes(v),
            (Self::StreamConfiguration(channels), _) => encode_stream_configuration(channels)?,
            (Self::StreamDeck(v), _) => pod_bytes(v),
            (Self::SmpteCallback(v) | Self::ScheduledOutputCallback(v), _) => pod_bytes(v),
            (Self::ComponentDescription(v), _) => pod_bytes(v),
            (Self::Time(v), _) => pod_bytes(v),
            (Self::Rect(v), _) => pod_bytes(v),
            (Self::String(s), _) => handle(HostRef::String(s.clone())),
            (Self::FormatDescription(o) | Self::SampleBuffer(o) | Self::Clock(o), _) => {
                handle(HostRef::Object(Arc::clone(&o.0)))
            }
            (Self::ArrayOfUInt32(v), _) => slice_bytes(v),
            (Self::ArrayOfFloat64(v), _) => slice_bytes(v),
            (Self::ArrayOfObjectId(v), _) => slice_bytes(v),
            (Self::ArrayOfClassId(v), _) => slice_bytes(v),
            (Self::ArrayOfValueRange(v), _) => slice_bytes(v),
            (Self::ArrayOfComponentDescription(v), _) => slice_bytes(v),
            (Self::ArrayOfFormatDescription(v), _) => v
                .iter()
                .flat_map(|o| handle(HostRef::Object(Arc::clone(&o.0))))
                .collect(),
        };
        Ok(bytes)
    }

    // === Decoding ===

    /// Decode a host buffer holding a value of type `ty`. Reference handles
    /// are resolved through `adopt`.
    pub fn decode(
        ty: ValueType,
        bytes: &[u8],
        mut adopt: impl FnMut(RefHandle) -> Option<HostRef>,
    ) -> Result<Self> {
        let value = match ty {
            ValueType::Boolean => {
                let byte = bytes.first().ok_or_else(|| Error::invalid("empty boolean buffer"))?;
                Self::Boolean(*byte != 0)
            }
            ValueType::Boolean32 => Self::Boolean(read_pod::<u32>(bytes)? != 0),
            ValueType::Int32 => Self::Int32(read_pod(bytes)?),
            ValueType::UInt32 => Self::UInt32(read_pod(bytes)?),
            ValueType::UInt64 => Self::UInt64(read_pod(bytes)?),
            ValueType::Float32 => Self::Float32(read_pod(bytes)?),
            ValueType::Float64 => Self::Float64(read_pod(bytes)?),
            ValueType::FourCc => Self::FourCc(read_pod(bytes)?),
            ValueType::ClassId => Self::ClassId(read_pod(bytes)?),
            ValueType::ObjectId => Self::ObjectId(read_pod(bytes)?),
            ValueType::PropertyScope => Self::PropertyScope(read_pod(bytes)?),
            ValueType::PropertyElement => Self::PropertyElement(read_pod(bytes)?),
            ValueType::Pid => Self::Pid(read_pod(bytes)?),
            ValueType::ValueRange => Self::ValueRange(read_pod(bytes)?),
            ValueType::PropertyAddress => Self::PropertyAddress(read_pod(bytes)?),
            ValueType::StreamConfiguration => Self::StreamConfiguration(decode_stream_configuration(bytes)?),
            ValueType::StreamDeck => Self::StreamDeck(read_pod(bytes)?),
            ValueType::SmpteCallback => Self::SmpteCallback(read_pod(bytes)?),
            ValueType::ScheduledOutputCallback => Self::ScheduledOutputCallback(read_pod(bytes)?),
            ValueType::ComponentDescription => Self::ComponentDescription(read_pod(bytes)?),
            ValueType::Time => Self::Time(read_pod(bytes)?),
            ValueType::Rect => Self::Rect(read_pod(bytes)?),
            ValueType::String => match adopt(read_pod(bytes)?) {
                Some(HostRef::String(s)) => Self::String(s),
                other => return Err(bad_ref(ty, other)),
            },
            ValueType::FormatDescription => Self::FormatDescription(adopt_object(ty, bytes, &mut adopt)?),
            ValueType::SampleBuffer => Self::SampleBuffer(adopt_object(ty, bytes, &mut adopt)?),
            ValueType::Clock => Self::Clock(adopt_object(ty, bytes, &mut adopt)?),
            ValueType::Array(element) => match element {
                ElementType::UInt32 => Self::ArrayOfUInt32(read_pod_array(bytes)),
                ElementType::Float64 => Self::ArrayOfFloat64(read_pod_array(bytes)),
                ElementType::ObjectId => Self::ArrayOfObjectId(read_pod_array(bytes)),
                ElementType::ClassId => Self::ArrayOfClassId(read_pod_array(bytes)),
                ElementType::ValueRange => Self::ArrayOfValueRange(read_pod_array(bytes)),
                ElementType::ComponentDescription => Self::ArrayOfComponentDescription(read_pod_array(bytes)),
                ElementType::FormatDescription => Self::ArrayOfFormatDescription(
                    read_pod_array::<RefHandle>(bytes)
                        .into_iter()
                        .map(|h| adopt_handle(element.scalar(), h, &mut adopt))
                        .collect::<Result<_>>()?,
                ),
            },
            ValueType::Translation => {
                return Err(Error::invalid("translation properties carry no stored value"));
            }
        };
        Ok(value)
    }
}

#[inline]
fn pod_bytes<T: Pod>(v: &T) -> Vec<u8> {
    bytemuck::bytes_of(v).to_vec()
}

#[inline]
fn slice_bytes<T: Pod>(v: &[T]) -> Vec<u8> {
    bytemuck::cast_slice::<T, u8>(v).to_vec()
}

fn encode_stream_configuration(channels: &[u32]) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(4 * (channels.len() + 1));
    out.write_u32::<NativeEndian>(channels.len() as u32)?;
    for &c in channels {
        out.write_u32::<NativeEndian>(c)?;
    }
    Ok(out)
}

/// Stream count, then one channel count per stream. A count larger than the
/// buffer is clamped to the whole entries present.
fn decode_stream_configuration(bytes: &[u8]) -> Result<Vec<u32>> {
    let mut cursor = Cursor::new(bytes);
    let count = cursor
        .read_u32::<NativeEndian>()
        .map_err(|_| Error::invalid("stream configuration header truncated"))? as usize;
    let available = (bytes.len() - 4) / 4;
    let mut channels = Vec::with_capacity(count.min(available));
    for _ in 0..count.min(available) {
        channels.push(cursor.read_u32::<NativeEndian>()?);
    }
    Ok(channels)
}

fn adopt_object(
    ty: ValueType,
    bytes: &[u8],
    adopt: &mut impl FnMut(RefHandle) -> Option<HostRef>,
) -> Result<ObjectRef> {
    adopt_handle(ty, read_pod(bytes)?, adopt)
}

fn adopt_handle(
    ty: ValueType,
    handle: RefHandle,
    adopt: &mut impl FnMut(RefHandle) -> Option<HostRef>,
) -> Result<ObjectRef> {
    match adopt(handle) {
        Some(HostRef::Object(o)) => Ok(ObjectRef(o)),
        other => Err(bad_ref(ty, other)),
    }
}

fn bad_ref(ty: ValueType, got: Option<HostRef>) -> Error {
    match got {
        None => Error::invalid(format!("null or unknown {} reference", ty)),
        Some(_) => Error::invalid(format!("reference of wrong kind for {}", ty)),
    }
}
