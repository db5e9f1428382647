//! Human-readable rendering of property values.
//!
//! Four-character values (class ids, codes, scopes, elements) are rendered
//! as `'adev' (kCMIODeviceClassID)` when a [`FourCcDatabase`] knows them.
//! [`Registry::property_list`] renders every property of one object, with the
//! property sets chosen by its class.

mod fourcc_db;
mod property_list;

use crate::host::{Host, ObjectId, PropertyAddress};
use crate::property::{Property, PropertyValue, Qualifier, ReadSemantics, ValueType};
use crate::registry::{Registry, Target};
use crate::util::{CallbackRecord, ComponentDescription, FourCc, ValueRange};
use tracing::debug;

pub use fourcc_db::{FourCcDatabase, FourCcEntry};
pub use property_list::{PropertyListItem, UNREADABLE};

/// `'code'` or `'code' (ConstantName)`, `None` if the value is not printable.
pub fn four_cc_description(value: u32, db: &FourCcDatabase) -> Option<String> {
    let code = FourCc(value);
    if !code.is_printable() {
        return None;
    }
    Some(match db.entry(value) {
        Some(entry) => format!("'{}' ({})", code, entry.constant_name),
        None => format!("'{}'", code),
    })
}

fn code_or_number(value: u32, db: &FourCcDatabase) -> String {
    four_cc_description(value, db).unwrap_or_else(|| value.to_string())
}

fn object_id(id: ObjectId) -> String {
    if id.is_unknown() {
        "<null>".to_string()
    } else {
        id.to_string()
    }
}

fn value_range(v: &ValueRange) -> String {
    format!("AudioValueRange {{{}, {}}}", v.minimum, v.maximum)
}

fn callback(type_name: &str, v: &CallbackRecord) -> String {
    if v.is_null() {
        "<null>".to_string()
    } else {
        format!("{} {{proc={:#x}, ctx={:#x}}}", type_name, v.proc_addr, v.ref_con)
    }
}

fn component(v: &ComponentDescription, db: &FourCcDatabase) -> String {
    format!(
        "ComponentDescription {{{}, {}, {}, {:#x}, {:#x}}}",
        code_or_number(v.component_type, db),
        code_or_number(v.component_sub_type, db),
        code_or_number(v.component_manufacturer, db),
        v.component_flags,
        v.component_flags_mask
    )
}

fn list<T>(items: &[T], f: impl Fn(&T) -> String) -> String {
    let parts: Vec<String> = items.iter().map(f).collect();
    format!("[{}]", parts.join(", "))
}

/// Render a decoded value.
pub fn describe(value: &PropertyValue, db: &FourCcDatabase) -> String {
    use PropertyValue as V;
    match value {
        V::Boolean(true) => "true".to_string(),
        V::Boolean(false) => "false".to_string(),
        V::Int32(v) | V::Pid(v) => v.to_string(),
        V::UInt32(v) => v.to_string(),
        V::UInt64(v) => v.to_string(),
        V::Float32(v) => v.to_string(),
        V::Float64(v) => v.to_string(),
        V::FourCc(v) => code_or_number(v.value(), db),
        V::ClassId(v) => code_or_number(v.value(), db),
        V::PropertyScope(v) => code_or_number(v.0, db),
        V::PropertyElement(v) => code_or_number(v.0, db),
        V::ObjectId(v) => object_id(*v),
        V::ValueRange(v) => value_range(v),
        V::PropertyAddress(PropertyAddress { selector, scope, element }) => format!(
            "CMIOObjectPropertyAddress {{{}, {}, {}}}",
            code_or_number(selector.value(), db),
            code_or_number(scope.0, db),
            code_or_number(element.0, db)
        ),
        V::StreamConfiguration(channels) => list(channels, u32::to_string),
        V::StreamDeck(v) => format!("CMIOStreamDeck {{{}, {}, {}}}", v.status, v.state, v.state2),
        V::SmpteCallback(v) => callback("CMIODeviceSMPTETimeCallback", v),
        V::ScheduledOutputCallback(v) => {
            callback("CMIOStreamScheduledOutputNotificationProcAndRefCon", v)
        }
        V::ComponentDescription(v) => component(v, db),
        V::Time(v) => format!("CMTime {{{} / {}}}", v.value, v.timescale),
        V::Rect(v) => format!("CGRect {{{{{}, {}}}, {{{}, {}}}}}", v.x, v.y, v.width, v.height),
        V::String(s) => s.clone(),
        V::FormatDescription(o) | V::SampleBuffer(o) | V::Clock(o) => o.description(),
        V::ArrayOfUInt32(v) => list(v, u32::to_string),
        V::ArrayOfFloat64(v) => list(v, f64::to_string),
        V::ArrayOfObjectId(v) => list(v, |id| object_id(*id)),
        V::ArrayOfClassId(v) => list(v, |c| code_or_number(c.value(), db)),
        V::ArrayOfValueRange(v) => list(v, value_range),
        V::ArrayOfComponentDescription(v) => list(v, |c| component(c, db)),
        V::ArrayOfFormatDescription(v) => list(v, |o| o.description()),
    }
}

/// Render a 4-byte boolean with the value the host returned.
pub fn describe_boolean32(raw: u32) -> String {
    match raw {
        0 => "false (0)".to_string(),
        n => format!("true ({})", n),
    }
}

/// Signature of a translation key, e.g. `<function: (string) -> objectID>`.
pub fn describe_signature<P: Property>(key: P) -> Option<String> {
    let desc = key.descriptor();
    if desc.value_type != ValueType::Translation {
        return None;
    }
    Some(match desc.read_semantics {
        ReadSemantics::Translation(source, destination) => {
            format!("<function: ({}) -> {}>", source, destination)
        }
        _ => "<function>".to_string(),
    })
}

impl<H: Host> Registry<H> {
    /// Read a property and render it. Translation keys render as their
    /// signature without a host call.
    pub fn describe_property<P: Property>(
        &self,
        key: P,
        target: impl Into<Target>,
        qualifier: Option<&Qualifier<'_>>,
        db: &FourCcDatabase,
    ) -> Option<String> {
        if let Some(signature) = describe_signature(key) {
            return Some(signature);
        }
        if key.value_type() == ValueType::Boolean32 {
            let bytes = self
                .try_get_raw(key, target, qualifier)
                .map_err(|e| debug!("describe {:?}: {}", key, e))
                .ok()?;
            let raw: [u8; 4] = bytes.get(..4)?.try_into().ok()?;
            return Some(describe_boolean32(u32::from_ne_bytes(raw)));
        }
        self.get(key, target, qualifier).map(|v| describe(&v, db))
    }

    /// Translate `input` and render the result.
    pub fn describe_translation<P: Property>(
        &self,
        key: P,
        input: &str,
        target: impl Into<Target>,
        db: &FourCcDatabase,
    ) -> Option<String> {
        self.translate(key, &PropertyValue::String(input.to_string()), target)
            .map(|v| describe(&v, db))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::class::ClassId;
    use crate::host::mock::MockObject;
    use crate::host::{Element, MockHost, Scope};
    use crate::property::{BooleanControlProperty, ObjectRef, StreamProperty, SystemProperty};
    use crate::util::{Rect, StreamDeck, Time};
    use std::sync::Arc;

    fn show(value: PropertyValue) -> String {
        describe(&value, FourCcDatabase::builtin())
    }

    #[test]
    fn test_scalars() {
        assert_eq!(show(PropertyValue::Boolean(true)), "true");
        assert_eq!(show(PropertyValue::Boolean(false)), "false");
        assert_eq!(describe_boolean32(0), "false (0)");
        assert_eq!(describe_boolean32(5), "true (5)");
        assert_eq!(show(PropertyValue::Int32(-3)), "-3");
        assert_eq!(show(PropertyValue::Float64(29.97)), "29.97");
        assert_eq!(show(PropertyValue::String("Mute".into())), "Mute");
    }

    #[test]
    fn test_object_ids() {
        assert_eq!(show(PropertyValue::ObjectId(ObjectId(42))), "@42");
        assert_eq!(show(PropertyValue::ObjectId(ObjectId::UNKNOWN)), "<null>");
        assert_eq!(
            show(PropertyValue::ArrayOfObjectId(vec![ObjectId(2), ObjectId(0)])),
            "[@2, <null>]"
        );
    }

    #[test]
    fn test_four_cc_values() {
        assert_eq!(show(PropertyValue::ClassId(ClassId::DEVICE)), "'adev' (kCMIODeviceClassID)");
        assert_eq!(show(PropertyValue::FourCc(FourCc::new(*b"usb "))), "'usb '");
        assert_eq!(show(PropertyValue::PropertyElement(Element::MAIN)), "0");
        assert_eq!(show(PropertyValue::PropertyScope(Scope::GLOBAL)), "'glob' (kCMIOObjectPropertyScopeGlobal)");
    }

    #[test]
    fn test_records() {
        assert_eq!(show(PropertyValue::ValueRange(ValueRange::new(0.0, 1.0))), "AudioValueRange {0, 1}");
        assert_eq!(show(PropertyValue::Time(Time::new(1, 30))), "CMTime {1 / 30}");
        assert_eq!(
            show(PropertyValue::Rect(Rect::new(0.0, 0.5, 1.0, 1.0))),
            "CGRect {{0, 0.5}, {1, 1}}"
        );
        assert_eq!(
            show(PropertyValue::StreamDeck(StreamDeck { status: 1, state: 2, state2: 3 })),
            "CMIOStreamDeck {1, 2, 3}"
        );
        assert_eq!(show(PropertyValue::StreamConfiguration(vec![2, 1])), "[2, 1]");
    }

    #[test]
    fn test_callbacks() {
        assert_eq!(show(PropertyValue::SmpteCallback(CallbackRecord::default())), "<null>");
        let cb = CallbackRecord { proc_addr: 0x1000, ref_con: 0 };
        assert_eq!(
            show(PropertyValue::SmpteCallback(cb)),
            "CMIODeviceSMPTETimeCallback {proc=0x1000, ctx=0x0}"
        );
    }

    #[test]
    fn test_opaque_objects() {
        let fd = ObjectRef(MockObject::new("CMFormatDescription", "420v 1280x720"));
        assert_eq!(show(PropertyValue::FormatDescription(fd.clone())), "420v 1280x720");
        assert_eq!(
            show(PropertyValue::ArrayOfFormatDescription(vec![fd.clone(), fd])),
            "[420v 1280x720, 420v 1280x720]"
        );
    }

    #[test]
    fn test_signature() {
        assert_eq!(
            describe_signature(SystemProperty::DeviceForUid).as_deref(),
            Some("<function: (string) -> objectID>")
        );
        assert_eq!(describe_signature(StreamProperty::FrameRate), None);
    }

    #[test]
    fn test_registry_describe() {
        let host = Arc::new(MockHost::new());
        let reg = Registry::new(Arc::clone(&host));
        host.insert_value(ObjectId(4), StreamProperty::FrameRate, &PropertyValue::Float64(30.0))
            .unwrap();
        let db = FourCcDatabase::builtin();
        assert_eq!(reg.describe_property(StreamProperty::FrameRate, ObjectId(4), None, db).as_deref(), Some("30"));
        assert_eq!(reg.describe_property(StreamProperty::Latency, ObjectId(4), None, db), None);
        assert!(reg
            .describe_property(SystemProperty::DeviceForUid, ObjectId::SYSTEM, None, db)
            .is_some());
        assert_eq!(host.total_calls(), 2);

        host.on_translate(ObjectId::SYSTEM, SystemProperty::DeviceForUid.selector(), |_| {
            Ok(7u32.to_ne_bytes().to_vec())
        });
        assert_eq!(
            reg.describe_translation(SystemProperty::DeviceForUid, "cam", ObjectId::SYSTEM, db)
                .as_deref(),
            Some("@7")
        );
    }

    #[test]
    fn test_boolean32_shows_host_value() {
        let host = Arc::new(MockHost::new());
        let reg = Registry::new(Arc::clone(&host));
        let selector = BooleanControlProperty::Value.selector();
        host.insert(ObjectId(6), selector, 5u32.to_ne_bytes());
        host.insert(ObjectId(7), selector, 0u32.to_ne_bytes());
        let db = FourCcDatabase::builtin();
        assert_eq!(
            reg.describe_property(BooleanControlProperty::Value, ObjectId(6), None, db).as_deref(),
            Some("true (5)")
        );
        assert_eq!(
            reg.describe_property(BooleanControlProperty::Value, ObjectId(7), None, db).as_deref(),
            Some("false (0)")
        );
        assert_eq!(
            reg.get(BooleanControlProperty::Value, ObjectId(6), None),
            Some(PropertyValue::Boolean(true))
        );
        assert_eq!(reg.describe_property(BooleanControlProperty::Value, ObjectId(8), None, db), None);
    }
}
