//! Decoded control models.
//!
//! A control object is decoded by class: boolean, selector and feature
//! controls each read their own property set. Every read a model needs must
//! succeed, otherwise there is no model.

use crate::class::ClassId;
use crate::host::{Host, ObjectId};
use crate::property::{
    BooleanControlProperty, FeatureControlProperty, Property, PropertyValue, Qualifier,
    SelectorControlProperty,
};
use crate::registry::Registry;
use crate::util::ValueRange;

#[derive(Clone, Debug, PartialEq)]
pub struct BooleanControl {
    pub object: ObjectId,
    pub name: String,
    pub value: bool,
}

/// One choice of a selector control.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SelectorItem {
    pub id: u32,
    pub name: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SelectorControl {
    pub object: ObjectId,
    pub name: String,
    pub items: Vec<SelectorItem>,
    pub current_item: u32,
}

impl SelectorControl {
    /// Position of the current item among `items`.
    pub fn current_index(&self) -> Option<usize> {
        self.items.iter().position(|item| item.id == self.current_item)
    }
}

/// A feature control read in either absolute or native units.
#[derive(Clone, Debug, PartialEq)]
pub struct FeatureControl {
    pub object: ObjectId,
    pub name: String,
    pub enabled: bool,
    pub automatic: bool,
    pub tuning: bool,
    pub absolute: bool,
    pub range: ValueRange,
    pub value: f32,
    /// Only present in absolute units.
    pub unit_name: Option<String>,
}

impl FeatureControl {
    /// Key holding the value in the units this model was read in.
    pub fn value_key(&self) -> FeatureControlProperty {
        if self.absolute {
            FeatureControlProperty::AbsoluteValue
        } else {
            FeatureControlProperty::NativeValue
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ControlModel {
    Boolean(BooleanControl),
    Selector(SelectorControl),
    Feature(FeatureControl),
}

impl ControlModel {
    pub fn object(&self) -> ObjectId {
        match self {
            Self::Boolean(c) => c.object,
            Self::Selector(c) => c.object,
            Self::Feature(c) => c.object,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Boolean(c) => &c.name,
            Self::Selector(c) => &c.name,
            Self::Feature(c) => &c.name,
        }
    }
}

impl<H: Host> Registry<H> {
    /// Decode the control behind `object`, if it is one.
    pub fn control_model(&self, object: ObjectId) -> Option<ControlModel> {
        let class = self.class_of(object)?;
        let name = self.name_of(object)?;

        if class.is_subclass(ClassId::BOOLEAN_CONTROL) {
            let value = self.read_bool(BooleanControlProperty::Value, object)?;
            Some(ControlModel::Boolean(BooleanControl { object, name, value }))
        } else if class.is_subclass(ClassId::SELECTOR_CONTROL) {
            self.selector_model(object, name).map(ControlModel::Selector)
        } else if class.is_subclass(ClassId::FEATURE_CONTROL) {
            self.feature_model(object, name).map(ControlModel::Feature)
        } else {
            None
        }
    }

    fn selector_model(&self, object: ObjectId, name: String) -> Option<SelectorControl> {
        let ids = self
            .get(SelectorControlProperty::AvailableItems, object, None)?
            .as_u32_array()?
            .to_vec();
        let items = ids
            .into_iter()
            .map(|id| {
                let qualifier = Qualifier::from_scalar(&id);
                let value = self.get(SelectorControlProperty::ItemName, object, Some(&qualifier))?;
                Some(SelectorItem { id, name: value.as_str()?.to_string() })
            })
            .collect::<Option<Vec<_>>>()?;
        let current_item = self.get(SelectorControlProperty::CurrentItem, object, None)?.as_u32()?;
        Some(SelectorControl { object, name, items, current_item })
    }

    fn feature_model(&self, object: ObjectId, name: String) -> Option<FeatureControl> {
        let enabled = self.read_bool(FeatureControlProperty::OnOff, object)?;
        let automatic = self.read_bool(FeatureControlProperty::AutomaticManual, object)?;
        let absolute = self.read_bool(FeatureControlProperty::AbsoluteNative, object)?;
        let tuning = self.read_bool(FeatureControlProperty::Tune, object)?;

        let (range_key, value_key, unit_name) = if absolute {
            let unit = self.get(FeatureControlProperty::AbsoluteUnitName, object, None)?;
            (
                FeatureControlProperty::AbsoluteRange,
                FeatureControlProperty::AbsoluteValue,
                Some(unit.as_str()?.to_string()),
            )
        } else {
            (FeatureControlProperty::NativeRange, FeatureControlProperty::NativeValue, None)
        };
        let range = self.get(range_key, object, None)?.as_value_range()?;
        let value = self.get(value_key, object, None)?.as_f32()?;

        Some(FeatureControl {
            object,
            name,
            enabled,
            automatic,
            tuning,
            absolute,
            range,
            value,
            unit_name,
        })
    }

    fn read_bool<P: Property>(&self, key: P, object: ObjectId) -> Option<bool> {
        self.get(key, object, None)?.as_bool()
    }

    // === Adjustments ===

    pub fn set_boolean_control(&self, control: ObjectId, value: bool) -> bool {
        self.set(BooleanControlProperty::Value, &PropertyValue::Boolean(value), control, None)
    }

    pub fn select_item(&self, control: ObjectId, item: u32) -> bool {
        self.set(SelectorControlProperty::CurrentItem, &PropertyValue::UInt32(item), control, None)
    }

    /// Write a feature value in the units the model was read in.
    pub fn set_feature_value(&self, control: &FeatureControl, value: f32) -> bool {
        self.set(control.value_key(), &PropertyValue::Float32(value), control.object, None)
    }

    /// Convert a native value to absolute units on the device.
    pub fn native_to_absolute(&self, control: ObjectId, native: f32) -> Option<f32> {
        self.mutate(FeatureControlProperty::ConvertNativeToAbsolute, &PropertyValue::Float32(native), control)?
            .as_f32()
    }

    /// Convert an absolute value to native units on the device.
    pub fn absolute_to_native(&self, control: ObjectId, absolute: f32) -> Option<f32> {
        self.mutate(FeatureControlProperty::ConvertAbsoluteToNative, &PropertyValue::Float32(absolute), control)?
            .as_f32()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{HostResult, MockHost};
    use crate::property::ObjectProperty;
    use std::sync::Arc;

    fn registry() -> (Arc<MockHost>, Registry<MockHost>) {
        let host = Arc::new(MockHost::new());
        (Arc::clone(&host), Registry::new(Arc::clone(&host)))
    }

    fn put<P: Property>(host: &MockHost, object: u32, key: P, value: PropertyValue) {
        host.insert_value(ObjectId(object), key, &value).unwrap();
    }

    fn control(host: &MockHost, object: u32, class: ClassId, name: &str) {
        put(host, object, ObjectProperty::Class, PropertyValue::ClassId(class));
        put(host, object, ObjectProperty::Name, PropertyValue::String(name.into()));
    }

    #[test]
    fn test_boolean_model() {
        let (host, reg) = registry();
        control(&host, 3, ClassId::JACK_CONTROL, "Jack");
        put(&host, 3, BooleanControlProperty::Value, PropertyValue::Boolean(true));
        assert_eq!(
            reg.control_model(ObjectId(3)),
            Some(ControlModel::Boolean(BooleanControl { object: ObjectId(3), name: "Jack".into(), value: true }))
        );
    }

    #[test]
    fn test_selector_model() {
        let (host, reg) = registry();
        control(&host, 4, ClassId::DATA_SOURCE_CONTROL, "Source");
        put(&host, 4, SelectorControlProperty::AvailableItems, PropertyValue::ArrayOfUInt32(vec![1, 2]));
        put(&host, 4, SelectorControlProperty::CurrentItem, PropertyValue::UInt32(2));
        for (id, name) in [(1u32, "Composite"), (2, "S-Video")] {
            host.insert_qualified_value(
                ObjectId(4),
                SelectorControlProperty::ItemName,
                &id.to_ne_bytes(),
                &PropertyValue::String(name.into()),
            )
            .unwrap();
        }
        let Some(ControlModel::Selector(model)) = reg.control_model(ObjectId(4)) else {
            panic!("expected selector model");
        };
        assert_eq!(model.items[1], SelectorItem { id: 2, name: "S-Video".into() });
        assert_eq!(model.current_index(), Some(1));
    }

    #[test]
    fn test_feature_model_absolute() {
        let (host, reg) = registry();
        control(&host, 5, ClassId::GAIN_CONTROL, "Gain");
        put(&host, 5, FeatureControlProperty::OnOff, PropertyValue::Boolean(true));
        put(&host, 5, FeatureControlProperty::AutomaticManual, PropertyValue::Boolean(false));
        put(&host, 5, FeatureControlProperty::AbsoluteNative, PropertyValue::Boolean(true));
        put(&host, 5, FeatureControlProperty::Tune, PropertyValue::Boolean(false));
        put(&host, 5, FeatureControlProperty::AbsoluteUnitName, PropertyValue::String("dB".into()));
        put(&host, 5, FeatureControlProperty::AbsoluteRange, PropertyValue::ValueRange(ValueRange::new(0.0, 12.0)));
        put(&host, 5, FeatureControlProperty::AbsoluteValue, PropertyValue::Float32(6.0));

        let Some(ControlModel::Feature(model)) = reg.control_model(ObjectId(5)) else {
            panic!("expected feature model");
        };
        assert!(model.enabled && model.absolute);
        assert_eq!(model.unit_name.as_deref(), Some("dB"));
        assert_eq!(model.range, ValueRange::new(0.0, 12.0));
        assert_eq!(model.value, 6.0);
        assert_eq!(model.value_key(), FeatureControlProperty::AbsoluteValue);
    }

    #[test]
    fn test_feature_model_missing_read() {
        let (host, reg) = registry();
        control(&host, 5, ClassId::FOCUS_CONTROL, "Focus");
        put(&host, 5, FeatureControlProperty::OnOff, PropertyValue::Boolean(true));
        assert_eq!(reg.control_model(ObjectId(5)), None);
    }

    #[test]
    fn test_non_control() {
        let (host, reg) = registry();
        control(&host, 2, ClassId::DEVICE, "Camera");
        assert_eq!(reg.control_model(ObjectId(2)), None);
    }

    #[test]
    fn test_conversions() {
        let (host, reg) = registry();
        let scale = |factor: f32| {
            move |input: &[u8]| -> HostResult<Vec<u8>> {
                let v = f32::from_ne_bytes([input[0], input[1], input[2], input[3]]);
                Ok((v * factor).to_ne_bytes().to_vec())
            }
        };
        host.on_mutate(ObjectId(5), FeatureControlProperty::ConvertNativeToAbsolute.selector(), scale(0.1));
        host.on_mutate(ObjectId(5), FeatureControlProperty::ConvertAbsoluteToNative.selector(), scale(10.0));
        assert_eq!(reg.native_to_absolute(ObjectId(5), 40.0), Some(4.0));
        assert_eq!(reg.absolute_to_native(ObjectId(5), 4.0), Some(40.0));
    }
}
