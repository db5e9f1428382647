//! Flat, displayable property listing of one object.

use tracing::debug;

use super::FourCcDatabase;
use crate::class::ClassId;
use crate::host::{Element, Host, ObjectId, Scope};
use crate::property::{
    BooleanControlProperty, ControlProperty, DeviceProperty, ExposureControlProperty,
    FeatureControlProperty, ObjectProperty, Property, PropertyDescriptor, PropertySet,
    PropertyValue, SelectorControlProperty, StreamProperty, SystemProperty, ValueType,
};
use crate::registry::{Registry, Target};
use crate::util::FourCc;

/// Rendered value of a property that could not be read.
pub const UNREADABLE: &str = "#ERROR";

/// One row of a property listing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PropertyListItem {
    /// Name of the property set the key belongs to.
    pub set: &'static str,
    pub name: &'static str,
    pub descriptor: PropertyDescriptor,
    pub is_settable: bool,
    /// Rendered value, [`UNREADABLE`] when the read failed.
    pub value: String,
    /// Raw code for class id and four-character-code values.
    pub four_cc: Option<u32>,
}

impl<H: Host> Registry<H> {
    /// Every existing property of `object` in `scope`, any element.
    ///
    /// Starts with the object id itself and the object set, then adds the
    /// sets selected by the object's class: device, stream, control (plus
    /// its boolean, selector or feature kind, and exposure below feature),
    /// or system.
    pub fn property_list(&self, object: ObjectId, scope: Scope, db: &FourCcDatabase) -> Vec<PropertyListItem> {
        let target = Target::new(object, scope, Element::WILDCARD);
        let class = self.class_of(object).unwrap_or(ClassId::OBJECT);
        debug!("property list of {} ({})", object, class);

        let mut items = vec![PropertyListItem {
            set: ObjectProperty::SET_NAME,
            name: "objectID",
            descriptor: PropertyDescriptor::read(FourCc::new(*b"****"), ValueType::ObjectId),
            is_settable: false,
            value: format!("@{}", object.0),
            four_cc: None,
        }];
        self.list_set::<ObjectProperty>(target, db, &mut items);

        if class.is_subclass(ClassId::DEVICE) {
            self.list_set::<DeviceProperty>(target, db, &mut items);
        } else if class.is_subclass(ClassId::STREAM) {
            self.list_set::<StreamProperty>(target, db, &mut items);
        } else if class.is_subclass(ClassId::CONTROL) {
            self.list_set::<ControlProperty>(target, db, &mut items);
            if class.is_subclass(ClassId::BOOLEAN_CONTROL) {
                self.list_set::<BooleanControlProperty>(target, db, &mut items);
            } else if class.is_subclass(ClassId::SELECTOR_CONTROL) {
                self.list_set::<SelectorControlProperty>(target, db, &mut items);
            } else if class.is_subclass(ClassId::FEATURE_CONTROL) {
                self.list_set::<FeatureControlProperty>(target, db, &mut items);
                if class.is_subclass(ClassId::EXPOSURE_CONTROL) {
                    self.list_set::<ExposureControlProperty>(target, db, &mut items);
                }
            }
        } else if class == ClassId::SYSTEM {
            self.list_set::<SystemProperty>(target, db, &mut items);
        }
        items
    }

    fn list_set<S: PropertySet>(&self, target: Target, db: &FourCcDatabase, items: &mut Vec<PropertyListItem>) {
        for key in self.all_existing::<S>(target) {
            let four_cc = match key.value_type() {
                ValueType::FourCc | ValueType::ClassId => match self.get(key, target, None) {
                    Some(PropertyValue::FourCc(code)) => Some(code.value()),
                    Some(PropertyValue::ClassId(class)) => Some(class.value()),
                    _ => None,
                },
                _ => None,
            };
            items.push(PropertyListItem {
                set: S::SET_NAME,
                name: key.name(),
                descriptor: key.descriptor(),
                is_settable: self.is_settable(key, target),
                value: self
                    .describe_property(key, target, None, db)
                    .unwrap_or_else(|| UNREADABLE.to_string()),
                four_cc,
            });
        }
    }
}
