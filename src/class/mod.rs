//! Class identifiers and the fixed class taxonomy.
//!
//! The host tags every object with a [`ClassId`]. The taxonomy is two levels
//! deep: the object class subsumes everything, the control class subsumes
//! three control kinds, and each kind owns a closed set of leaf classes.
//! Membership is decided by static tables, never by runtime discovery.

use bytemuck::{Pod, Zeroable};
use std::fmt;

use crate::util::FourCc;

/// Identifier of an object's class.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Pod, Zeroable)]
#[repr(transparent)]
pub struct ClassId(pub u32);

impl ClassId {
    const fn code(chars: [u8; 4]) -> Self {
        Self(FourCc::new(chars).value())
    }

    // === Root classes ===

    /// Base class of every object.
    pub const OBJECT: Self = Self::code(*b"aobj");
    /// The singleton system object.
    pub const SYSTEM: Self = Self::code(*b"asys");
    /// A driver plug-in.
    pub const PLUG_IN: Self = Self::code(*b"aplg");
    /// A capture or output device.
    pub const DEVICE: Self = Self::code(*b"adev");
    /// A stream of a device.
    pub const STREAM: Self = Self::code(*b"astr");
    /// Base class of every control.
    pub const CONTROL: Self = Self::code(*b"actl");

    // === Control kinds ===

    /// On/off switches.
    pub const BOOLEAN_CONTROL: Self = Self::code(*b"togl");
    /// Controls with multiple discrete values.
    pub const SELECTOR_CONTROL: Self = Self::code(*b"slct");
    /// Continuous features such as hue, zoom or gain.
    pub const FEATURE_CONTROL: Self = Self::code(*b"ftct");

    // === Boolean control leaves ===

    pub const JACK_CONTROL: Self = Self::code(*b"jack");
    pub const DIRECTION_CONTROL: Self = Self::code(*b"dire");

    // === Selector control leaves ===

    pub const DATA_SOURCE_CONTROL: Self = Self::code(*b"dsrc");
    pub const DATA_DESTINATION_CONTROL: Self = Self::code(*b"dest");

    // === Feature control leaves ===

    pub const BLACK_LEVEL_CONTROL: Self = Self::code(*b"bklv");
    pub const WHITE_LEVEL_CONTROL: Self = Self::code(*b"whlv");
    pub const HUE_CONTROL: Self = Self::code(*b"hue ");
    pub const SATURATION_CONTROL: Self = Self::code(*b"satu");
    pub const CONTRAST_CONTROL: Self = Self::code(*b"ctst");
    pub const SHARPNESS_CONTROL: Self = Self::code(*b"shrp");
    pub const BRIGHTNESS_CONTROL: Self = Self::code(*b"brit");
    pub const GAIN_CONTROL: Self = Self::code(*b"gain");
    pub const IRIS_CONTROL: Self = Self::code(*b"iris");
    pub const SHUTTER_CONTROL: Self = Self::code(*b"shtr");
    pub const EXPOSURE_CONTROL: Self = Self::code(*b"xpsr");
    pub const WHITE_BALANCE_U_CONTROL: Self = Self::code(*b"whbu");
    pub const WHITE_BALANCE_V_CONTROL: Self = Self::code(*b"whbv");
    pub const WHITE_BALANCE_CONTROL: Self = Self::code(*b"whbl");
    pub const GAMMA_CONTROL: Self = Self::code(*b"gmma");
    pub const TEMPERATURE_CONTROL: Self = Self::code(*b"temp");
    pub const ZOOM_CONTROL: Self = Self::code(*b"zoom");
    pub const FOCUS_CONTROL: Self = Self::code(*b"fcus");
    pub const PAN_CONTROL: Self = Self::code(*b"pan ");
    pub const TILT_CONTROL: Self = Self::code(*b"tilt");
    pub const OPTICAL_FILTER: Self = Self::code(*b"opft");
    pub const BACKLIGHT_COMPENSATION_CONTROL: Self = Self::code(*b"bklt");
    pub const POWER_LINE_FREQUENCY_CONTROL: Self = Self::code(*b"pwfq");
    pub const NOISE_REDUCTION_CONTROL: Self = Self::code(*b"s2nr");
    pub const PAN_TILT_ABSOLUTE_CONTROL: Self = Self::code(*b"ptab");
    pub const PAN_TILT_RELATIVE_CONTROL: Self = Self::code(*b"ptrl");
    pub const ZOOM_RELATIVE_CONTROL: Self = Self::code(*b"zomr");
    pub const ROLL_ABSOLUTE_CONTROL: Self = Self::code(*b"rola");

    /// Leaf classes of [`ClassId::BOOLEAN_CONTROL`].
    pub const BOOLEAN_CONTROL_LEAVES: &'static [Self] = &[Self::JACK_CONTROL, Self::DIRECTION_CONTROL];

    /// Leaf classes of [`ClassId::SELECTOR_CONTROL`].
    pub const SELECTOR_CONTROL_LEAVES: &'static [Self] =
        &[Self::DATA_SOURCE_CONTROL, Self::DATA_DESTINATION_CONTROL];

    /// Leaf classes of [`ClassId::FEATURE_CONTROL`].
    pub const FEATURE_CONTROL_LEAVES: &'static [Self] = &[
        Self::BLACK_LEVEL_CONTROL,
        Self::WHITE_LEVEL_CONTROL,
        Self::HUE_CONTROL,
        Self::SATURATION_CONTROL,
        Self::CONTRAST_CONTROL,
        Self::SHARPNESS_CONTROL,
        Self::BRIGHTNESS_CONTROL,
        Self::GAIN_CONTROL,
        Self::IRIS_CONTROL,
        Self::SHUTTER_CONTROL,
        Self::EXPOSURE_CONTROL,
        Self::WHITE_BALANCE_U_CONTROL,
        Self::WHITE_BALANCE_V_CONTROL,
        Self::WHITE_BALANCE_CONTROL,
        Self::GAMMA_CONTROL,
        Self::TEMPERATURE_CONTROL,
        Self::ZOOM_CONTROL,
        Self::FOCUS_CONTROL,
        Self::PAN_CONTROL,
        Self::TILT_CONTROL,
        Self::OPTICAL_FILTER,
        Self::BACKLIGHT_COMPENSATION_CONTROL,
        Self::POWER_LINE_FREQUENCY_CONTROL,
        Self::NOISE_REDUCTION_CONTROL,
        Self::PAN_TILT_ABSOLUTE_CONTROL,
        Self::PAN_TILT_RELATIVE_CONTROL,
        Self::ZOOM_RELATIVE_CONTROL,
        Self::ROLL_ABSOLUTE_CONTROL,
    ];

    /// Raw class value.
    #[inline]
    pub const fn value(self) -> u32 {
        self.0
    }

    /// The class as a four-character code.
    #[inline]
    pub const fn four_cc(self) -> FourCc {
        FourCc(self.0)
    }

    /// Whether `self` is `base` or belongs to it in the taxonomy.
    ///
    /// Total over any pair of ids: unknown ids are only subclasses of
    /// themselves and of [`ClassId::OBJECT`].
    pub fn is_subclass(self, base: Self) -> bool {
        match base {
            Self::OBJECT => true,
            Self::CONTROL => {
                matches!(
                    self,
                    Self::CONTROL | Self::BOOLEAN_CONTROL | Self::SELECTOR_CONTROL | Self::FEATURE_CONTROL
                ) || Self::BOOLEAN_CONTROL_LEAVES.contains(&self)
                    || Self::SELECTOR_CONTROL_LEAVES.contains(&self)
                    || Self::FEATURE_CONTROL_LEAVES.contains(&self)
            }
            Self::BOOLEAN_CONTROL => self == base || Self::BOOLEAN_CONTROL_LEAVES.contains(&self),
            Self::SELECTOR_CONTROL => self == base || Self::SELECTOR_CONTROL_LEAVES.contains(&self),
            Self::FEATURE_CONTROL => self == base || Self::FEATURE_CONTROL_LEAVES.contains(&self),
            _ => self == base,
        }
    }

    /// Host constant name of a known class, e.g. `kCMIODeviceClassID`.
    pub fn constant_name(self) -> Option<&'static str> {
        KNOWN_CLASSES
            .iter()
            .find(|(id, _)| *id == self)
            .map(|(_, name)| *name)
    }

    /// Every class the taxonomy knows about, with its host constant name.
    pub fn known() -> &'static [(ClassId, &'static str)] {
        KNOWN_CLASSES
    }
}

/// Free-function form of [`ClassId::is_subclass`].
#[inline]
pub fn is_subclass(candidate: ClassId, base: ClassId) -> bool {
    candidate.is_subclass(base)
}

impl From<u32> for ClassId {
    #[inline]
    fn from(v: u32) -> Self {
        Self(v)
    }
}

impl fmt::Debug for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ClassId({:?})", self.four_cc())
    }
}

impl fmt::Display for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.four_cc())
    }
}

static KNOWN_CLASSES: &[(ClassId, &str)] = &[
    (ClassId::OBJECT, "kCMIOObjectClassID"),
    (ClassId::SYSTEM, "kCMIOSystemObjectClassID"),
    (ClassId::PLUG_IN, "kCMIOPlugInClassID"),
    (ClassId::DEVICE, "kCMIODeviceClassID"),
    (ClassId::STREAM, "kCMIOStreamClassID"),
    (ClassId::CONTROL, "kCMIOControlClassID"),
    (ClassId::BOOLEAN_CONTROL, "kCMIOBooleanControlClassID"),
    (ClassId::SELECTOR_CONTROL, "kCMIOSelectorControlClassID"),
    (ClassId::FEATURE_CONTROL, "kCMIOFeatureControlClassID"),
    (ClassId::JACK_CONTROL, "kCMIOJackControlClassID"),
    (ClassId::DIRECTION_CONTROL, "kCMIODirectionControlClassID"),
    (ClassId::DATA_SOURCE_CONTROL, "kCMIODataSourceControlClassID"),
    (ClassId::DATA_DESTINATION_CONTROL, "kCMIODataDestinationControlClassID"),
    (ClassId::BLACK_LEVEL_CONTROL, "kCMIOBlackLevelControlClassID"),
    (ClassId::WHITE_LEVEL_CONTROL, "kCMIOWhiteLevelControlClassID"),
    (ClassId::HUE_CONTROL, "kCMIOHueControlClassID"),
    (ClassId::SATURATION_CONTROL, "kCMIOSaturationControlClassID"),
    (ClassId::CONTRAST_CONTROL, "kCMIOContrastControlClassID"),
    (ClassId::SHARPNESS_CONTROL, "kCMIOSharpnessControlClassID"),
    (ClassId::BRIGHTNESS_CONTROL, "kCMIOBrightnessControlClassID"),
    (ClassId::GAIN_CONTROL, "kCMIOGainControlClassID"),
    (ClassId::IRIS_CONTROL, "kCMIOIrisControlClassID"),
    (ClassId::SHUTTER_CONTROL, "kCMIOShutterControlClassID"),
    (ClassId::EXPOSURE_CONTROL, "kCMIOExposureControlClassID"),
    (ClassId::WHITE_BALANCE_U_CONTROL, "kCMIOWhiteBalanceUControlClassID"),
    (ClassId::WHITE_BALANCE_V_CONTROL, "kCMIOWhiteBalanceVControlClassID"),
    (ClassId::WHITE_BALANCE_CONTROL, "kCMIOWhiteBalanceControlClassID"),
    (ClassId::GAMMA_CONTROL, "kCMIOGammaControlClassID"),
    (ClassId::TEMPERATURE_CONTROL, "kCMIOTemperatureControlClassID"),
    (ClassId::ZOOM_CONTROL, "kCMIOZoomControlClassID"),
    (ClassId::FOCUS_CONTROL, "kCMIOFocusControlClassID"),
    (ClassId::PAN_CONTROL, "kCMIOPanControlClassID"),
    (ClassId::TILT_CONTROL, "kCMIOTiltControlClassID"),
    (ClassId::OPTICAL_FILTER, "kCMIOOpticalFilterClassID"),
    (ClassId::BACKLIGHT_COMPENSATION_CONTROL, "kCMIOBacklightCompensationControlClassID"),
    (ClassId::POWER_LINE_FREQUENCY_CONTROL, "kCMIOPowerLineFrequencyControlClassID"),
    (ClassId::NOISE_REDUCTION_CONTROL, "kCMIONoiseReductionControlClassID"),
    (ClassId::PAN_TILT_ABSOLUTE_CONTROL, "kCMIOPanTiltAbsoluteControlClassID"),
    (ClassId::PAN_TILT_RELATIVE_CONTROL, "kCMIOPanTiltRelativeControlClassID"),
    (ClassId::ZOOM_RELATIVE_CONTROL, "kCMIOZoomRelativeControlClassID"),
    (ClassId::ROLL_ABSOLUTE_CONTROL, "kCMIORollAbsoluteControlClassID"),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_everything_is_an_object() {
        for (id, _) in ClassId::known() {
            assert!(id.is_subclass(ClassId::OBJECT));
        }
        assert!(ClassId(0).is_subclass(ClassId::OBJECT));
        assert!(ClassId(0xDEAD_BEEF).is_subclass(ClassId::OBJECT));
    }

    #[test]
    fn test_feature_leaves() {
        for &leaf in ClassId::FEATURE_CONTROL_LEAVES {
            assert!(leaf.is_subclass(ClassId::FEATURE_CONTROL));
            assert!(leaf.is_subclass(ClassId::CONTROL));
            assert!(!leaf.is_subclass(ClassId::BOOLEAN_CONTROL));
            assert!(!leaf.is_subclass(ClassId::SELECTOR_CONTROL));
        }
    }

    #[test]
    fn test_control_kinds() {
        assert!(ClassId::BOOLEAN_CONTROL.is_subclass(ClassId::CONTROL));
        assert!(ClassId::JACK_CONTROL.is_subclass(ClassId::BOOLEAN_CONTROL));
        assert!(ClassId::DATA_SOURCE_CONTROL.is_subclass(ClassId::SELECTOR_CONTROL));
        assert!(!ClassId::DEVICE.is_subclass(ClassId::CONTROL));
        assert!(!ClassId::CONTROL.is_subclass(ClassId::FEATURE_CONTROL));
    }

    #[test]
    fn test_leaf_bases_are_exact() {
        assert!(ClassId::DEVICE.is_subclass(ClassId::DEVICE));
        assert!(!ClassId::STREAM.is_subclass(ClassId::DEVICE));
        assert!(ClassId::GAIN_CONTROL.is_subclass(ClassId::GAIN_CONTROL));
        assert!(!ClassId::FOCUS_CONTROL.is_subclass(ClassId::GAIN_CONTROL));
    }

    #[test]
    fn test_leaf_sets_disjoint() {
        for leaf in ClassId::BOOLEAN_CONTROL_LEAVES {
            assert!(!ClassId::FEATURE_CONTROL_LEAVES.contains(leaf));
            assert!(!ClassId::SELECTOR_CONTROL_LEAVES.contains(leaf));
        }
        assert_eq!(ClassId::FEATURE_CONTROL_LEAVES.len(), 28);
    }

    #[test]
    fn test_constant_names() {
        assert_eq!(ClassId::DEVICE.constant_name(), Some("kCMIODeviceClassID"));
        assert_eq!(ClassId(1).constant_name(), None);
        assert_eq!(ClassId::HUE_CONTROL.to_string(), "hue ");
    }
}
