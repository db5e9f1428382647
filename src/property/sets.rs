//! The nine property sets.
//!
//! Each set is declared once through [`property_set!`], which generates the
//! key enum, its exhaustive descriptor `match` and the ordered key list.

use super::ElementType as E;
use super::ReadSemantics as R;
use super::ValueType as T;
use super::{Property, PropertyDescriptor, PropertySet, ReadSemantics};
use crate::util::FourCc;

macro_rules! property_set {
    (@sem) => { ReadSemantics::Read };
    (@sem $sem:expr) => { $sem };
    (
        $(#[$meta:meta])*
        $vis:vis enum $set:ident ($set_name:literal) {
            $(
                $(#[$vmeta:meta])*
                $variant:ident = $sel:literal : $ty:expr $(=> $sem:expr)?
            ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
        $vis enum $set {
            $( $(#[$vmeta])* $variant, )+
        }

        impl Property for $set {
            fn descriptor(self) -> PropertyDescriptor {
                match self {
                    $(
                        Self::$variant => PropertyDescriptor::new(
                            FourCc::new(*$sel),
                            $ty,
                            property_set!(@sem $($sem)?),
                        ),
                    )+
                }
            }

            fn name(self) -> &'static str {
                match self {
                    $( Self::$variant => stringify!($variant), )+
                }
            }
        }

        impl PropertySet for $set {
            const SET_NAME: &'static str = $set_name;
            const ALL: &'static [Self] = &[ $( Self::$variant, )+ ];
        }
    };
}

property_set! {
    /// Properties every registry object has.
    pub enum ObjectProperty ("Object") {
        Class = b"clas": T::ClassId,
        Owner = b"stdv": T::ObjectId,
        Creator = b"oplg": T::String,
        Name = b"lnam": T::String,
        Manufacturer = b"lmak": T::String,
        ElementName = b"lchn": T::String,
        ElementCategoryName = b"lccn": T::String,
        ElementNumberName = b"lcnn": T::String,
        /// Children, optionally filtered by an array of class ids.
        OwnedObjects = b"ownd": T::Array(E::ObjectId) => R::OptionallyQualifiedRead(T::Array(E::ClassId)),
    }
}

property_set! {
    /// Properties of the system object.
    pub enum SystemProperty ("System") {
        ProcessIsMaster = b"mast": T::Boolean32,
        IsInitingOrExiting = b"inot": T::Boolean32,
        Devices = b"dev#": T::Array(E::ObjectId),
        DefaultInputDevice = b"dIn ": T::ObjectId,
        DefaultOutputDevice = b"dOut": T::ObjectId,
        DeviceForUid = b"duid": T::Translation => R::Translation(T::String, T::ObjectId),
        SleepingIsAllowed = b"slep": T::Boolean32,
        UnloadingIsAllowed = b"unld": T::Boolean32,
        PlugInForBundleId = b"pibi": T::Translation => R::Translation(T::String, T::ObjectId),
        UserSessionIsActiveOrHeadless = b"user": T::Boolean32,
        SuspendedBySystem = b"sbys": T::Boolean32,
        AllowScreenCaptureDevices = b"yes ": T::Boolean32,
        AllowWirelessScreenCaptureDevices = b"wscd": T::Boolean32,
    }
}

property_set! {
    /// Properties of a device.
    pub enum DeviceProperty ("Device") {
        PlugIn = b"plug": T::ObjectId,
        DeviceUid = b"uid ": T::String,
        ModelUid = b"muid": T::String,
        TransportType = b"tran": T::FourCc,
        DeviceIsAlive = b"livn": T::Boolean32,
        DeviceHasChanged = b"diff": T::Boolean32,
        DeviceIsRunning = b"goin": T::Boolean32,
        DeviceIsRunningSomewhere = b"gone": T::Boolean32,
        DeviceCanBeDefaultDevice = b"dflt": T::Boolean32,
        HogMode = b"oink": T::Pid,
        Latency = b"ltnc": T::UInt32,
        Streams = b"stm#": T::Array(E::ObjectId),
        StreamConfiguration = b"slay": T::StreamConfiguration,
        DeviceMaster = b"pmnh": T::Pid,
        ExcludeNonDalAccess = b"ixna": T::Boolean32,
        ClientSyncDiscontinuity = b"pmcs": T::Boolean,
        SmpteTimeCallback = b"pmsc": T::SmpteCallback,
        CanProcessAvcCommand = b"pmac": T::Boolean,
        AvcDeviceType = b"pmat": T::UInt32,
        AvcDeviceSignalMode = b"pmsm": T::UInt32,
        CanProcessRs422Command = b"r422": T::Boolean,
        LinkedCoreAudioDeviceUid = b"plud": T::String,
        VideoDigitizerComponents = b"vdig": T::Array(E::ComponentDescription),
        SuspendedByUser = b"sbyu": T::Boolean32,
        LinkedAndSyncedCoreAudioDeviceUid = b"plsd": T::String,
        IidcInitialUnitSpace = b"iuns": T::UInt32,
        /// Register contents at the address given as qualifier.
        IidcCsrData = b"csrd": T::UInt32 => R::QualifiedRead(T::UInt32),
        CanSwitchFrameRatesWithoutFrameDrops = b"frnd": T::Boolean,
        Location = b"dloc": T::FourCc,
        HasStreamingError = b"serr": T::UInt32,
    }
}

property_set! {
    /// Properties of a stream.
    pub enum StreamProperty ("Stream") {
        Direction = b"sdir": T::UInt32,
        TerminalType = b"term": T::UInt32,
        StartingChannel = b"schn": T::UInt32,
        Latency = b"ltnc": T::UInt32,
        FormatDescription = b"pft ": T::FormatDescription,
        FormatDescriptions = b"pfta": T::Array(E::FormatDescription),
        /// Still image for the format description given as qualifier.
        StillImage = b"stmg": T::SampleBuffer => R::QualifiedRead(T::FormatDescription),
        StillImageFormatDescriptions = b"stft": T::Array(E::FormatDescription),
        FrameRate = b"nfrt": T::Float64,
        MinimumFrameRate = b"mfrt": T::Float64,
        FrameRates = b"nfr#": T::Array(E::Float64) => R::OptionallyQualifiedRead(T::FormatDescription),
        FrameRateRanges = b"frrg": T::Array(E::ValueRange) => R::OptionallyQualifiedRead(T::FormatDescription),
        NoDataTimeoutInMSec = b"pmn1": T::UInt32,
        DeviceSyncTimeoutInMSec = b"pmn2": T::UInt32,
        NoDataEventCount = b"pmn3": T::UInt32,
        OutputBufferUnderrunCount = b"pmou": T::UInt32,
        OutputBufferRepeatCount = b"pmor": T::UInt32,
        OutputBufferQueueSize = b"pmoq": T::UInt32,
        OutputBuffersRequiredForStartup = b"pmos": T::UInt32,
        OutputBuffersNeededForThrottledPlayback = b"miff": T::UInt32,
        FirstOutputPresentationTimeStamp = b"popt": T::Time,
        EndOfData = b"pmed": T::Boolean32,
        Clock = b"pmcl": T::Clock,
        CanProcessDeckCommand = b"pdcc": T::Boolean,
        Deck = b"deck": T::StreamDeck,
        DeckFrameNumber = b"tcod": T::UInt64,
        DeckDropness = b"drop": T::Boolean32,
        DeckThreaded = b"thrd": T::Boolean32,
        DeckLocal = b"locl": T::Boolean32,
        DeckCueing = b"cuei": T::Int32,
        InitialPresentationTimeStampForLinkedAndSyncedAudio = b"ipls": T::Time => R::QualifiedRead(T::Time),
        ScheduledOutputNotificationProc = b"sonp": T::ScheduledOutputCallback,
        PreferredFormatDescription = b"prfd": T::FormatDescription,
        PreferredFrameRate = b"prfr": T::Float64,
    }
}

property_set! {
    /// Properties shared by all controls.
    pub enum ControlProperty ("Control") {
        Scope = b"cscp": T::PropertyScope,
        Element = b"celm": T::PropertyElement,
        Variant = b"cvar": T::UInt32,
    }
}

property_set! {
    pub enum BooleanControlProperty ("BooleanControl") {
        Value = b"bcvl": T::Boolean32,
    }
}

property_set! {
    pub enum SelectorControlProperty ("SelectorControl") {
        CurrentItem = b"scci": T::UInt32,
        AvailableItems = b"scai": T::Array(E::UInt32),
        /// Name of the item id given as qualifier.
        ItemName = b"scin": T::String => R::QualifiedRead(T::UInt32),
    }
}

property_set! {
    pub enum FeatureControlProperty ("FeatureControl") {
        OnOff = b"fcoo": T::Boolean32,
        AutomaticManual = b"fcam": T::Boolean32,
        AbsoluteNative = b"fcna": T::Boolean32,
        Tune = b"fctn": T::Boolean32,
        NativeValue = b"fcfv": T::Float32,
        AbsoluteValue = b"fcav": T::Float32,
        NativeRange = b"fcfr": T::ValueRange,
        AbsoluteRange = b"fcar": T::ValueRange,
        ConvertNativeToAbsolute = b"fn2a": T::Float32 => R::MutatingRead,
        ConvertAbsoluteToNative = b"fa2n": T::Float32 => R::MutatingRead,
        AbsoluteUnitName = b"fcun": T::String,
    }
}

property_set! {
    /// Properties of exposure feature controls.
    pub enum ExposureControlProperty ("ExposureControl") {
        RegionOfInterest = b"eroi": T::Rect,
        LockThreshold = b"elck": T::Float32,
        UnlockThreshold = b"eulk": T::Float32,
        Target = b"etgt": T::Float32,
        ConvergenceSpeed = b"ecsp": T::Float32,
        Stability = b"esty": T::Float32,
        Stable = b"estb": T::Boolean,
        IntegrationTime = b"eint": T::Float32,
        MaximumGain = b"emax": T::Float32,
    }
}
