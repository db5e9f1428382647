//! Four-character-code name lookup.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::OnceLock;

use crate::class::ClassId;
use crate::host::Scope;
use crate::util::{FourCc, Result, Status};

/// One named four-character constant.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FourCcEntry {
    #[serde(rename = "fourCC")]
    pub four_cc: String,
    #[serde(rename = "rawValue")]
    pub raw_value: u32,
    #[serde(rename = "constantName")]
    pub constant_name: String,
}

impl FourCcEntry {
    pub fn new(code: FourCc, constant_name: impl Into<String>) -> Self {
        Self {
            four_cc: code.to_string(),
            raw_value: code.value(),
            constant_name: constant_name.into(),
        }
    }

    fn matches(&self, term: &str) -> bool {
        let hex = format!("{:x}", self.raw_value);
        let name = self.constant_name.to_lowercase();
        let fcc = self.four_cc.to_lowercase();
        let lower = term.to_lowercase();
        name.contains(&lower)
            || fcc.contains(&lower)
            || hex.contains(&lower)
            || (lower.starts_with("0x") && format!("0x{}", hex).contains(&lower))
            || self.raw_value.to_string().contains(term)
    }
}

/// Read-only table of named four-character constants.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FourCcDatabase {
    entries: Vec<FourCcEntry>,
}

impl FourCcDatabase {
    pub fn from_entries(entries: Vec<FourCcEntry>) -> Self {
        Self { entries }
    }

    /// Parse a JSON array of `{fourCC, rawValue, constantName}` objects.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(Self::from_entries(serde_json::from_str(json)?))
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Table of the class, scope and status constants the engine knows.
    pub fn builtin() -> &'static FourCcDatabase {
        static BUILTIN: OnceLock<FourCcDatabase> = OnceLock::new();
        BUILTIN.get_or_init(|| {
            let mut entries: Vec<FourCcEntry> = ClassId::known()
                .iter()
                .map(|&(class, name)| FourCcEntry::new(class.four_cc(), name))
                .collect();
            let scopes = [
                (Scope::GLOBAL, "kCMIOObjectPropertyScopeGlobal"),
                (Scope::WILDCARD, "kCMIOObjectPropertyScopeWildcard"),
                (Scope::DEVICE_INPUT, "kCMIODevicePropertyScopeInput"),
                (Scope::DEVICE_OUTPUT, "kCMIODevicePropertyScopeOutput"),
                (Scope::DEVICE_PLAY_THROUGH, "kCMIODevicePropertyScopePlayThrough"),
            ];
            entries.extend(scopes.iter().map(|&(s, name)| FourCcEntry::new(FourCc(s.0), name)));
            let statuses = [
                (Status::UNKNOWN_PROPERTY, "kCMIOHardwareUnknownPropertyError"),
                (Status::BAD_OBJECT, "kCMIOHardwareBadObjectError"),
                (Status::BAD_PROPERTY_SIZE, "kCMIOHardwareBadPropertySizeError"),
                (Status::ILLEGAL_OPERATION, "kCMIOHardwareIllegalOperationError"),
                (Status::UNSUPPORTED_OPERATION, "kCMIOHardwareUnsupportedOperationError"),
                (Status::UNSPECIFIED, "kCMIOHardwareUnspecifiedError"),
            ];
            entries.extend(statuses.iter().map(|&(s, name)| FourCcEntry::new(FourCc(s.0 as u32), name)));
            Self::from_entries(entries)
        })
    }

    /// First entry with the given value.
    pub fn entry(&self, value: u32) -> Option<&FourCcEntry> {
        self.entries.iter().find(|e| e.raw_value == value)
    }

    /// Entries whose name, code, hex or decimal value contains `term`,
    /// ignoring case.
    pub fn entries_matching(&self, term: &str) -> Vec<&FourCcEntry> {
        self.entries.iter().filter(|e| e.matches(term)).collect()
    }

    pub fn entries(&self) -> &[FourCcEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
