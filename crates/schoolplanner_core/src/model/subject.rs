//! Subject domain model.
//!
//! # Invariants
//! - `name` and `abbreviation` are non-blank after trimming.
//! - Colors are stored as 32-bit ARGB integers.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

pub type SubjectId = i64;

static HEX_COLOR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^#?(?P<hex>[0-9a-fA-F]{6}|[0-9a-fA-F]{8})$").expect("valid hex color regex")
});

/// Palette used when a subject is created without an explicit color.
const DEFAULT_PALETTE: [u32; 8] = [
    0xFFE5_7373,
    0xFFF0_6292,
    0xFFBA_68C8,
    0xFF79_86CB,
    0xFF4F_C3F7,
    0xFF4D_B6AC,
    0xFFAE_D581,
    0xFFFF_B74D,
];

/// ARGB display color of a subject.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Color(pub u32);

impl Color {
    pub fn argb(self) -> u32 {
        self.0
    }

    /// Deterministic palette color derived from a subject name.
    pub fn for_name(name: &str) -> Self {
        let hash = name
            .trim()
            .to_lowercase()
            .bytes()
            .fold(0u32, |acc, byte| acc.wrapping_mul(31).wrapping_add(u32::from(byte)));
        Self(DEFAULT_PALETTE[hash as usize % DEFAULT_PALETTE.len()])
    }
}

impl Display for Color {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{:08X}", self.0)
    }
}

/// Error for color strings that are not `#RRGGBB` or `#AARRGGBB`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorParseError(pub String);

impl Display for ColorParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "invalid color `{}`; expected #RRGGBB or #AARRGGBB",
            self.0
        )
    }
}

impl Error for ColorParseError {}

impl FromStr for Color {
    type Err = ColorParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let captures = HEX_COLOR_RE
            .captures(value.trim())
            .ok_or_else(|| ColorParseError(value.to_string()))?;
        let hex = &captures["hex"];
        let parsed =
            u32::from_str_radix(hex, 16).map_err(|_| ColorParseError(value.to_string()))?;
        // Six-digit colors are opaque.
        if hex.len() == 6 {
            Ok(Self(0xFF00_0000 | parsed))
        } else {
            Ok(Self(parsed))
        }
    }
}

/// Persisted subject record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    pub id: SubjectId,
    pub name: String,
    pub abbreviation: String,
    pub color: Color,
}

/// Insert shape for a subject; the store assigns the id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewSubject {
    pub name: String,
    pub abbreviation: String,
    pub color: Color,
}

impl NewSubject {
    /// Creates an insert shape with trimmed fields.
    pub fn new(name: impl Into<String>, abbreviation: impl Into<String>, color: Color) -> Self {
        Self {
            name: name.into().trim().to_string(),
            abbreviation: abbreviation.into().trim().to_string(),
            color,
        }
    }

    pub fn validate(&self) -> Result<(), SubjectValidationError> {
        validate_subject_fields(&self.name, &self.abbreviation)
    }

    pub fn into_subject(self, id: SubjectId) -> Subject {
        Subject {
            id,
            name: self.name,
            abbreviation: self.abbreviation,
            color: self.color,
        }
    }
}

impl Subject {
    pub fn validate(&self) -> Result<(), SubjectValidationError> {
        validate_subject_fields(&self.name, &self.abbreviation)
    }
}

/// Validation failures for subject fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubjectValidationError {
    EmptyName,
    EmptyAbbreviation,
}

impl Display for SubjectValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName => write!(f, "subject name must not be blank"),
            Self::EmptyAbbreviation => write!(f, "subject abbreviation must not be blank"),
        }
    }
}

impl Error for SubjectValidationError {}

fn validate_subject_fields(name: &str, abbreviation: &str) -> Result<(), SubjectValidationError> {
    if name.trim().is_empty() {
        return Err(SubjectValidationError::EmptyName);
    }
    if abbreviation.trim().is_empty() {
        return Err(SubjectValidationError::EmptyAbbreviation);
    }
    Ok(())
}
