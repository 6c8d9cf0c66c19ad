use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

pub const FALLBACK_COLOR: Rgb = Rgb(0xCC, 0xCC, 0xCC);

const NAMED_COLORS: &[(&str, u32)] = &[
    ("black", 0x000000),
    ("white", 0xFFFFFF),
    ("gray", 0x808080),
    ("grey", 0x808080),
    ("lightgray", 0xD3D3D3),
    ("skyblue", 0x87CEEB),
    ("lightblue", 0xADD8E6),
    ("powderblue", 0xB0E0E6),
    ("cornflowerblue", 0x6495ED),
    ("lightgreen", 0x90EE90),
    ("violet", 0xEE82EE),
    ("plum", 0xDDA0DD),
    ("orange", 0xFFA500),
    ("gold", 0xFFD700),
    ("lightpink", 0xFFB6C1),
    ("pink", 0xFFC0CB),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub fn from_u32(value: u32) -> Self {
        Rgb(
            ((value >> 16) & 0xFF) as u8,
            ((value >> 8) & 0xFF) as u8,
            (value & 0xFF) as u8,
        )
    }

    pub fn as_u32(&self) -> u32 {
        ((self.0 as u32) << 16) | ((self.1 as u32) << 8) | self.2 as u32
    }

    pub fn to_hex(&self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.0, self.1, self.2)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorError {
    value: String,
}

impl fmt::Display for ColorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unrecognised color '{}'", self.value)
    }
}

impl std::error::Error for ColorError {}

/// Accepts `#RRGGBB` or one of the named colors the workflows use.
pub fn parse_color(input: &str) -> Result<Rgb, ColorError> {
    let trimmed = input.trim();
    let err = || ColorError {
        value: input.to_string(),
    };
    if let Some(hex) = trimmed.strip_prefix('#') {
        if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(err());
        }
        return u32::from_str_radix(hex, 16)
            .map(Rgb::from_u32)
            .map_err(|_| err());
    }
    let lowered = trimmed.to_ascii_lowercase();
    NAMED_COLORS
        .iter()
        .find(|(name, _)| *name == lowered)
        .map(|(_, value)| Rgb::from_u32(*value))
        .ok_or_else(err)
}

/// Category to color map.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Palette {
    colors: BTreeMap<String, String>,
}

impl Palette {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            colors: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    pub fn insert(&mut self, category: impl Into<String>, color: impl Into<String>) {
        self.colors.insert(category.into(), color.into());
    }

    /// Layers `overrides` on top of this palette.
    pub fn merged_with(&self, overrides: &BTreeMap<String, String>) -> Self {
        let mut merged = self.clone();
        for (category, color) in overrides {
            merged.insert(category.clone(), color.clone());
        }
        merged
    }

    pub fn color_for(&self, category: &str) -> Rgb {
        self.colors
            .get(category)
            .and_then(|value| parse_color(value).ok())
            .unwrap_or(FALLBACK_COLOR)
    }

    pub fn validate(&self) -> Result<(), ColorError> {
        for value in self.colors.values() {
            parse_color(value)?;
        }
        Ok(())
    }
}
