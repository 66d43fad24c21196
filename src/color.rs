//! Color inputs from the configurator UI and the RGB color type used by
//! materials.
//!
//! The wizard hands colors over in two shapes: a bare hex string, or a
//! catalog swatch object whose `value` field carries the hex. Resolution is
//! total - it always produces a hex string, falling back to a caller-supplied
//! default.

/// A color selection as received from the host UI.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum ColorInput {
    Hex(String),
    Swatch(Swatch),
}

/// Catalog swatch carrier. Only `value` matters to the preview; the rest of
/// the catalog fields are ignored by serde.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Swatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Resolve a color input to a concrete hex string.
///
/// Fallback chain: explicit string, then the swatch's `value`, then the
/// supplied default. Never fails.
pub fn resolve_hex(input: Option<&ColorInput>, fallback: &str) -> String {
    match input {
        Some(ColorInput::Hex(hex)) => hex.clone(),
        Some(ColorInput::Swatch(swatch)) => swatch
            .value
            .clone()
            .unwrap_or_else(|| fallback.to_string()),
        None => fallback.to_string(),
    }
}

/// RGB color with components in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const WHITE: Color = Color {
        r: 1.0,
        g: 1.0,
        b: 1.0,
    };

    pub fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Parse `#rgb` or `#rrggbb` (leading `#` optional).
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        let (r, g, b) = match digits.len() {
            3 => {
                let mut chars = digits.chars();
                let r = chars.next()?.to_digit(16)? as u8;
                let g = chars.next()?.to_digit(16)? as u8;
                let b = chars.next()?.to_digit(16)? as u8;
                (r * 17, g * 17, b * 17)
            }
            6 => {
                let r = u8::from_str_radix(&digits[0..2], 16).ok()?;
                let g = u8::from_str_radix(&digits[2..4], 16).ok()?;
                let b = u8::from_str_radix(&digits[4..6], 16).ok()?;
                (r, g, b)
            }
            _ => return None,
        };
        Some(Self {
            r: r as f32 / 255.0,
            g: g as f32 / 255.0,
            b: b as f32 / 255.0,
        })
    }

    /// Set from a hex string. Unparseable input leaves the color unchanged
    /// and logs a warning rather than erroring.
    pub fn set(&mut self, hex: &str) {
        match Self::from_hex(hex) {
            Some(parsed) => *self = parsed,
            None => log::warn!("ignoring unparseable color {:?}", hex),
        }
    }

    pub fn to_hex(&self) -> String {
        format!(
            "#{:02x}{:02x}{:02x}",
            (self.r.clamp(0.0, 1.0) * 255.0).round() as u8,
            (self.g.clamp(0.0, 1.0) * 255.0).round() as u8,
            (self.b.clamp(0.0, 1.0) * 255.0).round() as u8,
        )
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}
