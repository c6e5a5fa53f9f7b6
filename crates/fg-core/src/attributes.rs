use std::collections::BTreeMap;
use std::ops::Range;

use serde::Serialize;

use crate::error::CoreError;

pub const ATTRIBUTE_COUNT: usize = 40;
pub const DEFAULT_VALUE: u8 = 50;
pub const MAX_VALUE: u8 = 100;

/// How many entries the "active attributes" summary shows.
pub const ACTIVE_SUMMARY_LIMIT: usize = 10;

/// Every attribute the generation service understands, grouped by category
/// (see [`AttributeCategory::range`]).
pub const CATALOG: [&str; ATTRIBUTE_COUNT] = [
    // hair
    "Black_Hair",
    "Blond_Hair",
    "Brown_Hair",
    "Gray_Hair",
    "Bald",
    "Bangs",
    "Receding_Hairline",
    "Straight_Hair",
    "Wavy_Hair",
    // facial
    "Arched_Eyebrows",
    "Bushy_Eyebrows",
    "Big_Lips",
    "Big_Nose",
    "Pointy_Nose",
    "Narrow_Eyes",
    "High_Cheekbones",
    "Chubby",
    "Double_Chin",
    "Oval_Face",
    "Mouth_Slightly_Open",
    "Smiling",
    // facial hair
    "5_o_Clock_Shadow",
    "Goatee",
    "Mustache",
    "No_Beard",
    "Sideburns",
    // makeup & accessories
    "Heavy_Makeup",
    "Wearing_Lipstick",
    "Eyeglasses",
    "Wearing_Earrings",
    "Wearing_Hat",
    "Wearing_Necklace",
    "Wearing_Necktie",
    // general
    "Attractive",
    "Bags_Under_Eyes",
    "Blurry",
    "Male",
    "Pale_Skin",
    "Rosy_Cheeks",
    "Young",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeCategory {
    Hair,
    Facial,
    FacialHair,
    MakeupAccessories,
    General,
}

impl AttributeCategory {
    /// Identifier used for localization keys
    pub fn id(&self) -> &'static str {
        match self {
            Self::Hair => "hair",
            Self::Facial => "facial",
            Self::FacialHair => "facial_hair",
            Self::MakeupAccessories => "makeup_accessories",
            Self::General => "general",
        }
    }

    /// Position of this category's members inside [`CATALOG`]
    pub fn range(&self) -> Range<usize> {
        match self {
            Self::Hair => 0..9,
            Self::Facial => 9..21,
            Self::FacialHair => 21..26,
            Self::MakeupAccessories => 26..33,
            Self::General => 33..40,
        }
    }

    pub fn members(&self) -> &'static [&'static str] {
        &CATALOG[self.range()]
    }

    pub fn all() -> [AttributeCategory; 5] {
        [
            Self::Hair,
            Self::Facial,
            Self::FacialHair,
            Self::MakeupAccessories,
            Self::General,
        ]
    }
}

/// Position of `name` in the catalog.
pub fn index_of(name: &str) -> Option<usize> {
    CATALOG.iter().position(|attr| *attr == name)
}

/// Maps a slider value in `0..=100` onto the service's `-1.0..=1.0` scale.
pub fn map_value_to_api_range(value: u8) -> f64 {
    f64::from(value) / 50.0 - 1.0
}

/// `Mouth_Slightly_Open` -> `Mouth Slightly Open`
pub fn display_name(name: &str) -> String {
    name.split('_')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActiveAttribute {
    pub name: &'static str,
    pub value: u8,
}

impl ActiveAttribute {
    /// Whether the slider is pushed above the neutral midpoint.
    pub fn is_raised(&self) -> bool {
        self.value > DEFAULT_VALUE
    }
}

/// Slider state for every catalog attribute.
///
/// Values are stored by catalog position, so the set can neither lose a key
/// nor grow an unknown one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeSet {
    values: [u8; ATTRIBUTE_COUNT],
}

impl Default for AttributeSet {
    fn default() -> Self {
        Self {
            values: [DEFAULT_VALUE; ATTRIBUTE_COUNT],
        }
    }
}

impl AttributeSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<u8> {
        index_of(name).map(|idx| self.values[idx])
    }

    pub fn set(&mut self, name: &str, value: i64) -> Result<(), CoreError> {
        let idx = index_of(name).ok_or_else(|| CoreError::UnknownAttribute(name.to_string()))?;
        let value = u8::try_from(value)
            .ok()
            .filter(|v| *v <= MAX_VALUE)
            .ok_or_else(|| CoreError::ValueOutOfRange {
                name: name.to_string(),
                value,
            })?;

        self.values[idx] = value;
        Ok(())
    }

    pub fn reset(&mut self) {
        self.values = [DEFAULT_VALUE; ATTRIBUTE_COUNT];
    }

    pub fn is_default(&self) -> bool {
        self.values.iter().all(|v| *v == DEFAULT_VALUE)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, u8)> + '_ {
        CATALOG.iter().copied().zip(self.values.iter().copied())
    }

    /// Attributes moved away from the midpoint, strongest first, capped at
    /// [`ACTIVE_SUMMARY_LIMIT`]. Ties keep catalog order.
    pub fn active(&self) -> Vec<ActiveAttribute> {
        let mut active: Vec<ActiveAttribute> = self
            .iter()
            .filter(|(_, value)| *value != DEFAULT_VALUE)
            .map(|(name, value)| ActiveAttribute { name, value })
            .collect();

        active.sort_by_key(|attr| std::cmp::Reverse(attr.value.abs_diff(DEFAULT_VALUE)));
        active.truncate(ACTIVE_SUMMARY_LIMIT);
        active
    }

    pub fn to_api(&self) -> ApiAttributes {
        ApiAttributes(
            self.iter()
                .map(|(name, value)| (name, map_value_to_api_range(value)))
                .collect(),
        )
    }
}

/// Attribute values on the service's `-1.0..=1.0` scale, sent as the `attrs`
/// JSON object.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ApiAttributes(BTreeMap<&'static str, f64>);

impl ApiAttributes {
    pub fn get(&self, name: &str) -> Option<f64> {
        self.0.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
