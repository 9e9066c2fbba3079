//! Vision deficiency types used to pick a recoloring strategy.

use std::fmt;
use std::str::FromStr;

use anyhow::bail;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeficiencyType {
    Protanopia,
    Protanomaly,
    Deuteranopia,
    Deuteranomaly,
    Tritanopia,
    Tritanomaly,
    LowLight,
}

impl DeficiencyType {
    pub const ALL: [DeficiencyType; 7] = [
        DeficiencyType::Protanopia,
        DeficiencyType::Protanomaly,
        DeficiencyType::Deuteranopia,
        DeficiencyType::Deuteranomaly,
        DeficiencyType::Tritanopia,
        DeficiencyType::Tritanomaly,
        DeficiencyType::LowLight,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            DeficiencyType::Protanopia => "Protanopia",
            DeficiencyType::Protanomaly => "Protanomaly",
            DeficiencyType::Deuteranopia => "Deuteranopia",
            DeficiencyType::Deuteranomaly => "Deuteranomaly",
            DeficiencyType::Tritanopia => "Tritanopia",
            DeficiencyType::Tritanomaly => "Tritanomaly",
            DeficiencyType::LowLight => "LowLight",
        }
    }

    /// Short plain-language label.
    pub fn label(&self) -> &'static str {
        match self {
            DeficiencyType::Protanopia => "Red-Blind",
            DeficiencyType::Protanomaly => "Red-Weak",
            DeficiencyType::Deuteranopia => "Green-Blind",
            DeficiencyType::Deuteranomaly => "Green-Weak",
            DeficiencyType::Tritanopia => "Blue-Blind",
            DeficiencyType::Tritanomaly => "Blue-Weak",
            DeficiencyType::LowLight => "Low-Light",
        }
    }

    /// Instruction describing how the image should be adjusted.
    pub fn instruction(&self) -> &'static str {
        match self {
            DeficiencyType::Protanopia => {
                "The user has Protanopia (red-blindness) and has no red cones. Adjust the image to make it easier to see by shifting red hues towards distinguishable colors like oranges or blues, and increasing contrast with greens."
            }
            DeficiencyType::Protanomaly => {
                "The user has Protanomaly (red-weakness) and has malfunctioning red cones. Enhance the reds in the image to make them more vibrant and distinct from greens."
            }
            DeficiencyType::Deuteranopia => {
                "The user has Deuteranopia (green-blindness) and has no green cones. Adjust the image by shifting green hues towards distinguishable colors like magentas or oranges, and increasing contrast with reds."
            }
            DeficiencyType::Deuteranomaly => {
                "The user has Deuteranomaly (green-weakness) and has malfunctioning green cones. Enhance the greens in the image to make them more vibrant and distinct from reds."
            }
            DeficiencyType::Tritanopia => {
                "The user has Tritanopia (blue-blindness) and has no blue cones. Adjust the image by shifting blues towards distinguishable colors like teals or reds, and increasing contrast with yellows."
            }
            DeficiencyType::Tritanomaly => {
                "The user has Tritanomaly (blue-weakness) and has malfunctioning blue cones. Enhance the blues and yellows in the image to make them more distinct from each other."
            }
            DeficiencyType::LowLight => {
                "The user has low vision in dim conditions. Brighten dark regions, raise overall contrast and separate similar tones so shapes stay distinguishable."
            }
        }
    }
}

impl fmt::Display for DeficiencyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name(), self.label())
    }
}

impl FromStr for DeficiencyType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted: String = s
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_lowercase();

        for d in DeficiencyType::ALL {
            let name = d.name().to_lowercase();
            let label: String = d
                .label()
                .chars()
                .filter(|c| c.is_ascii_alphanumeric())
                .collect::<String>()
                .to_lowercase();
            if wanted == name || wanted == label {
                return Ok(d);
            }
        }

        bail!(
            "unknown deficiency type \"{s}\"; expected one of: {}",
            DeficiencyType::ALL.map(|d| d.name()).join(", ")
        )
    }
}
