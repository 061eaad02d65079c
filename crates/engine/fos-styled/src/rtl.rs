//! Right-to-left mirroring
//!
//! Logical start/end properties compile into a pair of physical
//! declarations: one for left-to-right rules and a swapped one for rules
//! scoped under the [`RTL_CLASS`] marker.

/// Marker class added to an element rendered right-to-left
pub const RTL_CLASS: &str = "RTL";

/// Layout direction of a compiled rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Direction {
    #[default]
    Ltr,
    Rtl,
}

impl Direction {
    pub fn is_rtl(self) -> bool {
        self == Direction::Rtl
    }
}

/// Physical properties for a logical property
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MirroredPair {
    /// Property used in left-to-right rules
    pub ltr: &'static str,
    /// Property used in right-to-left rules
    pub rtl: &'static str,
}

impl MirroredPair {
    pub fn for_direction(&self, direction: Direction) -> &'static str {
        match direction {
            Direction::Ltr => self.ltr,
            Direction::Rtl => self.rtl,
        }
    }
}

/// Look up the physical pair for a logical start/end property
pub fn mirror(property: &str) -> Option<MirroredPair> {
    let (ltr, rtl) = match property {
        "paddingStart" => ("paddingLeft", "paddingRight"),
        "paddingEnd" => ("paddingRight", "paddingLeft"),
        "marginStart" => ("marginLeft", "marginRight"),
        "marginEnd" => ("marginRight", "marginLeft"),
        "borderStart" => ("borderLeft", "borderRight"),
        "borderEnd" => ("borderRight", "borderLeft"),
        "startOffset" => ("left", "right"),
        "endOffset" => ("right", "left"),
        _ => return None,
    };
    Some(MirroredPair { ltr, rtl })
}
