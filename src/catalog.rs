//! static catalog of placeable component archetypes
//! kind, label, glyph, color, and default electrical value are fixed at build time

use crate::circuit::Electrical;
use iced::Color;
use lazy_static::lazy_static;

/// every component occupies a fixed square footprint on the canvas, in pixels
pub const FOOTPRINT: f32 = 60.0;

/// closed set of placeable component kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentKind {
    Battery,
    Resistor,
    Led,
    Switch,
}

impl ComponentKind {
    /// palette order
    pub const ALL: [ComponentKind; 4] = [
        ComponentKind::Battery,
        ComponentKind::Resistor,
        ComponentKind::Led,
        ComponentKind::Switch,
    ];
}

/// presentation and defaults for one component archetype
#[derive(Debug, Clone)]
pub struct CatalogEntry {
    pub kind: ComponentKind,
    pub label: &'static str,
    pub glyph: &'static str,
    pub color: Color,
    pub default: Electrical,
}

lazy_static! {
    static ref CATALOG: [CatalogEntry; 4] = [
        CatalogEntry {
            kind: ComponentKind::Battery,
            label: "Battery",
            glyph: "+",
            color: Color::from_rgb8(0x10, 0xb9, 0x81),
            default: Electrical::Battery { voltage_v: 9.0 },
        },
        CatalogEntry {
            kind: ComponentKind::Resistor,
            label: "Resistor",
            glyph: "\u{03a9}",
            color: Color::from_rgb8(0xf5, 0x9e, 0x0b),
            default: Electrical::Resistor {
                resistance_ohms: 100.0
            },
        },
        CatalogEntry {
            kind: ComponentKind::Led,
            label: "LED",
            glyph: "*",
            color: Color::from_rgb8(0xef, 0x44, 0x44),
            default: Electrical::Led {
                resistance_ohms: 10.0
            },
        },
        CatalogEntry {
            kind: ComponentKind::Switch,
            label: "Switch",
            glyph: "/",
            color: Color::from_rgb8(0x8b, 0x5c, 0xf6),
            default: Electrical::Switch { is_closed: true },
        },
    ];
}

/// catalog lookup - the set is closed so every kind has an entry
pub fn entry(kind: ComponentKind) -> &'static CatalogEntry {
    match kind {
        ComponentKind::Battery => &CATALOG[0],
        ComponentKind::Resistor => &CATALOG[1],
        ComponentKind::Led => &CATALOG[2],
        ComponentKind::Switch => &CATALOG[3],
    }
}
