//! Circuit
//! ordered sequence of placed components forming a single series loop,
//! selection, hit-testing, and canvas drawing for the sandbox

pub mod solver;

use crate::catalog::{self, ComponentKind, FOOTPRINT};
use crate::transforms::{CSBox, CSPoint, CSVec, Point};
use iced::widget::canvas::{self, stroke, Frame, LineCap, Path, Stroke, Text};
use iced::{alignment, Color, Size};
use thiserror::Error;
use tracing::debug;

/// kind-dependent electrical attributes, one case per kind
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Electrical {
    Battery { voltage_v: f32 },
    Resistor { resistance_ohms: f32 },
    Led { resistance_ohms: f32 },
    Switch { is_closed: bool },
}

impl Electrical {
    /// source voltage if this is a battery
    pub fn source_voltage(&self) -> Option<f32> {
        match self {
            Electrical::Battery { voltage_v } => Some(*voltage_v),
            _ => None,
        }
    }

    /// series resistance if this is a load (resistor or LED)
    pub fn load_resistance(&self) -> Option<f32> {
        match self {
            Electrical::Resistor { resistance_ohms } | Electrical::Led { resistance_ohms } => {
                Some(*resistance_ohms)
            }
            _ => None,
        }
    }

    /// true only for a switch in the open position
    pub fn is_open_switch(&self) -> bool {
        matches!(self, Electrical::Switch { is_closed: false })
    }

    /// text shown in the value editor
    pub fn summary(&self) -> String {
        match self {
            Electrical::Battery { voltage_v } => format!("{}", voltage_v),
            Electrical::Resistor { resistance_ohms } | Electrical::Led { resistance_ohms } => {
                format!("{}", resistance_ohms)
            }
            Electrical::Switch { is_closed } => {
                String::from(if *is_closed { "closed" } else { "open" })
            }
        }
    }
}

/// errors rejected at the value-edit boundary - the stored value is left unchanged
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValueError {
    #[error("not a number: {0:?}")]
    NotANumber(String),
    #[error("value must be finite")]
    NonFinite,
    #[error("component has no numeric value")]
    NoNumericValue,
    #[error("no component with id {0}")]
    NoSuchComponent(usize),
}

/// one placed component - label, color, glyph come from the catalog by kind
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ComponentInstance {
    pub id: usize,
    pub kind: ComponentKind,
    /// top-left corner, canvas pixels
    pub position: CSPoint,
    pub electrical: Electrical,
}

impl ComponentInstance {
    pub fn bounds(&self) -> CSBox {
        CSBox::new(self.position, self.position + CSVec::splat(FOOTPRINT))
    }

    pub fn center(&self) -> CSPoint {
        self.position + CSVec::splat(FOOTPRINT / 2.0)
    }

    pub fn contains(&self, csp: CSPoint) -> bool {
        self.bounds().contains(csp)
    }
}

/// struct holding sandbox circuit state (placed components and selection)
/// insertion order is the series loop order
#[derive(Debug, Clone, Default)]
pub struct Circuit {
    components: Vec<ComponentInstance>,
    selected: Option<usize>,
    next_id: usize,
}

impl Circuit {
    pub fn components(&self) -> &[ComponentInstance] {
        &self.components
    }

    pub fn selected_id(&self) -> Option<usize> {
        self.selected
    }

    /// canonical instance for the current selection, re-resolved on every call
    pub fn selected(&self) -> Option<&ComponentInstance> {
        self.selected
            .and_then(|id| self.components.iter().find(|c| c.id == id))
    }

    /// place a new component with catalog defaults at the next staggered position
    pub fn add(&mut self, kind: ComponentKind) -> usize {
        let id = self.next_id;
        self.next_id += 1;
        let position = CSPoint::new(150.0 + self.components.len() as f32 * 80.0, 200.0);
        self.components.push(ComponentInstance {
            id,
            kind,
            position,
            electrical: catalog::entry(kind).default,
        });
        debug!(?kind, id, "placed component");
        id
    }

    /// remove by id - no-op when absent; clears a selection pointing at it
    pub fn remove(&mut self, id: usize) {
        let before = self.components.len();
        self.components.retain(|c| c.id != id);
        if self.components.len() != before {
            debug!(id, "removed component");
        }
        if self.selected == Some(id) {
            self.selected = None;
        }
    }

    /// parse and store a numeric value for the component's kind-specific field
    /// rejects (and keeps the old value) on non-numeric or non-finite input
    pub fn set_value(&mut self, id: usize, raw: &str) -> Result<(), ValueError> {
        let Some(c) = self.components.iter_mut().find(|c| c.id == id) else {
            return Err(ValueError::NoSuchComponent(id));
        };
        let value: f32 = raw
            .trim()
            .parse()
            .map_err(|_| ValueError::NotANumber(raw.to_string()))?;
        if !value.is_finite() {
            return Err(ValueError::NonFinite);
        }
        match &mut c.electrical {
            Electrical::Battery { voltage_v } => *voltage_v = value,
            Electrical::Resistor { resistance_ohms } | Electrical::Led { resistance_ohms } => {
                *resistance_ohms = value;
            }
            Electrical::Switch { .. } => return Err(ValueError::NoNumericValue),
        }
        debug!(id, value, "set component value");
        Ok(())
    }

    /// flip a switch open/closed - no-op for any other kind or missing id
    pub fn toggle_switch(&mut self, id: usize) {
        if let Some(c) = self.components.iter_mut().find(|c| c.id == id) {
            if let Electrical::Switch { is_closed } = &mut c.electrical {
                *is_closed = !*is_closed;
                debug!(id, is_closed = *is_closed, "toggled switch");
            }
        }
    }

    /// earliest-added component whose footprint contains the point, if any
    pub fn hit_test(&self, csp: CSPoint) -> Option<&ComponentInstance> {
        self.components.iter().find(|c| c.contains(csp))
    }

    /// select the component under the point, or clear the selection
    pub fn select_at(&mut self, csp: CSPoint) {
        self.selected = self.hit_test(csp).map(|c| c.id);
    }

    /// clear all components and the selection; ids keep counting up
    pub fn reset(&mut self) {
        self.components.clear();
        self.selected = None;
        debug!("reset circuit");
    }
}

/// trait for elements drawn onto the sandbox canvas
pub trait Drawable {
    fn draw_persistent(&self, frame: &mut Frame);
    fn draw_selected(&self, frame: &mut Frame);
}

impl Drawable for ComponentInstance {
    fn draw_persistent(&self, frame: &mut Frame) {
        self.draw_body(frame, border_stroke(false));
    }

    fn draw_selected(&self, frame: &mut Frame) {
        self.draw_body(frame, border_stroke(true));
    }
}

impl ComponentInstance {
    fn draw_body(&self, frame: &mut Frame, border: Stroke) {
        let entry = catalog::entry(self.kind);
        let f = canvas::Fill {
            style: canvas::Style::Solid(entry.color),
            ..canvas::Fill::default()
        };
        let size = Size::new(FOOTPRINT, FOOTPRINT);
        frame.fill_rectangle(Point::from(self.position).into(), size, f);
        frame.stroke(
            &Path::rectangle(Point::from(self.position).into(), size),
            border,
        );

        frame.fill_text(Text {
            content: entry.glyph.to_string(),
            position: Point::from(self.center()).into(),
            color: Color::WHITE,
            size: 30.0,
            horizontal_alignment: alignment::Horizontal::Center,
            vertical_alignment: alignment::Vertical::Center,
            ..Text::default()
        });
        frame.fill_text(Text {
            content: entry.label.to_string(),
            position: Point::from(CSPoint::new(self.center().x, self.position.y + 75.0)).into(),
            color: Color::from_rgb8(0x1f, 0x29, 0x37),
            size: 12.0,
            horizontal_alignment: alignment::Horizontal::Center,
            vertical_alignment: alignment::Vertical::Center,
            ..Text::default()
        });
    }
}

impl Circuit {
    /// wires and component glyphs - redrawn on model/selection/power changes
    pub fn draw_passive(&self, frame: &mut Frame, energized: bool) {
        let wire = wire_stroke(energized);
        if self.components.len() > 1 {
            for pair in self.components.windows(2) {
                let c = Path::line(
                    Point::from(pair[0].center()).into(),
                    Point::from(pair[1].center()).into(),
                );
                frame.stroke(&c, wire.clone());
            }
            // the loop only closes visually once three components exist
            if self.components.len() > 2 {
                let c = Path::line(
                    Point::from(self.components[self.components.len() - 1].center()).into(),
                    Point::from(self.components[0].center()).into(),
                );
                frame.stroke(&c, wire.clone());
            }
        }

        for comp in &self.components {
            if self.selected == Some(comp.id) {
                comp.draw_selected(frame);
            } else {
                comp.draw_persistent(frame);
            }
        }
    }

    /// current-flow markers along each consecutive segment
    /// phase is the fraction of each segment traversed, wall clock mod 1s
    pub fn draw_flow(&self, frame: &mut Frame, phase: f32) {
        let f = canvas::Fill {
            style: canvas::Style::Solid(Color::from_rgb8(0xfb, 0xbf, 0x24)),
            ..canvas::Fill::default()
        };
        for pair in self.components.windows(2) {
            let csp = pair[0].center() + (pair[1].center() - pair[0].center()) * phase;
            frame.fill(&Path::circle(Point::from(csp).into(), 4.0), f.clone());
        }
    }

    /// radial glow over each LED, brightness proportional to current
    pub fn draw_glow(&self, frame: &mut Frame, current_ma: f32) {
        let brightness = (current_ma / 50.0).min(1.0);
        let f = canvas::Fill {
            style: canvas::Style::Solid(Color::from_rgba8(0xfb, 0xbf, 0x24, brightness)),
            ..canvas::Fill::default()
        };
        for comp in &self.components {
            if comp.kind == ComponentKind::Led {
                frame.fill(&Path::circle(Point::from(comp.center()).into(), 25.0), f.clone());
            }
        }
    }
}

/// fixed-spacing background grid over the canvas
pub fn draw_grid(frame: &mut Frame, bb_canvas: CSBox) {
    let spacing = 20.0;
    let grid_stroke = Stroke {
        width: 1.0,
        style: stroke::Style::Solid(Color::from_rgb8(0xe5, 0xe7, 0xeb)),
        line_cap: LineCap::Round,
        ..Stroke::default()
    };
    let v = bb_canvas.max - bb_canvas.min;
    for col in 0..=(v.x / spacing).ceil() as u32 {
        let x = bb_canvas.min.x + col as f32 * spacing;
        let c = Path::line(
            Point::from(CSPoint::new(x, bb_canvas.min.y)).into(),
            Point::from(CSPoint::new(x, bb_canvas.max.y)).into(),
        );
        frame.stroke(&c, grid_stroke.clone());
    }
    for row in 0..=(v.y / spacing).ceil() as u32 {
        let y = bb_canvas.min.y + row as f32 * spacing;
        let c = Path::line(
            Point::from(CSPoint::new(bb_canvas.min.x, y)).into(),
            Point::from(CSPoint::new(bb_canvas.max.x, y)).into(),
        );
        frame.stroke(&c, grid_stroke.clone());
    }
}

fn wire_stroke(energized: bool) -> Stroke<'static> {
    let color = if energized {
        Color::from_rgb8(0x3b, 0x82, 0xf6)
    } else {
        Color::from_rgb8(0x9c, 0xa3, 0xaf)
    };
    Stroke {
        width: 3.0,
        style: stroke::Style::Solid(color),
        line_cap: LineCap::Round,
        ..Stroke::default()
    }
}

fn border_stroke(selected: bool) -> Stroke<'static> {
    let (width, color) = if selected {
        (3.0, Color::from_rgb8(0x25, 0x63, 0xeb))
    } else {
        (2.0, Color::from_rgb8(0x1f, 0x29, 0x37))
    };
    Stroke {
        width,
        style: stroke::Style::Solid(color),
        line_cap: LineCap::Round,
        ..Stroke::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_staggers_positions() {
        let mut circuit = Circuit::default();
        circuit.add(ComponentKind::Battery);
        circuit.add(ComponentKind::Resistor);
        circuit.add(ComponentKind::Led);
        let xs: Vec<f32> = circuit.components().iter().map(|c| c.position.x).collect();
        assert_eq!(xs, vec![150.0, 230.0, 310.0]);
        assert!(circuit.components().iter().all(|c| c.position.y == 200.0));
    }

    #[test]
    fn test_ids_unique_and_monotonic() {
        let mut circuit = Circuit::default();
        let a = circuit.add(ComponentKind::Battery);
        let b = circuit.add(ComponentKind::Resistor);
        circuit.reset();
        let c = circuit.add(ComponentKind::Switch);
        assert!(a < b && b < c);
    }

    #[test]
    fn test_remove_missing_id_is_noop() {
        let mut circuit = Circuit::default();
        circuit.add(ComponentKind::Resistor);
        let snapshot = circuit.components().to_vec();
        circuit.remove(9999);
        assert_eq!(circuit.components(), snapshot.as_slice());
    }

    #[test]
    fn test_remove_selected_clears_selection() {
        let mut circuit = Circuit::default();
        let id = circuit.add(ComponentKind::Resistor);
        circuit.select_at(CSPoint::new(160.0, 210.0));
        assert_eq!(circuit.selected_id(), Some(id));
        circuit.remove(id);
        assert_eq!(circuit.selected_id(), None);
    }

    #[test]
    fn test_hit_test_earliest_added_wins() {
        let mut circuit = Circuit::default();
        let first = circuit.add(ComponentKind::Battery);
        let second = circuit.add(ComponentKind::Resistor);
        // overlap the second box onto the first
        circuit.components[1].position = circuit.components[0].position;
        let hit = circuit.hit_test(CSPoint::new(160.0, 210.0));
        assert_eq!(hit.map(|c| c.id), Some(first));
        assert_ne!(hit.map(|c| c.id), Some(second));
    }

    #[test]
    fn test_hit_test_outside_all_boxes() {
        let mut circuit = Circuit::default();
        circuit.add(ComponentKind::Battery);
        assert!(circuit.hit_test(CSPoint::new(5.0, 5.0)).is_none());
        circuit.select_at(CSPoint::new(5.0, 5.0));
        assert_eq!(circuit.selected_id(), None);
    }

    #[test]
    fn test_set_value_updates_field() {
        let mut circuit = Circuit::default();
        let id = circuit.add(ComponentKind::Battery);
        assert_eq!(circuit.set_value(id, "12"), Ok(()));
        assert_eq!(
            circuit.components()[0].electrical,
            Electrical::Battery { voltage_v: 12.0 }
        );
    }

    #[test]
    fn test_set_value_rejects_bad_input() {
        let mut circuit = Circuit::default();
        let id = circuit.add(ComponentKind::Resistor);
        assert_eq!(
            circuit.set_value(id, "abc"),
            Err(ValueError::NotANumber(String::from("abc")))
        );
        assert_eq!(circuit.set_value(id, "inf"), Err(ValueError::NonFinite));
        assert_eq!(
            circuit.components()[0].electrical,
            Electrical::Resistor {
                resistance_ohms: 100.0
            }
        );
    }

    #[test]
    fn test_set_value_missing_id_is_noop() {
        let mut circuit = Circuit::default();
        circuit.add(ComponentKind::Resistor);
        let snapshot = circuit.components().to_vec();
        assert_eq!(
            circuit.set_value(9999, "42"),
            Err(ValueError::NoSuchComponent(9999))
        );
        assert_eq!(circuit.components(), snapshot.as_slice());
    }

    #[test]
    fn test_set_value_on_switch_rejected() {
        let mut circuit = Circuit::default();
        let id = circuit.add(ComponentKind::Switch);
        assert_eq!(circuit.set_value(id, "1"), Err(ValueError::NoNumericValue));
        assert_eq!(
            circuit.components()[0].electrical,
            Electrical::Switch { is_closed: true }
        );
    }

    #[test]
    fn test_toggle_switch() {
        let mut circuit = Circuit::default();
        let sw = circuit.add(ComponentKind::Switch);
        let r = circuit.add(ComponentKind::Resistor);
        circuit.toggle_switch(sw);
        assert_eq!(
            circuit.components()[0].electrical,
            Electrical::Switch { is_closed: false }
        );
        circuit.toggle_switch(sw);
        assert_eq!(
            circuit.components()[0].electrical,
            Electrical::Switch { is_closed: true }
        );
        // not a switch: no-op
        circuit.toggle_switch(r);
        assert_eq!(
            circuit.components()[1].electrical,
            Electrical::Resistor {
                resistance_ohms: 100.0
            }
        );
    }

    #[test]
    fn test_reset_clears_components_and_selection() {
        let mut circuit = Circuit::default();
        circuit.add(ComponentKind::Battery);
        circuit.add(ComponentKind::Resistor);
        circuit.select_at(CSPoint::new(160.0, 210.0));
        circuit.reset();
        assert!(circuit.components().is_empty());
        assert_eq!(circuit.selected_id(), None);
        assert_eq!(
            solver::evaluate(circuit.components(), false),
            solver::Measurements::ZERO
        );
    }
}
