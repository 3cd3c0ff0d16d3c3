//! series-loop evaluator
//! pure Ohm's/Watt's-law over the ordered component sequence with switch gating

use super::ComponentInstance;

/// derived measurement triple - full precision, never stored independently
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Measurements {
    pub voltage_v: f32,
    pub current_ma: f32,
    pub power_w: f32,
}

impl Measurements {
    pub const ZERO: Measurements = Measurements {
        voltage_v: 0.0,
        current_ma: 0.0,
        power_w: 0.0,
    };

    /// display/assertion view, 2 decimal places
    pub fn rounded(self) -> Self {
        Measurements {
            voltage_v: round2(self.voltage_v),
            current_ma: round2(self.current_ma),
            power_w: round2(self.power_w),
        }
    }

    /// whether current is actually flowing
    pub fn live(&self) -> bool {
        self.current_ma > 0.0
    }

    fn is_finite(&self) -> bool {
        self.voltage_v.is_finite() && self.current_ma.is_finite() && self.power_w.is_finite()
    }
}

pub fn round2(x: f32) -> f32 {
    (x * 100.0).round() / 100.0
}

/// evaluate the series loop
/// - first battery found is the source; any further batteries are ignored
/// - any open switch or an absence of loads opens the circuit
/// - non-finite arithmetic (e.g. zero total resistance) collapses to zero
pub fn evaluate(components: &[ComponentInstance], powered: bool) -> Measurements {
    if !powered || components.is_empty() {
        return Measurements::ZERO;
    }
    let Some(source_v) = components
        .iter()
        .find_map(|c| c.electrical.source_voltage())
    else {
        return Measurements::ZERO;
    };
    if components.iter().any(|c| c.electrical.is_open_switch()) {
        return Measurements::ZERO;
    }
    let loads: Vec<f32> = components
        .iter()
        .filter_map(|c| c.electrical.load_resistance())
        .collect();
    if loads.is_empty() {
        return Measurements::ZERO;
    }
    let total_resistance: f32 = loads.iter().sum();

    let current_a = source_v / total_resistance;
    let measurements = Measurements {
        voltage_v: source_v,
        current_ma: current_a * 1000.0,
        power_w: source_v * current_a,
    };
    if measurements.is_finite() {
        measurements
    } else {
        Measurements::ZERO
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ComponentKind;
    use crate::circuit::Circuit;

    fn circuit_of(kinds: &[ComponentKind]) -> Circuit {
        let mut circuit = Circuit::default();
        for kind in kinds {
            circuit.add(*kind);
        }
        circuit
    }

    #[test]
    fn test_unpowered_is_zero() {
        let circuit = circuit_of(&[ComponentKind::Battery, ComponentKind::Resistor]);
        assert_eq!(evaluate(circuit.components(), false), Measurements::ZERO);
    }

    #[test]
    fn test_empty_is_zero() {
        assert_eq!(evaluate(&[], true), Measurements::ZERO);
    }

    #[test]
    fn test_no_battery_is_zero() {
        let circuit = circuit_of(&[ComponentKind::Resistor, ComponentKind::Led]);
        assert_eq!(evaluate(circuit.components(), true), Measurements::ZERO);
    }

    #[test]
    fn test_no_load_is_zero() {
        let circuit = circuit_of(&[ComponentKind::Battery, ComponentKind::Switch]);
        assert_eq!(evaluate(circuit.components(), true), Measurements::ZERO);
    }

    #[test]
    fn test_open_switch_is_zero() {
        let mut circuit = circuit_of(&[
            ComponentKind::Battery,
            ComponentKind::Resistor,
            ComponentKind::Switch,
        ]);
        let sw = circuit.components()[2].id;
        circuit.toggle_switch(sw);
        assert_eq!(evaluate(circuit.components(), true), Measurements::ZERO);
        // closing it again restores current
        circuit.toggle_switch(sw);
        assert!(evaluate(circuit.components(), true).live());
    }

    #[test]
    fn test_battery_and_resistor() {
        let circuit = circuit_of(&[ComponentKind::Battery, ComponentKind::Resistor]);
        let m = evaluate(circuit.components(), true).rounded();
        assert_eq!(m.voltage_v, 9.0);
        assert_eq!(m.current_ma, 90.0);
        assert_eq!(m.power_w, 0.81);
    }

    #[test]
    fn test_series_resistances_sum() {
        let mut circuit = circuit_of(&[
            ComponentKind::Battery,
            ComponentKind::Resistor,
            ComponentKind::Resistor,
        ]);
        let second = circuit.components()[2].id;
        circuit.set_value(second, "200").unwrap();
        let m = evaluate(circuit.components(), true).rounded();
        assert_eq!(m.voltage_v, 9.0);
        assert_eq!(m.current_ma, 30.0);
        assert_eq!(m.power_w, 0.27);
    }

    #[test]
    fn test_led_counts_as_load() {
        let circuit = circuit_of(&[ComponentKind::Battery, ComponentKind::Led]);
        let m = evaluate(circuit.components(), true).rounded();
        // 9 V over the LED's default 10 ohm
        assert_eq!(m.current_ma, 900.0);
        assert_eq!(m.power_w, 8.1);
    }

    #[test]
    fn test_first_battery_wins() {
        let mut circuit = circuit_of(&[
            ComponentKind::Battery,
            ComponentKind::Battery,
            ComponentKind::Resistor,
        ]);
        let second = circuit.components()[1].id;
        circuit.set_value(second, "24").unwrap();
        let m = evaluate(circuit.components(), true).rounded();
        assert_eq!(m.voltage_v, 9.0);
        assert_eq!(m.current_ma, 90.0);
    }

    #[test]
    fn test_zero_resistance_clamps_to_zero() {
        let mut circuit = circuit_of(&[ComponentKind::Battery, ComponentKind::Resistor]);
        let r = circuit.components()[1].id;
        circuit.set_value(r, "0").unwrap();
        assert_eq!(evaluate(circuit.components(), true), Measurements::ZERO);
    }

    #[test]
    fn test_idempotent() {
        let circuit = circuit_of(&[
            ComponentKind::Battery,
            ComponentKind::Resistor,
            ComponentKind::Led,
        ]);
        let a = evaluate(circuit.components(), true);
        let b = evaluate(circuit.components(), true);
        assert_eq!(a, b);
    }
}
