//! Debug control panel.
//!
//! Five sliders bound live to the particle sprite size and the four flow
//! field tunables. Values are only bounded by each slider's range and step.

use crate::flow::FlowFieldParams;

/// What a slider edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SliderTarget {
    ParticleSize,
    Influence,
    Strength,
    Frequency,
    Height,
}

impl SliderTarget {
    /// The bound value.
    pub fn slot<'a>(self, particle_size: &'a mut f32, params: &'a mut FlowFieldParams) -> &'a mut f32 {
        match self {
            SliderTarget::ParticleSize => particle_size,
            SliderTarget::Influence => &mut params.influence,
            SliderTarget::Strength => &mut params.strength,
            SliderTarget::Frequency => &mut params.frequency,
            SliderTarget::Height => &mut params.height,
        }
    }
}

/// Range and step of one slider.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SliderSpec {
    pub target: SliderTarget,
    pub label: &'static str,
    pub min: f32,
    pub max: f32,
    pub step: f32,
}

impl SliderSpec {
    /// Clamp `value` to the range and snap it to the step grid.
    pub fn apply(&self, value: f32) -> f32 {
        if !value.is_finite() {
            return self.min;
        }
        let steps = ((value - self.min) / self.step).round();
        (self.min + steps * self.step).clamp(self.min, self.max)
    }

    /// Write `value` through [`Self::apply`] into the bound slot.
    pub fn set(&self, value: f32, particle_size: &mut f32, params: &mut FlowFieldParams) {
        *self.target.slot(particle_size, params) = self.apply(value);
    }
}

/// Sliders in display order.
pub const SLIDERS: [SliderSpec; 5] = [
    SliderSpec {
        target: SliderTarget::ParticleSize,
        label: "Particle Size",
        min: 0.0,
        max: 1.0,
        step: 0.001,
    },
    SliderSpec {
        target: SliderTarget::Influence,
        label: "Flow Field Influence",
        min: 0.0,
        max: 1.0,
        step: 0.001,
    },
    SliderSpec {
        target: SliderTarget::Strength,
        label: "Flow Field Strength",
        min: 0.0,
        max: 10.0,
        step: 0.01,
    },
    SliderSpec {
        target: SliderTarget::Frequency,
        label: "Flow Field Frequency",
        min: 0.0,
        max: 1.0,
        step: 0.001,
    },
    SliderSpec {
        target: SliderTarget::Height,
        label: "Flow Field Height",
        min: -5.0,
        max: 5.0,
        step: 0.1,
    },
];

/// Draw the control window.
#[cfg(feature = "egui")]
pub fn debug_panel(ctx: &egui::Context, particle_size: &mut f32, params: &mut FlowFieldParams) {
    egui::Window::new("Controls")
        .default_pos([10.0, 10.0])
        .default_width(340.0)
        .show(ctx, |ui| {
            for slider in &SLIDERS {
                let mut value = *slider.target.slot(particle_size, params);
                let response = ui.add(
                    egui::Slider::new(&mut value, slider.min..=slider.max)
                        .step_by(slider.step as f64)
                        .text(slider.label),
                );
                if response.changed() {
                    slider.set(value, particle_size, params);
                }
            }

            ui.separator();
            if ui.button("Reset Flow Field").clicked() {
                *params = FlowFieldParams::default();
            }
            ui.label("P: save the particle state texture");
        });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slider_table_matches_defaults() {
        let params = FlowFieldParams::default();
        let mut size = 0.07;
        let mut p = params;
        for slider in &SLIDERS {
            let v = *slider.target.slot(&mut size, &mut p);
            assert!(v >= slider.min && v <= slider.max, "{} out of range", slider.label);
        }
    }

    #[test]
    fn test_apply_clamps_and_snaps() {
        let strength = SLIDERS[2];
        assert_eq!(strength.apply(42.0), 10.0);
        assert_eq!(strength.apply(-1.0), 0.0);
        assert!((strength.apply(3.456) - 3.46).abs() < 1e-5);
        assert_eq!(strength.apply(f32::NAN), 0.0);
    }

    #[test]
    fn test_set_writes_bound_value() {
        let mut size = 0.07;
        let mut params = FlowFieldParams::default();
        SLIDERS[4].set(-9.0, &mut size, &mut params);
        assert_eq!(params.height, -5.0);
        SLIDERS[0].set(0.5, &mut size, &mut params);
        assert!((size - 0.5).abs() < 1e-6);
        assert_eq!(params.influence, FlowFieldParams::default().influence);
    }
}
