//! Shader parameter debug panel.
//!
//! One row per [`ShaderParam`]: a label reading `"<Name>: <value>"` and an
//! increase/decrease button pair. A press reads the value back from the label,
//! applies a fixed step, pushes the result to the renderer and rewrites the
//! label, so what is on screen is always what the shader sees.
//!
//! Values are not clamped; stepping below zero is allowed.

use crowdwalk_render::{RenderService, ShaderParam};

/// Default increment applied per button press.
pub const DEFAULT_STEP: f32 = 0.01;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StepDirection {
    Increase,
    Decrease,
}

impl StepDirection {
    fn sign(self) -> f32 {
        match self {
            Self::Increase => 1.0,
            Self::Decrease => -1.0,
        }
    }
}

/// Identifies one of the panel's buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ButtonId {
    pub param: ShaderParam,
    pub direction: StepDirection,
}

impl ButtonId {
    pub fn increase(param: ShaderParam) -> Self {
        Self {
            param,
            direction: StepDirection::Increase,
        }
    }

    pub fn decrease(param: ShaderParam) -> Self {
        Self {
            param,
            direction: StepDirection::Decrease,
        }
    }

    /// Button caption.
    pub fn caption(&self) -> &'static str {
        match self.direction {
            StepDirection::Increase => "+",
            StepDirection::Decrease => "-",
        }
    }
}

/// Label text for a parameter. Uses the shortest round-trip float
/// formatting, so parsing the label gives back exactly `value`.
pub fn format_label(param: ShaderParam, value: f32) -> String {
    format!("{}: {value}", param.name())
}

fn parse_label(label: &str) -> Option<f32> {
    label.rsplit_once(": ")?.1.trim().parse().ok()
}

/// One label plus its button pair.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamRow {
    pub param: ShaderParam,
    label: String,
}

impl ParamRow {
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn increase(&self) -> ButtonId {
        ButtonId::increase(self.param)
    }

    pub fn decrease(&self) -> ButtonId {
        ButtonId::decrease(self.param)
    }
}

/// The debug panel model. Rendering is left to the front-end.
#[derive(Debug, Clone)]
pub struct DebugPanel {
    rows: Vec<ParamRow>,
    step: f32,
}

impl DebugPanel {
    /// Build the panel and push every initial value to the renderer.
    /// `initial` is indexed by [`ShaderParam::index`].
    pub fn new(initial: [f32; 4], step: f32, renderer: &mut dyn RenderService) -> Self {
        let rows = ShaderParam::ALL
            .iter()
            .map(|&param| {
                let value = initial[param.index()];
                renderer.set_shader_parameter(param, value);
                ParamRow {
                    param,
                    label: format_label(param, value),
                }
            })
            .collect();
        tracing::info!(step, "debug panel created");
        Self { rows, step }
    }

    pub fn step(&self) -> f32 {
        self.step
    }

    pub fn rows(&self) -> &[ParamRow] {
        &self.rows
    }

    pub fn label(&self, param: ShaderParam) -> &str {
        self.row(param).label()
    }

    /// The value currently shown in the parameter's label.
    pub fn displayed_value(&self, param: ShaderParam) -> Option<f32> {
        parse_label(self.label(param))
    }

    /// Every button on the panel, increase before decrease, row by row.
    pub fn buttons(&self) -> impl Iterator<Item = ButtonId> + '_ {
        self.rows.iter().flat_map(|r| [r.increase(), r.decrease()])
    }

    /// Handle one button press. Returns the value pushed to the renderer.
    pub fn press(&mut self, button: ButtonId, renderer: &mut dyn RenderService) -> f32 {
        let param = button.param;
        let current = match self.displayed_value(param) {
            Some(v) => v,
            None => {
                tracing::warn!(%param, label = self.label(param), "unreadable label, using renderer value");
                renderer.shader_parameter(param).unwrap_or_default()
            }
        };
        let value = current + button.direction.sign() * self.step;
        renderer.set_shader_parameter(param, value);
        self.row_mut(param).label = format_label(param, value);
        tracing::debug!(%param, value, "shader parameter adjusted");
        value
    }

    fn row(&self, param: ShaderParam) -> &ParamRow {
        &self.rows[param.index()]
    }

    fn row_mut(&mut self, param: ShaderParam) -> &mut ParamRow {
        &mut self.rows[param.index()]
    }
}
