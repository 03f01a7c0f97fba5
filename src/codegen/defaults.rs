use crate::config::{InstrumentOptions, ParamSetting};
use crate::parser::types::{ParamMode, Parameter, Qualifier, ShaderType};
use std::collections::HashMap;

/// Candidate values for feeding a parameter of one type.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TypeDefaults {
    pub default_value: Option<String>,
    pub uv_value: Option<String>,
    pub centered_uv_value: Option<String>,
}

fn defaults(default: &str, uv: &str, centered: &str) -> TypeDefaults {
    TypeDefaults {
        default_value: Some(default.to_string()),
        uv_value: Some(uv.to_string()),
        centered_uv_value: Some(centered.to_string()),
    }
}

fn literal_only(default: &str) -> TypeDefaults {
    TypeDefaults {
        default_value: Some(default.to_string()),
        ..TypeDefaults::default()
    }
}

/// Supplies default, UV-derived and centered-UV-derived values per type.
#[derive(Debug, Clone)]
pub struct DefaultValueProvider {
    coord_var: String,
    resolution: String,
    texture: Option<String>,
    overrides: HashMap<String, ParamSetting>,
}

impl Default for DefaultValueProvider {
    fn default() -> Self {
        Self::new(&InstrumentOptions::default())
    }
}

impl DefaultValueProvider {
    pub fn new(options: &InstrumentOptions) -> Self {
        Self {
            coord_var: options.coord_var.clone(),
            resolution: options.resolution_uniform.clone(),
            texture: options.texture_inputs.first().cloned(),
            overrides: options.param_overrides.clone(),
        }
    }

    pub fn defaults_for(&self, ty: &ShaderType) -> TypeDefaults {
        match ty {
            ShaderType::Float => defaults("0.5", "uv.x", "centeredUv.x"),
            ShaderType::Vec2 => defaults("vec2(0.5)", "uv", "centeredUv"),
            ShaderType::Vec3 => defaults("vec3(0.5)", "vec3(uv, 0.0)", "vec3(centeredUv, 0.0)"),
            ShaderType::Vec4 => defaults(
                "vec4(0.5)",
                "vec4(uv, 0.0, 1.0)",
                "vec4(centeredUv, 0.0, 1.0)",
            ),
            ShaderType::Int => defaults("1", "int(uv.x * 10.0)", "int(centeredUv.x * 10.0)"),
            ShaderType::Bool => TypeDefaults {
                default_value: Some("true".to_string()),
                uv_value: Some("uv.x > 0.5".to_string()),
                centered_uv_value: Some(format!(
                    "{}.x > 0.5 * {}.x",
                    self.coord_var, self.resolution
                )),
            },
            ShaderType::Mat2 => literal_only("mat2(1.0)"),
            ShaderType::Mat3 => literal_only("mat3(1.0)"),
            ShaderType::Mat4 => literal_only("mat4(1.0)"),
            ShaderType::Sampler2D => TypeDefaults {
                default_value: self.texture.clone(),
                ..TypeDefaults::default()
            },
            ShaderType::Void | ShaderType::Unsupported(_) => TypeDefaults::default(),
        }
    }

    /// Position-like `vec2` inputs sweep the screen; everything else starts
    /// from a fixed representative literal.
    pub fn initial_mode(ty: &ShaderType) -> ParamMode {
        match ty {
            ShaderType::Vec2 => ParamMode::Uv,
            _ => ParamMode::Custom,
        }
    }

    /// Build a parameter with its values filled in and overrides applied.
    pub fn parameter(&self, name: &str, ty: ShaderType, qualifier: Qualifier) -> Parameter {
        let values = self.defaults_for(&ty);
        let mut param = Parameter {
            name: name.to_string(),
            mode: Self::initial_mode(&ty),
            ty,
            qualifier,
            default_value: values.default_value,
            uv_value: values.uv_value,
            centered_uv_value: values.centered_uv_value,
        };

        match self.overrides.get(name) {
            Some(ParamSetting::Uv) => param.mode = ParamMode::Uv,
            Some(ParamSetting::CenteredUv) => param.mode = ParamMode::CenteredUv,
            Some(ParamSetting::Custom(value)) => {
                param.mode = ParamMode::Custom;
                param.default_value = Some(value.clone());
            }
            None => {}
        }
        param
    }

    /// `uv` and `centeredUv` declarations every synthetic entry point starts with.
    pub fn uv_setup(&self) -> [String; 2] {
        let coord = &self.coord_var;
        let res = &self.resolution;
        [
            format!("vec2 uv = {} / {}.xy;", coord, res),
            format!("vec2 centeredUv = ({} - 0.5 * {}.xy) / {}.y;", coord, res, res),
        ]
    }
}

/// Zero value used to initialise shadows; `None` when the type has none.
pub fn zero_literal(ty: &ShaderType) -> Option<&'static str> {
    match ty {
        ShaderType::Float => Some("0.0"),
        ShaderType::Int => Some("0"),
        ShaderType::Bool => Some("false"),
        ShaderType::Vec2 => Some("vec2(0.0)"),
        ShaderType::Vec3 => Some("vec3(0.0)"),
        ShaderType::Vec4 => Some("vec4(0.0)"),
        ShaderType::Mat2 => Some("mat2(0.0)"),
        ShaderType::Mat3 => Some("mat3(0.0)"),
        ShaderType::Mat4 => Some("mat4(0.0)"),
        ShaderType::Void | ShaderType::Sampler2D | ShaderType::Unsupported(_) => None,
    }
}
