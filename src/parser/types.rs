use std::fmt;
use std::ops::Deref;

/// GLSL type keywords a declaration may start with.
pub const TYPE_KEYWORDS: &[&str] = &[
    "float", "int", "uint", "bool", "vec2", "vec3", "vec4", "ivec2", "ivec3", "ivec4", "uvec2",
    "uvec3", "uvec4", "bvec2", "bvec3", "bvec4", "mat2", "mat3", "mat4", "mat2x2", "mat2x3",
    "mat2x4", "mat3x2", "mat3x3", "mat3x4", "mat4x2", "mat4x3", "mat4x4", "sampler2D",
    "sampler3D", "samplerCube",
];

/// Words that look like identifiers but start control flow.
pub const CONTROL_KEYWORDS: &[&str] = &[
    "if", "else", "for", "while", "do", "switch", "case", "return", "break", "continue",
    "discard", "default",
];

pub fn is_type_keyword(word: &str) -> bool {
    TYPE_KEYWORDS.contains(&word)
}

pub fn is_control_keyword(word: &str) -> bool {
    CONTROL_KEYWORDS.contains(&word)
}

/// Shader types the generator knows how to feed or display.
///
/// Everything else is carried verbatim in `Unsupported` and falls back to
/// the magenta "unsupported type" signal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ShaderType {
    Void,
    Float,
    Int,
    Bool,
    Vec2,
    Vec3,
    Vec4,
    Mat2,
    Mat3,
    Mat4,
    Sampler2D,
    Unsupported(String),
}

impl ShaderType {
    pub fn parse(name: &str) -> Self {
        match name.trim() {
            "void" => ShaderType::Void,
            "float" => ShaderType::Float,
            "int" => ShaderType::Int,
            "bool" => ShaderType::Bool,
            "vec2" => ShaderType::Vec2,
            "vec3" => ShaderType::Vec3,
            "vec4" => ShaderType::Vec4,
            "mat2" | "mat2x2" => ShaderType::Mat2,
            "mat3" | "mat3x3" => ShaderType::Mat3,
            "mat4" | "mat4x4" => ShaderType::Mat4,
            "sampler2D" => ShaderType::Sampler2D,
            other => ShaderType::Unsupported(other.to_string()),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            ShaderType::Void => "void",
            ShaderType::Float => "float",
            ShaderType::Int => "int",
            ShaderType::Bool => "bool",
            ShaderType::Vec2 => "vec2",
            ShaderType::Vec3 => "vec3",
            ShaderType::Vec4 => "vec4",
            ShaderType::Mat2 => "mat2",
            ShaderType::Mat3 => "mat3",
            ShaderType::Mat4 => "mat4",
            ShaderType::Sampler2D => "sampler2D",
            ShaderType::Unsupported(name) => name,
        }
    }
}

impl fmt::Display for ShaderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The shader text split into lines. All line numbers are 0-based indices
/// into this sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLines {
    lines: Vec<String>,
    trailing_newline: bool,
}

impl SourceLines {
    pub fn new(source: &str) -> Self {
        Self {
            lines: source.lines().map(str::to_string).collect(),
            trailing_newline: source.ends_with('\n'),
        }
    }

    /// Rebuild the source text around a new set of lines.
    pub fn render(&self, lines: &[String]) -> String {
        let mut out = lines.join("\n");
        if self.trailing_newline {
            out.push('\n');
        }
        out
    }
}

impl Deref for SourceLines {
    type Target = [String];

    fn deref(&self) -> &[String] {
        &self.lines
    }
}

/// A statement joined from one or more physical lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    /// Comment-free text up to and including the terminating `;`.
    pub text: String,
    pub start: usize,
    /// Line bearing the terminating `;`.
    pub end: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VarInfo {
    pub name: String,
    pub ty: ShaderType,
}

impl VarInfo {
    pub fn new(name: impl Into<String>, ty: ShaderType) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Qualifier {
    In,
    Out,
    InOut,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamMode {
    Uv,
    CenteredUv,
    Custom,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    pub name: String,
    pub ty: ShaderType,
    pub qualifier: Qualifier,
    pub mode: ParamMode,
    pub default_value: Option<String>,
    pub uv_value: Option<String>,
    pub centered_uv_value: Option<String>,
}

impl Parameter {
    /// The expression fed to this parameter under its current mode.
    pub fn value(&self) -> Option<&str> {
        let preferred = match self.mode {
            ParamMode::Uv => self.uv_value.as_deref(),
            ParamMode::CenteredUv => self.centered_uv_value.as_deref(),
            ParamMode::Custom => self.default_value.as_deref(),
        };
        preferred.or(self.default_value.as_deref())
    }

    /// `out` parameters are write-only and never configurable.
    pub fn is_configurable(&self) -> bool {
        self.qualifier != Qualifier::Out
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionSignature {
    pub name: String,
    pub return_type: ShaderType,
    /// Every parameter in declaration order, `out` ones included.
    pub parameters: Vec<Parameter>,
    pub start_line: usize,
    /// Line holding the body's opening brace.
    pub open_line: usize,
    /// Line holding the body's closing brace, `None` while unclosed.
    pub end_line: Option<usize>,
}

impl FunctionSignature {
    /// Parameters exposed as debug inputs.
    pub fn configurable_parameters(&self) -> impl Iterator<Item = &Parameter> {
        self.parameters.iter().filter(|p| p.is_configurable())
    }

    pub fn parameter(&self, name: &str) -> Option<&Parameter> {
        self.parameters.iter().find(|p| p.name == name)
    }
}

/// A `for`/`while` loop inside a function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoopSite {
    pub header_line: usize,
    pub header_text: String,
    /// Encounter order within the function, 0 first.
    pub index: usize,
    /// Line and byte column of the body's `{`, `None` for brace-less bodies.
    pub open: Option<(usize, usize)>,
    pub close_line: Option<usize>,
}
