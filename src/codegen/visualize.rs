use crate::parser::types::ShaderType;

/// Flat magenta: the deliberate "this type cannot be displayed" signal.
pub const UNSUPPORTED_COLOR: &str = "vec4(1.0, 0.0, 1.0, 1.0)";

/// How a typed value becomes an RGBA color. `{v}` stands for the value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeVisualizationRule {
    pub template: &'static str,
    pub known: bool,
}

const fn rule(template: &'static str) -> TypeVisualizationRule {
    TypeVisualizationRule {
        template,
        known: true,
    }
}

const UNSUPPORTED: TypeVisualizationRule = TypeVisualizationRule {
    template: UNSUPPORTED_COLOR,
    known: false,
};

/// Matrices show their first column, zero-filled or truncated to RGB with
/// alpha forced to 1.
pub fn visualization_rule(ty: &ShaderType) -> TypeVisualizationRule {
    match ty {
        ShaderType::Float => rule("vec4(vec3({v}), 1.0)"),
        ShaderType::Vec2 => rule("vec4({v}, 0.0, 1.0)"),
        ShaderType::Vec3 => rule("vec4({v}, 1.0)"),
        ShaderType::Vec4 => rule("{v}"),
        ShaderType::Mat2 => rule("vec4({v}[0], 0.0, 1.0)"),
        ShaderType::Mat3 => rule("vec4({v}[0], 1.0)"),
        ShaderType::Mat4 => rule("vec4({v}[0].xyz, 1.0)"),
        ShaderType::Void
        | ShaderType::Int
        | ShaderType::Bool
        | ShaderType::Sampler2D
        | ShaderType::Unsupported(_) => UNSUPPORTED,
    }
}

pub fn color_expression(ty: &ShaderType, name: &str) -> String {
    visualization_rule(ty).template.replace("{v}", name)
}

/// `<output> = <color of name>;`
pub fn return_statement_for_var(ty: &ShaderType, name: &str, output_var: &str) -> String {
    format!("{} = {};", output_var, color_expression(ty, name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn stmt(ty: ShaderType) -> String {
        return_statement_for_var(&ty, "v", "fragColor")
    }

    #[test]
    fn test_scalar_and_vectors() {
        assert_eq!(stmt(ShaderType::Float), "fragColor = vec4(vec3(v), 1.0);");
        assert_eq!(stmt(ShaderType::Vec2), "fragColor = vec4(v, 0.0, 1.0);");
        assert_eq!(stmt(ShaderType::Vec3), "fragColor = vec4(v, 1.0);");
        assert_eq!(stmt(ShaderType::Vec4), "fragColor = v;");
    }

    #[test]
    fn test_matrices_show_first_column() {
        assert_eq!(stmt(ShaderType::Mat2), "fragColor = vec4(v[0], 0.0, 1.0);");
        assert_eq!(stmt(ShaderType::Mat3), "fragColor = vec4(v[0], 1.0);");
        assert_eq!(stmt(ShaderType::Mat4), "fragColor = vec4(v[0].xyz, 1.0);");
    }

    #[test]
    fn test_unsupported_types_are_magenta() {
        for ty in [
            ShaderType::Int,
            ShaderType::Bool,
            ShaderType::Sampler2D,
            ShaderType::Unsupported("ivec3".into()),
        ] {
            assert!(!visualization_rule(&ty).known);
            assert_eq!(stmt(ty), "fragColor = vec4(1.0, 0.0, 1.0, 1.0);");
        }
    }

    #[test]
    fn test_custom_output_name() {
        assert_eq!(
            return_statement_for_var(&ShaderType::Vec3, "col", "O"),
            "O = vec4(col, 1.0);"
        );
    }
}
