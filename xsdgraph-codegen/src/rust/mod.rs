//! Rust code generation modules.

pub mod enums;
pub mod operations;
pub mod types;

pub use enums::EnumGenerator;
pub use operations::OperationGenerator;
pub use types::TypeGenerator;

/// Renders a string as a Rust string literal.
pub(crate) fn str_literal(value: &str) -> String {
    format!("{value:?}")
}

/// Renders an optional string as `Some("..")` or `None`.
pub(crate) fn opt_literal(value: Option<&str>) -> String {
    match value {
        Some(value) => format!("Some({})", str_literal(value)),
        None => "None".to_string(),
    }
}

/// Renders a slice of string literals.
pub(crate) fn slice_literal(values: &[String]) -> String {
    let items: Vec<String> = values.iter().map(|v| str_literal(v)).collect();
    format!("&[{}]", items.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literals() {
        assert_eq!(str_literal("a\"b"), r#""a\"b""#);
        assert_eq!(opt_literal(Some("x")), r#"Some("x")"#);
        assert_eq!(opt_literal(None), "None");
        assert_eq!(slice_literal(&["A".to_string(), "B".to_string()]), r#"&["A", "B"]"#);
        assert_eq!(slice_literal(&[]), "&[]");
    }
}
