//! JVM descriptor parsing.
//!
//! Descriptors are kept verbatim in the model (`(Ljava/lang/String;I)V`,
//! `[Lorg/example/Color;`); these helpers decode the type names they refer
//! to, using dotted qualified names (`java.lang.String`).

use crate::error::{ApiToolsError, Result};

/// Decoded method descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodDescriptor {
    /// Parameter types, as written in source (`int`, `java.lang.String[]`)
    pub parameters: Vec<String>,
    /// Return type (`void` for no return value)
    pub return_type: String,
}

impl MethodDescriptor {
    /// Parameter part of the descriptor, without the return type.
    #[must_use]
    pub fn parameter_descriptor(descriptor: &str) -> &str {
        descriptor
            .find(')')
            .map_or(descriptor, |idx| &descriptor[..=idx])
    }
}

/// Parse a method descriptor such as `(ILjava/lang/String;)V`.
pub fn parse_method_descriptor(descriptor: &str) -> Result<MethodDescriptor> {
    let malformed = |reason: &str| {
        ApiToolsError::malformed(descriptor, format!("invalid method descriptor: {reason}"))
    };
    let body = descriptor
        .strip_prefix('(')
        .ok_or_else(|| malformed("missing '('"))?;
    let close = body.find(')').ok_or_else(|| malformed("missing ')'"))?;
    let (params, ret) = (&body[..close], &body[close + 1..]);

    let mut parameters = Vec::new();
    let mut rest = params;
    while !rest.is_empty() {
        let (ty, remaining) = parse_one(rest).ok_or_else(|| malformed("bad parameter type"))?;
        parameters.push(ty);
        rest = remaining;
    }

    let return_type = if ret == "V" {
        "void".to_string()
    } else {
        match parse_one(ret) {
            Some((ty, "")) => ty,
            _ => return Err(malformed("bad return type")),
        }
    };

    Ok(MethodDescriptor {
        parameters,
        return_type,
    })
}

/// Parse a field type descriptor such as `[Ljava/lang/String;`.
pub fn parse_field_descriptor(descriptor: &str) -> Result<String> {
    match parse_one(descriptor) {
        Some((ty, "")) => Ok(ty),
        _ => Err(ApiToolsError::malformed(
            descriptor,
            "invalid field descriptor",
        )),
    }
}

/// Referenced reference types of a decoded type name (arrays unwrapped,
/// primitives and `void` dropped).
#[must_use]
pub fn referenced_type(type_name: &str) -> Option<&str> {
    let element = type_name.trim_end_matches("[]");
    if is_primitive(element) {
        None
    } else {
        Some(element)
    }
}

/// Whether `name` is a primitive type name (or `void`).
#[must_use]
pub fn is_primitive(name: &str) -> bool {
    matches!(
        name,
        "boolean" | "byte" | "char" | "short" | "int" | "long" | "float" | "double" | "void"
    )
}

/// Human-readable method label, e.g. `bar(int, String)`.
#[must_use]
pub fn display_method(name: &str, descriptor: &str) -> String {
    match parse_method_descriptor(descriptor) {
        Ok(decoded) => {
            let params: Vec<&str> = decoded
                .parameters
                .iter()
                .map(|p| super::simple_name_of(p))
                .collect();
            format!("{name}({})", params.join(", "))
        }
        Err(_) => format!("{name}{descriptor}"),
    }
}

fn parse_one(input: &str) -> Option<(String, &str)> {
    let mut dims = 0;
    let mut rest = input;
    while let Some(stripped) = rest.strip_prefix('[') {
        dims += 1;
        rest = stripped;
    }
    let mut chars = rest.chars();
    let base = match chars.next()? {
        'Z' => "boolean".to_string(),
        'B' => "byte".to_string(),
        'C' => "char".to_string(),
        'S' => "short".to_string(),
        'I' => "int".to_string(),
        'J' => "long".to_string(),
        'F' => "float".to_string(),
        'D' => "double".to_string(),
        'L' => {
            let end = rest.find(';')?;
            let name = &rest[1..end];
            if name.is_empty() {
                return None;
            }
            rest = &rest[end + 1..];
            let mut ty = name.replace('/', ".");
            ty.push_str(&"[]".repeat(dims));
            return Some((ty, rest));
        }
        _ => return None,
    };
    let mut ty = base;
    ty.push_str(&"[]".repeat(dims));
    Some((ty, &rest[1..]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_method_descriptor() {
        let decoded = parse_method_descriptor("(ILjava/lang/String;[[J)Lorg/example/Color;")
            .expect("valid descriptor");
        assert_eq!(decoded.parameters, vec!["int", "java.lang.String", "long[][]"]);
        assert_eq!(decoded.return_type, "org.example.Color");
    }

    #[test]
    fn test_parse_void_method() {
        let decoded = parse_method_descriptor("()V").expect("valid descriptor");
        assert!(decoded.parameters.is_empty());
        assert_eq!(decoded.return_type, "void");
    }

    #[test]
    fn test_malformed_descriptors() {
        assert!(parse_method_descriptor("I)V").is_err());
        assert!(parse_method_descriptor("(Ljava/lang/String").is_err());
        assert!(parse_method_descriptor("(Q)V").is_err());
        assert!(parse_method_descriptor("()VV").is_err());
        assert!(parse_field_descriptor("L;").is_err());
    }

    #[test]
    fn test_referenced_type() {
        assert_eq!(referenced_type("java.lang.String[]"), Some("java.lang.String"));
        assert_eq!(referenced_type("int[]"), None);
        assert_eq!(referenced_type("void"), None);
    }

    #[test]
    fn test_parameter_descriptor() {
        assert_eq!(MethodDescriptor::parameter_descriptor("(II)J"), "(II)");
    }

    #[test]
    fn test_display_method() {
        assert_eq!(display_method("bar", "(ILjava/lang/String;)V"), "bar(int, String)");
    }
}
