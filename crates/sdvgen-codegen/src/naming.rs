//! Naming convention utilities for code generation.
//!
//! # Supported Conversions
//!
//! | Input | Function | Output |
//! |-------|----------|--------|
//! | `word` | [`capitalize`] | `Word` |
//! | `Word` | [`lower_first`] | `word` |
//! | `PascalCase` | [`to_snake_case`] | `pascal_case` |
//! | `com.example` + `Name` | [`class_path`] | `com/example/Name` |
//! | `com.ex_ample` | [`jni_mangle`] | `com_ex_1ample` |

/// Capitalize the first letter of a string.
///
/// # Examples
///
/// ```
/// use sdvgen_codegen::naming::capitalize;
///
/// assert_eq!(capitalize("speed"), "Speed");
/// assert_eq!(capitalize(""), "");
/// ```
pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_uppercase().chain(chars).collect(),
    }
}

/// Lowercase the first letter of a string.
pub fn lower_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_lowercase().chain(chars).collect(),
    }
}

/// Convert PascalCase or camelCase to snake_case.
///
/// # Examples
///
/// ```
/// use sdvgen_codegen::naming::to_snake_case;
///
/// assert_eq!(to_snake_case("Navigation"), "navigation");
/// assert_eq!(to_snake_case("ClimateControl"), "climate_control");
/// ```
pub fn to_snake_case(s: &str) -> String {
    let mut result = String::new();
    for (i, c) in s.chars().enumerate() {
        if c.is_uppercase() {
            if i > 0 {
                result.push('_');
            }
            result.extend(c.to_lowercase());
        } else {
            result.push(c);
        }
    }
    result
}

/// Slash-separated class path for `FindClass` and descriptors.
pub fn class_path(package: &str, class: &str) -> String {
    if package.is_empty() {
        class.to_string()
    } else {
        format!("{}/{class}", package.replace('.', "/"))
    }
}

/// Mangle a dotted name for use inside a JNI symbol.
///
/// `_` becomes `_1` and `.` becomes `_`, per the JNI symbol rules.
pub fn jni_mangle(name: &str) -> String {
    let mut result = String::with_capacity(name.len());
    for c in name.chars() {
        match c {
            '_' => result.push_str("_1"),
            '.' | '/' => result.push('_'),
            '$' => result.push_str("_00024"),
            other => result.push(other),
        }
    }
    result
}

/// Exported symbol for a static native method.
pub fn jni_symbol(package: &str, class: &str, method: &str) -> String {
    format!(
        "Java_{}_{}_{}",
        jni_mangle(package),
        jni_mangle(class),
        jni_mangle(method)
    )
}

const JAVA_KEYWORDS: &[&str] = &[
    "abstract", "assert", "boolean", "break", "byte", "case", "catch", "char", "class", "const",
    "continue", "default", "do", "double", "else", "enum", "extends", "final", "finally", "float",
    "for", "goto", "if", "implements", "import", "instanceof", "int", "interface", "long", "native",
    "new", "package", "private", "protected", "public", "return", "short", "static", "strictfp",
    "super", "switch", "synchronized", "this", "throw", "throws", "transient", "try", "void",
    "volatile", "while", "true", "false", "null",
];

/// Append `_` to names that are Java keywords.
pub fn java_identifier(name: &str) -> String {
    if JAVA_KEYWORDS.contains(&name) {
        format!("{name}_")
    } else {
        name.to_string()
    }
}

#[cfg(test)]
mod tests {
    #![allow(non_snake_case)]

    use super::*;

    #[test]
    fn capitalize___capitalizes_first_letter() {
        assert_eq!(capitalize("speed"), "Speed");
        assert_eq!(capitalize("a"), "A");
        assert_eq!(capitalize(""), "");
    }

    #[test]
    fn capitalize___preserves_rest_of_string() {
        assert_eq!(capitalize("routeUpdated"), "RouteUpdated");
        assert_eq!(capitalize("ALLCAPS"), "ALLCAPS");
    }

    #[test]
    fn lower_first___lowers_only_first_letter() {
        assert_eq!(lower_first("RouteUpdated"), "routeUpdated");
        assert_eq!(lower_first(""), "");
    }

    #[test]
    fn to_snake_case___splits_on_capitals() {
        assert_eq!(to_snake_case("ClimateControl"), "climate_control");
        assert_eq!(to_snake_case("radio"), "radio");
    }

    #[test]
    fn class_path___joins_with_slashes() {
        assert_eq!(class_path("com.example.bridge", "Point"), "com/example/bridge/Point");
        assert_eq!(class_path("", "Point"), "Point");
    }

    #[test]
    fn jni_mangle___escapes_underscores_before_dots() {
        assert_eq!(jni_mangle("com.my_app"), "com_my_1app");
        assert_eq!(jni_mangle("get_x"), "get_1x");
    }

    #[test]
    fn jni_symbol___combines_package_class_and_method() {
        assert_eq!(
            jni_symbol("com.example.bridge", "NavigationNative", "getSpeedAttribute"),
            "Java_com_example_bridge_NavigationNative_getSpeedAttribute"
        );
    }

    #[test]
    fn java_identifier___escapes_keywords_only() {
        assert_eq!(java_identifier("class"), "class_");
        assert_eq!(java_identifier("speed"), "speed");
    }
}
