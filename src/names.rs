//! Naming policies for declared names.

/// Marker the build system mangles internal module names with.
pub const DEFAULT_HIDDEN_MARKER: &str = "__";

/// Whether `name` follows the internal-naming convention for `marker`.
///
/// Packed libraries expose their implementation units as `Lib__Impl`; such
/// modules are hidden unless a canonical path says where they really live.
pub fn is_internal(name: &str, marker: &str) -> bool {
    !marker.is_empty() && name.contains(marker)
}

/// Whether `name` is an operator rather than an alphanumeric identifier.
pub fn is_operator(name: &str) -> bool {
    match name.chars().next() {
        Some(c) => !(c.is_alphabetic() || c == '_' || c == '\''),
        None => false,
    }
}

/// Wrap operator names in parentheses: `+` becomes `(+)`, `*` becomes `( * )`.
pub fn parenthesise(name: &str) -> String {
    if !is_operator(name) {
        name.to_string()
    } else if name.starts_with('*') || name.ends_with('*') {
        format!("( {} )", name)
    } else {
        format!("({})", name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_internal() {
        assert!(is_internal("Stdlib__List", DEFAULT_HIDDEN_MARKER));
        assert!(is_internal("__private", DEFAULT_HIDDEN_MARKER));
        assert!(!is_internal("List", DEFAULT_HIDDEN_MARKER));
        assert!(!is_internal("a_b", DEFAULT_HIDDEN_MARKER));
        assert!(!is_internal("Anything", ""));
    }

    #[test]
    fn test_parenthesise() {
        assert_eq!(parenthesise("map"), "map");
        assert_eq!(parenthesise("_x"), "_x");
        assert_eq!(parenthesise("+"), "(+)");
        assert_eq!(parenthesise(">>="), "(>>=)");
        assert_eq!(parenthesise("*"), "( * )");
        assert_eq!(parenthesise("**"), "( ** )");
    }
}
