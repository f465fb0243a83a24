//! Attribute and path helpers shared by the checkers.

use syn::{Attribute, Path};

/// Checks if attributes contain an `#[allow(...)]` for one of `lint_names`.
///
/// Whitespace is ignored, so `clippy :: unwrap_used` matches too.
#[must_use]
pub fn has_allow_attr(attrs: &[Attribute], lint_names: &[&str]) -> bool {
    attrs
        .iter()
        .filter(|attr| attr.path().is_ident("allow"))
        .map(|attr| quote::quote!(#attr).to_string().replace(' ', ""))
        .any(|text| lint_names.iter().any(|name| text.contains(name)))
}

/// Checks if attributes contain `#[test]` (or `#[tokio::test]` and friends).
#[must_use]
pub fn has_test_attr(attrs: &[Attribute]) -> bool {
    attrs.iter().any(|attr| {
        attr.path()
            .segments
            .last()
            .is_some_and(|seg| seg.ident == "test")
    })
}

/// Checks if attributes contain a `#[cfg(...)]` mentioning `test`.
#[must_use]
pub fn has_cfg_test(attrs: &[Attribute]) -> bool {
    attrs
        .iter()
        .filter(|attr| attr.path().is_ident("cfg"))
        .any(|attr| {
            quote::quote!(#attr)
                .to_string()
                .split(|c: char| !c.is_alphanumeric() && c != '_')
                .any(|word| word == "test")
        })
}

/// Renders a path as `a::b::c`, ignoring generic arguments.
#[must_use]
pub fn path_to_string(path: &Path) -> String {
    path.segments
        .iter()
        .map(|seg| seg.ident.to_string())
        .collect::<Vec<_>>()
        .join("::")
}

#[cfg(test)]
mod tests {
    use super::*;
    use syn::parse_quote;

    #[test]
    fn test_has_allow_attr() {
        let attrs: Vec<Attribute> = vec![parse_quote!(#[allow(clippy::unwrap_used)])];
        assert!(has_allow_attr(&attrs, &["clippy::unwrap_used"]));
        assert!(!has_allow_attr(&attrs, &["clippy::expect_used"]));
    }

    #[test]
    fn test_has_test_attr() {
        let attrs: Vec<Attribute> = vec![parse_quote!(#[test])];
        assert!(has_test_attr(&attrs));

        let attrs: Vec<Attribute> = vec![parse_quote!(#[tokio::test])];
        assert!(has_test_attr(&attrs));

        let attrs: Vec<Attribute> = vec![parse_quote!(#[inline])];
        assert!(!has_test_attr(&attrs));
    }

    #[test]
    fn test_has_cfg_test() {
        let attrs: Vec<Attribute> = vec![parse_quote!(#[cfg(test)])];
        assert!(has_cfg_test(&attrs));

        let attrs: Vec<Attribute> = vec![parse_quote!(#[cfg(all(test, unix))])];
        assert!(has_cfg_test(&attrs));

        let attrs: Vec<Attribute> = vec![parse_quote!(#[cfg(feature = "testing")])];
        assert!(!has_cfg_test(&attrs));
    }

    #[test]
    fn test_path_to_string() {
        let path: Path = parse_quote!(std::fs::read_to_string);
        assert_eq!(path_to_string(&path), "std::fs::read_to_string");
    }
}
