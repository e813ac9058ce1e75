use codegraph_core::TypeFlavor;

/// The result of normalizing a raw type-text string from the type server
/// (or a declared annotation) into the shape `TypeEntity` wants.
pub struct NormalizedType {
    pub canonical_text: String,
    pub flavor: TypeFlavor,
    pub is_nullable: bool,
}

/// Type-text normalization rules (non-exhaustive): trailing
/// `| None` / `Optional[T]` sets `is_nullable` and unwraps to `T`;
/// bracket/angle generics set `Generic`; `A | B` unions set `Union`;
/// callable arrows set `Callable`.
pub fn normalize_type_text(raw: &str) -> NormalizedType {
    let raw = raw.trim();

    if let Some(inner) = raw.strip_prefix("Optional[").and_then(|s| s.strip_suffix(']')) {
        let mut inner = normalize_type_text(inner);
        inner.is_nullable = true;
        return inner;
    }

    if let Some(stripped) = raw.strip_suffix("| None").map(str::trim) {
        let mut inner = normalize_type_text(stripped);
        inner.is_nullable = true;
        return inner;
    }
    if let Some(stripped) = raw.strip_suffix("None | ").map(str::trim) {
        let mut inner = normalize_type_text(stripped);
        inner.is_nullable = true;
        return inner;
    }

    if raw.contains("->") {
        return NormalizedType {
            canonical_text: raw.to_string(),
            flavor: TypeFlavor::Callable,
            is_nullable: false,
        };
    }

    if raw.contains('|') {
        return NormalizedType {
            canonical_text: raw.to_string(),
            flavor: TypeFlavor::Union,
            is_nullable: false,
        };
    }

    if (raw.contains('[') && raw.ends_with(']')) || (raw.contains('<') && raw.ends_with('>')) {
        return NormalizedType {
            canonical_text: raw.to_string(),
            flavor: TypeFlavor::Generic,
            is_nullable: false,
        };
    }

    let flavor = if is_primitive(raw) {
        TypeFlavor::Primitive
    } else if is_builtin(raw) {
        TypeFlavor::Builtin
    } else {
        TypeFlavor::User
    };

    NormalizedType {
        canonical_text: raw.to_string(),
        flavor,
        is_nullable: false,
    }
}

fn is_primitive(text: &str) -> bool {
    matches!(
        text,
        "int" | "float" | "bool" | "str" | "bytes" | "None" | "NoneType"
    )
}

fn is_builtin(text: &str) -> bool {
    matches!(
        text,
        "list" | "dict" | "set" | "tuple" | "frozenset" | "object" | "Any"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unwraps_optional_and_marks_nullable() {
        let n = normalize_type_text("Optional[str]");
        assert_eq!(n.canonical_text, "str");
        assert!(n.is_nullable);
        assert_eq!(n.flavor, TypeFlavor::Primitive);
    }

    #[test]
    fn unwraps_pipe_none_suffix() {
        let n = normalize_type_text("int | None");
        assert!(n.is_nullable);
        assert_eq!(n.canonical_text, "int");
    }

    #[test]
    fn detects_generic_brackets() {
        let n = normalize_type_text("list[int]");
        assert_eq!(n.flavor, TypeFlavor::Generic);
    }

    #[test]
    fn detects_union() {
        let n = normalize_type_text("int | str");
        assert_eq!(n.flavor, TypeFlavor::Union);
    }

    #[test]
    fn detects_callable() {
        let n = normalize_type_text("(int) -> str");
        assert_eq!(n.flavor, TypeFlavor::Callable);
    }
}
