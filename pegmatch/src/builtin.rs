//! Built-in single-character classes, usable as bare rule references.

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Builtin {
    Letter,
    Digit,
    Alnum,
    Space,
    Upper,
    Lower,
}

impl Builtin {
    /// Resolves a reference that names no user-defined rule.
    pub(crate) fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "letter" => Builtin::Letter,
            "digit" => Builtin::Digit,
            "alnum" => Builtin::Alnum,
            "space" => Builtin::Space,
            "upper" => Builtin::Upper,
            "lower" => Builtin::Lower,
            _ => return None,
        })
    }

    pub(crate) fn matches(&self, c: char) -> bool {
        match self {
            Builtin::Letter => c.is_alphabetic(),
            Builtin::Digit => c.is_ascii_digit(),
            Builtin::Alnum => c.is_alphabetic() || c.is_ascii_digit(),
            Builtin::Space => c.is_whitespace(),
            Builtin::Upper => c.is_uppercase(),
            Builtin::Lower => c.is_lowercase(),
        }
    }
}
