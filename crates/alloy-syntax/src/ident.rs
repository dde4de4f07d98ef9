/// Reports whether `s` is a valid Alloy identifier: an ASCII letter or
/// underscore followed by letters, digits or underscores.
pub fn is_valid_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Turns `s` into a valid identifier. Invalid characters become `_` and a
/// leading digit gets a `_` prefix. The empty string maps to `_`.
pub fn sanitize_identifier(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 1);
    if !s.starts_with(|c: char| c.is_ascii_alphabetic() || c == '_') {
        out.push('_');
    }
    out.extend(s.chars().map(|c| {
        if c.is_ascii_alphanumeric() || c == '_' {
            c
        } else {
            '_'
        }
    }));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_valid_identifier() {
        let tests = vec![
            ("default", true),
            ("_2", true),
            ("otlp_http", true),
            ("2", false),
            ("", false),
            ("a-b", false),
            ("a.b", false),
        ];
        for (input, want) in tests {
            assert_eq!(is_valid_identifier(input), want, "input {:?}", input);
        }
    }

    #[test]
    fn test_sanitize_identifier() {
        let tests = vec![
            ("default", "default"),
            ("2", "_2"),
            ("a-b", "a_b"),
            ("team/a", "team_a"),
            ("", "_"),
        ];
        for (input, want) in tests {
            let got = sanitize_identifier(input);
            assert_eq!(got, want, "input {:?}", input);
            assert!(is_valid_identifier(&got), "output {:?}", got);
        }
    }
}
