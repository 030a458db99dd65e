//! Serde helpers for PATCH bodies.

use serde::{Deserialize, Deserializer};

/// Tell an absent field apart from an explicit `null`.
///
/// Pair with `#[serde(default)]`: absent gives `None` (leave alone), `null`
/// gives `Some(None)` (clear), a value gives `Some(Some(v))`.
pub fn double_option<'de, T, D>(de: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(de).map(Some)
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct MemberPatch {
        #[serde(default, deserialize_with = "super::double_option")]
        email: Option<Option<String>>,
    }

    fn parse(json: &str) -> Option<Option<String>> {
        serde_json::from_str::<MemberPatch>(json).unwrap().email
    }

    #[test]
    fn absent_field_leaves_value_alone() {
        assert_eq!(parse("{}"), None);
    }

    #[test]
    fn null_clears() {
        assert_eq!(parse(r#"{"email": null}"#), Some(None));
    }

    #[test]
    fn value_sets() {
        assert_eq!(
            parse(r#"{"email": "lea@example.com"}"#),
            Some(Some("lea@example.com".to_string()))
        );
    }
}
