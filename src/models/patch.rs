//! Tri-state field for partial updates.
//!
//! A JSON body distinguishes three cases for every optional field: the key is
//! missing, the key is present with `null`, or the key carries a value. A plain
//! `Option<T>` folds the first two together, which makes "clear this field"
//! inexpressible. Pair `Patch<T>` with `#[serde(default)]` on the field.

use serde::{Deserialize, Deserializer};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Patch<T> {
    /// Field not sent; keep the stored value.
    #[default]
    Absent,
    /// Field sent as `null`; clear the stored value.
    Clear,
    /// Field sent with a value; replace the stored value.
    Set(T),
}

impl<T> Patch<T> {
    /// Resolve against the currently stored value.
    pub fn apply(self, current: Option<T>) -> Option<T> {
        match self {
            Self::Absent => current,
            Self::Clear => None,
            Self::Set(value) => Some(value),
        }
    }

    pub fn as_set(&self) -> Option<&T> {
        match self {
            Self::Set(value) => Some(value),
            _ => None,
        }
    }
}

impl<'de, T> Deserialize<'de> for Patch<T>
where
    T: Deserialize<'de>,
{
    // Only reached when the key is present; a missing key takes the default.
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Option::<T>::deserialize(deserializer)? {
            Some(value) => Self::Set(value),
            None => Self::Clear,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Deserialize)]
    struct Body {
        #[serde(default)]
        bio: Patch<String>,
    }

    #[test]
    fn test_missing_key_is_absent() {
        let body: Body = serde_json::from_str("{}").unwrap();
        assert_eq!(body.bio, Patch::Absent);
    }

    #[test]
    fn test_null_is_clear() {
        let body: Body = serde_json::from_str(r#"{"bio": null}"#).unwrap();
        assert_eq!(body.bio, Patch::Clear);
    }

    #[test]
    fn test_value_is_set() {
        let body: Body = serde_json::from_str(r#"{"bio": "hi"}"#).unwrap();
        assert_eq!(body.bio, Patch::Set("hi".to_string()));
    }

    #[test]
    fn test_apply() {
        let current = Some("old".to_string());
        assert_eq!(Patch::Absent.apply(current.clone()), current);
        assert_eq!(Patch::<String>::Clear.apply(current.clone()), None);
        assert_eq!(
            Patch::Set("new".to_string()).apply(current),
            Some("new".to_string())
        );
    }
}
