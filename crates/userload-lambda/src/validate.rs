//! Requester validation

use crate::error::ValidationError;
use crate::metadata::CompiledMetadata;

/// Leaves every object must carry under `requester`
pub const REQUIRED_REQUESTER_FIELDS: [&str; 4] = ["exid", "ip", "city", "countrycode"];

/// Fails unless `requester.{exid,ip,city,countrycode}` are all present as values.
pub fn validate_requester(meta: &CompiledMetadata) -> Result<(), ValidationError> {
    let missing: Vec<&'static str> = REQUIRED_REQUESTER_FIELDS
        .iter()
        .copied()
        .filter(|field| meta.leaf(&["requester", *field]).is_none())
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(ValidationError { missing })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::metadata::compile;
    use std::collections::HashMap;

    fn meta(pairs: &[(&str, &str)]) -> CompiledMetadata {
        let raw: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        compile(&raw).unwrap()
    }

    #[test]
    fn test_complete_requester_passes() {
        let meta = meta(&[
            ("requester-exid", "admin|exid"),
            ("requester-ip", "1.2.3.4"),
            ("requester-city", "Minas Tirith"),
            ("requester-countrycode", "Gondor"),
        ]);
        assert!(validate_requester(&meta).is_ok());
    }

    #[test]
    fn test_missing_requester_lists_every_field() {
        let err = validate_requester(&CompiledMetadata::new()).unwrap_err();
        assert_eq!(err.missing, vec!["exid", "ip", "city", "countrycode"]);
    }

    #[test]
    fn test_partial_requester_fails() {
        let meta = meta(&[
            ("requester-exid", "admin|exid"),
            ("requester-ip", "1.2.3.4"),
            ("requester-city", "Minas Tirith"),
        ]);
        let err = validate_requester(&meta).unwrap_err();
        assert_eq!(err.missing, vec!["countrycode"]);
        assert!(err.to_string().contains("requester.countrycode"));
    }

    #[test]
    fn test_requester_as_plain_value_fails() {
        let meta = meta(&[("requester", "admin")]);
        assert!(validate_requester(&meta).is_err());
    }

    #[test]
    fn test_nested_field_is_not_a_value() {
        let meta = meta(&[
            ("requester-exid-scheme", "oidc"),
            ("requester-ip", "1.2.3.4"),
            ("requester-city", "Minas Tirith"),
            ("requester-countrycode", "Gondor"),
        ]);
        assert_eq!(validate_requester(&meta).unwrap_err().missing, vec!["exid"]);
    }
}
