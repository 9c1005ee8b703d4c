//! Binds template variables to resolved key values and static parameters

use crate::error::{Error, Result};
use crate::types::InputBinding;
use std::collections::{BTreeMap, HashMap};

/// Resolves template inputs for one computed key
///
/// Lookups go strictly through the already-resolved key values; a binding to
/// a key that has not been resolved is an error, never a default. Static
/// parameters fill in variables that no binding provides.
pub struct Resolver<'a, V> {
    resolved: &'a HashMap<String, V>,
    params: &'a BTreeMap<String, String>,
}

impl<'a, V: AsRef<str>> Resolver<'a, V> {
    pub fn new(resolved: &'a HashMap<String, V>, params: &'a BTreeMap<String, String>) -> Self {
        Self { resolved, params }
    }

    /// Build the variable map for a template
    ///
    /// Bound keys take precedence over static parameters of the same name.
    pub fn resolve_inputs(&self, inputs: &[InputBinding]) -> Result<HashMap<String, String>> {
        let mut values = HashMap::with_capacity(inputs.len() + self.params.len());

        for (i, input) in inputs.iter().enumerate() {
            let value = self.resolved.get(&input.key).ok_or_else(|| {
                Error::validation(
                    format!("inputs[{i}].key"),
                    format!(
                        "key '{}' (bound to variable '{}') has no resolved value",
                        input.key, input.var
                    ),
                )
            })?;
            values.insert(input.var.clone(), value.as_ref().to_string());
        }

        for (name, value) in self.params {
            values
                .entry(name.clone())
                .or_insert_with(|| value.clone());
        }

        Ok(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn binding(var: &str, key: &str) -> InputBinding {
        InputBinding {
            var: var.to_string(),
            key: key.to_string(),
        }
    }

    fn resolved(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_resolve_inputs_maps_vars_to_key_values() {
        let values = resolved(&[("username", "admin"), ("password", "secret123")]);
        let params = BTreeMap::new();
        let resolver = Resolver::new(&values, &params);

        let out = resolver
            .resolve_inputs(&[binding("user", "username"), binding("pass", "password")])
            .unwrap();

        assert_eq!(out["user"], "admin");
        assert_eq!(out["pass"], "secret123");
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn test_missing_key_is_validation_error() {
        let values = resolved(&[("username", "admin")]);
        let params = BTreeMap::new();
        let resolver = Resolver::new(&values, &params);

        let err = resolver
            .resolve_inputs(&[binding("user", "username"), binding("pass", "password")])
            .unwrap_err();

        match err {
            Error::Validation { field, message } => {
                assert_eq!(field, "inputs[1].key");
                assert!(message.contains("password"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_params_merged_when_not_bound() {
        let values = resolved(&[("username", "admin")]);
        let params: BTreeMap<String, String> = [("host".to_string(), "localhost".to_string())]
            .into_iter()
            .collect();
        let resolver = Resolver::new(&values, &params);

        let out = resolver.resolve_inputs(&[binding("user", "username")]).unwrap();
        assert_eq!(out["host"], "localhost");
    }

    #[test]
    fn test_bound_keys_win_over_params() {
        let values = resolved(&[("db_host", "db.internal")]);
        let params: BTreeMap<String, String> = [("host".to_string(), "localhost".to_string())]
            .into_iter()
            .collect();
        let resolver = Resolver::new(&values, &params);

        let out = resolver.resolve_inputs(&[binding("host", "db_host")]).unwrap();
        assert_eq!(out["host"], "db.internal");
    }
}
