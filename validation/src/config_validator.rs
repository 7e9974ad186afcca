//! Configuration Validator — structural checks on strategy configs
//!
//! Validates a strategy configuration (a `serde_json::Value`) against the
//! fixed schema: required keys, per-key types, ranges, and enumerations.
//! Checks are independent and additive — every type error on an input
//! surfaces, and a malformed collection short-circuits only that section's
//! deeper checks, never the whole validation.
//!
//! Field-name and code checks are delegated to optional collaborators
//! behind the [`FieldLookup`], [`SuggestionProvider`], and [`CodeValidator`]
//! seams; a validator built without them performs structural checks only.

use crate::report::{ValidationIssue, ValidationOutcome};
use crate::traits::{CodeValidator, FieldLookup, SuggestionProvider};
use serde_json::Value;
use std::sync::Arc;

/// Required top-level keys of a strategy config.
const REQUIRED_KEYS: &[&str] = &["name", "type", "required_fields", "parameters", "logic"];

/// All recognized top-level keys (required + optional).
const VALID_KEYS: &[&str] = &[
    "name",
    "type",
    "required_fields",
    "parameters",
    "logic",
    "description",
    "constraints",
    "optional_fields",
    "coverage_percentage",
];

/// Accepted strategy types.
const STRATEGY_TYPES: &[&str] = &["factor_graph", "llm_generated", "hybrid"];

/// Accepted parameter type declarations.
const PARAMETER_TYPES: &[&str] = &["int", "float", "bool", "str", "list"];

/// Accepted constraint severities.
const CONSTRAINT_SEVERITIES: &[&str] = &["critical", "high", "medium", "low"];

/// Structural validator over strategy configuration objects.
#[derive(Clone, Default)]
pub struct ConfigValidator {
    fields: Option<Arc<dyn FieldLookup>>,
    suggestions: Option<Arc<dyn SuggestionProvider>>,
    code: Option<Arc<dyn CodeValidator>>,
}

impl ConfigValidator {
    /// A structural-only validator (no field or code collaborators).
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a field-name lookup; `required_fields`/`optional_fields`
    /// entries will be resolved against it.
    pub fn with_field_lookup(mut self, fields: Arc<dyn FieldLookup>) -> Self {
        self.fields = Some(fields);
        self
    }

    /// Attach a suggestion provider; unresolved field names carry its
    /// correction hint verbatim.
    pub fn with_suggestions(mut self, suggestions: Arc<dyn SuggestionProvider>) -> Self {
        self.suggestions = Some(suggestions);
        self
    }

    /// Attach a code validator; `logic.entry` and `logic.exit` are run
    /// through it and its issues re-emitted under the logic path.
    pub fn with_code_validator(mut self, code: Arc<dyn CodeValidator>) -> Self {
        self.code = Some(code);
        self
    }

    /// Validate one configuration value.
    pub fn validate(&self, config: &Value) -> ValidationOutcome {
        let mut outcome = ValidationOutcome::valid();

        let Some(object) = config.as_object() else {
            outcome.push(ValidationIssue::error(
                "config",
                &format!(
                    "strategy config must be an object, got {}",
                    json_type_name(config)
                ),
            ));
            return outcome;
        };

        for key in REQUIRED_KEYS {
            if !object.contains_key(*key) {
                outcome.push(ValidationIssue::error(
                    key,
                    &format!("missing required key '{}'", key),
                ));
            }
        }

        for key in object.keys() {
            if !VALID_KEYS.contains(&key.as_str()) {
                outcome.push(ValidationIssue::warning(
                    key,
                    &format!(
                        "unknown key '{}' (valid keys: {})",
                        key,
                        VALID_KEYS.join(", ")
                    ),
                ));
            }
        }

        if let Some(name) = object.get("name") {
            if !name.is_string() {
                outcome.push(ValidationIssue::error(
                    "name",
                    &format!("'name' must be a string, got {}", json_type_name(name)),
                ));
            }
        }

        if let Some(kind) = object.get("type") {
            self.check_strategy_type(kind, &mut outcome);
        }

        if let Some(description) = object.get("description") {
            if !description.is_string() {
                outcome.push(ValidationIssue::error(
                    "description",
                    &format!(
                        "'description' must be a string, got {}",
                        json_type_name(description)
                    ),
                ));
            }
        }

        if let Some(coverage) = object.get("coverage_percentage") {
            match coverage.as_f64() {
                Some(pct) if (0.0..=100.0).contains(&pct) => {}
                Some(pct) => outcome.push(ValidationIssue::error(
                    "coverage_percentage",
                    &format!("'coverage_percentage' must be in [0, 100], got {}", pct),
                )),
                None => outcome.push(ValidationIssue::error(
                    "coverage_percentage",
                    &format!(
                        "'coverage_percentage' must be a number, got {}",
                        json_type_name(coverage)
                    ),
                )),
            }
        }

        if let Some(fields) = object.get("required_fields") {
            self.check_field_list("required_fields", fields, &mut outcome);
        }
        if let Some(fields) = object.get("optional_fields") {
            self.check_field_list("optional_fields", fields, &mut outcome);
        }

        if let Some(parameters) = object.get("parameters") {
            self.check_parameters(parameters, &mut outcome);
        }

        if let Some(logic) = object.get("logic") {
            self.check_logic(logic, &mut outcome);
        }

        if let Some(constraints) = object.get("constraints") {
            self.check_constraints(constraints, &mut outcome);
        }

        outcome
    }

    fn check_strategy_type(&self, kind: &Value, outcome: &mut ValidationOutcome) {
        match kind.as_str() {
            Some(s) if STRATEGY_TYPES.contains(&s) => {}
            Some(s) => outcome.push(
                ValidationIssue::error("type", &format!("unknown strategy type '{}'", s))
                    .with_suggestion(&format!("valid types: {}", STRATEGY_TYPES.join(", "))),
            ),
            None => outcome.push(ValidationIssue::error(
                "type",
                &format!("'type' must be a string, got {}", json_type_name(kind)),
            )),
        }
    }

    /// `required_fields` / `optional_fields`: items are strings or objects
    /// with a required `canonical_name` and optional `alias`/`usage`.
    fn check_field_list(&self, key: &str, list: &Value, outcome: &mut ValidationOutcome) {
        let Some(items) = list.as_array() else {
            outcome.push(ValidationIssue::error(
                key,
                &format!("'{}' must be a list, got {}", key, json_type_name(list)),
            ));
            return;
        };

        for (index, item) in items.iter().enumerate() {
            let path = format!("{}[{}]", key, index);
            match item {
                Value::String(name) => self.check_field_name(&path, name, outcome),
                Value::Object(entry) => {
                    match entry.get("canonical_name").and_then(Value::as_str) {
                        Some(name) => self.check_field_name(&path, name, outcome),
                        None => outcome.push(ValidationIssue::error(
                            &path,
                            "field entry requires a string 'canonical_name'",
                        )),
                    }
                    for optional in ["alias", "usage"] {
                        if let Some(value) = entry.get(optional) {
                            if !value.is_string() {
                                outcome.push(ValidationIssue::error(
                                    &format!("{}.{}", path, optional),
                                    &format!(
                                        "'{}' must be a string, got {}",
                                        optional,
                                        json_type_name(value)
                                    ),
                                ));
                            }
                        }
                    }
                }
                other => outcome.push(ValidationIssue::error(
                    &path,
                    &format!(
                        "field entry must be a string or object, got {}",
                        json_type_name(other)
                    ),
                )),
            }
        }
    }

    /// Resolve one field name through the lookup collaborator, if present.
    fn check_field_name(&self, path: &str, name: &str, outcome: &mut ValidationOutcome) {
        let Some(fields) = &self.fields else {
            return;
        };
        if fields.exists(name) {
            return;
        }
        let mut issue =
            ValidationIssue::error(path, &format!("unknown data field '{}'", name));
        if let Some(hint) = self
            .suggestions
            .as_ref()
            .and_then(|s| s.suggest_for(name))
        {
            issue = issue.with_suggestion(&hint);
        }
        outcome.push(issue);
    }

    fn check_parameters(&self, parameters: &Value, outcome: &mut ValidationOutcome) {
        let Some(items) = parameters.as_array() else {
            outcome.push(ValidationIssue::error(
                "parameters",
                &format!(
                    "'parameters' must be a list, got {}",
                    json_type_name(parameters)
                ),
            ));
            return;
        };

        for (index, item) in items.iter().enumerate() {
            let path = format!("parameters[{}]", index);
            let Some(entry) = item.as_object() else {
                outcome.push(ValidationIssue::error(
                    &path,
                    &format!("parameter must be an object, got {}", json_type_name(item)),
                ));
                continue;
            };

            let name = match entry.get("name").and_then(Value::as_str) {
                Some(n) => n.to_string(),
                None => {
                    outcome.push(ValidationIssue::error(
                        &format!("{}.name", path),
                        "parameter requires a string 'name'",
                    ));
                    format!("#{}", index)
                }
            };

            let declared = match entry.get("type").and_then(Value::as_str) {
                Some(t) if PARAMETER_TYPES.contains(&t) => Some(t),
                Some(t) => {
                    outcome.push(
                        ValidationIssue::error(
                            &format!("{}.type", path),
                            &format!("parameter '{}': unknown type '{}'", name, t),
                        )
                        .with_suggestion(&format!(
                            "valid types: {}",
                            PARAMETER_TYPES.join(", ")
                        )),
                    );
                    None
                }
                None => {
                    outcome.push(ValidationIssue::error(
                        &format!("{}.type", path),
                        &format!("parameter '{}' requires a string 'type'", name),
                    ));
                    None
                }
            };

            let value = entry.get("value");
            match (declared, value) {
                (Some(decl), Some(v)) => {
                    if !value_matches_type(decl, v) {
                        outcome.push(ValidationIssue::error(
                            &format!("{}.value", path),
                            &format!(
                                "parameter '{}': declared type '{}' but value is '{}'",
                                name,
                                decl,
                                json_type_name(v)
                            ),
                        ));
                    }
                }
                (_, None) => outcome.push(ValidationIssue::error(
                    &format!("{}.value", path),
                    &format!("parameter '{}' requires a 'value'", name),
                )),
                _ => {}
            }

            if let Some(range) = entry.get("range") {
                self.check_parameter_range(&path, &name, declared, value, range, outcome);
            }
        }
    }

    /// `range` must be a two-element numeric `[min, max]` with `min < max`.
    /// Declaring a range on a non-numeric type is a warning; a numeric value
    /// outside the range is an additional error.
    fn check_parameter_range(
        &self,
        path: &str,
        name: &str,
        declared: Option<&str>,
        value: Option<&Value>,
        range: &Value,
        outcome: &mut ValidationOutcome,
    ) {
        let range_path = format!("{}.range", path);
        let bounds = range.as_array().and_then(|pair| {
            if pair.len() == 2 {
                Some((pair[0].as_f64()?, pair[1].as_f64()?))
            } else {
                None
            }
        });

        let Some((min, max)) = bounds else {
            outcome.push(ValidationIssue::error(
                &range_path,
                &format!(
                    "parameter '{}': range must be a two-element numeric [min, max]",
                    name
                ),
            ));
            return;
        };

        if min >= max {
            outcome.push(ValidationIssue::error(
                &range_path,
                &format!(
                    "parameter '{}': range min {} must be less than max {}",
                    name, min, max
                ),
            ));
            return;
        }

        match declared {
            Some("int") | Some("float") => {
                if let Some(actual) = value.and_then(Value::as_f64) {
                    if actual < min || actual > max {
                        outcome.push(ValidationIssue::error(
                            &format!("{}.value", path),
                            &format!(
                                "parameter '{}': value {} outside range [{}, {}]",
                                name, actual, min, max
                            ),
                        ));
                    }
                }
            }
            Some(other) => outcome.push(ValidationIssue::warning(
                &range_path,
                &format!(
                    "parameter '{}': range declared on non-numeric type '{}'",
                    name, other
                ),
            )),
            None => {}
        }
    }

    fn check_logic(&self, logic: &Value, outcome: &mut ValidationOutcome) {
        let Some(entry_map) = logic.as_object() else {
            outcome.push(ValidationIssue::error(
                "logic",
                &format!("'logic' must be an object, got {}", json_type_name(logic)),
            ));
            return;
        };

        for key in ["entry", "exit"] {
            let path = format!("logic.{}", key);
            match entry_map.get(key) {
                Some(Value::String(code)) => {
                    if let Some(validator) = &self.code {
                        let nested = validator.validate_code(code);
                        for issue in nested.issues {
                            outcome.push(issue.prefixed(&path));
                        }
                    }
                }
                Some(other) => outcome.push(ValidationIssue::error(
                    &path,
                    &format!(
                        "'logic.{}' must be a string, got {}",
                        key,
                        json_type_name(other)
                    ),
                )),
                None => outcome.push(ValidationIssue::error(
                    &path,
                    &format!("logic requires '{}'", key),
                )),
            }
        }

        if let Some(dependencies) = entry_map.get("dependencies") {
            match dependencies.as_array() {
                Some(items) => {
                    for (index, item) in items.iter().enumerate() {
                        if !item.is_string() {
                            outcome.push(ValidationIssue::error(
                                &format!("logic.dependencies[{}]", index),
                                &format!(
                                    "dependency must be a string, got {}",
                                    json_type_name(item)
                                ),
                            ));
                        }
                    }
                }
                None => outcome.push(ValidationIssue::error(
                    "logic.dependencies",
                    &format!(
                        "'logic.dependencies' must be a list, got {}",
                        json_type_name(dependencies)
                    ),
                )),
            }
        }
    }

    fn check_constraints(&self, constraints: &Value, outcome: &mut ValidationOutcome) {
        let Some(items) = constraints.as_array() else {
            outcome.push(ValidationIssue::error(
                "constraints",
                &format!(
                    "'constraints' must be a list, got {}",
                    json_type_name(constraints)
                ),
            ));
            return;
        };

        for (index, item) in items.iter().enumerate() {
            let path = format!("constraints[{}]", index);
            let Some(entry) = item.as_object() else {
                outcome.push(ValidationIssue::error(
                    &path,
                    &format!(
                        "constraint must be an object, got {}",
                        json_type_name(item)
                    ),
                ));
                continue;
            };

            for key in ["type", "condition", "message"] {
                match entry.get(key) {
                    Some(v) if v.is_string() => {}
                    Some(v) => outcome.push(ValidationIssue::error(
                        &format!("{}.{}", path, key),
                        &format!("'{}' must be a string, got {}", key, json_type_name(v)),
                    )),
                    None => outcome.push(ValidationIssue::error(
                        &format!("{}.{}", path, key),
                        &format!("constraint requires '{}'", key),
                    )),
                }
            }

            let severity_path = format!("{}.severity", path);
            match entry.get("severity").and_then(Value::as_str) {
                Some(s) if CONSTRAINT_SEVERITIES.contains(&s) => {}
                Some(s) => outcome.push(
                    ValidationIssue::error(
                        &severity_path,
                        &format!("unknown constraint severity '{}'", s),
                    )
                    .with_suggestion(&format!(
                        "valid severities: {}",
                        CONSTRAINT_SEVERITIES.join(", ")
                    )),
                ),
                None => outcome.push(ValidationIssue::error(
                    &severity_path,
                    "constraint requires a string 'severity'",
                )),
            }
        }
    }
}

fn value_matches_type(declared: &str, value: &Value) -> bool {
    match declared {
        "int" => value.is_i64() || value.is_u64(),
        // Float declarations accept integer values.
        "float" => value.is_number(),
        "bool" => value.is_boolean(),
        "str" => value.is_string(),
        "list" => value.is_array(),
        _ => false,
    }
}

/// Python-facing type name of a JSON value, for error messages that the
/// generating model can act on.
fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(n) if n.is_i64() || n.is_u64() => "int",
        Value::Number(_) => "float",
        Value::String(_) => "str",
        Value::Array(_) => "list",
        Value::Object(_) => "dict",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corrector::AutoCorrector;
    use crate::manifest::FieldManifest;
    use serde_json::json;

    fn structural() -> ConfigValidator {
        ConfigValidator::new()
    }

    fn full() -> ConfigValidator {
        let manifest = Arc::new(FieldManifest::builtin());
        ConfigValidator::new()
            .with_field_lookup(manifest.clone())
            .with_suggestions(Arc::new(AutoCorrector::new(manifest.clone())))
            .with_code_validator(Arc::new(crate::code_validator::AstCodeValidator::new(
                manifest,
            )))
    }

    fn valid_config() -> Value {
        json!({
            "name": "momentum_breakout",
            "type": "llm_generated",
            "required_fields": ["close", {"canonical_name": "成交金額", "usage": "liquidity filter"}],
            "parameters": [
                {"name": "window", "type": "int", "value": 20, "range": [5, 120]},
                {"name": "threshold", "type": "float", "value": 2, "range": [0.5, 10.0]}
            ],
            "logic": {
                "entry": "data.get('close') > data.get('開盤價')",
                "exit": "data.get('rsi') > 70",
                "dependencies": ["close", "rsi"]
            }
        })
    }

    #[test]
    fn test_valid_config_passes() {
        let outcome = full().validate(&valid_config());
        assert!(outcome.is_valid(), "unexpected issues: {:?}", outcome.issues);
    }

    #[test]
    fn test_non_object_short_circuits() {
        let outcome = structural().validate(&json!([1, 2, 3]));
        assert_eq!(outcome.issues.len(), 1);
        assert_eq!(outcome.issues[0].subject, "config");
    }

    #[test]
    fn test_missing_required_keys_one_error_each() {
        // {"name": "X"} is missing type, required_fields, parameters, logic:
        // exactly 4 errors, 0 warnings.
        let outcome = structural().validate(&json!({"name": "X"}));
        assert_eq!(outcome.error_count(), 4);
        assert_eq!(outcome.warning_count(), 0);
    }

    #[test]
    fn test_unknown_key_is_warning_not_error() {
        let mut config = valid_config();
        config["surprise"] = json!(1);
        let outcome = structural().validate(&config);
        assert!(outcome.is_valid());
        assert_eq!(outcome.warning_count(), 1);
        let warning = outcome.warnings().next().unwrap();
        assert!(warning.message.contains("surprise"));
        assert!(warning.message.contains("coverage_percentage"));
    }

    #[test]
    fn test_bad_strategy_type_lists_valid_values() {
        let mut config = valid_config();
        config["type"] = json!("quantum");
        let outcome = structural().validate(&config);
        assert_eq!(outcome.error_count(), 1);
        let issue = outcome.errors().next().unwrap();
        assert!(issue.suggestion.as_deref().unwrap().contains("factor_graph"));
    }

    #[test]
    fn test_type_errors_are_additive() {
        let config = json!({
            "name": 42,
            "type": true,
            "required_fields": "close",
            "parameters": {},
            "logic": []
        });
        let outcome = structural().validate(&config);
        // One independent error per malformed key.
        assert_eq!(outcome.error_count(), 5);
    }

    #[test]
    fn test_parameter_type_mismatch_names_both_types() {
        let mut config = valid_config();
        config["parameters"] = json!([{"name": "p", "type": "int", "value": "20"}]);
        let outcome = structural().validate(&config);
        assert_eq!(outcome.error_count(), 1);
        let message = &outcome.errors().next().unwrap().message;
        assert!(message.contains("'int'"));
        assert!(message.contains("'str'"));
    }

    #[test]
    fn test_float_declaration_accepts_integer_value() {
        let mut config = valid_config();
        config["parameters"] = json!([{"name": "p", "type": "float", "value": 3}]);
        let outcome = structural().validate(&config);
        assert!(outcome.is_valid());
    }

    #[test]
    fn test_int_declaration_rejects_float_value() {
        let mut config = valid_config();
        config["parameters"] = json!([{"name": "p", "type": "int", "value": 3.5}]);
        let outcome = structural().validate(&config);
        assert_eq!(outcome.error_count(), 1);
    }

    #[test]
    fn test_value_outside_range_is_extra_error() {
        let mut config = valid_config();
        config["parameters"] = json!([
            {"name": "p", "type": "int", "value": 500, "range": [5, 120]}
        ]);
        let outcome = structural().validate(&config);
        assert_eq!(outcome.error_count(), 1);
        assert!(outcome.errors().next().unwrap().message.contains("outside range"));
    }

    #[test]
    fn test_range_on_non_numeric_type_is_warning() {
        let mut config = valid_config();
        config["parameters"] = json!([
            {"name": "p", "type": "str", "value": "x", "range": [0, 1]}
        ]);
        let outcome = structural().validate(&config);
        assert!(outcome.is_valid());
        assert_eq!(outcome.warning_count(), 1);
    }

    #[test]
    fn test_malformed_range_is_error() {
        let mut config = valid_config();
        config["parameters"] = json!([
            {"name": "p", "type": "int", "value": 10, "range": [5]}
        ]);
        let outcome = structural().validate(&config);
        assert_eq!(outcome.error_count(), 1);
    }

    #[test]
    fn test_inverted_range_is_error() {
        let mut config = valid_config();
        config["parameters"] = json!([
            {"name": "p", "type": "int", "value": 10, "range": [120, 5]}
        ]);
        let outcome = structural().validate(&config);
        assert_eq!(outcome.error_count(), 1);
        assert!(outcome.errors().next().unwrap().message.contains("less than"));
    }

    #[test]
    fn test_malformed_parameters_short_circuits_only_that_section() {
        let mut config = valid_config();
        config["parameters"] = json!("not a list");
        config["logic"] = json!({"entry": "data.get('close')"});
        let outcome = structural().validate(&config);
        // parameters error + missing logic.exit error: the logic section
        // still ran.
        assert_eq!(outcome.error_count(), 2);
    }

    #[test]
    fn test_field_suggestions_surface_verbatim() {
        let mut config = valid_config();
        config["required_fields"] = json!(["trading_volume"]);
        let outcome = full().validate(&config);
        assert_eq!(outcome.error_count(), 1);
        let issue = outcome.errors().next().unwrap();
        assert_eq!(issue.subject, "required_fields[0]");
        assert_eq!(issue.suggestion.as_deref(), Some("did you mean '成交金額'?"));
    }

    #[test]
    fn test_field_entries_validate_without_lookup() {
        // Structural validator: field names are unchecked, shapes still are.
        let mut config = valid_config();
        config["required_fields"] = json!(["whatever", 42]);
        let outcome = structural().validate(&config);
        assert_eq!(outcome.error_count(), 1); // only the non-string item
    }

    #[test]
    fn test_field_object_requires_canonical_name() {
        let mut config = valid_config();
        config["required_fields"] = json!([{"alias": "close"}]);
        let outcome = structural().validate(&config);
        assert_eq!(outcome.error_count(), 1);
        assert!(outcome
            .errors()
            .next()
            .unwrap()
            .message
            .contains("canonical_name"));
    }

    #[test]
    fn test_logic_code_issues_carry_path_prefix() {
        let mut config = valid_config();
        config["logic"] = json!({
            "entry": "data.get('bogus_field')",
            "exit": "data.get('close')"
        });
        let outcome = full().validate(&config);
        assert_eq!(outcome.error_count(), 1);
        let issue = outcome.errors().next().unwrap();
        assert!(issue.subject.starts_with("logic.entry"));
        assert!(issue.subject.contains("bogus_field"));
    }

    #[test]
    fn test_logic_dependencies_item_errors_are_individual() {
        let mut config = valid_config();
        config["logic"] = json!({
            "entry": "data.get('close')",
            "exit": "data.get('close')",
            "dependencies": ["close", 7, null]
        });
        let outcome = structural().validate(&config);
        assert_eq!(outcome.error_count(), 2);
    }

    #[test]
    fn test_constraint_severity_enumeration() {
        let mut config = valid_config();
        config["constraints"] = json!([
            {"type": "risk", "condition": "drawdown < 0.2", "severity": "fatal", "message": "cap drawdown"}
        ]);
        let outcome = structural().validate(&config);
        assert_eq!(outcome.error_count(), 1);
        let issue = outcome.errors().next().unwrap();
        assert!(issue.suggestion.as_deref().unwrap().contains("critical"));
    }

    #[test]
    fn test_constraint_missing_keys() {
        let mut config = valid_config();
        config["constraints"] = json!([{"severity": "high"}]);
        let outcome = structural().validate(&config);
        // type, condition, message all missing.
        assert_eq!(outcome.error_count(), 3);
    }

    #[test]
    fn test_coverage_percentage_bounds() {
        let mut config = valid_config();
        config["coverage_percentage"] = json!(120);
        let outcome = structural().validate(&config);
        assert_eq!(outcome.error_count(), 1);

        config["coverage_percentage"] = json!(85.5);
        assert!(structural().validate(&config).is_valid());
    }

    #[test]
    fn test_validation_is_idempotent() {
        let validator = full();
        let mut config = valid_config();
        config["required_fields"] = json!(["trading_volume"]);
        let a = validator.validate(&config);
        let b = validator.validate(&config);
        assert_eq!(a.issues.len(), b.issues.len());
        assert_eq!(a.issues[0].message, b.issues[0].message);
    }
}
