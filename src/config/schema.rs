// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 jobflow contributors

//! Declarative attribute schemas
//!
//! Every config-backed entity (repository, step, trait) declares its
//! attributes as a table of [`AttributeSpec`]s. User-supplied mappings are
//! deep-merged over the declared defaults and validated once, at
//! construction; the raw mapping never travels further into the core.
//!
//! Merge rules: the user wins on scalar conflicts, list values are
//! concatenated then deduplicated, nested mappings merge recursively.
//! Unknown keys are tolerated.

use serde_yaml::{Mapping, Value};

use crate::errors::{JobflowError, JobflowResult};

/// Expected shape of an attribute value.
#[derive(Debug, Clone, Copy)]
pub enum Expect {
    /// Any value (validated downstream by the consuming entity)
    Any,
    /// A boolean
    Bool,
    /// A string
    Str,
    /// A list of strings
    StrList,
    /// A nested mapping
    Mapping,
    /// A string drawn from a closed value set
    OneOf(&'static [&'static str]),
}

/// Declarative spec for one attribute of a config-backed entity.
#[derive(Debug, Clone)]
pub struct AttributeSpec {
    name: &'static str,
    doc: &'static str,
    required: bool,
    default: Option<Value>,
    expect: Expect,
}

impl AttributeSpec {
    /// A required attribute with no default.
    pub fn required(name: &'static str, doc: &'static str, expect: Expect) -> Self {
        Self {
            name,
            doc,
            required: true,
            default: None,
            expect,
        }
    }

    /// An optional attribute with a declared default.
    pub fn optional(
        name: &'static str,
        doc: &'static str,
        expect: Expect,
        default: impl Into<Value>,
    ) -> Self {
        Self {
            name,
            doc,
            required: false,
            default: Some(default.into()),
            expect,
        }
    }

    /// An optional attribute that is simply absent when not configured.
    pub fn optional_absent(name: &'static str, doc: &'static str, expect: Expect) -> Self {
        Self {
            name,
            doc,
            required: false,
            default: None,
            expect,
        }
    }

    /// Attribute name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// One-line documentation of the attribute.
    pub fn doc(&self) -> &'static str {
        self.doc
    }
}

/// Deep-merge a user value over a base (default) value.
///
/// Mappings merge key-wise, sequences are concatenated then deduplicated,
/// everything else is replaced by the user value.
pub fn deep_merge(base: Value, user: Value) -> Value {
    match (base, user) {
        (Value::Mapping(mut base), Value::Mapping(user)) => {
            for (key, user_value) in user {
                let merged = match base.remove(&key) {
                    Some(base_value) => deep_merge(base_value, user_value),
                    None => user_value,
                };
                base.insert(key, merged);
            }
            Value::Mapping(base)
        }
        (Value::Sequence(base), Value::Sequence(user)) => {
            let mut merged = base;
            for item in user {
                if !merged.contains(&item) {
                    merged.push(item);
                }
            }
            Value::Sequence(merged)
        }
        (_, user) => user,
    }
}

/// Merged and validated attribute set for one entity.
///
/// `entity` is a human-readable designator ("trait 'release' of job 'build'")
/// used verbatim in error messages.
#[derive(Debug, Clone, PartialEq)]
pub struct Attributes {
    entity: String,
    values: Mapping,
}

impl Attributes {
    /// Merge `user` over the defaults declared in `specs` and validate the
    /// result. Fails with a configuration error naming the entity and key on
    /// a missing required attribute or a value outside its declared shape.
    pub fn build(entity: &str, specs: &[AttributeSpec], user: &Mapping) -> JobflowResult<Self> {
        let mut values = Mapping::new();
        for spec in specs {
            if let Some(default) = &spec.default {
                values.insert(Value::from(spec.name), default.clone());
            }
        }

        for (key, user_value) in user.clone() {
            let merged = match values.remove(&key) {
                Some(default) => deep_merge(default, user_value),
                None => user_value,
            };
            values.insert(key, merged);
        }

        let attrs = Self {
            entity: entity.to_string(),
            values,
        };

        for spec in specs {
            match attrs.get(spec.name) {
                None => {
                    if spec.required {
                        return Err(JobflowError::MissingAttribute {
                            entity: attrs.entity.clone(),
                            key: spec.name.to_string(),
                        });
                    }
                }
                Some(value) => attrs.check_shape(spec, value)?,
            }
        }

        Ok(attrs)
    }

    fn check_shape(&self, spec: &AttributeSpec, value: &Value) -> JobflowResult<()> {
        let mismatch = |reason: String| JobflowError::InvalidAttributeValue {
            entity: self.entity.clone(),
            key: spec.name.to_string(),
            reason,
        };

        match spec.expect {
            Expect::Any => Ok(()),
            Expect::Bool => value
                .as_bool()
                .map(|_| ())
                .ok_or_else(|| mismatch("expected a boolean".into())),
            Expect::Str => value
                .as_str()
                .map(|_| ())
                .ok_or_else(|| mismatch("expected a string".into())),
            Expect::StrList => {
                let all_strings = value
                    .as_sequence()
                    .is_some_and(|seq| seq.iter().all(|v| v.as_str().is_some()));
                if all_strings {
                    Ok(())
                } else {
                    Err(mismatch("expected a list of strings".into()))
                }
            }
            Expect::Mapping => value
                .as_mapping()
                .map(|_| ())
                .ok_or_else(|| mismatch("expected a mapping".into())),
            Expect::OneOf(allowed) => {
                let ok = value.as_str().is_some_and(|s| allowed.contains(&s));
                if ok {
                    Ok(())
                } else {
                    Err(mismatch(format!("expected one of: {}", allowed.join(", "))))
                }
            }
        }
    }

    /// The entity designator used in error messages.
    pub fn entity(&self) -> &str {
        &self.entity
    }

    /// Raw value of an attribute. Explicit nulls count as absent.
    pub fn get(&self, name: &str) -> Option<&Value> {
        let key = Value::from(name);
        match self.values.get(&key) {
            Some(Value::Null) | None => None,
            Some(value) => Some(value),
        }
    }

    /// Whether the attribute carries a (non-null) value.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// String value of an attribute, if present.
    pub fn str_value(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_str)
    }

    /// Boolean value of an attribute, if present.
    pub fn bool_value(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(Value::as_bool)
    }

    /// String-list value of an attribute; empty when absent.
    pub fn str_list(&self, name: &str) -> Vec<String> {
        self.get(name)
            .and_then(Value::as_sequence)
            .map(|seq| {
                seq.iter()
                    .filter_map(Value::as_str)
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Nested mapping value of an attribute, if present.
    pub fn mapping(&self, name: &str) -> Option<&Mapping> {
        self.get(name).and_then(Value::as_mapping)
    }

    /// Store a derived attribute value (used by trait transformers that
    /// write computed defaults back, e.g. a derived component name).
    pub(crate) fn set(&mut self, name: &str, value: Value) {
        self.values.insert(Value::from(name), value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mapping(yaml: &str) -> Mapping {
        serde_yaml::from_str(yaml).unwrap()
    }

    fn specs() -> Vec<AttributeSpec> {
        vec![
            AttributeSpec::required("path", "repository path", Expect::Str),
            AttributeSpec::optional("branch", "branch to track", Expect::Str, "master"),
            AttributeSpec::optional(
                "labels",
                "labels to attach",
                Expect::StrList,
                Value::Sequence(vec![Value::from("base")]),
            ),
            AttributeSpec::optional(
                "mode",
                "processing mode",
                Expect::OneOf(&["fast", "thorough"]),
                "fast",
            ),
            AttributeSpec::optional_absent("trigger", "trigger automatically", Expect::Bool),
        ]
    }

    #[test]
    fn test_user_scalar_wins_over_default() {
        let attrs = Attributes::build(
            "repository 'source'",
            &specs(),
            &mapping("path: org/repo\nbranch: main"),
        )
        .unwrap();
        assert_eq!(attrs.str_value("branch"), Some("main"));
        assert_eq!(attrs.str_value("path"), Some("org/repo"));
    }

    #[test]
    fn test_lists_concatenate_and_deduplicate() {
        let attrs = Attributes::build(
            "repository 'source'",
            &specs(),
            &mapping("path: org/repo\nlabels: [extra, base]"),
        )
        .unwrap();
        assert_eq!(attrs.str_list("labels"), vec!["base", "extra"]);
    }

    #[test]
    fn test_missing_required_names_key_and_entity() {
        let err = Attributes::build("repository 'source'", &specs(), &mapping("branch: main"))
            .unwrap_err();
        match err {
            JobflowError::MissingAttribute { entity, key } => {
                assert_eq!(entity, "repository 'source'");
                assert_eq!(key, "path");
            }
            other => panic!("expected MissingAttribute, got {other:?}"),
        }
    }

    #[test]
    fn test_enumerated_value_rejected() {
        let err = Attributes::build(
            "repository 'source'",
            &specs(),
            &mapping("path: org/repo\nmode: sloppy"),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            JobflowError::InvalidAttributeValue { ref key, .. } if key == "mode"
        ));
    }

    #[test]
    fn test_unknown_keys_tolerated() {
        let attrs = Attributes::build(
            "repository 'source'",
            &specs(),
            &mapping("path: org/repo\nfuture_knob: 42"),
        )
        .unwrap();
        assert!(attrs.contains("future_knob"));
    }

    #[test]
    fn test_explicit_null_counts_as_absent() {
        let attrs = Attributes::build(
            "repository 'source'",
            &specs(),
            &mapping("path: org/repo\ntrigger: ~"),
        )
        .unwrap();
        assert!(!attrs.contains("trigger"));
        assert_eq!(attrs.bool_value("trigger"), None);
    }

    #[test]
    fn test_nested_mappings_merge_recursively() {
        let base = serde_yaml::from_str::<Value>("a: {x: 1, y: 2}").unwrap();
        let user = serde_yaml::from_str::<Value>("a: {y: 3, z: 4}").unwrap();
        let merged = deep_merge(base, user);
        let merged = merged.as_mapping().unwrap();
        let inner = merged
            .get(&Value::from("a"))
            .unwrap()
            .as_mapping()
            .unwrap();
        assert_eq!(inner.get(&Value::from("x")), Some(&Value::from(1)));
        assert_eq!(inner.get(&Value::from("y")), Some(&Value::from(3)));
        assert_eq!(inner.get(&Value::from("z")), Some(&Value::from(4)));
    }
}
