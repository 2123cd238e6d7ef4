//! [`DocumentNode`] for `serde_json::Value`.
//!
//! - Objects are composites. Their type tag is the `resourceType` member when
//!   it holds a string (FHIR JSON convention), otherwise `object`.
//! - Arrays are repeated fields of the enclosing object. An array nested
//!   directly inside another array has no field names and is reported as not
//!   enumerable.
//! - Scalars are leaves tagged `string`, `integer`, `decimal`, `boolean`
//!   or `null`.

use std::borrow::Cow;

use serde_json::{Number, Value};

use crate::error::NodeError;
use crate::node::{Children, DocumentNode, LeafValue};

/// Member used as the runtime type tag of a JSON object.
pub const RESOURCE_TYPE_FIELD: &str = "resourceType";

fn scalar_tag(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_i64() || n.is_u64() => "integer",
        Value::Number(_) => "decimal",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

impl DocumentNode for Value {
    fn type_tag(&self) -> Cow<'_, str> {
        match self {
            Value::Object(map) => match map.get(RESOURCE_TYPE_FIELD) {
                Some(Value::String(resource_type)) => Cow::Borrowed(resource_type.as_str()),
                _ => Cow::Borrowed("object"),
            },
            other => Cow::Borrowed(scalar_tag(other)),
        }
    }

    fn is_leaf(&self) -> bool {
        !matches!(self, Value::Object(_) | Value::Array(_))
    }

    fn leaf_value(&self) -> Option<LeafValue> {
        match self {
            Value::Null => Some(LeafValue::Null),
            Value::Bool(b) => Some(LeafValue::Boolean(*b)),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Some(LeafValue::Integer(i))
                } else if let Some(u) = n.as_u64() {
                    Some(LeafValue::Unsigned(u))
                } else {
                    n.as_f64().map(LeafValue::Decimal)
                }
            }
            Value::String(s) => Some(LeafValue::Text(s.clone())),
            Value::Array(_) | Value::Object(_) => None,
        }
    }

    fn with_leaf_value(&self, value: LeafValue) -> Result<Self, NodeError> {
        if !self.is_leaf() {
            return Err(NodeError::NotALeaf {
                type_tag: self.type_tag().into_owned(),
            });
        }
        Ok(match value {
            LeafValue::Null => Value::Null,
            LeafValue::Boolean(b) => Value::Bool(b),
            LeafValue::Integer(i) => Value::Number(i.into()),
            LeafValue::Unsigned(u) => Value::Number(u.into()),
            LeafValue::Decimal(d) => {
                let number =
                    Number::from_f64(d).ok_or_else(|| NodeError::UnrepresentableValue {
                        kind: "decimal",
                        message: "JSON numbers must be finite".to_string(),
                    })?;
                Value::Number(number)
            }
            LeafValue::Text(s) => Value::String(s),
        })
    }

    fn named_children(&self) -> Option<Vec<(String, Children<'_, Self>)>> {
        match self {
            Value::Object(map) => Some(
                map.iter()
                    .map(|(name, value)| {
                        let children = match value {
                            Value::Array(items) => Children::Repeated(items.as_slice()),
                            single => Children::Single(single),
                        };
                        (name.clone(), children)
                    })
                    .collect(),
            ),
            Value::Array(_) => None,
            _ => Some(Vec::new()),
        }
    }

    fn with_child_replaced(
        mut self,
        field: &str,
        index: Option<usize>,
        child: Self,
    ) -> Result<Self, NodeError> {
        let type_tag = self.type_tag().into_owned();
        let Value::Object(map) = &mut self else {
            return Err(NodeError::NotAComposite { type_tag });
        };
        let slot = map.get_mut(field).ok_or_else(|| NodeError::MissingField {
            field: field.to_string(),
        })?;
        match (slot, index) {
            (Value::Array(items), Some(i)) => {
                let len = items.len();
                let element = items.get_mut(i).ok_or_else(|| NodeError::IndexOutOfRange {
                    field: field.to_string(),
                    index: i,
                    len,
                })?;
                *element = child;
            }
            (Value::Array(_), None) => {
                return Err(NodeError::IndexRequired {
                    field: field.to_string(),
                });
            }
            (_, Some(_)) => {
                return Err(NodeError::NotRepeated {
                    field: field.to_string(),
                });
            }
            (slot, None) => *slot = child,
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn type_tags_follow_resource_type() {
        assert_eq!(json!({"resourceType": "Patient"}).type_tag(), "Patient");
        assert_eq!(json!({"resourceType": 3}).type_tag(), "object");
        assert_eq!(json!({}).type_tag(), "object");
        assert_eq!(json!("x").type_tag(), "string");
        assert_eq!(json!(1).type_tag(), "integer");
        assert_eq!(json!(1.5).type_tag(), "decimal");
        assert_eq!(json!(true).type_tag(), "boolean");
        assert_eq!(json!(null).type_tag(), "null");
    }

    #[test]
    fn named_children_keep_source_order() {
        let doc = json!({"zeta": 1, "alpha": [1, 2], "mid": {"a": 1}});
        let children = doc.named_children().unwrap();
        let names: Vec<_> = children.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["zeta", "alpha", "mid"]);
        assert!(children[1].1.is_repeated());
        assert_eq!(children[1].1.elements().len(), 2);
        assert_eq!(children[0].1.elements().len(), 1);
    }

    #[test]
    fn nested_arrays_are_not_enumerable() {
        assert!(json!([1, 2]).named_children().is_none());
        assert_eq!(json!("leaf").named_children().map(|c| c.is_empty()), Some(true));
    }

    #[test]
    fn leaf_values_round_trip_kinds() {
        let leaf = json!("abc");
        assert_eq!(leaf.leaf_value(), Some(LeafValue::text("abc")));
        let replaced = leaf.with_leaf_value(LeafValue::Integer(7)).unwrap();
        assert_eq!(replaced, json!(7));
        assert!(json!({}).with_leaf_value(LeafValue::Null).is_err());
        assert!(matches!(
            json!(1).with_leaf_value(LeafValue::Decimal(f64::NAN)),
            Err(NodeError::UnrepresentableValue { .. })
        ));
    }

    #[test]
    fn integers_above_i64_keep_full_precision() {
        let big = json!(u64::MAX);
        assert_eq!(big.type_tag(), "integer");
        let value = big.leaf_value().unwrap();
        assert_eq!(value, LeafValue::Unsigned(u64::MAX));
        assert_eq!(value.to_string(), "18446744073709551615");
        assert_eq!(json!(1).with_leaf_value(value).unwrap(), big);

        let neighbour = json!(u64::MAX - 1).leaf_value().unwrap();
        assert_ne!(neighbour.to_string(), "18446744073709551615");
        assert_eq!(json!(7).leaf_value(), Some(LeafValue::Integer(7)));
    }

    #[test]
    fn replaces_single_and_repeated_children() {
        let doc = json!({"id": "a", "name": [{"family": "x"}, {"family": "y"}]});
        let doc = doc.with_child_replaced("id", None, json!("b")).unwrap();
        let doc = doc
            .with_child_replaced("name", Some(1), json!({"family": "z"}))
            .unwrap();
        assert_eq!(
            doc,
            json!({"id": "b", "name": [{"family": "x"}, {"family": "z"}]})
        );
    }

    #[test]
    fn replacement_errors() {
        let doc = json!({"id": "a", "name": [1]});
        assert_eq!(
            doc.clone().with_child_replaced("nope", None, json!(1)),
            Err(NodeError::MissingField {
                field: "nope".to_string()
            })
        );
        assert!(matches!(
            doc.clone().with_child_replaced("name", Some(4), json!(1)),
            Err(NodeError::IndexOutOfRange { index: 4, len: 1, .. })
        ));
        assert!(matches!(
            doc.clone().with_child_replaced("name", None, json!(1)),
            Err(NodeError::IndexRequired { .. })
        ));
        assert!(matches!(
            doc.with_child_replaced("id", Some(0), json!(1)),
            Err(NodeError::NotRepeated { .. })
        ));
        assert!(matches!(
            json!("x").with_child_replaced("id", None, json!(1)),
            Err(NodeError::NotAComposite { .. })
        ));
    }
}
