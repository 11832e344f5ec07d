//! property resolution
//!
//! A property's value is picked in this order:
//!
//! 1. its `defaultValue`
//! 2. if it has an `associatedProperty`: the override keyed by that sibling's *resolved* value
//! 3. otherwise: the override keyed by the active scheme
//!
//! The picked value is then formatted according to the declared [PropertyType]. References and
//! associations may point at siblings that are not resolved yet, so siblings are resolved on demand
//! and a stack of properties in progress guards against loops.
use crate::definition::{PropertyDefinition, PropertyType, ScopeDefinition};
use crate::encryption::{self, Iv};
use crate::error::{join_path, GenerateError};
use crate::event::{Event, OverrideSource};
use crate::value::Value;
use indexmap::IndexMap;

/// Name of the property carrying the active scheme
pub const SCHEME_NAME: &str = "schemeName";

/// A property ready to be rendered
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct ResolvedProperty {
    pub name: String,
    /// Swift type annotation
    pub rendered_type: String,
    /// Swift expression
    pub literal: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// The value the literal was rendered from
    pub value: Value,
}

impl ResolvedProperty {
    pub fn string(name: impl Into<String>, value: &str) -> Self {
        Self {
            name: name.into(),
            rendered_type: "String".to_string(),
            literal: swift_string(value),
            description: None,
            value: value.into(),
        }
    }

    pub fn bytes(name: impl Into<String>, bytes: &[u8], value: Value) -> Self {
        Self {
            name: name.into(),
            rendered_type: "[UInt8]".to_string(),
            literal: byte_array_literal(bytes),
            description: None,
            value,
        }
    }
}

/// Resolves the properties of one scope
pub(crate) struct ScopeResolver<'s> {
    scheme: &'s str,
    iv: &'s Iv,
    scope: &'s ScopeDefinition,
    /// Raw encryption key of the closest enclosing scope declaring one
    inherited_key: Option<Vec<u8>>,
    resolved: IndexMap<String, ResolvedProperty>,
    /// Properties currently being resolved
    stack: Vec<String>,
    events: Vec<Event>,
}

impl<'s> ScopeResolver<'s> {
    pub(crate) fn new(
        scheme: &'s str,
        iv: &'s Iv,
        scope: &'s ScopeDefinition,
        inherited_key: Option<Vec<u8>>,
    ) -> Self {
        Self {
            scheme,
            iv,
            scope,
            inherited_key,
            resolved: IndexMap::new(),
            stack: vec![],
            events: vec![],
        }
    }

    /// Adds a property that has no definition in the document
    ///
    /// Names must already be checked for collisions.
    pub(crate) fn inject(&mut self, property: ResolvedProperty) {
        self.resolved.insert(property.name.clone(), property);
    }

    /// Resolves a sibling by name, `None` if the scope has no such property
    #[tracing::instrument(level = "trace", skip(self), fields(scope = ?self.scope.path))]
    pub(crate) fn resolve(&mut self, name: &str) -> Result<Option<ResolvedProperty>, GenerateError> {
        if let Some(property) = self.resolved.get(name) {
            return Ok(Some(property.clone()));
        }

        let scope = self.scope;
        let Some(definition) = scope.properties.get(name) else {
            return Ok(None);
        };

        if self.stack.iter().any(|in_progress| in_progress == name) {
            let chain = self
                .stack
                .iter()
                .skip_while(|in_progress| *in_progress != name)
                .chain(std::iter::once(&name.to_string()))
                .map(|name| join_path(&scope.path, name))
                .collect();
            return Err(GenerateError::CircularDependency { chain });
        }

        self.stack.push(name.to_string());
        let property = self.compute(definition);
        self.stack.pop();

        let property = property?;
        tracing::trace!(literal = %property.literal, "resolved");
        self.resolved.insert(name.to_string(), property.clone());
        Ok(Some(property))
    }

    /// Raw key used to encrypt secrets of this scope
    pub(crate) fn encryption_key(&mut self) -> Result<Option<Vec<u8>>, GenerateError> {
        let scope = self.scope;
        let Some(key) = scope.encryption_keys().next() else {
            return Ok(self.inherited_key.clone());
        };

        let key = self.resolve(&key.name)?;
        Ok(key.and_then(|key| key.value.as_str().map(|key| key.as_bytes().to_vec())))
    }

    /// Resolved properties sorted by name, and the events raised on the way
    pub(crate) fn finish(self) -> (Vec<ResolvedProperty>, Vec<Event>) {
        let mut properties: Vec<_> = self.resolved.into_values().collect();
        properties.sort_by(|a, b| a.name.cmp(&b.name));
        (properties, self.events)
    }

    fn compute(&mut self, definition: &PropertyDefinition) -> Result<ResolvedProperty, GenerateError> {
        let path = join_path(&self.scope.path, &definition.name);
        let value = self.select_value(definition, &path)?;

        let (rendered_type, literal, value) = match definition.property_type {
            PropertyType::String => {
                let s = expect_string(&path, value)?;
                ("String".to_string(), swift_string(&s), Value::String(s))
            }
            PropertyType::Url => {
                let s = expect_string(&path, value)?;
                let literal = format!("URL(string: {})!", swift_string(&s));
                ("URL".to_string(), literal, Value::String(s))
            }
            PropertyType::Int => match value {
                Some(Value::Integer(int)) => ("Int".to_string(), int.to_string(), Value::Integer(int)),
                Some(other) => return Err(mismatch(path, "integer", &other)),
                None => return Err(GenerateError::MissingDefaultValue { property: path }),
            },
            PropertyType::Float | PropertyType::Double => {
                let rendered_type = match definition.property_type {
                    PropertyType::Float => "Float",
                    _ => "Double",
                };
                match value {
                    Some(value) => {
                        let Some(dec) = value.as_f64() else {
                            return Err(mismatch(path, "decimal", &value));
                        };
                        (rendered_type.to_string(), float_literal(dec), Value::Decimal(dec))
                    }
                    None => return Err(GenerateError::MissingDefaultValue { property: path }),
                }
            }
            PropertyType::Bool => match value {
                Some(Value::Boolean(b)) => ("Bool".to_string(), b.to_string(), Value::Boolean(b)),
                Some(other) => return Err(mismatch(path, "boolean", &other)),
                None => return Err(GenerateError::MissingDefaultValue { property: path }),
            },
            PropertyType::Dictionary => {
                let value = value.unwrap_or_else(|| Value::Object(Default::default()));
                if !matches!(value, Value::Object(_)) {
                    return Err(mismatch(path, "object", &value));
                }
                ("[String: Any]".to_string(), swift_literal(&value), value)
            }
            PropertyType::StringArray => {
                let value = value.unwrap_or_else(|| Value::Array(vec![]));
                let is_string_array = match &value {
                    Value::Array(items) => items.iter().all(|item| matches!(item, Value::String(_))),
                    _ => false,
                };
                if !is_string_array {
                    return Err(GenerateError::TypeMismatch {
                        property: path,
                        expected: "array of strings",
                        found: value.kind(),
                    });
                }
                ("[String]".to_string(), swift_literal(&value), value)
            }
            PropertyType::Reference => {
                let target = expect_string(&path, value)?;
                let Some(resolved_target) = self.resolve(&target)? else {
                    return Err(GenerateError::UnresolvedReference {
                        property: path,
                        target,
                    });
                };
                (resolved_target.rendered_type, target, resolved_target.value)
            }
            PropertyType::EncryptionKey => {
                let key = expect_string(&path, value)?;
                let literal = byte_array_literal(key.as_bytes());
                ("[UInt8]".to_string(), literal, Value::String(key))
            }
            PropertyType::Encrypted => {
                let secret = expect_string(&path, value)?;
                let Some(key) = self.encryption_key()? else {
                    return Err(GenerateError::MissingEncryptionKey { property: path });
                };
                let cipher = encryption::encrypt(&key, self.iv, &secret);
                self.events.push(Event::SecretEncrypted {
                    property: path,
                    bytes: cipher.len(),
                });
                ("[UInt8]".to_string(), byte_array_literal(&cipher), Value::String(secret))
            }
        };

        Ok(ResolvedProperty {
            name: definition.name.clone(),
            rendered_type,
            literal,
            description: definition.description.clone(),
            value,
        })
    }

    fn select_value(
        &mut self,
        definition: &PropertyDefinition,
        path: &str,
    ) -> Result<Option<Value>, GenerateError> {
        if let Some(associated) = &definition.associated_property {
            let Some(target) = self.resolve(associated)? else {
                return Err(GenerateError::UnknownAssociatedProperty {
                    property: path.to_string(),
                    target: associated.clone(),
                });
            };

            if let Some(key) = target.value.as_key() {
                if let Some(value) = definition.overrides.get(&key) {
                    self.events.push(Event::OverrideApplied {
                        property: path.to_string(),
                        key,
                        source: OverrideSource::Associated(associated.clone()),
                    });
                    return Ok(Some(value.clone()));
                }
            }
        } else if let Some(value) = definition.overrides.get(self.scheme) {
            self.events.push(Event::OverrideApplied {
                property: path.to_string(),
                key: self.scheme.to_string(),
                source: OverrideSource::Scheme,
            });
            return Ok(Some(value.clone()));
        }

        Ok(definition.default_value.clone())
    }
}

fn expect_string(path: &str, value: Option<Value>) -> Result<String, GenerateError> {
    match value {
        Some(Value::String(s)) => Ok(s),
        Some(other) => Err(mismatch(path.to_string(), "string", &other)),
        None => Err(GenerateError::MissingDefaultValue {
            property: path.to_string(),
        }),
    }
}

fn mismatch(path: String, expected: &'static str, found: &Value) -> GenerateError {
    GenerateError::TypeMismatch {
        property: path,
        expected,
        found: found.kind(),
    }
}

/// Quoted swift string literal
pub(crate) fn swift_string(s: &str) -> String {
    let mut literal = String::with_capacity(s.len() + 2);
    literal.push('"');
    for c in s.chars() {
        match c {
            '"' => literal.push_str("\\\""),
            '\\' => literal.push_str("\\\\"),
            '\n' => literal.push_str("\\n"),
            '\r' => literal.push_str("\\r"),
            '\t' => literal.push_str("\\t"),
            c => literal.push(c),
        }
    }
    literal.push('"');
    literal
}

/// Decimal literal that always carries a fractional part or an exponent
pub(crate) fn float_literal(value: f64) -> String {
    // Debug keeps `.0` on integral values, unlike Display
    format!("{value:?}")
}

pub(crate) fn byte_array_literal(bytes: &[u8]) -> String {
    let elements: Vec<_> = bytes.iter().map(|byte| format!("UInt8({byte})")).collect();
    format!("[{}]", elements.join(", "))
}

/// Swift literal for a collection member; object keys are sorted
pub(crate) fn swift_literal(value: &Value) -> String {
    match value {
        Value::Boolean(b) => b.to_string(),
        Value::Integer(int) => int.to_string(),
        Value::Decimal(dec) => float_literal(*dec),
        Value::String(s) => swift_string(s),
        Value::Array(items) => {
            let items: Vec<_> = items.iter().map(swift_literal).collect();
            format!("[{}]", items.join(", "))
        }
        Value::Object(object) if object.is_empty() => "[:]".to_string(),
        Value::Object(object) => {
            let mut entries: Vec<_> = object.iter().collect();
            entries.sort_by(|(a, _), (b, _)| a.cmp(b));
            let entries: Vec<_> = entries
                .into_iter()
                .map(|(key, value)| format!("{}: {}", swift_string(key), swift_literal(value)))
                .collect();
            format!("[{}]", entries.join(", "))
        }
    }
}
