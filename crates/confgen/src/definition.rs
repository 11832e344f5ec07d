//! parsed form of a configuration document
//!
//! A document is a json object. Each entry is either
//! - a property: an object with a `type` key, or
//! - a group: an object without a `type` key, whose entries follow the same rules
//!
//! The root may additionally carry a `template` object with [TemplateOptions].
//!
//! ```json
//! {
//!     "template": { "imports": ["UIKit"] },
//!     "host": {
//!         "type": "String",
//!         "defaultValue": "staging.example.com",
//!         "overrides": { "prod": "example.com" }
//!     },
//!     "Analytics": {
//!         "enabled": { "type": "Bool", "defaultValue": false }
//!     }
//! }
//! ```
use crate::encryption::Iv;
use crate::error::{join_path, GenerateError};
use crate::value::Value;
use indexmap::IndexMap;
use std::collections::BTreeSet;

/// Reserved root key holding [TemplateOptions]
pub const TEMPLATE_KEY: &str = "template";

/// Import every generated file carries
pub const BASE_IMPORT: &str = "Foundation";

/// Declared type of a property
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyType {
    String,
    Url,
    Int,
    Float,
    Double,
    Bool,
    Dictionary,
    StringArray,
    Reference,
    Encrypted,
    EncryptionKey,
}

impl PropertyType {
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "String" => Self::String,
            "URL" => Self::Url,
            "Int" => Self::Int,
            "Float" => Self::Float,
            "Double" => Self::Double,
            "Bool" => Self::Bool,
            "Dictionary" => Self::Dictionary,
            "StringArray" => Self::StringArray,
            "Reference" => Self::Reference,
            "Encrypted" => Self::Encrypted,
            "EncryptionKey" => Self::EncryptionKey,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PropertyDefinition {
    pub name: String,
    pub property_type: PropertyType,
    pub default_value: Option<Value>,
    /// Rendered as doc comment lines; an empty or blank description counts as none
    pub description: Option<String>,
    pub associated_property: Option<String>,
    pub overrides: IndexMap<String, Value>,
}

impl PropertyDefinition {
    fn parse(
        scope: &[String],
        name: &str,
        descriptor: &IndexMap<String, Value>,
    ) -> Result<Self, GenerateError> {
        let path = join_path(scope, name);

        let type_name = match descriptor.get("type") {
            Some(Value::String(type_name)) => type_name,
            Some(other) => {
                return Err(GenerateError::bad_input(
                    path,
                    format!("type must be a string, found {}", other.kind()),
                ))
            }
            None => return Err(GenerateError::bad_input(path, "type is missing")),
        };
        let Some(property_type) = PropertyType::from_name(type_name) else {
            return Err(GenerateError::UnknownType {
                property: path,
                type_name: type_name.clone(),
            });
        };

        let overrides = match descriptor.get("overrides") {
            None => IndexMap::new(),
            Some(Value::Object(overrides)) => overrides.clone(),
            Some(other) => {
                return Err(GenerateError::bad_input(
                    path,
                    format!("overrides must be an object, found {}", other.kind()),
                ))
            }
        };

        for key in descriptor.keys() {
            if !matches!(
                key.as_str(),
                "type" | "defaultValue" | "description" | "associatedProperty" | "overrides"
            ) {
                tracing::trace!(property = %path, %key, "ignoring unknown property key");
            }
        }

        Ok(Self {
            name: name.to_string(),
            property_type,
            default_value: descriptor.get("defaultValue").cloned(),
            description: optional_string(&path, descriptor, "description")?
                .filter(|description| !description.trim().is_empty()),
            associated_property: optional_string(&path, descriptor, "associatedProperty")?,
            overrides,
        })
    }
}

/// A nested namespace
#[derive(Debug, Clone, PartialEq)]
pub struct GroupDefinition {
    pub name: String,
    pub scope: ScopeDefinition,
}

/// Properties and groups sharing one namespace
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScopeDefinition {
    /// Path of group names leading to this scope, empty for the root
    pub path: Vec<String>,
    pub properties: IndexMap<String, PropertyDefinition>,
    /// In declaration order
    pub groups: Vec<GroupDefinition>,
}

impl ScopeDefinition {
    fn parse<'v>(
        path: Vec<String>,
        entries: impl IntoIterator<Item = (&'v String, &'v Value)>,
    ) -> Result<Self, GenerateError> {
        let mut scope = Self {
            path,
            ..Default::default()
        };

        for (name, value) in entries {
            let Value::Object(object) = value else {
                return Err(GenerateError::bad_input(
                    join_path(&scope.path, name),
                    format!("expected a property or group object, found {}", value.kind()),
                ));
            };

            if object.contains_key("type") {
                let property = PropertyDefinition::parse(&scope.path, name, object)?;
                scope.properties.insert(name.clone(), property);
            } else {
                let mut group_path = scope.path.clone();
                group_path.push(name.clone());
                tracing::trace!(group = %join_path(&scope.path, name), "found group");

                scope.groups.push(GroupDefinition {
                    name: name.clone(),
                    scope: ScopeDefinition::parse(group_path, object)?,
                });
            }
        }

        Ok(scope)
    }

    /// Properties of type [PropertyType::EncryptionKey], in declaration order
    pub fn encryption_keys(&self) -> impl Iterator<Item = &PropertyDefinition> {
        self.properties
            .values()
            .filter(|property| property.property_type == PropertyType::EncryptionKey)
    }
}

/// Root `template` options
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateOptions {
    /// Type to extend instead of declaring a new namespace
    pub extension_on: Option<String>,
    pub extension_name: Option<String>,
    /// Always contains [BASE_IMPORT]
    pub imports: BTreeSet<String>,
    pub requires_non_objc: bool,
}

impl Default for TemplateOptions {
    fn default() -> Self {
        Self {
            extension_on: None,
            extension_name: None,
            imports: BTreeSet::from([BASE_IMPORT.to_string()]),
            requires_non_objc: false,
        }
    }
}

impl TemplateOptions {
    fn parse(value: Option<&Value>) -> Result<Self, GenerateError> {
        let mut options = Self::default();
        let Some(value) = value else {
            return Ok(options);
        };
        let Value::Object(object) = value else {
            return Err(GenerateError::bad_input(
                TEMPLATE_KEY,
                format!("expected an object, found {}", value.kind()),
            ));
        };

        options.extension_on = optional_string(TEMPLATE_KEY, object, "extensionOn")?;
        options.extension_name = optional_string(TEMPLATE_KEY, object, "extensionName")?;

        match object.get("imports") {
            None => {}
            Some(Value::Array(imports)) => {
                for import in imports {
                    let Value::String(import) = import else {
                        return Err(GenerateError::bad_input(
                            TEMPLATE_KEY,
                            format!("imports must be strings, found {}", import.kind()),
                        ));
                    };
                    options.imports.insert(import.clone());
                }
            }
            Some(other) => {
                return Err(GenerateError::bad_input(
                    TEMPLATE_KEY,
                    format!("imports must be an array, found {}", other.kind()),
                ))
            }
        }

        match object.get("requiresNonObjC") {
            None => {}
            Some(Value::Boolean(requires_non_objc)) => options.requires_non_objc = *requires_non_objc,
            Some(other) => {
                return Err(GenerateError::bad_input(
                    TEMPLATE_KEY,
                    format!("requiresNonObjC must be a boolean, found {}", other.kind()),
                ))
            }
        }

        Ok(options)
    }

    pub fn is_extension(&self) -> bool {
        self.extension_on.is_some()
    }
}

/// A configuration document bound to one scheme
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigurationSpec {
    pub scheme: String,
    pub output_name: String,
    pub template: TemplateOptions,
    pub root: ScopeDefinition,
    pub iv: Iv,
}

impl ConfigurationSpec {
    pub fn new(config: &Value, name: &str, scheme: &str) -> Result<Self, GenerateError> {
        let Value::Object(object) = config else {
            return Err(GenerateError::bad_input(
                name,
                format!("configuration must be an object, found {}", config.kind()),
            ));
        };

        let template = TemplateOptions::parse(object.get(TEMPLATE_KEY))?;
        let root = ScopeDefinition::parse(
            vec![],
            object.iter().filter(|(key, _)| key.as_str() != TEMPLATE_KEY),
        )?;

        Ok(Self {
            scheme: scheme.to_string(),
            output_name: name.to_string(),
            template,
            root,
            iv: Iv::derive(config)?,
        })
    }

    /// Output file name, only set when it differs from the source file name
    pub fn filename(&self) -> Option<String> {
        let extension_on = self.template.extension_on.as_ref()?;
        let name = self
            .template
            .extension_name
            .as_deref()
            .unwrap_or(&self.output_name);
        Some(format!("{extension_on}+{name}"))
    }

    /// Identifier shown in the generated header
    pub fn file_identifier(&self) -> String {
        self.filename().unwrap_or_else(|| self.output_name.clone())
    }
}

fn optional_string(
    path: &str,
    object: &IndexMap<String, Value>,
    key: &str,
) -> Result<Option<String>, GenerateError> {
    match object.get(key) {
        None => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(other) => Err(GenerateError::bad_input(
            path,
            format!("{key} must be a string, found {}", other.kind()),
        )),
    }
}
