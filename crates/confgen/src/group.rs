//! recursive resolution of scopes and their groups
use crate::definition::{ConfigurationSpec, ScopeDefinition};
use crate::encryption::{iv_property_name, Iv};
use crate::error::{join_path, scope_name, GenerateError};
use crate::event::Event;
use crate::property::{ResolvedProperty, ScopeResolver, SCHEME_NAME};
use crate::value::Value;
use std::collections::HashSet;

/// Resolved properties (sorted by name) and groups (in declaration order) of one scope
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize)]
pub struct ResolvedScope {
    pub properties: Vec<ResolvedProperty>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub groups: Vec<ResolvedGroup>,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct ResolvedGroup {
    pub name: String,
    #[serde(flatten)]
    pub scope: ResolvedScope,
}

/// Outcome of resolving a whole document
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub root: ResolvedScope,
    pub events: Vec<Event>,
}

/// Resolves every property of `spec` for its scheme
pub fn resolve(spec: &ConfigurationSpec) -> Result<Resolution, GenerateError> {
    let mut events = vec![];
    let mut injected = vec![];

    if !spec.template.is_extension() {
        injected.push(ResolvedProperty::string(SCHEME_NAME, &spec.scheme));
        events.push(Event::SchemeNameInjected {
            scheme: spec.scheme.clone(),
        });
    }

    let root = ScopeResolution {
        scheme: &spec.scheme,
        iv: &spec.iv,
    }
    .resolve(&spec.root, injected, None, &mut events)?;

    Ok(Resolution { root, events })
}

struct ScopeResolution<'s> {
    scheme: &'s str,
    iv: &'s Iv,
}

impl ScopeResolution<'_> {
    fn resolve(
        &self,
        scope: &ScopeDefinition,
        mut injected: Vec<ResolvedProperty>,
        inherited_key: Option<Vec<u8>>,
        events: &mut Vec<Event>,
    ) -> Result<ResolvedScope, GenerateError> {
        let keys: Vec<_> = scope.encryption_keys().collect();
        if keys.len() > 1 {
            return Err(GenerateError::MultipleEncryptionKeys {
                scope: scope_name(&scope.path),
                keys: keys.iter().map(|key| key.name.clone()).collect(),
            });
        }

        for key in keys {
            let name = iv_property_name(&key.name);
            events.push(Event::InitialisationVectorDerived {
                property: join_path(&scope.path, &name),
            });
            injected.push(ResolvedProperty::bytes(
                name,
                self.iv.bytes(),
                Value::String(self.iv.hash().to_string()),
            ));
        }

        check_names(scope, &injected)?;

        let mut resolver = ScopeResolver::new(self.scheme, self.iv, scope, inherited_key);
        for property in injected {
            resolver.inject(property);
        }
        for name in scope.properties.keys() {
            resolver.resolve(name)?;
        }
        let key = resolver.encryption_key()?;

        let (properties, scope_events) = resolver.finish();
        events.extend(scope_events);

        let mut groups = Vec::with_capacity(scope.groups.len());
        for group in &scope.groups {
            groups.push(ResolvedGroup {
                name: group.name.clone(),
                scope: self.resolve(&group.scope, vec![], key.clone(), events)?,
            });
        }

        Ok(ResolvedScope { properties, groups })
    }
}

/// Properties, groups and injected properties share one namespace
fn check_names(scope: &ScopeDefinition, injected: &[ResolvedProperty]) -> Result<(), GenerateError> {
    let mut seen = HashSet::new();

    let names = scope
        .properties
        .keys()
        .chain(scope.groups.iter().map(|group| &group.name))
        .chain(injected.iter().map(|property| &property.name));

    for name in names {
        if !seen.insert(name) {
            return Err(GenerateError::DuplicateName {
                scope: scope_name(&scope.path),
                name: name.clone(),
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    fn resolve_json(json: serde_json::Value, scheme: &str) -> Result<Resolution, GenerateError> {
        let spec = ConfigurationSpec::new(&Value::try_from(json).unwrap(), "Test", scheme)?;
        resolve(&spec)
    }

    fn names(scope: &ResolvedScope) -> Vec<&str> {
        scope.properties.iter().map(|p| p.name.as_str()).collect()
    }

    #[test]
    fn scheme_name_is_injected() {
        let resolution = resolve_json(serde_json::json!({}), "any").unwrap();
        assert_eq!(resolution.root.properties, [ResolvedProperty::string("schemeName", "any")]);
        assert!(resolution.root.groups.is_empty());
    }

    #[test]
    fn extension_suppresses_scheme_name() {
        let resolution = resolve_json(
            serde_json::json!({ "template": { "extensionOn": "UIColor" } }),
            "any",
        )
        .unwrap();
        assert!(resolution.root.properties.is_empty());
    }

    #[test]
    fn properties_are_sorted_and_groups_keep_declaration_order() {
        let resolution = resolve_json(
            serde_json::json!({
                "zeta": { "type": "Int", "defaultValue": 1 },
                "alpha": { "type": "Int", "defaultValue": 2 },
                "Second": {
                    "b": { "type": "Bool", "defaultValue": true },
                    "a": { "type": "Bool", "defaultValue": false }
                },
                "First": {}
            }),
            "any",
        )
        .unwrap();

        assert_eq!(names(&resolution.root), ["alpha", "schemeName", "zeta"]);
        let groups: Vec<_> = resolution.root.groups.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(groups, ["Second", "First"]);
        assert_eq!(names(&resolution.root.groups[0].scope), ["a", "b"]);
        assert!(resolution.root.groups[1].scope.properties.is_empty());
    }

    #[test]
    fn groups_nest() {
        let resolution = resolve_json(
            serde_json::json!({
                "Outer": { "Inner": { "value": { "type": "String", "defaultValue": "deep" } } }
            }),
            "any",
        )
        .unwrap();

        let inner = &resolution.root.groups[0].scope.groups[0];
        assert_eq!(inner.name, "Inner");
        assert_eq!(inner.scope.properties[0].literal, r#""deep""#);
    }

    #[test]
    fn scheme_overrides_apply_inside_groups() {
        let resolution = resolve_json(
            serde_json::json!({
                "Api": {
                    "host": {
                        "type": "String",
                        "defaultValue": "staging.example.com",
                        "overrides": { "prod": "example.com" }
                    }
                }
            }),
            "prod",
        )
        .unwrap();
        assert_eq!(
            resolution.root.groups[0].scope.properties[0].literal,
            r#""example.com""#
        );
    }

    #[test]
    fn references_do_not_cross_scopes() {
        let err = resolve_json(
            serde_json::json!({
                "host": { "type": "String", "defaultValue": "example.com" },
                "Api": { "alias": { "type": "Reference", "defaultValue": "host" } }
            }),
            "any",
        )
        .unwrap_err();
        assert!(matches!(err, GenerateError::UnresolvedReference { property, .. } if property == "Api.alias"));
    }

    #[test]
    fn user_defined_scheme_name_collides() {
        let err = resolve_json(
            serde_json::json!({ "schemeName": { "type": "String", "defaultValue": "mine" } }),
            "any",
        )
        .unwrap_err();
        assert!(matches!(err, GenerateError::DuplicateName { name, .. } if name == "schemeName"));
    }

    #[test]
    fn user_defined_scheme_name_is_allowed_for_extensions() {
        let resolution = resolve_json(
            serde_json::json!({
                "template": { "extensionOn": "Bundle" },
                "schemeName": { "type": "String", "defaultValue": "mine" }
            }),
            "any",
        )
        .unwrap();
        assert_eq!(resolution.root.properties[0].literal, r#""mine""#);
    }

    #[test]
    fn iv_property_collides() {
        let err = resolve_json(
            serde_json::json!({
                "key": { "type": "EncryptionKey", "defaultValue": "k" },
                "keyIV": { "type": "String", "defaultValue": "mine" }
            }),
            "any",
        )
        .unwrap_err();
        assert!(matches!(err, GenerateError::DuplicateName { name, .. } if name == "keyIV"));
    }

    #[test]
    fn encryption_key_and_iv_are_siblings() {
        let resolution = resolve_json(
            serde_json::json!({
                "encryptionKey": { "type": "EncryptionKey", "defaultValue": "the-key-to-the-secret" },
                "somethingSecret": { "type": "Encrypted", "defaultValue": "secret" }
            }),
            "any",
        )
        .unwrap();

        assert_eq!(
            names(&resolution.root),
            ["encryptionKey", "encryptionKeyIV", "schemeName", "somethingSecret"]
        );
        assert_eq!(
            resolution.root.properties[3].literal,
            "[UInt8(72), UInt8(248), UInt8(24), UInt8(73), UInt8(30), UInt8(207), UInt8(159), UInt8(0), \
             UInt8(65), UInt8(147), UInt8(20), UInt8(183), UInt8(214), UInt8(231), UInt8(169), UInt8(3)]"
        );
        assert!(resolution.events.contains(&Event::SecretEncrypted {
            property: "somethingSecret".into(),
            bytes: 16
        }));
    }

    #[test]
    fn groups_inherit_the_encryption_key() {
        let resolution = resolve_json(
            serde_json::json!({
                "key": { "type": "EncryptionKey", "defaultValue": "0123456789abcdef" },
                "Secrets": { "token": { "type": "Encrypted", "defaultValue": "t" } }
            }),
            "any",
        )
        .unwrap();

        let token = &resolution.root.groups[0].scope.properties[0];
        assert_eq!(token.rendered_type, "[UInt8]");
        assert_eq!(token.literal.matches("UInt8(").count(), 16);
    }

    #[test]
    fn multiple_encryption_keys() {
        let err = resolve_json(
            serde_json::json!({
                "one": { "type": "EncryptionKey", "defaultValue": "a" },
                "two": { "type": "EncryptionKey", "defaultValue": "b" }
            }),
            "any",
        )
        .unwrap_err();
        assert!(matches!(err, GenerateError::MultipleEncryptionKeys { keys, .. } if keys == ["one", "two"]));
    }

    #[test]
    fn resolution_is_deterministic() {
        let json = serde_json::json!({
            "key": { "type": "EncryptionKey", "defaultValue": "k" },
            "secret": { "type": "Encrypted", "defaultValue": "s", "overrides": { "prod": "p" } },
            "Group": { "flag": { "type": "Bool", "defaultValue": true } }
        });
        assert_eq!(
            resolve_json(json.clone(), "prod").unwrap(),
            resolve_json(json, "prod").unwrap()
        );
    }
}
