//! errors raised while turning a configuration document into generated text
//!
//! Every variant names the offending property by its path (`Group.property`) so callers can
//! report it without further context.

#[derive(thiserror::Error, Debug)]
pub enum GenerateError {
    #[error("bad input at {path}: {reason}")]
    BadInput { path: String, reason: String },

    #[error("no template can handle this configuration")]
    NoApplicableTemplate,

    #[error("property {property} references {target}, which is not defined in the same scope")]
    UnresolvedReference { property: String, target: String },

    #[error("property {property} is associated with {target}, which is not defined in the same scope")]
    UnknownAssociatedProperty { property: String, target: String },

    #[error("circular dependency: {}", chain.join(" -> "))]
    CircularDependency { chain: Vec<String> },

    #[error("encrypted property {property} has no encryption key in scope")]
    MissingEncryptionKey { property: String },

    #[error("scope {scope} declares more than one encryption key: {}", keys.join(", "))]
    MultipleEncryptionKeys { scope: String, keys: Vec<String> },

    #[error("name {name} is used more than once in scope {scope}")]
    DuplicateName { scope: String, name: String },

    #[error("property {property} has unknown type {type_name}")]
    UnknownType { property: String, type_name: String },

    #[error("property {property} expects {expected} but found {found}")]
    TypeMismatch {
        property: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("property {property} has no default value")]
    MissingDefaultValue { property: String },

    #[error("unable to serialize configuration")]
    Serialization(#[from] serde_json::Error),
}

impl GenerateError {
    pub(crate) fn bad_input(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::BadInput {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

/// Raised when a template registry violates its ordering rule
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum RegistryError {
    #[error("catch-all template {template} must be registered last")]
    CatchAllNotLast { template: &'static str },
}

/// Joins a scope path and a name into the dotted form used in messages
pub(crate) fn join_path(scope: &[String], name: &str) -> String {
    if scope.is_empty() {
        return name.to_string();
    }
    format!("{}.{name}", scope.join("."))
}

/// Dotted form of a scope path, `<root>` for the top level
pub(crate) fn scope_name(scope: &[String]) -> String {
    if scope.is_empty() {
        return "<root>".to_string();
    }
    scope.join(".")
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn messages_name_the_property() {
        let err = GenerateError::UnresolvedReference {
            property: "Api.alias".into(),
            target: "host".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("Api.alias"));
        assert!(msg.contains("host"));
    }

    #[test]
    fn circular_dependency_lists_chain() {
        let err = GenerateError::CircularDependency {
            chain: vec!["a".into(), "b".into(), "a".into()],
        };
        assert_eq!(err.to_string(), "circular dependency: a -> b -> a");
    }

    #[test]
    fn paths() {
        assert_eq!(join_path(&[], "host"), "host");
        assert_eq!(join_path(&["Api".into(), "V2".into()], "host"), "Api.V2.host");
        assert_eq!(scope_name(&[]), "<root>");
    }
}
