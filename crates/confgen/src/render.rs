//! swift source rendering
//!
//! ```swift
//! /* Test.swift auto-generated from prod */
//!
//! import Foundation
//!
//! // swiftlint:disable force_unwrapping type_body_length file_length superfluous_disable_command
//! public enum Test {
//!     public static let schemeName: String = "prod"
//!
//!     public enum Group {
//!         /// the description
//!         public static let flag: Bool = true
//!     }
//! }
//!
//! // swiftlint:enable force_unwrapping type_body_length file_length superfluous_disable_command
//! ```
use crate::definition::ConfigurationSpec;
use crate::group::ResolvedScope;
use crate::property::{ResolvedProperty, SCHEME_NAME};
use std::fmt::Write;

const INDENT: &str = "    ";
const SWIFTLINT_RULES: &str =
    "force_unwrapping type_body_length file_length superfluous_disable_command";

/// How the generated declarations are wrapped
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Namespace {
    /// `public enum <name>`
    New(String),
    /// `public extension <type>`
    Extension(String),
}

/// Everything needed to write one swift file
#[derive(Debug, Clone, PartialEq, derive_new::new)]
pub struct GeneratedFile {
    /// Shown in the header, without the `.swift` extension
    file_identifier: String,
    scheme: String,
    /// Sorted and free of duplicates
    imports: Vec<String>,
    namespace: Namespace,
    root: ResolvedScope,
    /// Render `schemeName` as a `@nonobjc` computed property
    requires_non_objc: bool,
}

impl GeneratedFile {
    pub fn from_spec(spec: &ConfigurationSpec, root: ResolvedScope) -> Self {
        let namespace = match &spec.template.extension_on {
            Some(extension_on) => Namespace::Extension(extension_on.clone()),
            None => Namespace::New(spec.output_name.clone()),
        };

        Self::new(
            spec.file_identifier(),
            spec.scheme.clone(),
            spec.template.imports.iter().cloned().collect(),
            namespace,
            root,
            spec.template.requires_non_objc,
        )
    }

    pub fn root(&self) -> &ResolvedScope {
        &self.root
    }

    /// `schemeName` is only injected into new namespaces
    ///
    /// A user defined `schemeName` in an extension stays a constant.
    fn renders_computed_scheme_name(&self) -> bool {
        self.requires_non_objc && matches!(self.namespace, Namespace::New(_))
    }

    fn render_scope(&self, out: &mut String, scope: &ResolvedScope, depth: usize, is_root: bool) {
        let indent = INDENT.repeat(depth);
        let mut first = true;
        let mut separate = |out: &mut String| {
            if !first {
                out.push_str("\n\n");
            }
            first = false;
        };

        for property in &scope.properties {
            separate(out);
            if is_root && self.renders_computed_scheme_name() && property.name == SCHEME_NAME {
                render_computed(out, &indent, property);
            } else {
                render_property(out, &indent, property);
            }
        }

        for group in &scope.groups {
            separate(out);
            let _ = writeln!(out, "{indent}public enum {} {{", group.name);
            self.render_scope(out, &group.scope, depth + 1, false);
            let _ = write!(out, "\n{indent}}}");
        }
    }
}

impl std::fmt::Display for GeneratedFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "/* {}.swift auto-generated from {} */",
            self.file_identifier, self.scheme
        )?;
        writeln!(f)?;
        for import in &self.imports {
            writeln!(f, "import {import}")?;
        }
        writeln!(f)?;
        writeln!(f, "// swiftlint:disable {SWIFTLINT_RULES}")?;
        match &self.namespace {
            Namespace::New(name) => writeln!(f, "public enum {name} {{")?,
            Namespace::Extension(extended) => writeln!(f, "public extension {extended} {{")?,
        }

        let mut body = String::new();
        self.render_scope(&mut body, &self.root, 1, true);
        writeln!(f, "{body}")?;

        writeln!(f, "}}")?;
        writeln!(f)?;
        writeln!(f, "// swiftlint:enable {SWIFTLINT_RULES}")
    }
}

fn render_description(out: &mut String, indent: &str, property: &ResolvedProperty) {
    if let Some(description) = &property.description {
        for line in description.lines() {
            let _ = writeln!(out, "{indent}/// {line}");
        }
    }
}

fn render_property(out: &mut String, indent: &str, property: &ResolvedProperty) {
    render_description(out, indent, property);
    let _ = write!(
        out,
        "{indent}public static let {}: {} = {}",
        property.name, property.rendered_type, property.literal
    );
}

fn render_computed(out: &mut String, indent: &str, property: &ResolvedProperty) {
    render_description(out, indent, property);
    let _ = write!(
        out,
        "{indent}@nonobjc public static var {}: {} {{\n{indent}{INDENT}return {}\n{indent}}}",
        property.name, property.rendered_type, property.literal
    );
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::group::{self, ResolvedGroup};
    use crate::value::Value;
    use pretty_assertions::assert_eq;

    fn render(json: serde_json::Value, scheme: &str) -> String {
        let spec = ConfigurationSpec::new(&Value::try_from(json).unwrap(), "Test", scheme).unwrap();
        let resolution = group::resolve(&spec).unwrap();
        GeneratedFile::from_spec(&spec, resolution.root).to_string()
    }

    #[test]
    fn minimal_file() {
        let expected = r#"/* Test.swift auto-generated from any */

import Foundation

// swiftlint:disable force_unwrapping type_body_length file_length superfluous_disable_command
public enum Test {
    public static let schemeName: String = "any"
}

// swiftlint:enable force_unwrapping type_body_length file_length superfluous_disable_command
"#;
        assert_eq!(render(serde_json::json!({}), "any"), expected);
    }

    #[test]
    fn empty_extension() {
        let expected = r#"/* UIColor+Test.swift auto-generated from any */

import Foundation

// swiftlint:disable force_unwrapping type_body_length file_length superfluous_disable_command
public extension UIColor {

}

// swiftlint:enable force_unwrapping type_body_length file_length superfluous_disable_command
"#;
        let json = serde_json::json!({
            "template": { "extensionOn": "UIColor", "extensionName": "Test" }
        });
        assert_eq!(render(json, "any"), expected);
    }

    #[test]
    fn additional_imports_are_sorted() {
        let expected = r#"/* Test.swift auto-generated from any */

import AnotherFramework
import Foundation
import SomeFramework

// swiftlint:disable force_unwrapping type_body_length file_length superfluous_disable_command
public enum Test {
    public static let schemeName: String = "any"
}

// swiftlint:enable force_unwrapping type_body_length file_length superfluous_disable_command
"#;
        let json = serde_json::json!({
            "template": { "imports": ["SomeFramework", "AnotherFramework"] }
        });
        assert_eq!(render(json, "any"), expected);
    }

    #[test]
    fn encrypted_values() {
        let expected = r#"/* Test.swift auto-generated from any */

import Foundation

// swiftlint:disable force_unwrapping type_body_length file_length superfluous_disable_command
public enum Test {
    public static let encryptionKey: [UInt8] = [UInt8(116), UInt8(104), UInt8(101), UInt8(45), UInt8(107), UInt8(101), UInt8(121), UInt8(45), UInt8(116), UInt8(111), UInt8(45), UInt8(116), UInt8(104), UInt8(101), UInt8(45), UInt8(115), UInt8(101), UInt8(99), UInt8(114), UInt8(101), UInt8(116)]

    public static let encryptionKeyIV: [UInt8] = [UInt8(97), UInt8(53), UInt8(101), UInt8(49), UInt8(49), UInt8(97), UInt8(100), UInt8(57), UInt8(98), UInt8(53), UInt8(56), UInt8(55), UInt8(52), UInt8(56), UInt8(101), UInt8(48), UInt8(52), UInt8(56), UInt8(57), UInt8(57), UInt8(56), UInt8(97), UInt8(102), UInt8(53), UInt8(55), UInt8(55), UInt8(97), UInt8(55), UInt8(98), UInt8(97), UInt8(48), UInt8(102)]

    public static let schemeName: String = "any"

    public static let somethingSecret: [UInt8] = [UInt8(72), UInt8(248), UInt8(24), UInt8(73), UInt8(30), UInt8(207), UInt8(159), UInt8(0), UInt8(65), UInt8(147), UInt8(20), UInt8(183), UInt8(214), UInt8(231), UInt8(169), UInt8(3)]
}

// swiftlint:enable force_unwrapping type_body_length file_length superfluous_disable_command
"#;
        let json = serde_json::json!({
            "encryptionKey": { "type": "EncryptionKey", "defaultValue": "the-key-to-the-secret" },
            "somethingSecret": { "type": "Encrypted", "defaultValue": "secret" }
        });
        assert_eq!(render(json, "any"), expected);
    }

    #[test]
    fn groups_render_after_properties_in_declaration_order() {
        let expected = r#"/* Test.swift auto-generated from prod */

import Foundation

// swiftlint:disable force_unwrapping type_body_length file_length superfluous_disable_command
public enum Test {
    public static let schemeName: String = "prod"

    public enum Second {
        /// Requests per minute
        public static let limit: Int = 100
    }

    public enum First {
        public static let enabled: Bool = true
    }
}

// swiftlint:enable force_unwrapping type_body_length file_length superfluous_disable_command
"#;
        let json = serde_json::json!({
            "Second": {
                "limit": {
                    "type": "Int",
                    "defaultValue": 10,
                    "description": "Requests per minute",
                    "overrides": { "prod": 100 }
                }
            },
            "First": { "enabled": { "type": "Bool", "defaultValue": true } }
        });
        assert_eq!(render(json, "prod"), expected);
    }

    #[test]
    fn non_objc_scheme_name() {
        let expected = r#"/* Test.swift auto-generated from any */

import Foundation

// swiftlint:disable force_unwrapping type_body_length file_length superfluous_disable_command
public enum Test {
    public static let answer: Int = 42

    @nonobjc public static var schemeName: String {
        return "any"
    }
}

// swiftlint:enable force_unwrapping type_body_length file_length superfluous_disable_command
"#;
        let json = serde_json::json!({
            "template": { "requiresNonObjC": true },
            "answer": { "type": "Int", "defaultValue": 42 }
        });
        assert_eq!(render(json, "any"), expected);
    }

    #[test]
    fn non_objc_leaves_user_scheme_name_in_extensions() {
        let expected = r#"/* Bundle+Test.swift auto-generated from any */

import Foundation

// swiftlint:disable force_unwrapping type_body_length file_length superfluous_disable_command
public extension Bundle {
    public static let schemeName: String = "mine"
}

// swiftlint:enable force_unwrapping type_body_length file_length superfluous_disable_command
"#;
        let json = serde_json::json!({
            "template": { "extensionOn": "Bundle", "requiresNonObjC": true },
            "schemeName": { "type": "String", "defaultValue": "mine" }
        });
        assert_eq!(render(json, "any"), expected);
    }

    #[test]
    fn empty_group_still_renders() {
        let file = GeneratedFile::new(
            "Test".into(),
            "any".into(),
            vec!["Foundation".into()],
            Namespace::New("Test".into()),
            ResolvedScope {
                properties: vec![],
                groups: vec![ResolvedGroup {
                    name: "Empty".into(),
                    scope: ResolvedScope::default(),
                }],
            },
            false,
        );
        assert!(file.to_string().contains("public enum Test {\n    public enum Empty {\n\n    }\n}\n"));
    }

    #[test]
    fn rendering_is_deterministic() {
        let json = serde_json::json!({
            "b": { "type": "String", "defaultValue": "b" },
            "a": { "type": "Dictionary", "defaultValue": { "y": 1, "x": 2 } },
            "G": { "c": { "type": "Float", "defaultValue": 1 } }
        });
        assert_eq!(render(json.clone(), "any"), render(json, "any"));
    }
}
