//! structured events produced during generation
//!
//! The engine never logs on its own behalf. Whoever drives it decides what to do with these.

/// Which override axis selected a value
#[derive(Debug, Clone, PartialEq)]
pub enum OverrideSource {
    /// The active scheme matched an override key
    Scheme,
    /// The resolved value of the named sibling matched an override key
    Associated(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    TemplateSelected {
        template: &'static str,
    },
    SchemeNameInjected {
        scheme: String,
    },
    OverrideApplied {
        property: String,
        key: String,
        source: OverrideSource,
    },
    InitialisationVectorDerived {
        property: String,
    },
    SecretEncrypted {
        property: String,
        bytes: usize,
    },
}

impl std::fmt::Display for Event {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Event::TemplateSelected { template } => write!(f, "selected template {template}"),
            Event::SchemeNameInjected { scheme } => write!(f, "injected schemeName = {scheme:?}"),
            Event::OverrideApplied {
                property,
                key,
                source: OverrideSource::Scheme,
            } => write!(f, "{property}: using override for scheme {key:?}"),
            Event::OverrideApplied {
                property,
                key,
                source: OverrideSource::Associated(associated),
            } => write!(f, "{property}: using override {key:?} selected by {associated}"),
            Event::InitialisationVectorDerived { property } => {
                write!(f, "derived initialisation vector {property}")
            }
            Event::SecretEncrypted { property, bytes } => {
                write!(f, "encrypted {property} ({bytes} bytes)")
            }
        }
    }
}
