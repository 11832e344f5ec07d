//! the catch-all template: one swift namespace (or extension) of typed constants per document
use crate::definition::ConfigurationSpec;
use crate::error::GenerateError;
use crate::event::Event;
use crate::group;
use crate::render::GeneratedFile;
use crate::template::{Output, Template};
use crate::value::Value;

#[derive(Debug, Clone, Copy, Default)]
pub struct ConfigurationFileTemplate;

impl Template for ConfigurationFileTemplate {
    fn name(&self) -> &'static str {
        "configuration-file"
    }

    fn can_handle(&self, _config: &Value) -> bool {
        true
    }

    fn is_catch_all(&self) -> bool {
        true
    }

    fn construct(
        &self,
        config: &Value,
        name: &str,
        scheme: &str,
    ) -> Result<Box<dyn Output>, GenerateError> {
        Ok(Box::new(ConfigurationFile::new(config, name, scheme)?))
    }
}

/// A resolved configuration document
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigurationFile {
    spec: ConfigurationSpec,
    file: GeneratedFile,
    events: Vec<Event>,
}

impl ConfigurationFile {
    pub fn new(config: &Value, name: &str, scheme: &str) -> Result<Self, GenerateError> {
        let spec = ConfigurationSpec::new(config, name, scheme)?;
        let resolution = group::resolve(&spec)?;
        let file = GeneratedFile::from_spec(&spec, resolution.root);

        Ok(Self {
            spec,
            file,
            events: resolution.events,
        })
    }

    pub fn spec(&self) -> &ConfigurationSpec {
        &self.spec
    }

    pub fn file(&self) -> &GeneratedFile {
        &self.file
    }
}

impl Output for ConfigurationFile {
    fn filename(&self) -> Option<String> {
        self.spec.filename()
    }

    fn render(&self) -> String {
        self.file.to_string()
    }

    fn events(&self) -> &[Event] {
        &self.events
    }
}
