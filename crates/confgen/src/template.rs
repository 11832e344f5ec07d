//! template variants and their dispatch
//!
//! A [TemplateRegistry] holds templates in priority order. The first template whose
//! [Template::can_handle] accepts a document generates it. A catch-all template accepts
//! everything, so anything registered after it could never be selected; the registry refuses
//! such an ordering when it is built.
use crate::error::{GenerateError, RegistryError};
use crate::event::Event;
use crate::value::Value;

/// A generation strategy
pub trait Template: std::fmt::Debug + Send + Sync {
    fn name(&self) -> &'static str;

    fn can_handle(&self, config: &Value) -> bool;

    /// `true` if [Template::can_handle] accepts every document
    fn is_catch_all(&self) -> bool {
        false
    }

    fn construct(
        &self,
        config: &Value,
        name: &str,
        scheme: &str,
    ) -> Result<Box<dyn Output>, GenerateError>;
}

/// A constructed template, ready to render
pub trait Output {
    /// Output file name without extension, `None` to reuse the source file name
    fn filename(&self) -> Option<String>;

    fn render(&self) -> String;

    fn events(&self) -> &[Event];
}

/// Result of generating one document
#[derive(Debug, Clone, PartialEq)]
pub struct Generation {
    pub template: &'static str,
    pub filename: Option<String>,
    pub text: String,
    pub events: Vec<Event>,
}

#[derive(Debug)]
pub struct TemplateRegistry {
    templates: Vec<Box<dyn Template>>,
}

impl TemplateRegistry {
    pub fn new(templates: Vec<Box<dyn Template>>) -> Result<Self, RegistryError> {
        let last = templates.len().saturating_sub(1);
        if let Some((_, template)) = templates
            .iter()
            .enumerate()
            .find(|(index, template)| template.is_catch_all() && *index != last)
        {
            return Err(RegistryError::CatchAllNotLast {
                template: template.name(),
            });
        }

        Ok(Self { templates })
    }

    /// First template able to handle `config`
    pub fn select(&self, config: &Value) -> Result<&dyn Template, GenerateError> {
        self.templates
            .iter()
            .find(|template| template.can_handle(config))
            .map(|template| template.as_ref())
            .ok_or(GenerateError::NoApplicableTemplate)
    }

    pub fn generate(
        &self,
        config: &Value,
        name: &str,
        scheme: &str,
    ) -> Result<Generation, GenerateError> {
        let template = self.select(config)?;
        tracing::trace!(template = template.name(), name, scheme, "generating");

        let output = template.construct(config, name, scheme)?;

        let mut events = vec![Event::TemplateSelected {
            template: template.name(),
        }];
        events.extend_from_slice(output.events());

        Ok(Generation {
            template: template.name(),
            filename: output.filename(),
            text: output.render(),
            events,
        })
    }
}

impl Default for TemplateRegistry {
    /// Only the configuration file template
    fn default() -> Self {
        Self {
            templates: vec![Box::new(crate::configuration_file::ConfigurationFileTemplate)],
        }
    }
}
