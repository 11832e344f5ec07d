//! collection of configuration documents (parsed [Value] and path to source file)
//!
//! A configuration document is a json file with the `.config` extension. Its file stem names the
//! generated type and, unless the template says otherwise, the generated file.
use crate::value::Value;
use std::path::{Path, PathBuf};

/// Extension of configuration documents
pub const CONFIG_EXTENSION: &str = "config";

/// Extension of generated files
pub const SWIFT_EXTENSION: &str = "swift";

#[derive(Debug, Clone, PartialEq)]
pub struct ConfigSource {
    pub path: PathBuf,
    /// File stem, used as output name
    pub name: String,
    pub config: Value,
}

impl ConfigSource {
    /// Parses a json document, rejecting `null` and repeated keys
    pub fn parse(path: PathBuf, contents: &str) -> Result<Self, LoadError> {
        let config: Value = serde_json::from_str(contents).map_err(|source| match source.classify() {
            serde_json::error::Category::Data => LoadError::BadInput {
                path: path.clone(),
                source,
            },
            _ => LoadError::BadJson {
                path: path.clone(),
                source,
            },
        })?;

        let name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();

        Ok(Self { path, name, config })
    }

    /// Where the generated swift file for this document goes
    ///
    /// `<dir>/<filename or name>[.<additional_extension>].swift`
    pub fn output_path(&self, filename: Option<&str>, additional_extension: Option<&str>) -> PathBuf {
        let mut file_name = filename.unwrap_or(&self.name).to_string();
        if let Some(additional_extension) = additional_extension {
            file_name.push('.');
            file_name.push_str(additional_extension);
        }
        file_name.push('.');
        file_name.push_str(SWIFT_EXTENSION);

        self.path
            .parent()
            .unwrap_or_else(|| Path::new(""))
            .join(file_name)
    }
}

#[derive(Default, Debug)]
pub struct ConfigSources {
    sources: Vec<ConfigSource>,
}

impl ConfigSources {
    pub fn insert(&mut self, source: ConfigSource) {
        self.sources.push(source);
    }

    pub fn iter(&self) -> impl Iterator<Item = &ConfigSource> {
        self.sources.iter()
    }

    pub fn load_file(&mut self, file_path: &Path) -> Result<(), LoadError> {
        let file_path = file_path.canonicalize()?;
        tracing::info!(path=%file_path.display(), "loading file");

        let file_contents = std::fs::read_to_string(&file_path)?;
        self.insert(ConfigSource::parse(file_path, &file_contents)?);
        Ok(())
    }

    /// Loads every `.config` file in `dir_path`, ordered by path
    pub fn load_directory(&mut self, dir_path: &Path) -> Result<(), LoadError> {
        let mut file_paths = vec![];

        let read_dir = std::fs::read_dir(dir_path)?;
        for dir_entry in read_dir {
            let dir_entry = dir_entry?;
            if !dir_entry.file_type()?.is_file() {
                continue;
            }

            let file_path = dir_entry.path();
            let is_config_file = file_path
                .extension()
                .is_some_and(|extension| extension == CONFIG_EXTENSION);
            if is_config_file {
                file_paths.push(file_path);
            }
        }

        if file_paths.is_empty() {
            return Err(LoadError::NoFilesFound(dir_path.to_owned()));
        }

        file_paths.sort();
        for file_path in file_paths {
            self.load_file(&file_path)?;
        }

        Ok(())
    }
}

impl IntoIterator for ConfigSources {
    type Item = ConfigSource;
    type IntoIter = std::vec::IntoIter<ConfigSource>;

    fn into_iter(self) -> Self::IntoIter {
        self.sources.into_iter()
    }
}

#[derive(thiserror::Error, Debug)]
pub enum LoadError {
    #[error("No configuration files found in {}", .0.display())]
    NoFilesFound(PathBuf),
    #[error("IO error")]
    IoError(#[from] std::io::Error),
    #[error("Unable to parse {} as json", path.display())]
    BadJson {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("Invalid configuration in {}", path.display())]
    BadInput {
        path: PathBuf,
        source: serde_json::Error,
    },
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    fn source(path: &str) -> ConfigSource {
        ConfigSource::parse(path.into(), "{}").unwrap()
    }

    #[test]
    fn name_is_file_stem() {
        assert_eq!(source("/project/Config/App.config").name, "App");
    }

    #[test]
    fn output_path_defaults_to_source_name() {
        assert_eq!(
            source("/project/Config/App.config").output_path(None, None),
            PathBuf::from("/project/Config/App.swift")
        );
    }

    #[test]
    fn output_path_with_filename_and_extension() {
        assert_eq!(
            source("/project/Config/Colours.config").output_path(Some("UIColor+Colours"), Some("generated")),
            PathBuf::from("/project/Config/UIColor+Colours.generated.swift")
        );
    }

    #[test]
    fn bad_json() {
        let err = ConfigSource::parse("broken.config".into(), "{ not json").unwrap_err();
        assert!(matches!(err, LoadError::BadJson { .. }));
    }

    #[test]
    fn null_is_bad_input() {
        let err = ConfigSource::parse("null.config".into(), r#"{"a": null}"#).unwrap_err();
        assert!(matches!(err, LoadError::BadInput { .. }));
    }

    #[test]
    fn repeated_key_is_bad_input() {
        let err = ConfigSource::parse(
            "twice.config".into(),
            r#"{"host": {"type": "String", "defaultValue": "a"}, "host": {"type": "Int", "defaultValue": 1}}"#,
        )
        .unwrap_err();
        let LoadError::BadInput { source, .. } = err else {
            panic!("expected bad input");
        };
        assert!(source.to_string().contains("duplicate key `host`"));
    }

    #[test]
    fn load_directory_only_reads_config_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("B.config"), "{}").unwrap();
        std::fs::write(dir.path().join("A.config"), r#"{"x": {"type": "Int", "defaultValue": 1}}"#)
            .unwrap();
        std::fs::write(dir.path().join("A.swift"), "// generated").unwrap();
        std::fs::create_dir(dir.path().join("nested.config")).unwrap();

        let mut sources = ConfigSources::default();
        sources.load_directory(dir.path()).unwrap();

        let names: Vec<_> = sources.iter().map(|source| source.name.as_str()).collect();
        assert_eq!(names, ["A", "B"]);
    }

    #[test]
    fn empty_directory() {
        let dir = tempfile::tempdir().unwrap();
        let err = ConfigSources::default().load_directory(dir.path()).unwrap_err();
        assert!(matches!(err, LoadError::NoFilesFound(_)));
    }
}
