use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::layers::MAX_LAYER_DEPTH;

pub const OPTIONS_ENV_VAR: &str = "WORLDVIEW_OPTIONS";

/// Presentation flags read when the view is built and whenever options are re-applied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct ViewOptions {
    pub grid_enabled: bool,
    pub grid_coordinates_enabled: bool,
    pub reverse_scroll_enabled: bool,
    pub shadow_enabled: bool,
    pub darken_enabled: bool,
    pub blur_enabled: bool,
    /// Pins the deepest rendered slice instead of following the view-model's max Z level.
    pub show_underlying: Option<u32>,
}

impl ViewOptions {
    /// Every visual flag on; scroll direction untouched.
    pub fn showcase() -> Self {
        Self {
            grid_enabled: true,
            grid_coordinates_enabled: true,
            reverse_scroll_enabled: false,
            shadow_enabled: true,
            darken_enabled: true,
            blur_enabled: true,
            show_underlying: None,
        }
    }

    pub fn load(path: &Path) -> Result<Self, OptionsError> {
        let raw = fs::read_to_string(path).map_err(|source| OptionsError::ReadFile {
            path: path.to_path_buf(),
            source,
        })?;
        let options = Self::parse(&raw).map_err(|(location, message)| OptionsError::Parse {
            path: path.to_path_buf(),
            location,
            message,
        })?;
        if let Some(depth) = options.show_underlying {
            if depth >= MAX_LAYER_DEPTH {
                return Err(OptionsError::ShowUnderlyingOutOfRange {
                    path: path.to_path_buf(),
                    depth,
                    max: MAX_LAYER_DEPTH - 1,
                });
            }
        }
        Ok(options)
    }

    fn parse(raw: &str) -> Result<Self, (String, String)> {
        let mut deserializer = serde_json::Deserializer::from_str(raw);
        serde_path_to_error::deserialize::<_, ViewOptions>(&mut deserializer).map_err(|error| {
            let location = error.path().to_string();
            (location, error.into_inner().to_string())
        })
    }
}

#[derive(Debug, Error)]
pub enum OptionsError {
    #[error("failed to read options file {path}: {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid options file {path} at {location}: {message}")]
    Parse {
        path: PathBuf,
        location: String,
        message: String,
    },
    #[error("show_underlying {depth} in options file {path} exceeds the deepest layer {max}")]
    ShowUnderlyingOutOfRange { path: PathBuf, depth: u32, max: u32 },
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn write_options_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(contents.as_bytes()).expect("write options");
        file
    }

    #[test]
    fn defaults_are_all_off() {
        let options = ViewOptions::default();
        assert!(!options.grid_enabled);
        assert!(!options.grid_coordinates_enabled);
        assert!(!options.reverse_scroll_enabled);
        assert!(!options.shadow_enabled);
        assert!(!options.darken_enabled);
        assert!(!options.blur_enabled);
        assert_eq!(options.show_underlying, None);
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let file = write_options_file(r#"{ "darken_enabled": true, "show_underlying": 2 }"#);
        let options = ViewOptions::load(file.path()).expect("load options");
        assert!(options.darken_enabled);
        assert!(!options.blur_enabled);
        assert_eq!(options.show_underlying, Some(2));
    }

    #[test]
    fn wrong_type_reports_field_path() {
        let file = write_options_file(r#"{ "blur_enabled": "yes" }"#);
        let error = ViewOptions::load(file.path()).expect_err("should fail");
        match error {
            OptionsError::Parse { location, .. } => assert_eq!(location, "blur_enabled"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn oversized_show_underlying_is_rejected() {
        let file = write_options_file(r#"{ "show_underlying": 4294967295 }"#);
        let error = ViewOptions::load(file.path()).expect_err("should fail");
        assert!(matches!(
            error,
            OptionsError::ShowUnderlyingOutOfRange { depth: u32::MAX, .. }
        ));

        let deepest = MAX_LAYER_DEPTH - 1;
        let file = write_options_file(&format!(r#"{{ "show_underlying": {deepest} }}"#));
        let options = ViewOptions::load(file.path()).expect("deepest layer is allowed");
        assert_eq!(options.show_underlying, Some(MAX_LAYER_DEPTH - 1));
    }

    #[test]
    fn unknown_field_is_rejected() {
        let file = write_options_file(r#"{ "fog_enabled": true }"#);
        assert!(matches!(
            ViewOptions::load(file.path()),
            Err(OptionsError::Parse { .. })
        ));
    }

    #[test]
    fn missing_file_is_read_error() {
        let dir = tempfile::tempdir().expect("temp dir");
        let error = ViewOptions::load(&dir.path().join("absent.json")).expect_err("should fail");
        assert!(matches!(error, OptionsError::ReadFile { .. }));
    }
}
