//! jsnorm_options: the option surface of the normalizer.
//!
//! Options can come from the command line or from a `jsnorm.json` file;
//! the CLI merges the two with command-line flags winning.

use jsnorm_ast::LanguageMode;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// The ECMAScript level, as written in configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum LanguageTarget {
    #[serde(rename = "ES2015")]
    Es2015,
    #[serde(rename = "ES2016")]
    Es2016,
    #[serde(rename = "ES2017")]
    #[default]
    Es2017,
}

impl From<LanguageTarget> for LanguageMode {
    fn from(target: LanguageTarget) -> LanguageMode {
        match target {
            LanguageTarget::Es2015 => LanguageMode::Es2015,
            LanguageTarget::Es2016 => LanguageMode::Es2016,
            LanguageTarget::Es2017 => LanguageMode::Es2017,
        }
    }
}

/// Options recognized by the rename pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CompilerOptions {
    /// `true` selects the contextual (collision-avoiding) renamer, `false`
    /// the inline (unconditional) one.
    pub use_default_renamer: bool,
    /// Run the inverter instead of a forward renamer.
    pub invert: bool,
    /// Strip const-ness annotations while inline-renaming.
    pub remove_const: bool,
    /// String spliced into inline suffixes, e.g. `unique_`.
    pub local_name_prefix: String,
    /// Which syntactic forms the parser accepts.
    pub language_mode: LanguageTarget,
    /// Emit indented output.
    pub pretty: bool,
    /// Where to write outputs; stdout when absent.
    pub out_dir: Option<String>,
}

impl Default for CompilerOptions {
    fn default() -> Self {
        Self {
            use_default_renamer: true,
            invert: false,
            remove_const: false,
            local_name_prefix: String::new(),
            language_mode: LanguageTarget::default(),
            pretty: true,
            out_dir: None,
        }
    }
}

impl CompilerOptions {
    pub fn language(&self) -> LanguageMode {
        self.language_mode.into()
    }
}

/// The shape of a `jsnorm.json` file.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct JsnormConfig {
    pub compiler_options: Option<CompilerOptions>,
    pub files: Option<Vec<String>>,
}

/// Read and parse a config file.
pub fn parse_config_file(path: impl AsRef<Path>) -> Result<JsnormConfig, Box<dyn std::error::Error>> {
    let text = std::fs::read_to_string(path)?;
    let config = serde_json::from_str(&text)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = CompilerOptions::default();
        assert!(options.use_default_renamer);
        assert!(!options.invert);
        assert_eq!(options.language(), LanguageMode::Es2017);
    }

    #[test]
    fn test_config_round_trip() {
        let json = r#"{
            "compilerOptions": {
                "useDefaultRenamer": false,
                "localNamePrefix": "unique_",
                "languageMode": "ES2016"
            },
            "files": ["src/main.js"]
        }"#;
        let config: JsnormConfig = serde_json::from_str(json).expect("valid config");
        let options = config.compiler_options.expect("options present");
        assert!(!options.use_default_renamer);
        assert_eq!(options.local_name_prefix, "unique_");
        assert_eq!(options.language(), LanguageMode::Es2016);
        assert_eq!(config.files.as_deref(), Some(&["src/main.js".to_string()][..]));
    }
}
