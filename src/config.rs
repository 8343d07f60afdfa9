use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{info, warn};

use crate::input::SequenceAction;

#[derive(PartialEq, Eq, Hash, Copy, Clone, Debug)]
pub enum KeySequence {
    Zero,
    One(char),
    Two(char, char),
}

impl KeySequence {
    /// Sequences longer than two keys are not representable
    pub fn from_chars(keys: &[char]) -> Option<Self> {
        match keys {
            [] => Some(KeySequence::Zero),
            [a] => Some(KeySequence::One(*a)),
            [a, b] => Some(KeySequence::Two(*a, *b)),
            _ => None,
        }
    }

    pub fn first(&self) -> Option<char> {
        match self {
            KeySequence::Zero => None,
            KeySequence::One(a) | KeySequence::Two(a, _) => Some(*a),
        }
    }
}

/// Key sequences understood by normal mode
#[derive(Debug, Clone)]
pub struct CommandTable {
    basic_map: HashMap<KeySequence, SequenceAction>,
}

impl CommandTable {
    pub fn get(&self, seq: KeySequence) -> Option<SequenceAction> {
        self.basic_map.get(&seq).copied()
    }

    pub fn match_sequence(&self, keys: &[char]) -> Option<SequenceAction> {
        KeySequence::from_chars(keys).and_then(|seq| self.get(seq))
    }

    /// Whether `keys` could still grow into a two-key binding
    pub fn is_prefix(&self, keys: &[char]) -> bool {
        match keys {
            [c] => self
                .basic_map
                .keys()
                .any(|seq| matches!(seq, KeySequence::Two(..)) && seq.first() == Some(*c)),
            _ => false,
        }
    }

    pub fn bind(&mut self, seq: KeySequence, action: SequenceAction) {
        self.basic_map.insert(seq, action);
    }
}

impl Default for CommandTable {
    fn default() -> Self {
        Self {
            basic_map: HashMap::from([
                (KeySequence::Two('g', 'g'), SequenceAction::MoveToTop),

                (KeySequence::One('j'), SequenceAction::MoveDown),
                (KeySequence::One('k'), SequenceAction::MoveUp),
                (KeySequence::One('h'), SequenceAction::MoveLeft),
                (KeySequence::One('l'), SequenceAction::MoveRight),

                (KeySequence::Two('t', 'c'), SequenceAction::Cleanse),
                (KeySequence::Two('t', 's'), SequenceAction::Rescale),
                (KeySequence::Two('t', 'd'), SequenceAction::Dedupe),

                (KeySequence::Two('y', 'j'), SequenceAction::CopyRegisterMap),
                (KeySequence::Two('y', 'q'), SequenceAction::CopyQuery),
            ]),
        }
    }
}

/// Names of the columns that carry meaning for the operators and exports
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ColumnRules {
    /// Identifier column: protected from rescale and delta adjust, keys both exports
    pub tag: String,
    /// Starting register of each tag
    pub address: String,
    /// Scale factor column: protected from deduplicate
    pub scale: String,
}

impl Default for ColumnRules {
    fn default() -> Self {
        Self {
            tag: "Tags".to_string(),
            address: "Address".to_string(),
            scale: "Scale Factors".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ExportSettings {
    pub csv_file: String,
    pub register_map_file: String,
    pub query_file: String,
    /// Value of the `type` field of every register-map entry
    pub register_type: String,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            csv_file: "output.csv".to_string(),
            register_map_file: "tags_config.json".to_string(),
            query_file: "tags_query.json".to_string(),
            register_type: "int16".to_string(),
        }
    }
}

/// On-disk shape of `config.toml`
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ConfigFile {
    columns: ColumnRules,
    export: ExportSettings,
    theme: Option<String>,
    theme_file: Option<PathBuf>,
    keys: HashMap<String, String>,
}

pub struct AppConfig {
    pub columns: ColumnRules,
    pub export: ExportSettings,
    pub theme: Option<String>,
    pub theme_file: Option<PathBuf>,
    pub commands: CommandTable,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl AppConfig {
    pub fn new() -> Self {
        Self {
            columns: ColumnRules::default(),
            export: ExportSettings::default(),
            theme: None,
            theme_file: None,
            commands: CommandTable::default(),
        }
    }

    /// `$HOME/.config/tagsheet/config.toml`
    pub fn default_path() -> PathBuf {
        if let Some(home) = std::env::var_os("HOME") {
            PathBuf::from(home).join(".config/tagsheet/config.toml")
        } else {
            PathBuf::from(".config/tagsheet/config.toml")
        }
    }

    /// Parse a config document. Unusable key bindings are dropped and
    /// reported as warnings; a malformed document is an error.
    pub fn from_toml(content: &str) -> Result<(Self, Vec<String>), toml::de::Error> {
        let file: ConfigFile = toml::from_str(content)?;
        let mut warnings = Vec::new();
        let mut commands = CommandTable::default();

        for (keys, name) in &file.keys {
            let chars: Vec<char> = keys.chars().collect();
            let seq = KeySequence::from_chars(&chars).filter(|s| *s != KeySequence::Zero);
            match (seq, SequenceAction::from_name(name)) {
                (Some(seq), Some(action)) => commands.bind(seq, action),
                (None, _) => warnings.push(format!("Ignoring key binding '{}': use one or two keys", keys)),
                (_, None) => warnings.push(format!("Ignoring key binding '{}': unknown action '{}'", keys, name)),
            }
        }

        Ok((
            Self {
                columns: file.columns,
                export: file.export,
                theme: file.theme,
                theme_file: file.theme_file,
                commands,
            },
            warnings,
        ))
    }

    /// Load the config at `path` (or the default location). A missing file
    /// yields defaults silently; an unreadable or malformed one yields
    /// defaults plus a warning.
    pub fn load(path: Option<&Path>) -> (Self, Vec<String>) {
        let explicit = path.is_some();
        let path = path.map(Path::to_path_buf).unwrap_or_else(Self::default_path);

        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound && !explicit => {
                return (Self::new(), Vec::new());
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "could not read config");
                return (Self::new(), vec![format!("Config not read: {}", e)]);
            }
        };

        match Self::from_toml(&content) {
            Ok((config, warnings)) => {
                info!(path = %path.display(), "config loaded");
                (config, warnings)
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "invalid config");
                (Self::new(), vec![format!("Invalid config {}: {}", path.display(), e.message())])
            }
        }
    }
}
