pub mod command;
pub mod normal;
pub mod prompt;

/// What a prompt line is collecting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    /// Integer to add to the selected column
    Add,
    /// Integer to subtract from the selected column
    Subtract,
    /// New name for the selected column
    Rename,
}

impl PromptKind {
    pub fn label(&self) -> &'static str {
        match self {
            PromptKind::Add => "Add to column: ",
            PromptKind::Subtract => "Subtract from column: ",
            PromptKind::Rename => "Rename column to: ",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Normal,
    Command,
    Prompt(PromptKind),
}

impl Mode {
    pub fn display_name(&self) -> &'static str {
        match self {
            Mode::Normal => "NORMAL",
            Mode::Command => "COMMAND",
            Mode::Prompt(PromptKind::Rename) => "RENAME",
            Mode::Prompt(_) => "DELTA",
        }
    }
}

#[cfg(test)]
mod test;
