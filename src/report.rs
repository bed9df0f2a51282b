use serde::{Deserialize, Serialize};

/// A configured diagnostic command. Never carries output.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub title: String,
    pub command: String,
}

/// A command together with the output of one run of it
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct CommandResult {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub command: String,
    #[serde(default)]
    pub output: String,
}

impl CommandResult {
    pub fn new(spec: CommandSpec, output: String) -> Self {
        Self {
            title: spec.title,
            command: spec.command,
            output,
        }
    }
}

/// Body of a `/report` response, in configuration order
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandResultSet {
    pub commands: Vec<CommandResult>,
}

impl CommandResultSet {
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}
