use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Token replaced by the absolute input path when a template is instantiated.
pub const INPUT_PLACEHOLDER: &str = "{input}";

/// A program plus its argument vector, kept structural so paths are never
/// spliced into a shell string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandLine {
    pub program: String,
    pub args: Vec<String>,
}

impl CommandLine {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }
}

/// Display form used in log records: arguments that need it are single-quoted.
impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", quote_for_display(&self.program))?;
        for arg in &self.args {
            write!(f, " {}", quote_for_display(arg))?;
        }
        Ok(())
    }
}

fn quote_for_display(arg: &str) -> String {
    let plain = !arg.is_empty()
        && arg
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./=:,+@%".contains(c));
    if plain {
        arg.to_string()
    } else {
        format!("'{}'", arg.replace('\'', r"'\''"))
    }
}

/// Solver binary and fixed flags, with [`INPUT_PLACEHOLDER`] marking where the
/// input path goes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandTemplate {
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
}

impl CommandTemplate {
    pub fn has_placeholder(&self) -> bool {
        self.args.iter().any(|arg| arg.contains(INPUT_PLACEHOLDER))
    }

    pub fn instantiate(&self, input: &Path) -> CommandLine {
        let input = input.to_string_lossy();
        CommandLine {
            program: self.program.clone(),
            args: self
                .args
                .iter()
                .map(|arg| arg.replace(INPUT_PLACEHOLDER, &input))
                .collect(),
        }
    }
}
