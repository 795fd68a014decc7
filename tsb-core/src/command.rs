//! Invoked command and build mode.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// The tsb command a configuration is being resolved for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Command {
    /// One-off production bundle
    Build,
    /// Rebuild on change (development)
    Watch,
    /// Dev server (development)
    Serve,
}

impl Command {
    /// Every command, in declaration order.
    pub const ALL: [Command; 3] = [Command::Build, Command::Watch, Command::Serve];

    /// Returns the command name as a static string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Command::Build => "build",
            Command::Watch => "watch",
            Command::Serve => "serve",
        }
    }

    /// The build mode implied by this command.
    pub fn mode(&self) -> Mode {
        match self {
            Command::Build => Mode::Production,
            Command::Watch | Command::Serve => Mode::Development,
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Command {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "build" => Ok(Command::Build),
            "watch" => Ok(Command::Watch),
            "serve" => Ok(Command::Serve),
            _ => Err(format!(
                "unknown command '{}', expected 'build', 'watch' or 'serve'",
                s
            )),
        }
    }
}

/// Build mode handed to the bundler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Development,
    Production,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Development => "development",
            Mode::Production => "production",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
