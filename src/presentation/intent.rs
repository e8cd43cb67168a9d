use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

pub const HELP: &str = "\
Commands:
  id <student id>   type a student ID (empty clears it)
  clear             clear the student ID
  validate          look up the student ID
  choose <path>     pick a slip image
  upload            upload the selected slip
  show              redraw the screen
  history           list state transitions
  help              show this help
  quit              leave the session";

/// A user action forwarded to the workflow
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    SetIdentifier(String),
    Clear,
    Validate,
    Choose(PathBuf),
    Upload,
    Show,
    History,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IntentError {
    #[error("unknown command '{0}' (type 'help')")]
    Unknown(String),
    #[error("'{0}' needs an argument")]
    MissingArgument(&'static str),
}

impl FromStr for Intent {
    type Err = IntentError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim_start();
        let (command, rest) = match line.split_once(char::is_whitespace) {
            Some((command, rest)) => (command, rest.trim()),
            None => (line.trim_end(), ""),
        };

        match command {
            "id" => Ok(Intent::SetIdentifier(rest.to_string())),
            "clear" => Ok(Intent::Clear),
            "validate" | "v" => Ok(Intent::Validate),
            "choose" | "c" => {
                if rest.is_empty() {
                    Err(IntentError::MissingArgument("choose"))
                } else {
                    Ok(Intent::Choose(PathBuf::from(rest)))
                }
            }
            "upload" | "u" => Ok(Intent::Upload),
            "show" | "" => Ok(Intent::Show),
            "history" => Ok(Intent::History),
            "help" | "?" => Ok(Intent::Help),
            "quit" | "exit" | "q" => Ok(Intent::Quit),
            other => Err(IntentError::Unknown(other.to_string())),
        }
    }
}
