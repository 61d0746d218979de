//! Interactive shell commands

use crate::resources::Lang;
use crate::router::View;
use crate::workflow::FormEdit;
use procure_common::Error;
use std::str::FromStr;

pub const HELP: &str = "\
Commands:
  help                      Show this help
  show                      Render the current view
  go <predictor|docs|status>
                            Switch view
  back | forward            Move through view history
  lang <pl|en|ua>           Change interface language
  set <FIELD> <value>       Edit VALUE_EURO, CAE_NAME, NUTS or TYPE_OF_CONTRACT
  preset <1|2|3>            Load a ready scenario
  submit                    Send the form for prediction
  describe <code>           Look up a CPV description
  quit                      Exit";

/// One parsed line of shell input
#[derive(Debug, Clone, PartialEq)]
pub enum ShellCommand {
    Help,
    Show,
    Go(View),
    Back,
    Forward,
    Lang(Lang),
    Set(FormEdit),
    Preset(u8),
    Submit,
    Describe(String),
    Quit,
}

impl FromStr for ShellCommand {
    type Err = Error;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (command, rest) = match line.split_once(char::is_whitespace) {
            Some((command, rest)) => (command, rest.trim()),
            None => (line, ""),
        };

        let require = |what: &str| {
            if rest.is_empty() {
                Err(Error::InvalidInput(format!("'{}' needs {}", command, what)))
            } else {
                Ok(rest)
            }
        };

        match command.to_ascii_lowercase().as_str() {
            "help" | "?" => Ok(ShellCommand::Help),
            "show" | "" => Ok(ShellCommand::Show),
            "go" => require("a view")?.parse().map(ShellCommand::Go),
            "back" => Ok(ShellCommand::Back),
            "forward" => Ok(ShellCommand::Forward),
            "lang" => require("a language")?.parse().map(ShellCommand::Lang),
            "set" => {
                let args = require("a field and a value")?;
                let (field, value) = args
                    .split_once(char::is_whitespace)
                    .ok_or_else(|| Error::InvalidInput(format!("'set {}' needs a value", args)))?;
                FormEdit::parse(field, value.trim()).map(ShellCommand::Set)
            }
            "preset" => require("a number")?
                .parse::<u8>()
                .map(ShellCommand::Preset)
                .map_err(|_| Error::InvalidInput(format!("Preset must be a number, got '{}'", rest))),
            "submit" | "predict" => Ok(ShellCommand::Submit),
            "describe" => Ok(ShellCommand::Describe(require("a CPV code")?.to_string())),
            "quit" | "exit" => Ok(ShellCommand::Quit),
            other => Err(Error::InvalidInput(format!(
                "Unknown command '{}' (type 'help')",
                other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_commands() {
        assert_eq!("help".parse::<ShellCommand>().unwrap(), ShellCommand::Help);
        assert_eq!("".parse::<ShellCommand>().unwrap(), ShellCommand::Show);
        assert_eq!("  back ".parse::<ShellCommand>().unwrap(), ShellCommand::Back);
        assert_eq!("SUBMIT".parse::<ShellCommand>().unwrap(), ShellCommand::Submit);
        assert_eq!("exit".parse::<ShellCommand>().unwrap(), ShellCommand::Quit);
    }

    #[test]
    fn test_parse_arguments() {
        assert_eq!("go status".parse::<ShellCommand>().unwrap(), ShellCommand::Go(View::Status));
        assert_eq!("lang uk".parse::<ShellCommand>().unwrap(), ShellCommand::Lang(Lang::Ua));
        assert_eq!("preset 2".parse::<ShellCommand>().unwrap(), ShellCommand::Preset(2));
        assert_eq!(
            "describe 75000000".parse::<ShellCommand>().unwrap(),
            ShellCommand::Describe("75000000".to_string())
        );
    }

    #[test]
    fn test_set_keeps_spaces_in_value() {
        assert_eq!(
            "set CAE_NAME Urząd Miasta Warszawa".parse::<ShellCommand>().unwrap(),
            ShellCommand::Set(FormEdit::CaeName("Urząd Miasta Warszawa".to_string()))
        );
        assert_eq!(
            "set value_euro 150000".parse::<ShellCommand>().unwrap(),
            ShellCommand::Set(FormEdit::ValueEuro(150000.0))
        );
    }

    #[test]
    fn test_parse_errors() {
        assert!("go".parse::<ShellCommand>().is_err());
        assert!("go settings".parse::<ShellCommand>().is_err());
        assert!("set NUTS".parse::<ShellCommand>().is_err());
        assert!("set VALUE_EURO abc".parse::<ShellCommand>().is_err());
        assert!("preset x".parse::<ShellCommand>().is_err());
        assert!("dance".parse::<ShellCommand>().is_err());
    }
}
