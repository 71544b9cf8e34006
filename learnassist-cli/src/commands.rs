use learnassist_core::preferences::PreferenceAxis;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Chat(String),
    Set { axis: PreferenceAxis, value: String },
    ShowPreferences,
    Summarize(String),
    Ask { context: String, question: String },
    Help,
    Quit,
}

pub const HELP: &str = "\
commands:
  <text>                    ask the assistant
  :font small|medium|large|extra-large
  :contrast normal|high|inverted
  :speech on|off            read replies aloud
  :dark on|off
  :keys on|off              keyboard navigation hints
  :prefs                    show current preferences
  :summarize <text>
  :ask <context> | <question>
  :help
  :quit";

/// Turns one input line into a command. `None` for blank lines.
pub fn parse_line(line: &str) -> Result<Option<Command>, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let Some(rest) = line.strip_prefix(':') else {
        return Ok(Some(Command::Chat(line.to_string())));
    };

    let (name, arg) = match rest.split_once(char::is_whitespace) {
        Some((n, a)) => (n, a.trim()),
        None => (rest, ""),
    };

    let cmd = match name {
        "font" => set(PreferenceAxis::FontSize, arg)?,
        "contrast" => set(PreferenceAxis::Contrast, arg)?,
        "speech" => toggle(PreferenceAxis::SpeechEnabled, arg)?,
        "dark" => toggle(PreferenceAxis::DarkMode, arg)?,
        "keys" => toggle(PreferenceAxis::KeyboardNavHint, arg)?,
        "prefs" => Command::ShowPreferences,
        "summarize" if !arg.is_empty() => Command::Summarize(arg.to_string()),
        "summarize" => return Err("usage: :summarize <text>".into()),
        "ask" => {
            let Some((context, question)) = arg.split_once('|') else {
                return Err("usage: :ask <context> | <question>".into());
            };
            let (context, question) = (context.trim(), question.trim());
            if context.is_empty() || question.is_empty() {
                return Err("usage: :ask <context> | <question>".into());
            }
            Command::Ask {
                context: context.to_string(),
                question: question.to_string(),
            }
        }
        "help" | "h" => Command::Help,
        "quit" | "q" | "exit" => Command::Quit,
        other => return Err(format!("unknown command :{other} (try :help)")),
    };
    Ok(Some(cmd))
}

fn set(axis: PreferenceAxis, arg: &str) -> Result<Command, String> {
    if arg.is_empty() {
        return Err(format!("usage: :{} <value>", axis_command(axis)));
    }
    Ok(Command::Set {
        axis,
        value: arg.to_ascii_lowercase(),
    })
}

fn toggle(axis: PreferenceAxis, arg: &str) -> Result<Command, String> {
    let value = match arg.to_ascii_lowercase().as_str() {
        "on" | "true" | "yes" => "true",
        "off" | "false" | "no" => "false",
        _ => return Err(format!("usage: :{} on|off", axis_command(axis))),
    };
    Ok(Command::Set {
        axis,
        value: value.into(),
    })
}

fn axis_command(axis: PreferenceAxis) -> &'static str {
    match axis {
        PreferenceAxis::FontSize => "font",
        PreferenceAxis::Contrast => "contrast",
        PreferenceAxis::SpeechEnabled => "speech",
        PreferenceAxis::DarkMode => "dark",
        PreferenceAxis::KeyboardNavHint => "keys",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_is_chat() {
        assert_eq!(
            parse_line("  What is a verb? ").unwrap(),
            Some(Command::Chat("What is a verb?".into()))
        );
        assert_eq!(parse_line("   ").unwrap(), None);
    }

    #[test]
    fn preference_commands() {
        assert_eq!(
            parse_line(":font Extra-Large").unwrap(),
            Some(Command::Set {
                axis: PreferenceAxis::FontSize,
                value: "extra-large".into()
            })
        );
        assert_eq!(
            parse_line(":speech on").unwrap(),
            Some(Command::Set {
                axis: PreferenceAxis::SpeechEnabled,
                value: "true".into()
            })
        );
        assert_eq!(
            parse_line(":keys off").unwrap(),
            Some(Command::Set {
                axis: PreferenceAxis::KeyboardNavHint,
                value: "false".into()
            })
        );
        assert!(parse_line(":dark maybe").is_err());
        assert!(parse_line(":font").is_err());
    }

    #[test]
    fn tool_commands() {
        assert_eq!(
            parse_line(":ask Paris is in France. | Where is Paris?").unwrap(),
            Some(Command::Ask {
                context: "Paris is in France.".into(),
                question: "Where is Paris?".into()
            })
        );
        assert!(parse_line(":ask no separator").is_err());
        assert_eq!(
            parse_line(":summarize A long text").unwrap(),
            Some(Command::Summarize("A long text".into()))
        );
        assert!(parse_line(":summarize").is_err());
        assert_eq!(parse_line(":q").unwrap(), Some(Command::Quit));
        assert!(parse_line(":dance").is_err());
    }
}
