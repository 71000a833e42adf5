//! Parsing of lines typed at the prompt.

use tutor_core::orchestrator::QUICK_TOPICS;

#[derive(Debug, PartialEq, Eq)]
pub enum Command<'a> {
    /// Free text for the tutor, sent exactly as typed.
    Say(&'a str),
    /// One of the quick topics, by its 1-based number.
    Topic(&'static str),
    ListTopics,
    Transcript,
    Help,
    Quit,
    Unknown(&'a str),
}

pub fn parse(line: &str) -> Command<'_> {
    let Some(rest) = line.trim_start().strip_prefix('/') else {
        return Command::Say(line);
    };

    let mut parts = rest.split_whitespace();
    match (parts.next(), parts.next()) {
        (Some("topics"), None) => Command::ListTopics,
        (Some("topic"), Some(n)) => n
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .and_then(|i| QUICK_TOPICS.get(i).copied())
            .map_or(Command::Unknown(line), Command::Topic),
        (Some("transcript"), None) => Command::Transcript,
        (Some("help"), None) => Command::Help,
        (Some("quit" | "exit"), None) => Command::Quit,
        _ => Command::Unknown(line),
    }
}

pub const HELP: &str = "\
Type a question and press enter.
  /topics       list the quick topics
  /topic N      ask quick topic N
  /transcript   print the conversation so far
  /quit         leave";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_free_text_is_untouched() {
        assert_eq!(parse("  What is a mole? "), Command::Say("  What is a mole? "));
        assert_eq!(parse(""), Command::Say(""));
    }

    #[test]
    fn test_topic_by_number() {
        assert_eq!(parse("/topic 1"), Command::Topic("Explain quadratic equations"));
        assert_eq!(parse("/topic 4"), Command::Topic("Solve: 2x + 5 = 15"));
        assert_eq!(parse("/topic 0"), Command::Unknown("/topic 0"));
        assert_eq!(parse("/topic 5"), Command::Unknown("/topic 5"));
        assert_eq!(parse("/topic x"), Command::Unknown("/topic x"));
    }

    #[test]
    fn test_commands() {
        assert_eq!(parse("/topics"), Command::ListTopics);
        assert_eq!(parse("/transcript"), Command::Transcript);
        assert_eq!(parse("/help"), Command::Help);
        assert_eq!(parse("/quit"), Command::Quit);
        assert_eq!(parse("/exit"), Command::Quit);
        assert_eq!(parse("/dance"), Command::Unknown("/dance"));
    }
}
