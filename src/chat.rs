use std::collections::VecDeque;

/// Lines kept on screen.
pub const MAX_MESSAGES: usize = 4;

pub const DEFAULT_PORT: u16 = 4080;

/// Valid `/view` radii.
pub const VIEW_RADIUS: std::ops::RangeInclusive<i32> = 1..=24;

/// Fixed ring of the most recent chat lines, oldest first.
#[derive(Clone, Debug, Default)]
pub struct ChatLog {
    lines: VecDeque<String>,
}

impl ChatLog {
    pub fn new() -> Self {
        Self {
            lines: VecDeque::with_capacity(MAX_MESSAGES),
        }
    }

    pub fn push(&mut self, text: impl Into<String>) {
        let text = text.into();
        log::info!(target: "events", "chat: {text}");
        if self.lines.len() == MAX_MESSAGES {
            self.lines.pop_front();
        }
        self.lines.push_back(text);
    }

    pub fn lines(&self) -> impl Iterator<Item = &str> + '_ {
        self.lines.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }
}

/// A line typed by the local user.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// `/server <host> [port]`
    Server { host: String, port: u16 },
    /// `/view <radius>`; the radius is not yet range-checked.
    View(i32),
    /// Anything else goes to the server as chat.
    Say(String),
}

impl Command {
    pub fn parse(text: &str) -> Command {
        let mut words = text.split_whitespace();
        match words.next() {
            Some("/server") => {
                if let Some(host) = words.next() {
                    let port = words
                        .next()
                        .and_then(|p| p.parse().ok())
                        .unwrap_or(DEFAULT_PORT);
                    return Command::Server {
                        host: host.to_string(),
                        port,
                    };
                }
            }
            Some("/view") => {
                if let Some(r) = words.next().and_then(|r| r.parse().ok()) {
                    return Command::View(r);
                }
            }
            _ => {}
        }
        Command::Say(text.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ring_keeps_last_four() {
        let mut log = ChatLog::new();
        for i in 0..6 {
            log.push(format!("line {i}"));
        }
        assert_eq!(log.lines().collect::<Vec<_>>(), ["line 2", "line 3", "line 4", "line 5"]);
    }

    #[test]
    fn commands_parse() {
        assert_eq!(
            Command::parse("/server example.org"),
            Command::Server { host: "example.org".into(), port: DEFAULT_PORT }
        );
        assert_eq!(
            Command::parse("/server 10.0.0.1 5000"),
            Command::Server { host: "10.0.0.1".into(), port: 5000 }
        );
        assert_eq!(Command::parse("/view 30"), Command::View(30));
        assert_eq!(Command::parse("/view far"), Command::Say("/view far".into()));
        assert_eq!(Command::parse("/server"), Command::Say("/server".into()));
        assert_eq!(Command::parse("/goto bob"), Command::Say("/goto bob".into()));
        assert_eq!(Command::parse("hello"), Command::Say("hello".into()));
    }
}
