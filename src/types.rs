// src/types.rs
use crate::display::SettingCommand;
/// Lines typed on the console while the monitor runs.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ConsoleCommand {
    Setting(SettingCommand),
    Quit,
}
impl ConsoleCommand {
    /// `filter N`, `gain N`, `length S`, `spectrum on|off`, `single on|off`, `quit`.
    pub fn parse(line: &str) -> Option<Self> {
        let mut words = line.split_whitespace();
        let verb = words.next()?.to_ascii_lowercase();
        let arg = words.next();
        let command = match (verb.as_str(), arg) {
            ("quit" | "exit", None) => return Some(ConsoleCommand::Quit),
            ("filter", Some(v)) => SettingCommand::Filter(v.parse().ok()?),
            ("gain", Some(v)) => SettingCommand::Gain(v.parse().ok()?),
            ("length", Some(v)) => SettingCommand::WindowSeconds(v.parse().ok()?),
            ("spectrum", Some(v)) => SettingCommand::SpectrumMode(parse_switch(v)?),
            ("single", Some(v)) => SettingCommand::SingleChannelMode(parse_switch(v)?),
            _ => return None,
        };
        Some(ConsoleCommand::Setting(command))
    }
}
fn parse_switch(word: &str) -> Option<bool> {
    match word.to_ascii_lowercase().as_str() {
        "on" | "1" | "true" => Some(true),
        "off" | "0" | "false" => Some(false),
        _ => None,
    }
}
#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn parses_setting_lines() {
        assert_eq!(
            ConsoleCommand::parse("length 7.5"),
            Some(ConsoleCommand::Setting(SettingCommand::WindowSeconds(7.5)))
        );
        assert_eq!(
            ConsoleCommand::parse("  Spectrum ON "),
            Some(ConsoleCommand::Setting(SettingCommand::SpectrumMode(true)))
        );
        assert_eq!(
            ConsoleCommand::parse("single off"),
            Some(ConsoleCommand::Setting(SettingCommand::SingleChannelMode(false)))
        );
        assert_eq!(ConsoleCommand::parse("quit"), Some(ConsoleCommand::Quit));
    }
    #[test]
    fn rejects_malformed_lines() {
        assert_eq!(ConsoleCommand::parse(""), None);
        assert_eq!(ConsoleCommand::parse("filter"), None);
        assert_eq!(ConsoleCommand::parse("gain -1"), None);
        assert_eq!(ConsoleCommand::parse("spectrum maybe"), None);
        assert_eq!(ConsoleCommand::parse("volume 3"), None);
    }
}
