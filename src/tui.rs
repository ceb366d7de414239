use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    terminal::{disable_raw_mode, enable_raw_mode},
};
use musorg::Confirm;
use std::io::{self, Write};

/// Restores cooked mode when dropped, even if reading a key fails.
struct RawMode;

impl RawMode {
    fn enable() -> io::Result<Self> {
        enable_raw_mode()?;
        Ok(RawMode)
    }
}

impl Drop for RawMode {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
    }
}

/// Asks yes/no questions on the terminal, answering on a single key press.
pub struct TerminalConfirm;

impl Confirm for TerminalConfirm {
    fn confirm(&mut self, question: &str) -> io::Result<bool> {
        let mut stdout = io::stdout();
        write!(stdout, "{} [y/N] ", question)?;
        stdout.flush()?;

        let answer = {
            let _raw = RawMode::enable()?;
            loop {
                let Event::Key(key) = event::read()? else {
                    continue;
                };
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                match key.code {
                    KeyCode::Char('y') | KeyCode::Char('Y') => break true,
                    KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                        break false
                    }
                    KeyCode::Char(_) | KeyCode::Enter | KeyCode::Esc => break false,
                    _ => {}
                }
            }
        };

        writeln!(stdout, "{}", if answer { "y" } else { "n" })?;
        Ok(answer)
    }
}
