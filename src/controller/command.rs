use super::session_controller::Session;
use crate::document_model::{Document, Position};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    Continue(String),
    Quit,
}

/// Line-oriented driver over a `Session`.
///
/// A line starting with `:` is a command; any other line is typed into the
/// current document followed by a line break.
#[derive(Debug, Default)]
pub struct CommandRunner {
    clipboard: String,
}

impl CommandRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn execute_line(&mut self, session: &mut Session, line: &str) -> CommandOutcome {
        let Some(command) = line.strip_prefix(':') else {
            if session.current_document().is_none() {
                session.new_document();
            }
            for ch in line.chars() {
                session.process_character(ch);
            }
            session.process_character('\r');
            return CommandOutcome::Continue(String::new());
        };

        let command = command.trim();
        let (name, argument) = match command.split_once(' ') {
            Some((name, argument)) => (name, argument.trim()),
            None => (command, ""),
        };

        let message = match name {
            "q" | "quit" => return CommandOutcome::Quit,
            "e" | "edit" if !argument.is_empty() => {
                if session.open_file(argument) {
                    format!("\"{argument}\" opened")
                } else {
                    format!("\"{argument}\" [New File]")
                }
            }
            "new" => {
                let id = session.new_document();
                format!("New buffer {id}")
            }
            "ls" | "buffers" => session.list_buffers(),
            "b" | "buffer" => self.switch_buffer(session, argument),
            "bd" | "close" => {
                if session.close_file(None) {
                    "Buffer closed".to_string()
                } else {
                    "No buffer to close".to_string()
                }
            }
            "sync" => {
                if session.request_sync() {
                    "Sync requested".to_string()
                } else {
                    "Sync not started".to_string()
                }
            }
            "autosave" => match argument.parse::<u64>() {
                Ok(0) => {
                    session.end_autosave();
                    "Autosave off".to_string()
                }
                Ok(ms) => {
                    session.begin_autosave(Duration::from_millis(ms));
                    format!("Autosave every {ms}ms")
                }
                Err(_) => format!("Invalid interval: {argument}"),
            },
            _ => self.execute_document_command(session, name, argument),
        };
        CommandOutcome::Continue(message)
    }

    fn switch_buffer(&self, session: &mut Session, argument: &str) -> String {
        let ids = session.document_ids();
        match argument.parse::<usize>() {
            Ok(n) if n > 0 && n <= ids.len() => {
                session.switch_to(ids[n - 1]);
                format!("Switched to buffer {n}")
            }
            _ => format!("Buffer {argument} does not exist"),
        }
    }

    fn execute_document_command(
        &mut self,
        session: &mut Session,
        name: &str,
        argument: &str,
    ) -> String {
        let Some(document) = session.current_document_mut() else {
            return "No document open".to_string();
        };

        match name {
            "w" | "write" if argument.is_empty() => {
                if document.write() {
                    format!("\"{}\" written", document.display_name())
                } else {
                    "Write failed".to_string()
                }
            }
            "w" | "write" => match document.save_as(argument) {
                Ok(bytes) => format!("\"{argument}\" {bytes} bytes written"),
                Err(e) => format!("Error writing {argument}: {e}"),
            },
            "u" | "undo" => flag(document.undo(), "Undone", "Already at oldest change"),
            "redo" => flag(document.redo(), "Redone", "Already at newest change"),
            "bs" => flag(document.delete_character(None, None), "", "Nothing to delete"),
            "dw" => flag(document.delete_group(), "", "Nothing to delete"),
            "left" => move_by(document, |d| d.move_left(false)),
            "right" => move_by(document, |d| d.move_right(false)),
            "up" => move_by(document, |d| d.move_up(false)),
            "down" => move_by(document, |d| d.move_down(false)),
            "wleft" => move_by(document, |d| d.jump_left(false)),
            "wright" => move_by(document, |d| d.jump_right(false)),
            "goto" => {
                let mut parts = argument.split_whitespace().map(str::parse::<usize>);
                match (parts.next(), parts.next()) {
                    (Some(Ok(line)), Some(Ok(column)))
                        if line < document.line_count() && column <= document.line_len(line) =>
                    {
                        document.set_cursor(Position::new(line, column));
                        format!("{}", document.cursor())
                    }
                    _ => format!("Invalid position: {argument}"),
                }
            }
            "selectall" => {
                document.select_all();
                "Selected all".to_string()
            }
            "cut" => match document.cut_selection() {
                Some(text) => {
                    self.clipboard = text;
                    format!("{} characters cut", self.clipboard.chars().count())
                }
                None => "Nothing selected".to_string(),
            },
            "paste" => {
                let text = if argument.is_empty() {
                    self.clipboard.clone()
                } else {
                    argument.to_string()
                };
                flag(document.paste(&text), "", "Nothing to paste")
            }
            "p" | "print" => {
                let cursor = document.cursor();
                let mut output = String::new();
                for (i, line) in document.lines().iter().enumerate() {
                    let marker = if i == cursor.line { '>' } else { ' ' };
                    output.push_str(&format!("{marker}{:>4} {line}\n", i + 1));
                }
                output.push_str(&format!(
                    "cursor {cursor} (display column {})",
                    document.display_column(cursor)
                ));
                output
            }
            _ => format!("Not an editor command: {name}"),
        }
    }
}

fn flag(done: bool, success: &str, failure: &str) -> String {
    let message = if done { success } else { failure };
    message.to_string()
}

fn move_by(document: &mut Document, motion: impl FnOnce(&mut Document)) -> String {
    motion(document);
    format!("{}", document.cursor())
}
