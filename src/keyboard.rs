//! Line based keyboard commands read from standard input

use gstreamer::glib;
use std::io::BufRead;
use std::thread::JoinHandle;
use tracing::debug;

/// A single command typed by the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyCommand {
    ToggleRecording,
    Quit,
    /// Blank line
    Empty,
    Unknown(String),
}

impl KeyCommand {
    /// Parse one input line, surrounding whitespace ignored
    pub fn parse(line: &str) -> Self {
        match line.trim() {
            "r" | "R" => KeyCommand::ToggleRecording,
            "q" | "Q" => KeyCommand::Quit,
            "" => KeyCommand::Empty,
            other => KeyCommand::Unknown(other.to_string()),
        }
    }
}

/// Everything the input reader can report
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    Command(KeyCommand),
    Eof,
    Error(String),
}

/// Feed every line of `reader` to `handler` until it breaks, input ends or a read fails
///
/// End of input and read errors are delivered to the handler as the final event.
pub fn read_events<R, F>(mut reader: R, mut handler: F)
where
    R: BufRead,
    F: FnMut(InputEvent) -> glib::ControlFlow,
{
    let mut line = String::new();
    loop {
        line.clear();
        let event = match reader.read_line(&mut line) {
            Ok(0) => {
                handler(InputEvent::Eof);
                return;
            }
            Ok(_) => InputEvent::Command(KeyCommand::parse(&line)),
            Err(err) => {
                handler(InputEvent::Error(err.to_string()));
                return;
            }
        };

        if handler(event) == glib::ControlFlow::Break {
            debug!("Keyboard handler asked to stop reading input");
            return;
        }
    }
}

/// Read standard input on a dedicated thread
pub fn spawn_stdin_reader<F>(handler: F) -> std::io::Result<JoinHandle<()>>
where
    F: FnMut(InputEvent) -> glib::ControlFlow + Send + 'static,
{
    std::thread::Builder::new()
        .name("stdin-reader".to_string())
        .spawn(move || read_events(std::io::BufReader::new(std::io::stdin()), handler))
}
