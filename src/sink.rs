//! The output sinks log lines are written to, and the console-style template rendering they share.

use std::fmt::{Debug, Display, Write as _};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::{Mutex, PoisonError};
use termcolor::{ColorChoice, StandardStream, WriteColor};

mod memory;

pub use memory::{MemorySink, SinkCall};

use crate::severity::Severity;

/// A positional argument consumed by a directive in a sink template.
#[derive(Clone, Copy)]
pub enum Arg<'a> {
    /// A CSS declaration list for a `%c` directive. Terminals drop these.
    Style(&'a str),
    /// Text added by the logger itself, like a timestamp.
    Text(&'a str),
    /// The message passed to the logging method. This is never stringified before it reaches the
    /// sink.
    Payload(&'a dyn Display),
}

/// A text-output facility with a separate method per severity, like a browser's `console` object.
pub trait Sink: Send + Sync {
    /// Whether the sink has a dedicated method for this severity. Methods without one are written
    /// through [`Severity::Log`] instead.
    fn supports(&self, severity: Severity) -> bool {
        let _ = severity;
        true
    }

    /// Whether ANSI color codes should be embedded in templates written through this method.
    fn colors(&self, method: Severity) -> bool {
        let _ = method;
        false
    }

    /// Output a single line. `template` is a printf-style format string, see [`render()`].
    fn write(&self, method: Severity, template: &str, args: &[Arg<'_>]);

    fn flush(&self) {}
}

impl Display for Arg<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Arg::Style(text) | Arg::Text(text) => f.write_str(text),
            Arg::Payload(payload) => Display::fmt(payload, f),
        }
    }
}

impl Debug for Arg<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Arg::Style(style) => f.debug_tuple("Style").field(style).finish(),
            Arg::Text(text) => f.debug_tuple("Text").field(text).finish(),
            Arg::Payload(payload) => f
                .debug_tuple("Payload")
                .field(&format_args!("{payload}"))
                .finish(),
        }
    }
}

/// Substitute `args` into `template` the way a JavaScript console does. `%s`, `%d`, `%i`, `%f`,
/// `%o` and `%O` print the next argument, `%c` consumes the next argument without printing it,
/// and `%%` prints a percent sign. Directives without a matching argument are printed as is, and
/// arguments without a matching directive are appended separated by spaces.
pub fn render(template: &str, args: &[Arg<'_>]) -> String {
    let mut line = String::with_capacity(template.len() + 32);
    let mut args = args.iter();
    let mut chars = template.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '%' {
            line.push(c);
            continue;
        }

        match chars.peek().copied() {
            Some('%') => {
                chars.next();
                line.push('%');
            }
            Some('c') => {
                chars.next();
                args.next();
            }
            Some(directive @ ('s' | 'd' | 'i' | 'f' | 'o' | 'O')) => {
                chars.next();
                match args.next() {
                    // Writing to a `String` cannot fail
                    Some(arg) => {
                        let _ = write!(line, "{arg}");
                    }
                    None => {
                        line.push('%');
                        line.push(directive);
                    }
                }
            }
            _ => line.push('%'),
        }
    }

    for arg in args {
        let _ = write!(line, " {arg}");
    }

    line
}

/// Writes to the process' standard streams. By default debug, log and info output goes to STDOUT
/// while warnings and errors go to STDERR.
pub struct ConsoleSink {
    stdout: Mutex<StandardStream>,
    stderr: Mutex<StandardStream>,
    stdout_colors: bool,
    stderr_colors: bool,
    /// Send everything to STDERR.
    stderr_only: bool,
}

impl ConsoleSink {
    pub fn new() -> Self {
        Self::with_streams(false)
    }

    /// A console sink that writes every method to STDERR.
    pub fn stderr_only() -> Self {
        Self::with_streams(true)
    }

    fn with_streams(stderr_only: bool) -> Self {
        let forced = forced_color_choice(|name| std::env::var(name).ok());
        let choice = |stream| forced.unwrap_or_else(|| tty_color_choice(stream));
        let stdout = StandardStream::stdout(choice(atty::Stream::Stdout));
        let stderr = StandardStream::stderr(choice(atty::Stream::Stderr));

        ConsoleSink {
            stdout_colors: stdout.supports_color(),
            stderr_colors: stderr.supports_color(),
            stdout: Mutex::new(stdout),
            stderr: Mutex::new(stderr),
            stderr_only,
        }
    }

    fn uses_stdout(&self, method: Severity) -> bool {
        !self.stderr_only && method < Severity::Warn
    }
}

impl Default for ConsoleSink {
    fn default() -> Self {
        Self::new()
    }
}

impl Debug for ConsoleSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConsoleSink")
            .field("stdout_colors", &self.stdout_colors)
            .field("stderr_colors", &self.stderr_colors)
            .field("stderr_only", &self.stderr_only)
            .finish_non_exhaustive()
    }
}

impl Sink for ConsoleSink {
    fn colors(&self, method: Severity) -> bool {
        if self.uses_stdout(method) {
            self.stdout_colors
        } else {
            self.stderr_colors
        }
    }

    fn write(&self, method: Severity, template: &str, args: &[Arg<'_>]) {
        let line = render(template, args);
        let stream = if self.uses_stdout(method) {
            &self.stdout
        } else {
            &self.stderr
        };

        // There is nowhere to report a failing console write to
        let mut stream = stream.lock().unwrap_or_else(PoisonError::into_inner);
        let _ = writeln!(stream, "{line}").and_then(|()| stream.flush());
    }

    fn flush(&self) {
        for stream in [&self.stdout, &self.stderr] {
            let _ = stream
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .flush();
        }
    }
}

/// Appends every line to a file without any colors. Lines are flushed as soon as they're written.
#[derive(Debug)]
pub struct FileSink {
    file: Mutex<BufWriter<File>>,
}

impl FileSink {
    /// Open `path` for appending, creating it if it does not yet exist.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, std::io::Error> {
        let file = File::options().create(true).append(true).open(path)?;

        Ok(FileSink {
            file: Mutex::new(BufWriter::with_capacity(1024, file)),
        })
    }
}

impl Sink for FileSink {
    fn write(&self, _method: Severity, template: &str, args: &[Arg<'_>]) {
        let line = render(template, args);
        let mut file = self.file.lock().unwrap_or_else(PoisonError::into_inner);
        let _ = writeln!(file, "{line}").and_then(|()| file.flush());
    }

    fn flush(&self) {
        let _ = self
            .file
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .flush();
    }
}

/// The color choice forced by the `CLICOLOR_FORCE`, `NO_COLOR`, and `CLICOLOR` conventions, if
/// any. `None` leaves the decision to whether the stream is a TTY.
fn forced_color_choice(var: impl Fn(&str) -> Option<String>) -> Option<ColorChoice> {
    let set = |name: &str| var(name).map(|value| value.trim() != "0");

    match (set("CLICOLOR_FORCE"), set("NO_COLOR"), set("CLICOLOR")) {
        (Some(true), _, _) => Some(ColorChoice::Always),
        (_, Some(true), _) | (_, _, Some(false)) => Some(ColorChoice::Never),
        _ => None,
    }
}

fn tty_color_choice(stream: atty::Stream) -> ColorChoice {
    if atty::is(stream) {
        ColorChoice::Auto
    } else {
        ColorChoice::Never
    }
}
