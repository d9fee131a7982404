//! Terminal interaction: numbered choices on stderr, answers from stdin.
//!
//! Stdout carries only JSON responses, so every prompt and message goes to
//! the output stream given here (stderr for the real binary).

use std::io::{self, BufRead, Write};
use std::sync::Mutex;

use amdeps_core::interaction::{InteractionAdapter, InteractionError, InteractionResult};

/// [`InteractionAdapter`] reading choices line by line.
///
/// Answers are 1-based. An empty line, `q`, or end of input cancels; any
/// other unusable answer re-prompts.
pub struct TerminalAdapter {
    input: Mutex<Box<dyn BufRead + Send>>,
    output: Mutex<Box<dyn Write + Send>>,
}

impl TerminalAdapter {
    /// Adapter over arbitrary streams.
    pub fn new(input: impl BufRead + Send + 'static, output: impl Write + Send + 'static) -> Self {
        TerminalAdapter {
            input: Mutex::new(Box::new(input)),
            output: Mutex::new(Box::new(output)),
        }
    }

    /// Adapter over the process's stdin and stderr.
    pub fn stdio() -> Self {
        TerminalAdapter::new(io::BufReader::new(io::stdin()), io::stderr())
    }

    fn write_line(&self, line: &str) -> InteractionResult<()> {
        let mut output = self
            .output
            .lock()
            .map_err(|_| InteractionError::io("output lock poisoned"))?;
        writeln!(output, "{}", line)?;
        output.flush()?;
        Ok(())
    }

    fn read_line(&self) -> InteractionResult<Option<String>> {
        let mut input = self
            .input
            .lock()
            .map_err(|_| InteractionError::io("input lock poisoned"))?;
        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }
}

impl InteractionAdapter for TerminalAdapter {
    fn ask_select(&self, prompt: &str, options: &[&str]) -> InteractionResult<usize> {
        if options.is_empty() {
            return Err(InteractionError::InvalidInput(
                "no options to choose from".to_string(),
            ));
        }

        self.write_line(prompt)?;
        for (i, option) in options.iter().enumerate() {
            self.write_line(&format!("  {}) {}", i + 1, option))?;
        }

        loop {
            self.write_line(&format!(
                "Enter 1-{} (empty or q to cancel):",
                options.len()
            ))?;
            let Some(answer) = self.read_line()? else {
                return Err(InteractionError::Cancelled);
            };
            if answer.is_empty() || answer.eq_ignore_ascii_case("q") {
                return Err(InteractionError::Cancelled);
            }
            match answer.parse::<usize>() {
                Ok(n) if (1..=options.len()).contains(&n) => return Ok(n - 1),
                _ => self.write_line(&format!("invalid choice: {}", answer))?,
            }
        }
    }

    fn print_info(&self, message: &str) {
        let _ = self.write_line(message);
    }

    fn print_warning(&self, message: &str) {
        let _ = self.write_line(&format!("warning: {}", message));
    }

    fn print_error(&self, message: &str) {
        let _ = self.write_line(&format!("error: {}", message));
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::sync::Arc;

    /// Shared sink so tests can read what the adapter wrote.
    #[derive(Clone, Default)]
    struct Sink(Arc<Mutex<Vec<u8>>>);

    impl Write for Sink {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl Sink {
        fn text(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    fn adapter(input: &str) -> (TerminalAdapter, Sink) {
        let sink = Sink::default();
        let adapter = TerminalAdapter::new(Cursor::new(input.to_string()), sink.clone());
        (adapter, sink)
    }

    #[test]
    fn picks_one_based_answer() {
        let (adapter, sink) = adapter("2\n");
        assert_eq!(adapter.ask_select("Choose", &["a/Foo", "b/Foo"]).unwrap(), 1);
        let text = sink.text();
        assert!(text.contains("  1) a/Foo\n"));
        assert!(text.contains("  2) b/Foo\n"));
    }

    #[test]
    fn invalid_answer_reprompts() {
        let (adapter, sink) = adapter("7\nabc\n1\n");
        assert_eq!(adapter.ask_select("Choose", &["a", "b"]).unwrap(), 0);
        assert_eq!(sink.text().matches("invalid choice").count(), 2);
    }

    #[test]
    fn empty_line_cancels() {
        let (adapter, _) = adapter("\n");
        assert!(matches!(
            adapter.ask_select("Choose", &["a", "b"]),
            Err(InteractionError::Cancelled)
        ));
    }

    #[test]
    fn q_and_eof_cancel() {
        let (quit, _) = adapter("q\n");
        assert!(matches!(
            quit.ask_select("Choose", &["a"]),
            Err(InteractionError::Cancelled)
        ));
        let (eof, _) = adapter("");
        assert!(matches!(
            eof.ask_select("Choose", &["a"]),
            Err(InteractionError::Cancelled)
        ));
    }

    #[test]
    fn messages_are_prefixed() {
        let (adapter, sink) = adapter("");
        adapter.print_warning("careful");
        adapter.print_error("broken");
        assert_eq!(sink.text(), "warning: careful\nerror: broken\n");
    }
}
