use std::io::Write;

use vidhi_core::{conversation::ChatView, render::Rendered};

/// Line-oriented chat view over any writer.
pub struct TerminalView<W: Write> {
    out: W,
    input_enabled: bool,
}

impl<W: Write> TerminalView<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            input_enabled: false,
        }
    }

    pub fn input_enabled(&self) -> bool {
        self.input_enabled
    }

    /// Input prompt, shown only while submissions are accepted.
    pub fn prompt(&mut self) {
        if self.input_enabled {
            self.emit(format_args!("you> "));
            let _ = self.out.flush();
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    // Terminal write failures are not worth aborting a session over.
    fn emit(&mut self, args: std::fmt::Arguments<'_>) {
        let _ = self.out.write_fmt(args);
    }
}

impl<W: Write> ChatView for TerminalView<W> {
    fn set_input_enabled(&mut self, enabled: bool) {
        if !enabled {
            self.emit(format_args!("vidhi is thinking...\n"));
            let _ = self.out.flush();
        }
        self.input_enabled = enabled;
    }

    fn show_user(&mut self, _text: &str) {
        // Already echoed by the terminal as the user typed it.
    }

    fn show_reply(&mut self, reply: &Rendered) {
        self.emit(format_args!("\nvidhi> {reply}\n\n"));
    }

    fn show_notice(&mut self, text: &str) {
        self.emit(format_args!("\n[!] {text}\n\n"));
    }
}
