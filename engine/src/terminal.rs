//! Terminal-backed [`Prompt`].
//!
//! Labels go to stderr so stdout stays clean for operation output. Secret
//! input is read with terminal echo disabled when stdin is a terminal; when it
//! is not (a pipe, a file) the line is read as-is. Unix targets switch echo
//! off through termios; other targets read through `console`.
//!
//! An interrupt while a prompt is waiting ends the process with status 0
//! after restoring the terminal and printing a short notice. Once the handler
//! is installed, an interrupt outside a prompt exits with the conventional
//! status 130. The handler does not wait on the std stdout lock: on unix
//! the notice goes straight to the descriptor.

use std::io::{self, BufRead, Write};
use std::sync::Once;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::warn;

use crate::resolve::{Prompt, PromptError};

/// Notice printed when the user interrupts a prompt.
pub const INTERRUPT_NOTICE: &str = "ctrl+c by user.";

/// Exit status for an interrupt outside a prompt (128 + SIGINT).
const INTERRUPTED_STATUS: i32 = 130;

static INSTALL_HANDLER: Once = Once::new();
static PROMPTING: AtomicBool = AtomicBool::new(false);

#[derive(Debug, Default)]
pub struct TerminalPrompt;

impl TerminalPrompt {
    pub fn new() -> Self {
        Self
    }
}

impl Prompt for TerminalPrompt {
    fn read_value(&mut self, label: &str, secret: bool) -> Result<String, PromptError> {
        install_interrupt_handler();
        PROMPTING.store(true, Ordering::SeqCst);

        let written = {
            let mut stderr = io::stderr().lock();
            stderr.write_all(label.as_bytes()).and_then(|()| stderr.flush())
        };
        if let Err(err) = written {
            PROMPTING.store(false, Ordering::SeqCst);
            return Err(err.into());
        }

        let line = if secret { echo::read_hidden_line() } else { read_line() };
        PROMPTING.store(false, Ordering::SeqCst);

        line?.ok_or(PromptError::Interrupted)
    }
}

/// Reads one line without its terminator; `None` at end of input.
fn read_line() -> io::Result<Option<String>> {
    let mut line = String::new();
    if io::stdin().lock().read_line(&mut line)? == 0 {
        return Ok(None);
    }
    while line.ends_with(['\n', '\r']) {
        line.pop();
    }
    Ok(Some(line))
}

fn install_interrupt_handler() {
    INSTALL_HANDLER.call_once(|| {
        let result = ctrlc::set_handler(|| {
            if !PROMPTING.load(Ordering::SeqCst) {
                std::process::exit(INTERRUPTED_STATUS);
            }
            echo::restore();
            write_notice();
            std::process::exit(0);
        });
        if let Err(err) = result {
            warn!(error = %err, "could not install interrupt handler");
        }
    });
}

/// Writes the interrupt notice straight to the stdout descriptor.
#[cfg(unix)]
fn write_notice() {
    let notice = format!("\n{INTERRUPT_NOTICE}\n");
    // SAFETY: the buffer is valid for `notice.len()` bytes for the whole call.
    unsafe {
        libc::write(libc::STDOUT_FILENO, notice.as_ptr().cast(), notice.len());
    }
}

#[cfg(not(unix))]
fn write_notice() {
    let notice = format!("\n{INTERRUPT_NOTICE}\n");
    let _ = console::Term::stdout().write_str(&notice);
}

#[cfg(unix)]
mod echo {
    use std::io::{self, Write};
    use std::sync::Mutex;

    use super::read_line;

    /// Terminal settings to put back if the process is interrupted mid-read.
    static SAVED: Mutex<Option<libc::termios>> = Mutex::new(None);

    struct EchoGuard {
        original: Option<libc::termios>,
    }

    /// Reads one line with echo off when stdin is a terminal.
    pub fn read_hidden_line() -> io::Result<Option<String>> {
        let guard = disable();
        let line = read_line();
        if guard.is_active() {
            // The newline the user typed was not echoed.
            let _ = writeln!(io::stderr());
        }
        line
    }

    /// Turns off echo on stdin if it is a terminal.
    fn disable() -> EchoGuard {
        let fd = libc::STDIN_FILENO;
        // SAFETY: `termios` is plain data and `tcgetattr` fully initializes it
        // on success; failure (not a terminal) is handled below.
        let mut original: libc::termios = unsafe { std::mem::zeroed() };
        if unsafe { libc::tcgetattr(fd, &mut original) } != 0 {
            return EchoGuard { original: None };
        }

        let mut silent = original;
        silent.c_lflag &= !libc::ECHO;
        // SAFETY: `fd` is stdin and `silent` is a valid copy of its settings.
        if unsafe { libc::tcsetattr(fd, libc::TCSANOW, &silent) } != 0 {
            return EchoGuard { original: None };
        }

        if let Ok(mut saved) = SAVED.lock() {
            *saved = Some(original);
        }
        EchoGuard {
            original: Some(original),
        }
    }

    impl EchoGuard {
        fn is_active(&self) -> bool {
            self.original.is_some()
        }
    }

    /// Restores settings saved by [`disable`], if any are outstanding.
    pub fn restore() {
        let saved = SAVED.lock().ok().and_then(|mut saved| saved.take());
        if let Some(original) = saved {
            // SAFETY: `original` was obtained from `tcgetattr` on stdin.
            unsafe {
                libc::tcsetattr(libc::STDIN_FILENO, libc::TCSANOW, &original);
            }
        }
    }

    impl Drop for EchoGuard {
        fn drop(&mut self) {
            if let Some(original) = self.original.take() {
                // SAFETY: `original` was obtained from `tcgetattr` on stdin.
                unsafe {
                    libc::tcsetattr(libc::STDIN_FILENO, libc::TCSANOW, &original);
                }
                if let Ok(mut saved) = SAVED.lock() {
                    *saved = None;
                }
            }
        }
    }
}

#[cfg(not(unix))]
mod echo {
    use std::io::{self, IsTerminal};

    use console::Term;

    use super::read_line;

    /// Reads one line through the console without echo when stdin is a
    /// terminal.
    pub fn read_hidden_line() -> io::Result<Option<String>> {
        if io::stdin().is_terminal() {
            if let Some(term) = [Term::stderr(), Term::stdout()].into_iter().find(Term::is_term) {
                return term.read_secure_line().map(Some);
            }
        }
        read_line()
    }

    pub fn restore() {}
}
