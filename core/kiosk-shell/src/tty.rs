//! Terminal input handling for the live kiosk.
//!
//! Typed lines are not echoed by the terminal. The loop shows the last
//! command under the screen instead, with password and code arguments
//! masked.

/// Masks the argument of `password` and `code` lines.
pub fn masked_echo(line: &str) -> String {
    let line = line.trim();
    match line.split_once(char::is_whitespace) {
        Some((word @ ("password" | "code"), secret)) => {
            format!("{word} {}", "*".repeat(secret.trim().chars().count()))
        }
        _ => line.to_string(),
    }
}

/// Turns terminal echo off for stdin until dropped.
pub struct EchoGuard {
    #[cfg(unix)]
    fd: i32,
    #[cfg(unix)]
    saved: libc::termios,
}

impl EchoGuard {
    /// Returns `None` when stdin is not a terminal or the mode can't be set.
    #[cfg(unix)]
    pub fn disable() -> Option<Self> {
        use std::io::IsTerminal;
        use std::os::fd::AsRawFd;

        let stdin = std::io::stdin();
        if !stdin.is_terminal() {
            return None;
        }
        let fd = stdin.as_raw_fd();

        let mut term = std::mem::MaybeUninit::<libc::termios>::uninit();
        // SAFETY: fd is an open terminal and tcgetattr fills `term` when it
        // returns 0.
        let saved = unsafe {
            if libc::tcgetattr(fd, term.as_mut_ptr()) != 0 {
                tracing::warn!(
                    error = %std::io::Error::last_os_error(),
                    "Failed to read terminal mode"
                );
                return None;
            }
            term.assume_init()
        };

        let mut quiet = saved;
        quiet.c_lflag &= !libc::ECHO;
        quiet.c_lflag |= libc::ECHONL;
        // SAFETY: `quiet` is a valid termios copied from the current mode.
        if unsafe { libc::tcsetattr(fd, libc::TCSANOW, &quiet) } != 0 {
            tracing::warn!(
                error = %std::io::Error::last_os_error(),
                "Failed to turn off terminal echo"
            );
            return None;
        }
        tracing::debug!("Terminal echo off");
        Some(Self { fd, saved })
    }

    #[cfg(not(unix))]
    pub fn disable() -> Option<Self> {
        None
    }
}

impl Drop for EchoGuard {
    fn drop(&mut self) {
        #[cfg(unix)]
        {
            // SAFETY: restores the mode read from the same fd in `disable`.
            if unsafe { libc::tcsetattr(self.fd, libc::TCSANOW, &self.saved) } != 0 {
                tracing::warn!(
                    error = %std::io::Error::last_os_error(),
                    "Failed to restore terminal echo"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn secrets_are_masked() {
        assert_eq!(masked_echo("password W@m+(5+2n5wh1"), "password *************");
        assert_eq!(masked_echo("  code 0000 "), "code ****");
    }

    #[test]
    fn other_commands_are_shown_as_typed() {
        assert_eq!(masked_echo("toggle 3"), "toggle 3");
        assert_eq!(masked_echo("tap"), "tap");
        assert_eq!(masked_echo("passwords abc"), "passwords abc");
    }
}
