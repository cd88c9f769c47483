/// Stop trigger — watches standard input for the quit key.
///
/// Any other character is read and ignored. If input reaches EOF without a
/// quit key the runner keeps going until the process is terminated.
use crossbeam_channel::{bounded, Receiver};
use std::io::{self, Read};
use std::thread;
use tracing::{debug, warn};

/// The key that stops synchronisation.
pub const QUIT_KEY: u8 = b'q';

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StopOutcome {
    /// The quit key was read.
    Quit,
    /// Input ended without a quit key.
    Eof,
}

/// Block reading `input` until the quit key or EOF.
pub fn wait_for_quit<R: Read>(input: R) -> io::Result<StopOutcome> {
    for byte in input.bytes() {
        if byte? == QUIT_KEY {
            return Ok(StopOutcome::Quit);
        }
    }
    Ok(StopOutcome::Eof)
}

/// Watch `input` on a detached helper thread.
///
/// The returned receiver yields one message when the quit key is read and
/// disconnects without a message otherwise.
pub fn spawn_quit_watcher<R>(input: R) -> Receiver<()>
where
    R: Read + Send + 'static,
{
    let (tx, rx) = bounded::<()>(1);

    thread::Builder::new()
        .name("foldersync-stdin".into())
        .spawn(move || match wait_for_quit(input) {
            Ok(StopOutcome::Quit) => {
                let _ = tx.send(());
            }
            Ok(StopOutcome::Eof) => debug!("stdin closed; synchronisation continues until terminated"),
            Err(err) => warn!("Failed to read stdin: {err}"),
        })
        .expect("failed to spawn stdin watcher thread");

    rx
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::time::Duration;

    #[test]
    fn quit_key_stops() {
        assert_eq!(wait_for_quit(Cursor::new("q")).unwrap(), StopOutcome::Quit);
    }

    #[test]
    fn other_characters_are_ignored() {
        assert_eq!(
            wait_for_quit(Cursor::new("abc\nxyzq")).unwrap(),
            StopOutcome::Quit
        );
        assert_eq!(wait_for_quit(Cursor::new("Q\nquit")).unwrap(), StopOutcome::Quit);
    }

    #[test]
    fn eof_without_quit_key() {
        assert_eq!(wait_for_quit(Cursor::new("abc\n")).unwrap(), StopOutcome::Eof);
        assert_eq!(wait_for_quit(io::empty()).unwrap(), StopOutcome::Eof);
    }

    #[test]
    fn watcher_signals_on_quit() {
        let rx = spawn_quit_watcher(Cursor::new(b"..q".to_vec()));
        assert!(rx.recv_timeout(Duration::from_secs(10)).is_ok());
    }

    #[test]
    fn watcher_disconnects_on_eof() {
        let rx = spawn_quit_watcher(Cursor::new(b"no stop here".to_vec()));
        assert!(matches!(
            rx.recv_timeout(Duration::from_secs(10)),
            Err(crossbeam_channel::RecvTimeoutError::Disconnected)
        ));
    }
}
