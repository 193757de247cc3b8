// src/trigger/manual.rs

use std::io::{self, BufRead, BufReader, Read};
use std::thread;

use tokio::sync::mpsc;
use tracing::debug;

use crate::engine::{RuntimeEvent, TriggerReason};

/// Block on `input`, calling `on_trigger` once per line received (a final
/// line without newline counts too).
///
/// Returns the number of triggers fired. End of input and read errors end
/// the loop quietly; so does `on_trigger` returning `false`.
pub fn listen<R, F>(mut input: R, mut on_trigger: F) -> usize
where
    R: BufRead,
    F: FnMut() -> bool,
{
    let mut buf = Vec::new();
    let mut fired = 0;

    loop {
        buf.clear();
        match input.read_until(b'\n', &mut buf) {
            Ok(0) => {
                debug!("manual input closed");
                break;
            }
            Ok(_) => {
                fired += 1;
                if !on_trigger() {
                    debug!("trigger consumer gone; manual listener stopping");
                    break;
                }
            }
            Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
            Err(err) => {
                debug!(error = %err, "manual input unreadable; manual listener stopping");
                break;
            }
        }
    }

    fired
}

/// Run [`listen`] on its own OS thread, turning each line into
/// `RuntimeEvent::Triggered { Manual }`.
pub fn spawn_manual_listener<R>(
    input: R,
    runtime_tx: mpsc::Sender<RuntimeEvent>,
) -> io::Result<thread::JoinHandle<usize>>
where
    R: Read + Send + 'static,
{
    thread::Builder::new()
        .name("wad-manual".to_string())
        .spawn(move || {
            listen(BufReader::new(input), || {
                runtime_tx
                    .blocking_send(RuntimeEvent::Triggered {
                        reason: TriggerReason::Manual,
                    })
                    .is_ok()
            })
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    struct FailingReader;

    impl Read for FailingReader {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "console gone"))
        }
    }

    #[test]
    fn fires_once_per_line_until_eof() {
        let mut calls = 0;
        let fired = listen(Cursor::new("\n\nrebuild\npartial"), || {
            calls += 1;
            true
        });
        assert_eq!(fired, 4);
        assert_eq!(calls, 4);
    }

    #[test]
    fn read_error_ends_quietly() {
        let fired = listen(BufReader::new(FailingReader), || true);
        assert_eq!(fired, 0);
    }

    #[test]
    fn stops_when_consumer_is_gone() {
        let mut calls = 0;
        listen(Cursor::new("a\nb\nc\n"), || {
            calls += 1;
            calls < 2
        });
        assert_eq!(calls, 2);
    }

    #[test]
    fn spawned_listener_publishes_manual_triggers() {
        let (tx, mut rx) = mpsc::channel(8);
        let handle = spawn_manual_listener(Cursor::new(b"\n\n".to_vec()), tx).unwrap();

        assert_eq!(handle.join().unwrap(), 2);
        for _ in 0..2 {
            assert!(matches!(
                rx.try_recv(),
                Ok(RuntimeEvent::Triggered {
                    reason: TriggerReason::Manual
                })
            ));
        }
        assert!(rx.try_recv().is_err());
    }
}
