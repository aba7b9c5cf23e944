//! Byte-level keyboard decoding.
//!
//! The render loop polls this decoder once per tick; it must never block once
//! a byte has started an escape sequence. Ambiguous or unterminated sequences
//! decay to "no key" so the loop keeps spinning.

use std::io;
use std::time::{Duration, Instant};

/// One decoded logical key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Char(char),
    Enter,
    Tab,
    Backspace,
    Esc,
    Up,
    Down,
    Left,
    Right,
    /// Alt/Option plus a letter (ESC followed by a plain letter byte).
    Alt(char),
    /// Ctrl-C, delivered in-band because raw mode disables ISIG.
    Interrupt,
}

/// Label shown for the ESC-prefix modifier; decoding is identical everywhere,
/// only the name on the key cap differs.
#[cfg(target_os = "macos")]
pub const MOD_LABEL: &str = "Opt";
#[cfg(not(target_os = "macos"))]
pub const MOD_LABEL: &str = "Alt";

/// A pollable source of raw terminal bytes. `Ok(None)` means no byte is
/// pending right now.
pub trait ByteSource {
    fn next_byte(&mut self) -> io::Result<Option<u8>>;
}

/// How long to wait for the byte after a bare ESC before resolving it as the
/// Escape key rather than the start of a sequence.
const ESC_DISAMBIGUATION: Duration = Duration::from_millis(8);

/// Longest CSI parameter run we will buffer before giving up on a sequence.
const MAX_CSI_PARAMS: usize = 16;

/// Stateless-per-call decoder: each `poll` yields at most one logical key.
#[derive(Debug)]
pub struct InputDecoder {
    esc_wait: Duration,
}

impl Default for InputDecoder {
    fn default() -> Self {
        Self {
            esc_wait: ESC_DISAMBIGUATION,
        }
    }
}

impl InputDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decoder that never waits on a bare ESC; used in tests.
    #[cfg(test)]
    pub fn without_wait() -> Self {
        Self {
            esc_wait: Duration::ZERO,
        }
    }

    /// Decode at most one key from `source`. Returns `None` when no input is
    /// pending or when a sequence was swallowed.
    pub fn poll(&mut self, source: &mut impl ByteSource) -> Option<Key> {
        let byte = source.next_byte().ok().flatten()?;
        match byte {
            0x1b => self.decode_escape(source),
            b'\t' => Some(Key::Tab),
            b'\r' | b'\n' => Some(Key::Enter),
            0x7f | 0x08 => Some(Key::Backspace),
            0x03 => Some(Key::Interrupt),
            0x20..=0x7e => Some(Key::Char(byte as char)),
            0x80..=0xff => decode_utf8_tail(byte, source),
            // Remaining C0 controls carry no binding here.
            _ => None,
        }
    }

    fn decode_escape(&mut self, source: &mut impl ByteSource) -> Option<Key> {
        let Some(next) = self.read_pending(source) else {
            // Nothing followed within the wait: a real Escape press.
            return Some(Key::Esc);
        };
        match next {
            b'[' => self.decode_csi(source),
            b'a'..=b'z' | b'A'..=b'Z' => Some(Key::Alt(next as char)),
            // ESC plus anything else is not a combination we map.
            _ => None,
        }
    }

    /// Resolve a CSI sequence that has already consumed `ESC [`.
    ///
    /// Plain `A`..`D` finals map to arrows. Sequences carrying numeric
    /// parameters (modified arrows like `ESC [ 1 ; 9 A`) are recognized and
    /// deliberately swallowed so a modified arrow is never misread as an
    /// unmodified one. Any other final byte is swallowed too.
    fn decode_csi(&mut self, source: &mut impl ByteSource) -> Option<Key> {
        let mut params: Vec<u8> = Vec::new();
        loop {
            let byte = self.read_pending(source)?;
            match byte {
                0x40..=0x7e => {
                    if !params.is_empty() {
                        tracing::debug!(final_byte = %(byte as char), "discarding modified CSI");
                        return None;
                    }
                    return match byte {
                        b'A' => Some(Key::Up),
                        b'B' => Some(Key::Down),
                        b'C' => Some(Key::Right),
                        b'D' => Some(Key::Left),
                        _ => None,
                    };
                }
                // Parameter and intermediate bytes.
                0x20..=0x3f => {
                    if params.len() >= MAX_CSI_PARAMS {
                        return None;
                    }
                    params.push(byte);
                }
                _ => return None,
            }
        }
    }

    /// Fetch the next byte, retrying briefly. Returns `None` once the wait
    /// budget is spent; the caller treats that as an unterminated sequence.
    fn read_pending(&self, source: &mut impl ByteSource) -> Option<u8> {
        let deadline = Instant::now() + self.esc_wait;
        loop {
            match source.next_byte() {
                Ok(Some(byte)) => return Some(byte),
                Ok(None) => {}
                Err(_) => return None,
            }
            if Instant::now() >= deadline {
                return None;
            }
            std::thread::sleep(Duration::from_micros(250));
        }
    }
}

/// Assemble a multi-byte UTF-8 character whose lead byte was already read.
/// Continuation bytes are expected to be immediately available (terminals
/// deliver a keystroke's bytes together); anything malformed is dropped.
fn decode_utf8_tail(lead: u8, source: &mut impl ByteSource) -> Option<Key> {
    let len = match lead {
        0xc0..=0xdf => 2,
        0xe0..=0xef => 3,
        0xf0..=0xf7 => 4,
        _ => return None,
    };
    let mut buf = vec![lead];
    for _ in 1..len {
        match source.next_byte() {
            Ok(Some(byte)) if byte & 0xc0 == 0x80 => buf.push(byte),
            _ => return None,
        }
    }
    let text = String::from_utf8(buf).ok()?;
    text.chars().next().map(Key::Char)
}

// === Stdin source ===

/// Non-blocking reader over the process's stdin file descriptor.
///
/// The descriptor is switched to `O_NONBLOCK` for the lifetime of the source
/// and the original flags are restored on drop.
#[cfg(unix)]
pub struct StdinSource {
    fd: i32,
    original_flags: i32,
}

#[cfg(unix)]
impl StdinSource {
    pub fn new() -> io::Result<Self> {
        let fd = libc::STDIN_FILENO;
        // SAFETY: fcntl on a valid descriptor with F_GETFL/F_SETFL.
        let flags = unsafe { libc::fcntl(fd, libc::F_GETFL) };
        if flags == -1 {
            return Err(io::Error::last_os_error());
        }
        let rc = unsafe { libc::fcntl(fd, libc::F_SETFL, flags | libc::O_NONBLOCK) };
        if rc == -1 {
            return Err(io::Error::last_os_error());
        }
        Ok(Self {
            fd,
            original_flags: flags,
        })
    }
}

#[cfg(unix)]
impl ByteSource for StdinSource {
    fn next_byte(&mut self) -> io::Result<Option<u8>> {
        let mut buf = [0u8; 1];
        // SAFETY: reading one byte into a stack buffer from our own fd.
        let n = unsafe { libc::read(self.fd, buf.as_mut_ptr().cast(), 1) };
        match n {
            1 => Ok(Some(buf[0])),
            0 => Ok(None),
            _ => {
                let err = io::Error::last_os_error();
                if err.kind() == io::ErrorKind::WouldBlock {
                    Ok(None)
                } else {
                    Err(err)
                }
            }
        }
    }
}

#[cfg(unix)]
impl Drop for StdinSource {
    fn drop(&mut self) {
        // SAFETY: restoring the flags we saved in `new`.
        unsafe {
            libc::fcntl(self.fd, libc::F_SETFL, self.original_flags);
        }
    }
}

/// Stub source for platforms without fcntl; the UI simply sees no input.
#[cfg(not(unix))]
pub struct StdinSource;

#[cfg(not(unix))]
impl StdinSource {
    pub fn new() -> io::Result<Self> {
        Ok(Self)
    }
}

#[cfg(not(unix))]
impl ByteSource for StdinSource {
    fn next_byte(&mut self) -> io::Result<Option<u8>> {
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    struct Scripted(VecDeque<u8>);

    impl Scripted {
        fn new(bytes: &[u8]) -> Self {
            Self(bytes.iter().copied().collect())
        }
    }

    impl ByteSource for Scripted {
        fn next_byte(&mut self) -> io::Result<Option<u8>> {
            Ok(self.0.pop_front())
        }
    }

    fn drain(bytes: &[u8]) -> Vec<Key> {
        let mut decoder = InputDecoder::without_wait();
        let mut source = Scripted::new(bytes);
        let mut keys = Vec::new();
        for _ in 0..bytes.len() + 2 {
            if let Some(key) = decoder.poll(&mut source) {
                keys.push(key);
            }
        }
        keys
    }

    #[test]
    fn printable_bytes_become_chars() {
        assert_eq!(drain(b"ab "), vec![
            Key::Char('a'),
            Key::Char('b'),
            Key::Char(' ')
        ]);
    }

    #[test]
    fn control_keys_map_directly() {
        assert_eq!(drain(b"\t"), vec![Key::Tab]);
        assert_eq!(drain(b"\r"), vec![Key::Enter]);
        assert_eq!(drain(b"\n"), vec![Key::Enter]);
        assert_eq!(drain(&[0x7f]), vec![Key::Backspace]);
        assert_eq!(drain(&[0x08]), vec![Key::Backspace]);
    }

    #[test]
    fn ctrl_c_decodes_to_interrupt() {
        assert_eq!(drain(&[0x03]), vec![Key::Interrupt]);
    }

    #[test]
    fn arrow_sequence_is_one_key_not_three() {
        assert_eq!(drain(b"\x1b[A"), vec![Key::Up]);
        assert_eq!(drain(b"\x1b[B"), vec![Key::Down]);
        assert_eq!(drain(b"\x1b[C"), vec![Key::Right]);
        assert_eq!(drain(b"\x1b[D"), vec![Key::Left]);
    }

    #[test]
    fn modified_arrow_is_swallowed_whole() {
        // A modified arrow must neither emit a key nor leave stray bytes.
        assert_eq!(drain(b"\x1b[1;9A"), vec![]);
        // The decoder is immediately ready for the next sequence.
        assert_eq!(drain(b"\x1b[1;9A\x1b[B"), vec![Key::Down]);
    }

    #[test]
    fn alt_letter_combinations() {
        assert_eq!(drain(b"\x1bq"), vec![Key::Alt('q')]);
        assert_eq!(drain(b"\x1bZ"), vec![Key::Alt('Z')]);
    }

    #[test]
    fn bare_escape_resolves_to_esc() {
        assert_eq!(drain(&[0x1b]), vec![Key::Esc]);
    }

    #[test]
    fn empty_source_yields_nothing() {
        let mut decoder = InputDecoder::without_wait();
        let mut source = Scripted::new(b"");
        assert_eq!(decoder.poll(&mut source), None);
    }

    #[test]
    fn unterminated_csi_is_a_noop() {
        assert_eq!(drain(b"\x1b[1;"), vec![]);
    }

    #[test]
    fn unknown_csi_final_is_swallowed() {
        assert_eq!(drain(b"\x1b[Zq"), vec![Key::Char('q')]);
    }

    #[test]
    fn utf8_input_decodes_to_char() {
        assert_eq!(drain("é".as_bytes()), vec![Key::Char('é')]);
        assert_eq!(drain("你".as_bytes()), vec![Key::Char('你')]);
    }

    #[test]
    fn interleaved_typing_survives_sequences() {
        assert_eq!(drain(b"a\x1b[Ab"), vec![
            Key::Char('a'),
            Key::Up,
            Key::Char('b')
        ]);
    }
}
