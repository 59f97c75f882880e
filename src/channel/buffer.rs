//! Growable receive buffer dengan "peek, then commit"
//!
//! Setiap receive mulai dari page size. Datagram di-peek dulu tanpa
//! consume; selama hasil peek >= kapasitas (kemungkinan terpotong),
//! kapasitas di-double lalu peek lagi. Setelah muat, baru recv yang
//! sebenarnya. Hasil: tidak pernah truncated, tidak over-allocate untuk
//! message kecil.

use std::io;

use tracing::trace;

use super::DatagramSource;

/// Fallback kalau sysconf gagal
const DEFAULT_PAGE_SIZE: usize = 4096;

/// Platform memory page size.
pub fn page_size() -> usize {
    // SAFETY: sysconf tidak punya precondition
    let size = unsafe { libc::sysconf(libc::_SC_PAGESIZE) };
    if size > 0 {
        size as usize
    } else {
        DEFAULT_PAGE_SIZE
    }
}

/// Receive buffer owned by a channel.
#[derive(Debug)]
pub struct RecvBuffer {
    buf: Vec<u8>,
    initial: usize,
    len: usize,
    last_growth: u32,
}

impl Default for RecvBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl RecvBuffer {
    /// Buffer yang mulai dari page size
    pub fn new() -> Self {
        Self::with_initial_capacity(page_size())
    }

    /// # Panics
    /// Kalau `initial` nol.
    pub fn with_initial_capacity(initial: usize) -> Self {
        assert!(initial > 0, "initial capacity must be non-zero");
        Self {
            buf: Vec::new(),
            initial,
            len: 0,
            last_growth: 0,
        }
    }

    /// Receive exactly one datagram from `source`.
    ///
    /// Returned slice has the datagram's exact length. Bytes from an
    /// earlier, larger datagram are never visible.
    pub fn fill<S>(&mut self, source: &S) -> io::Result<&[u8]>
    where
        S: DatagramSource + ?Sized,
    {
        // Reset ke ukuran awal, zeroed
        self.buf.clear();
        self.buf.resize(self.initial, 0);
        self.len = 0;
        self.last_growth = 0;

        loop {
            let peeked = source.peek(&mut self.buf)?;
            if peeked < self.buf.len() {
                break;
            }

            let next = self.buf.len().checked_mul(2).ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::OutOfMemory,
                    "uevent receive buffer cannot grow further",
                )
            })?;
            trace!(from = self.buf.len(), to = next, "growing receive buffer");
            self.buf.resize(next, 0);
            self.last_growth += 1;
        }

        let n = source.recv(&mut self.buf)?;
        self.len = n;
        Ok(&self.buf[..n])
    }

    /// Datagram terakhir yang diterima
    #[inline(always)]
    pub fn filled(&self) -> &[u8] {
        &self.buf[..self.len]
    }

    /// Current buffer size in bytes.
    #[inline(always)]
    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    #[inline(always)]
    pub fn initial_capacity(&self) -> usize {
        self.initial
    }

    /// Jumlah doubling pada receive terakhir
    #[inline(always)]
    pub fn last_growth(&self) -> u32 {
        self.last_growth
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};
    use std::collections::VecDeque;
    use std::os::unix::net::UnixDatagram;

    /// In-memory source dengan semantik truncation seperti kernel
    #[derive(Default)]
    struct ScriptedSource {
        queue: RefCell<VecDeque<Vec<u8>>>,
        peeks: Cell<usize>,
        recvs: Cell<usize>,
        fail_peek: Cell<bool>,
    }

    impl ScriptedSource {
        fn with(datagrams: Vec<Vec<u8>>) -> Self {
            Self {
                queue: RefCell::new(datagrams.into()),
                ..Default::default()
            }
        }
    }

    impl DatagramSource for ScriptedSource {
        fn peek(&self, buf: &mut [u8]) -> io::Result<usize> {
            self.peeks.set(self.peeks.get() + 1);
            if self.fail_peek.get() {
                return Err(io::Error::from_raw_os_error(libc::ENOBUFS));
            }
            let queue = self.queue.borrow();
            let front = queue
                .front()
                .ok_or_else(|| io::Error::from(io::ErrorKind::WouldBlock))?;
            let n = front.len().min(buf.len());
            buf[..n].copy_from_slice(&front[..n]);
            Ok(n)
        }

        fn recv(&self, buf: &mut [u8]) -> io::Result<usize> {
            self.recvs.set(self.recvs.get() + 1);
            let front = self
                .queue
                .borrow_mut()
                .pop_front()
                .ok_or_else(|| io::Error::from(io::ErrorKind::WouldBlock))?;
            let n = front.len().min(buf.len());
            buf[..n].copy_from_slice(&front[..n]);
            Ok(n)
        }
    }

    fn datagram(size: usize) -> Vec<u8> {
        (0..size).map(|i| (i % 251) as u8 + 1).collect()
    }

    #[test]
    fn test_small_datagram_no_growth() {
        let source = ScriptedSource::with(vec![b"add@/devices/foo".to_vec()]);
        let mut buffer = RecvBuffer::with_initial_capacity(4096);

        let data = buffer.fill(&source).unwrap();
        assert_eq!(data, b"add@/devices/foo");
        assert_eq!(buffer.last_growth(), 0);
        assert_eq!(buffer.capacity(), 4096);
        assert_eq!(source.peeks.get(), 1);
        assert_eq!(source.recvs.get(), 1);
    }

    #[test]
    fn test_growth_converges_in_ceil_log2_steps() {
        // (size, expected doublings) untuk initial 4096
        let cases = [(4095, 0), (5000, 1), (10_000, 2), (20_000, 3), (70_000, 5)];

        for (size, steps) in cases {
            let expected = datagram(size);
            let source = ScriptedSource::with(vec![expected.clone()]);
            let mut buffer = RecvBuffer::with_initial_capacity(4096);

            let data = buffer.fill(&source).unwrap();
            assert_eq!(data.len(), size);
            assert_eq!(data, &expected[..]);
            assert_eq!(buffer.last_growth(), steps, "size {size}");
            assert_eq!(buffer.capacity(), 4096 << steps);
            // Satu peek per step plus peek terakhir yang muat
            assert_eq!(source.peeks.get(), steps as usize + 1);
            assert_eq!(source.recvs.get(), 1);
        }
    }

    #[test]
    fn test_exact_capacity_still_grows() {
        // Peek yang mengisi penuh buffer tidak bisa dibedakan dari truncation
        let source = ScriptedSource::with(vec![datagram(8192)]);
        let mut buffer = RecvBuffer::with_initial_capacity(4096);

        let data = buffer.fill(&source).unwrap();
        assert_eq!(data.len(), 8192);
        assert_eq!(buffer.last_growth(), 2);
        assert_eq!(buffer.capacity(), 16384);
    }

    #[test]
    fn test_no_stale_bytes_after_large_datagram() {
        let source = ScriptedSource::with(vec![datagram(20_000), b"remove@/d".to_vec()]);
        let mut buffer = RecvBuffer::with_initial_capacity(4096);

        assert_eq!(buffer.fill(&source).unwrap().len(), 20_000);

        let data = buffer.fill(&source).unwrap();
        assert_eq!(data, b"remove@/d");
        assert_eq!(buffer.filled(), b"remove@/d");
        assert_eq!(buffer.capacity(), 4096);
        assert_eq!(buffer.last_growth(), 0);
    }

    #[test]
    fn test_empty_datagram() {
        let source = ScriptedSource::with(vec![Vec::new()]);
        let mut buffer = RecvBuffer::with_initial_capacity(64);

        assert!(buffer.fill(&source).unwrap().is_empty());
        assert_eq!(source.recvs.get(), 1);
    }

    #[test]
    fn test_peek_error_does_not_consume() {
        let source = ScriptedSource::with(vec![b"add@/d".to_vec()]);
        source.fail_peek.set(true);
        let mut buffer = RecvBuffer::with_initial_capacity(64);

        let err = buffer.fill(&source).unwrap_err();
        assert_eq!(err.raw_os_error(), Some(libc::ENOBUFS));
        assert_eq!(source.recvs.get(), 0);
        assert_eq!(source.queue.borrow().len(), 1);
    }

    #[test]
    fn test_fill_from_real_datagram_socket() {
        let (tx, rx) = UnixDatagram::pair().unwrap();
        let expected = datagram(1000);
        tx.send(&expected).unwrap();

        let mut buffer = RecvBuffer::with_initial_capacity(64);
        let data = buffer.fill(&rx).unwrap();

        assert_eq!(data, &expected[..]);
        // 64 -> 128 -> 256 -> 512 -> 1024
        assert_eq!(buffer.last_growth(), 4);
    }

    #[test]
    fn test_page_size_is_power_of_two() {
        let size = page_size();
        assert!(size >= 4096);
        assert!(size.is_power_of_two());
        assert_eq!(RecvBuffer::new().initial_capacity(), size);
    }
}
