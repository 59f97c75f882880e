//! Raw datagram sockets untuk uevent
//!
//! `NetlinkSocket` membungkus fd `AF_NETLINK/NETLINK_KOBJECT_UEVENT`.
//! Fd dimiliki lewat `OwnedFd`, jadi selalu dilepas walaupun bind gagal.

use std::io;
use std::mem;
use std::os::fd::{AsFd, AsRawFd, BorrowedFd, FromRawFd, IntoRawFd, OwnedFd, RawFd};
use std::os::unix::net::UnixDatagram;

use tracing::debug;

use super::MulticastGroup;
use crate::error::{Error, Result};

/// Source of whole datagrams.
///
/// `peek` must not consume the pending datagram; `recv` consumes exactly
/// one. Both return the number of bytes copied into `buf`, which is
/// `buf.len()` when the datagram did not fit.
pub trait DatagramSource {
    fn peek(&self, buf: &mut [u8]) -> io::Result<usize>;

    fn recv(&self, buf: &mut [u8]) -> io::Result<usize>;

    /// Release the endpoint. Default: drop.
    fn release(self) -> io::Result<()>
    where
        Self: Sized,
    {
        drop(self);
        Ok(())
    }
}

/// recv(2) dengan retry hanya untuk EINTR
///
/// EINTR bukan receive fault: syscall diinterupsi signal sebelum ada data
/// yang di-copy, datagram masih pending. Error lain langsung dikembalikan.
#[inline]
fn recv_with_flags(fd: RawFd, buf: &mut [u8], flags: libc::c_int) -> io::Result<usize> {
    loop {
        // SAFETY: buf valid untuk buf.len() bytes selama call
        let n = unsafe { libc::recv(fd, buf.as_mut_ptr().cast(), buf.len(), flags) };
        if n >= 0 {
            return Ok(n as usize);
        }
        let err = io::Error::last_os_error();
        if err.kind() != io::ErrorKind::Interrupted {
            return Err(err);
        }
    }
}

/// Kernel uevent endpoint bound to one multicast group.
#[derive(Debug)]
pub struct NetlinkSocket {
    fd: OwnedFd,
    group: MulticastGroup,
}

impl NetlinkSocket {
    /// socket(AF_NETLINK, SOCK_RAW, NETLINK_KOBJECT_UEVENT) + bind ke group
    pub fn open(group: MulticastGroup) -> Result<Self> {
        // SAFETY: plain syscall, fd dicek sebelum dipakai
        let raw = unsafe {
            libc::socket(
                libc::AF_NETLINK,
                libc::SOCK_RAW | libc::SOCK_CLOEXEC,
                libc::NETLINK_KOBJECT_UEVENT,
            )
        };
        if raw < 0 {
            return Err(Error::resource("create", io::Error::last_os_error()));
        }
        // SAFETY: raw adalah fd baru yang belum dimiliki siapa pun
        let fd = unsafe { OwnedFd::from_raw_fd(raw) };

        // SAFETY: sockaddr_nl valid kalau di-zero
        let mut addr: libc::sockaddr_nl = unsafe { mem::zeroed() };
        addr.nl_family = libc::AF_NETLINK as libc::sa_family_t;
        // nl_pid 0: kernel yang assign port id
        addr.nl_pid = 0;
        addr.nl_groups = group.bits();

        // SAFETY: addr hidup selama call, panjang sesuai tipe
        let rc = unsafe {
            libc::bind(
                fd.as_raw_fd(),
                (&addr as *const libc::sockaddr_nl).cast(),
                mem::size_of::<libc::sockaddr_nl>() as libc::socklen_t,
            )
        };
        if rc < 0 {
            // fd di-drop di sini, tidak bocor
            return Err(Error::resource("bind", io::Error::last_os_error()));
        }

        debug!(fd = raw, group = %group, "uevent socket bound");
        Ok(Self { fd, group })
    }

    #[inline]
    pub fn group(&self) -> MulticastGroup {
        self.group
    }
}

impl AsFd for NetlinkSocket {
    fn as_fd(&self) -> BorrowedFd<'_> {
        self.fd.as_fd()
    }
}

impl AsRawFd for NetlinkSocket {
    fn as_raw_fd(&self) -> RawFd {
        self.fd.as_raw_fd()
    }
}

impl DatagramSource for NetlinkSocket {
    #[inline]
    fn peek(&self, buf: &mut [u8]) -> io::Result<usize> {
        recv_with_flags(self.fd.as_raw_fd(), buf, libc::MSG_PEEK)
    }

    #[inline]
    fn recv(&self, buf: &mut [u8]) -> io::Result<usize> {
        recv_with_flags(self.fd.as_raw_fd(), buf, 0)
    }

    /// close(2) eksplisit supaya error-nya bisa dilaporkan
    fn release(self) -> io::Result<()> {
        let raw = self.fd.into_raw_fd();
        // SAFETY: raw dimiliki penuh di sini dan hanya di-close sekali.
        // Di Linux fd sudah dilepas walaupun close mengembalikan error.
        if unsafe { libc::close(raw) } < 0 {
            return Err(io::Error::last_os_error());
        }
        debug!(fd = raw, "uevent socket closed");
        Ok(())
    }
}

/// Datagram Unix socket, dipakai untuk replay dan test
impl DatagramSource for UnixDatagram {
    #[inline]
    fn peek(&self, buf: &mut [u8]) -> io::Result<usize> {
        recv_with_flags(self.as_raw_fd(), buf, libc::MSG_PEEK)
    }

    #[inline]
    fn recv(&self, buf: &mut [u8]) -> io::Result<usize> {
        recv_with_flags(self.as_raw_fd(), buf, 0)
    }
}
