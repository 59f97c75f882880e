//! Replay synthetic uevents through a datagram pair
//!
//! Jalur yang sama dengan binary (Channel -> decode -> print), tanpa butuh
//! socket netlink atau hak akses khusus.
//!
//! Usage:
//!   cargo run --example replay

use std::os::unix::net::UnixDatagram;

use uevent_monitor::{poll, trace, Channel, MonitorConfig};

const EVENTS: &[&[u8]] = &[
    b"add@/devices/pci0000:00/0000:00:14.0/usb1/1-2\0ACTION=add\0SUBSYSTEM=usb\0DEVNAME=bus/usb/001/005\0SEQNUM=3101\0",
    b"add@/devices/virtual/block/loop3\0ACTION=add\0SUBSYSTEM=block\0DEVNAME=loop3\0DEVTYPE=disk\0SEQNUM=3102\0",
    b"change@/devices/virtual/block/loop3\0ACTION=change\0SUBSYSTEM=block\0DISK_MEDIA_CHANGE=1\0SEQNUM=3103\0",
    b"remove@/devices/pci0000:00/0000:00:14.0/usb1/1-2\0ACTION=remove\0SUBSYSTEM=usb\0SEQNUM=3104\0",
];

fn main() -> anyhow::Result<()> {
    trace::init_tracing(1);

    let (tx, rx) = UnixDatagram::pair()?;
    for event in EVENTS {
        tx.send(event)?;
    }

    let mut channel = Channel::with_source(rx);
    let config = MonitorConfig {
        max_events: Some(EVENTS.len() as u64),
        raw: std::env::args().any(|a| a == "--raw"),
        ..MonitorConfig::with_timeout_secs(5)
    };

    let stdout = std::io::stdout();
    let summary = poll::run(&mut channel, &config, &mut stdout.lock())?;
    channel.close()?;

    println!("\nreplayed {} events", summary.events);
    Ok(())
}
