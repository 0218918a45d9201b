use crate::game::Warning;
use crate::packet::Properties;
use crate::version::Version;

/// Marks the start of the packet stream inside the decompressed body
pub const STREAM_MARKER: [u8; 6] = [0x2C, 0x01, 0x01, 0x00, 0x00, 0x00];

/// The game appends a short trailing region after the last packet that is
/// not itself a packet
const TRAILER_SIZE: usize = 25;

/// Unknown types this early in the stream are treated as a mis-aligned
/// start rather than a corrupt tail
const RESYNC_PACKET_LIMIT: usize = 500;

/// How a packet type is framed: a fixed base size, plus an optional
/// variable payload whose length is embedded in the packet itself
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameSpec {
    pub base: usize,
    /// Offset of the embedded payload length field
    pub length_offset: usize,
    /// Width of the payload length field, 0 when there is no variable payload
    pub length_width: usize,
}

const fn fixed(base: usize) -> FrameSpec {
    FrameSpec {
        base,
        length_offset: 0,
        length_width: 0,
    }
}

const fn variable(base: usize, length_offset: usize, length_width: usize) -> FrameSpec {
    FrameSpec {
        base,
        length_offset,
        length_width,
    }
}

/// Frame sizes per packet type for clients from 0.8.0 onwards. Older
/// clients are handled through the overrides in [`FrameTable`].
static BASE_FRAMES: phf::Map<u8, FrameSpec> = phf::phf_map! {
    0x00u8 => variable(22, 15, 4),
    0x03u8 => fixed(24),
    0x04u8 => fixed(16),
    0x05u8 => variable(54, 47, 1),
    0x07u8 => variable(24, 17, 2),
    0x08u8 => variable(24, 17, 2),
    0x0Au8 => fixed(61),
    0x0Bu8 => variable(30, 23, 1),
    0x0Cu8 => fixed(3),
    0x0Du8 => variable(22, 15, 4),
    0x0Eu8 => variable(25, 10, 4),
    0x11u8 => fixed(12),
    0x12u8 => fixed(16),
    0x13u8 => fixed(16),
    0x14u8 => fixed(4),
    0x15u8 => fixed(44),
    0x16u8 => fixed(80),
    0x17u8 => variable(16, 9, 1),
    0x18u8 => fixed(16),
    0x19u8 => fixed(16),
    0x1Au8 => fixed(16),
    0x1Bu8 => fixed(16),
    0x1Cu8 => fixed(20),
    0x1Du8 => fixed(21),
    0x1Eu8 => fixed(16),
    0x1Fu8 => variable(17, 9, 1),
    0x20u8 => variable(21, 14, 1),
    0x31u8 => fixed(4),
};

/// The frame table for one specific client version.
///
/// This is the only point where the replay version changes decoder
/// behavior, so it is modeled as a small configuration value instead of
/// separate reader implementations.
#[derive(Debug, Clone, Copy)]
pub struct FrameTable {
    before_8_0: bool,
    before_8_5: bool,
    legacy: bool,
}

impl FrameTable {
    pub fn for_version(version: &Version, legacy: bool) -> Self {
        Self {
            before_8_0: version.before(8, 0),
            before_8_5: version.before(8, 5),
            legacy,
        }
    }

    pub fn get(&self, ty: u8) -> Option<FrameSpec> {
        match ty {
            0x16 if self.legacy => Some(fixed(44)),
            0x16 if self.before_8_5 => Some(fixed(52)),
            0x20 if self.before_8_0 => Some(fixed(4)),
            _ => BASE_FRAMES.get(&ty).copied(),
        }
    }
}

/// A framed packet: its byte range inside the decompressed body and the
/// properties derived from those bytes
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct FramedPacket {
    pub range: core::ops::Range<usize>,
    pub properties: Properties,
}

/// Locates the start of the packet stream. Falls back to the start of the
/// buffer when the marker is absent, which matches what old clients
/// produced.
pub fn find_stream_start(buffer: &[u8]) -> usize {
    buffer
        .windows(STREAM_MARKER.len())
        .position(|window| window == STREAM_MARKER)
        .map(|position| position + STREAM_MARKER.len())
        .unwrap_or(0)
}

/// Splits the decompressed body into packets.
///
/// An unknown type early in the stream restarts framing one byte further,
/// compensating for a marker scan that landed slightly off. An unknown
/// type late in the stream, or a frame reaching past the buffer, truncates
/// the stream with a recorded warning.
pub(crate) fn read_packets(
    buffer: &[u8],
    table: &FrameTable,
) -> (Vec<FramedPacket>, Vec<Warning>) {
    let mut sync = find_stream_start(buffer);
    let mut packets = Vec::new();
    let mut warnings = Vec::new();

    let mut position = sync;
    loop {
        if position + TRAILER_SIZE >= buffer.len() {
            break;
        }

        let ty = buffer[position + 1];
        let spec = match table.get(ty) {
            Some(spec) => spec,
            None if packets.len() < RESYNC_PACKET_LIMIT => {
                sync += 1;
                position = sync;
                packets.clear();
                continue;
            }
            None => {
                log::warn!(
                    "unknown packet type 0x{:02X} at offset {}, truncating stream",
                    ty,
                    position
                );
                warnings.push(Warning::UnknownPacketType {
                    offset: position,
                    ty,
                });
                break;
            }
        };

        let mut total = spec.base;
        if spec.length_width > 0 {
            match crate::reader::read_uint_le(
                buffer,
                position + spec.length_offset,
                spec.length_width,
            ) {
                Some(extra) => total += extra as usize,
                None => {
                    warnings.push(Warning::PacketOutOfBounds {
                        offset: position,
                        length: spec.base,
                    });
                    break;
                }
            }
        }

        if position + TRAILER_SIZE + total > buffer.len() {
            log::warn!(
                "packet at offset {} declares {} bytes beyond the buffer, truncating stream",
                position,
                total
            );
            warnings.push(Warning::PacketOutOfBounds {
                offset: position,
                length: total,
            });
            break;
        }

        let range = position..position + total;
        let properties = crate::packet::derive_properties(&buffer[range.clone()]);
        packets.push(FramedPacket { range, properties });

        position += total;
    }

    (packets, warnings)
}
