use crate::container::{Container, ParseContainerError};
use crate::crypto::DecryptError;
use crate::framer::FrameTable;
use crate::game::{Game, Warning};
use crate::inflate::InflateError;
use crate::metadata::{Metadata, MetadataError};
use crate::packet::Packet;
use crate::version::Version;

#[derive(Debug)]
pub enum ParseError {
    MalformedContainer(ParseContainerError),
    UnexpectedBlockCount(usize),
    DecryptionPadding { length: usize },
    MalformedCompressedBody(std::io::Error),
}

impl From<ParseContainerError> for ParseError {
    fn from(value: ParseContainerError) -> Self {
        match value {
            ParseContainerError::UnexpectedBlockCount(count) => Self::UnexpectedBlockCount(count),
            other => Self::MalformedContainer(other),
        }
    }
}
impl From<DecryptError> for ParseError {
    fn from(value: DecryptError) -> Self {
        match value {
            DecryptError::Padding { length } => Self::DecryptionPadding { length },
        }
    }
}
impl From<InflateError> for ParseError {
    fn from(value: InflateError) -> Self {
        match value {
            InflateError::Inflate(inner) => Self::MalformedCompressedBody(inner),
        }
    }
}

/// The decompressed body stores its client version string with a u32
/// length at offset 12 and the text from offset 16
const VERSION_LENGTH_OFFSET: usize = 12;
const VERSION_TEXT_OFFSET: usize = 16;

fn read_version(replay: &[u8]) -> Version {
    let length = match crate::reader::read_u32_le(replay, VERSION_LENGTH_OFFSET) {
        Some(length) => length as usize,
        None => return Version::default(),
    };

    match replay.get(VERSION_TEXT_OFFSET..VERSION_TEXT_OFFSET + length) {
        Some(raw) => Version::parse(&String::from_utf8_lossy(raw)),
        None => Version::default(),
    }
}

/// Parses a complete replay file into a [`Game`].
///
/// Container, decryption and decompression failures are fatal. Failures
/// past that point (metadata, packet framing) degrade the result and are
/// recorded as warnings on the `Game`.
pub fn parse(input: &[u8]) -> Result<Game, ParseError> {
    let container = Container::parse(input)?;

    let mut body = container.body.to_vec();
    if !container.legacy {
        crate::crypto::decrypt_body(&mut body)?;
    }
    let replay = crate::inflate::inflate(&body)?;

    // legacy bodies carry no version string, the all-zero version selects
    // the oldest frame table
    let version = if container.legacy {
        Version::default()
    } else {
        read_version(&replay)
    };

    let mut warnings = Vec::new();
    let metadata = match container.game_begin {
        Some(block) => match crate::metadata::decode(block) {
            Ok(metadata) => metadata,
            Err(MetadataError::Json(error)) => {
                log::warn!("failed decoding battle metadata: {}", error);
                warnings.push(Warning::MalformedMetadata(error.to_string()));
                Metadata::default()
            }
        },
        None => Metadata::default(),
    };

    let table = FrameTable::for_version(&version, container.legacy);
    let (packets, framing_warnings) = crate::framer::read_packets(&replay, &table);
    warnings.extend(framing_warnings);

    Ok(Game {
        game_begin: container.game_begin.map(<[u8]>::to_vec).unwrap_or_default(),
        game_end: container.game_end.map(<[u8]>::to_vec).unwrap_or_default(),
        replay,
        packets,
        version,
        metadata,
        legacy: container.legacy,
        warnings,
    })
}

/// Packet count per type, the quick overview used when inspecting replays
pub fn packet_summary<'b, I>(packets: I) -> std::collections::BTreeMap<u8, usize>
where
    I: IntoIterator<Item = Packet<'b>>,
{
    let mut counts = std::collections::BTreeMap::new();
    for packet in packets {
        *counts.entry(packet.packet_type()).or_insert(0) += 1;
    }
    counts
}
