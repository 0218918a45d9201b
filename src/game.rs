use crate::framer::FramedPacket;
use crate::metadata::Metadata;
use crate::packet::{Packet, Property};
use crate::version::Version;

use std::collections::BTreeSet;

/// A recoverable condition encountered while parsing. Warnings never make
/// the produced [`Game`] unusable.
#[derive(Debug)]
pub enum Warning {
    /// The `game begin` block could not be decoded, metadata fields are
    /// zero-valued
    MalformedMetadata(String),
    /// A frame declared a length past the end of the buffer, the packet
    /// stream was truncated at the last valid frame
    PacketOutOfBounds { offset: usize, length: usize },
    /// An unknown type was found deep in the stream, the tail was dropped
    UnknownPacketType { offset: usize, ty: u8 },
}

/// A fully parsed replay: the raw data blocks, the decompressed body and
/// the packet stream, plus the battle metadata.
///
/// A `Game` is immutable once constructed. Packets are views borrowing
/// from the buffer owned here and cannot outlive it.
#[derive(Debug)]
pub struct Game {
    pub(crate) game_begin: Vec<u8>,
    pub(crate) game_end: Vec<u8>,
    pub(crate) replay: Vec<u8>,
    pub(crate) packets: Vec<FramedPacket>,
    pub(crate) version: Version,
    pub(crate) metadata: Metadata,
    pub(crate) legacy: bool,
    pub(crate) warnings: Vec<Warning>,
}

impl Game {
    /// All packets in the order they appear in the replay body
    pub fn packets(&self) -> Packets<'_> {
        Packets {
            game: self,
            next: 0,
        }
    }

    pub fn packet(&self, index: usize) -> Option<Packet<'_>> {
        self.packets.get(index).map(|framed| self.materialize(framed))
    }

    pub fn packet_count(&self) -> usize {
        self.packets.len()
    }

    /// Player id of the recording client, 0 when the metadata is missing
    pub fn recorder_id(&self) -> u32 {
        self.metadata.recorder_id
    }

    /// Roster of team 0 or 1
    pub fn team(&self, team: usize) -> &BTreeSet<u32> {
        &self.metadata.teams[team]
    }

    /// The team a player belongs to, if any
    pub fn team_of(&self, player_id: u32) -> Option<usize> {
        self.metadata
            .teams
            .iter()
            .position(|team| team.contains(&player_id))
    }

    /// Canonical arena short-name, empty when the metadata is missing
    pub fn arena(&self) -> &str {
        &self.metadata.map_name
    }

    /// 3-letter game mode code, empty when the metadata is missing
    pub fn mode(&self) -> &str {
        &self.metadata.game_mode
    }

    pub fn version(&self) -> &Version {
        &self.version
    }

    pub fn is_legacy(&self) -> bool {
        self.legacy
    }

    /// The raw `game begin` JSON block, empty for legacy files
    pub fn game_begin(&self) -> &[u8] {
        &self.game_begin
    }

    /// The raw `game end` JSON block, empty outside of 3-block files
    pub fn game_end(&self) -> &[u8] {
        &self.game_end
    }

    /// The decompressed replay body the packets point into
    pub fn raw_replay(&self) -> &[u8] {
        &self.replay
    }

    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    /// Finds the packet carrying `property` for `player_id` that is
    /// closest in clock to the reference clock.
    ///
    /// Packets sharing the reference clock are preferred; otherwise the
    /// nearest matching packet before or after the reference is returned,
    /// with ties resolved towards the earlier packet.
    pub fn find_nearest(
        &self,
        clock: f32,
        player_id: u32,
        property: Property,
    ) -> Option<Packet<'_>> {
        let same_clock = |framed: &FramedPacket| -> bool {
            framed.properties.has(Property::Clock) && self.materialize(framed).clock() == clock
        };
        let matches = |framed: &FramedPacket| -> bool {
            framed.properties.has(Property::Clock)
                && framed.properties.has(Property::PlayerId)
                && framed.properties.has(property)
                && self.materialize(framed).player_id() == player_id
        };

        // locate the contiguous run of packets at the reference clock, or
        // the position where that run would be
        let (lo, hi) = match self.packets.iter().position(|p| same_clock(p)) {
            Some(lo) => {
                let run = self.packets[lo..].iter().take_while(|p| same_clock(p)).count();
                (lo, lo + run)
            }
            None => {
                let at = self
                    .packets
                    .iter()
                    .position(|framed| {
                        framed.properties.has(Property::Clock)
                            && self.materialize(framed).clock() > clock
                    })
                    .unwrap_or(self.packets.len());
                (at, at)
            }
        };

        if let Some(framed) = self.packets[lo..hi].iter().find(|p| matches(p)) {
            return Some(self.materialize(framed));
        }

        let after = self.packets[hi..].iter().find(|p| matches(p));
        let before = self.packets[..lo].iter().rev().find(|p| matches(p));

        let nearest = match (before, after) {
            (Some(before), Some(after)) => {
                let before_distance = (self.materialize(before).clock() - clock).abs();
                let after_distance = (self.materialize(after).clock() - clock).abs();
                if before_distance <= after_distance {
                    before
                } else {
                    after
                }
            }
            (Some(before), None) => before,
            (None, Some(after)) => after,
            (None, None) => return None,
        };

        Some(self.materialize(nearest))
    }

    fn materialize(&self, framed: &FramedPacket) -> Packet<'_> {
        Packet::from_parts(&self.replay[framed.range.clone()], framed.properties)
    }
}

/// Iterator over the packets of a [`Game`]
pub struct Packets<'g> {
    game: &'g Game,
    next: usize,
}

impl<'g> Iterator for Packets<'g> {
    type Item = Packet<'g>;

    fn next(&mut self) -> Option<Self::Item> {
        let packet = self.game.packet(self.next)?;
        self.next += 1;
        Some(packet)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.game.packets.len() - self.next;
        (remaining, Some(remaining))
    }
}

impl<'g> ExactSizeIterator for Packets<'g> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framer::{read_packets, FrameTable, STREAM_MARKER};

    fn position_packet(clock: f32, player_id: u32) -> Vec<u8> {
        let mut data = vec![0u8; 61];
        data[1] = 0x0A;
        data[5..9].copy_from_slice(&clock.to_le_bytes());
        data[9..13].copy_from_slice(&player_id.to_le_bytes());
        data
    }

    fn game_with(packets: &[Vec<u8>]) -> Game {
        let mut replay = STREAM_MARKER.to_vec();
        for packet in packets {
            replay.extend_from_slice(packet);
        }
        replay.extend([0u8; 25]);

        let table = FrameTable::for_version(&Version::parse("v.0.8.5.0"), false);
        let (framed, warnings) = read_packets(&replay, &table);
        assert!(warnings.is_empty());

        Game {
            game_begin: Vec::new(),
            game_end: Vec::new(),
            replay,
            packets: framed,
            version: Version::parse("v.0.8.5.0"),
            metadata: Metadata::default(),
            legacy: false,
            warnings: Vec::new(),
        }
    }

    #[test]
    fn iteration_order() {
        let game = game_with(&[
            position_packet(1.0, 7),
            position_packet(2.0, 7),
            position_packet(3.0, 7),
        ]);

        let clocks: Vec<f32> = game.packets().map(|p| p.clock()).collect();

        assert_eq!(vec![1.0, 2.0, 3.0], clocks);
        assert_eq!(3, game.packets().len());
    }

    #[test]
    fn nearest_exact_clock() {
        let game = game_with(&[
            position_packet(1.0, 7),
            position_packet(2.0, 7),
            position_packet(3.0, 7),
        ]);

        let packet = game.find_nearest(2.0, 7, Property::Position).unwrap();

        assert_eq!(2.0, packet.clock());
    }

    #[test]
    fn nearest_tie_breaks_before() {
        let game = game_with(&[
            position_packet(1.0, 7),
            position_packet(2.0, 7),
            position_packet(3.0, 7),
        ]);

        let packet = game.find_nearest(1.5, 7, Property::Position).unwrap();

        assert_eq!(1.0, packet.clock());
    }

    #[test]
    fn nearest_prefers_closer_side() {
        let game = game_with(&[position_packet(1.0, 7), position_packet(4.0, 7)]);

        let packet = game.find_nearest(3.5, 7, Property::Position).unwrap();

        assert_eq!(4.0, packet.clock());
    }

    #[test]
    fn nearest_skips_other_players() {
        let game = game_with(&[
            position_packet(2.0, 9),
            position_packet(5.0, 7),
        ]);

        let packet = game.find_nearest(2.0, 7, Property::Position).unwrap();

        assert_eq!(5.0, packet.clock());
        assert_eq!(7, packet.player_id());
    }

    #[test]
    fn nearest_same_clock_run() {
        let game = game_with(&[
            position_packet(2.0, 9),
            position_packet(2.0, 7),
            position_packet(2.0, 8),
        ]);

        let packet = game.find_nearest(2.0, 7, Property::Position).unwrap();

        assert_eq!(7, packet.player_id());
    }

    #[test]
    fn nearest_without_match() {
        let game = game_with(&[position_packet(1.0, 9)]);

        assert!(game.find_nearest(1.0, 7, Property::Position).is_none());
    }

    #[test]
    fn nearest_wrong_property() {
        let game = game_with(&[position_packet(1.0, 7)]);

        assert!(game
            .find_nearest(1.0, 7, Property::TankDestroyed)
            .is_none());
    }

    #[test]
    fn team_queries() {
        let mut game = game_with(&[]);
        game.metadata.teams[0].insert(42);
        game.metadata.teams[1].insert(99);

        assert_eq!(Some(0), game.team_of(42));
        assert_eq!(Some(1), game.team_of(99));
        assert_eq!(None, game.team_of(7));
        assert_eq!(&BTreeSet::from([42]), game.team(0));
    }
}
