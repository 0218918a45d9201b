/// A property a packet may carry. Which properties are present is fully
/// determined by the packet type, its length and a few header bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum Property {
    Clock,
    GunDirection,
    FiredShot,
    Health,
    IsShot,
    Position,
    PlayerId,
    SubType,
    Type,
    TurretDirection,
    TankDestroyed,
}

/// Set of properties present in a packet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Properties(u16);

impl Properties {
    pub const fn empty() -> Self {
        Self(0)
    }

    pub fn set(&mut self, property: Property) {
        self.0 |= 1 << property as u16;
    }

    pub fn has(&self, property: Property) -> bool {
        self.0 & (1 << property as u16) != 0
    }
}

// Field offsets inside a packet. These are contractual with the wire
// format, byte 0..4 is a length-coded header the framer interprets.
/// Every packet: the type tag
const TYPE_OFFSET: usize = 1;
/// Most packets: seconds since battle start, f32
const CLOCK_OFFSET: usize = 5;
/// Most packets: the acting player, u32
const PLAYER_ID_OFFSET: usize = 9;
/// 0x0A: x/y/z position, 3 consecutive f32 at 21, 25 and 29
const POSITION_OFFSET: usize = 21;
/// 0x07: remaining health, u16
const HEALTH_OFFSET: usize = 21;
/// 0x07: header byte deciding whether the health field is present
const HEALTH_MARKER_OFFSET: usize = 13;
const HEALTH_MARKER: u8 = 0x02;
/// 0x08: signature marking a destruction record, u32
const DESTROYED_SIGNATURE_OFFSET: usize = 21;
const DESTROYED_SIGNATURE: u32 = 0x02801006;
/// 0x08: destroyed tank and killer, u32 each
const DESTROYED_TARGET_OFFSET: usize = 26;
const DESTROYED_KILLER_OFFSET: usize = 31;

/// One framed event inside the decompressed replay body.
///
/// A packet is a non-owning view into the buffer owned by the
/// [`Game`](crate::Game) it came from, plus the set of properties that were
/// detected for it. Reading an accessor whose property is not present is a
/// programming error and asserted in debug builds.
#[derive(Debug, Clone, Copy)]
pub struct Packet<'b> {
    data: &'b [u8],
    properties: Properties,
}

impl<'b> Packet<'b> {
    /// The properties are derived once while framing and cached here
    pub(crate) fn from_parts(data: &'b [u8], properties: Properties) -> Self {
        Self { data, properties }
    }

    /// The raw bytes of this packet
    pub fn data(&self) -> &'b [u8] {
        self.data
    }

    pub fn length(&self) -> usize {
        self.data.len()
    }

    pub fn properties(&self) -> Properties {
        self.properties
    }

    pub fn has(&self, property: Property) -> bool {
        self.properties.has(property)
    }

    pub fn packet_type(&self) -> u8 {
        debug_assert!(self.has(Property::Type));
        self.read_u8(TYPE_OFFSET)
    }

    /// Seconds since the start of the battle
    pub fn clock(&self) -> f32 {
        debug_assert!(self.has(Property::Clock));
        self.read_f32(CLOCK_OFFSET)
    }

    pub fn player_id(&self) -> u32 {
        debug_assert!(self.has(Property::PlayerId));
        self.read_u32(PLAYER_ID_OFFSET)
    }

    /// Position of the player on the arena, the map is the x/z plane
    pub fn position(&self) -> (f32, f32, f32) {
        debug_assert!(self.has(Property::Position));
        (
            self.read_f32(POSITION_OFFSET),
            self.read_f32(POSITION_OFFSET + 4),
            self.read_f32(POSITION_OFFSET + 8),
        )
    }

    pub fn health(&self) -> u16 {
        debug_assert!(self.has(Property::Health));
        crate::reader::read_u16_le(self.data, HEALTH_OFFSET)
            .expect("The health property guarantees the field is in range")
    }

    /// `(target, killer)` of a destruction record
    pub fn tank_destroyed(&self) -> (u32, u32) {
        debug_assert!(self.has(Property::TankDestroyed));
        (
            self.read_u32(DESTROYED_TARGET_OFFSET),
            self.read_u32(DESTROYED_KILLER_OFFSET),
        )
    }

    fn read_u8(&self, offset: usize) -> u8 {
        crate::reader::read_u8(self.data, offset)
            .expect("The property set guarantees the field is in range")
    }

    fn read_u32(&self, offset: usize) -> u32 {
        crate::reader::read_u32_le(self.data, offset)
            .expect("The property set guarantees the field is in range")
    }

    fn read_f32(&self, offset: usize) -> f32 {
        crate::reader::read_f32_le(self.data, offset)
            .expect("The property set guarantees the field is in range")
    }
}

/// Derives the property set from the packet type, its length and the
/// relevant header bytes
pub(crate) fn derive_properties(data: &[u8]) -> Properties {
    let mut properties = Properties::empty();
    properties.set(Property::Type);

    match crate::reader::read_u8(data, TYPE_OFFSET) {
        Some(0x0A) => {
            properties.set(Property::Clock);
            properties.set(Property::PlayerId);
            properties.set(Property::Position);
        }
        Some(0x07) => {
            properties.set(Property::Clock);
            properties.set(Property::PlayerId);
            properties.set(Property::IsShot);
            if crate::reader::read_u8(data, HEALTH_MARKER_OFFSET) == Some(HEALTH_MARKER) {
                properties.set(Property::Health);
            }
        }
        Some(0x08) => {
            properties.set(Property::Clock);
            properties.set(Property::PlayerId);
            if data.len() > 25
                && crate::reader::read_u32_le(data, DESTROYED_SIGNATURE_OFFSET)
                    == Some(DESTROYED_SIGNATURE)
            {
                properties.set(Property::TankDestroyed);
            }
        }
        _ => {
            if data.len() >= CLOCK_OFFSET + 4 {
                properties.set(Property::Clock);
            }
            if data.len() >= PLAYER_ID_OFFSET + 4 {
                properties.set(Property::PlayerId);
            }
        }
    }

    properties
}
