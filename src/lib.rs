mod reader;

mod container;
pub use container::{Container, ParseContainerError};

mod crypto;
mod inflate;

mod version;
pub use version::Version;

pub mod arena;

mod metadata;
pub use metadata::Metadata;

mod packet;
pub use packet::{Packet, Properties, Property};

mod framer;
pub use framer::{FrameSpec, FrameTable, STREAM_MARKER};

mod game;
pub use game::{Game, Packets, Warning};

pub mod parser;
pub use parser::{parse, ParseError};
