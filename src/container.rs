#[derive(Debug)]
pub enum ParseContainerError {
    MissingHeader,
    TruncatedBlockTable {
        offset: usize,
        buffer_len: usize,
    },
    UnexpectedBlockCount(usize),
}

/// A Container models the outer layer of a replay file: a count-prefixed
/// table of metadata blocks followed by the encrypted and compressed
/// replay body. Pre-0.7.2 files skip the block table entirely and are
/// recognized by the zlib signature at offset 8.
#[derive(Debug)]
pub struct Container<'b> {
    /// JSON document describing the start of the battle
    pub game_begin: Option<&'b [u8]>,
    /// JSON document describing the result of the battle, only present in
    /// 3-block files
    pub game_end: Option<&'b [u8]>,
    /// The encrypted+compressed replay body (compressed only for legacy files)
    pub body: &'b [u8],
    pub legacy: bool,
}

const BLOCK_COUNT_OFFSET: usize = 4;
const FIRST_BLOCK_OFFSET: usize = 8;
/// Bytes with unknown content between the last counted block and the body
const BODY_GAP: usize = 8;

impl<'b> Container<'b> {
    /// Attempts to split the given bytes into the metadata blocks and the
    /// replay body
    pub fn parse<'ib>(input: &'ib [u8]) -> Result<Self, ParseContainerError>
    where
        'ib: 'b,
    {
        if input.len() < 10 {
            return Err(ParseContainerError::MissingHeader);
        }

        // legacy files carry a bare zlib stream from offset 8 onwards
        if input[8] == 0x78 && input[9] == 0xDA {
            return Ok(Self {
                game_begin: None,
                game_end: None,
                body: &input[8..],
                legacy: true,
            });
        }

        let block_count = crate::reader::read_u32_le(input, BLOCK_COUNT_OFFSET)
            .ok_or(ParseContainerError::MissingHeader)? as usize;

        if block_count != 1 && block_count != 2 {
            return Err(ParseContainerError::UnexpectedBlockCount(block_count));
        }

        let mut blocks = [None; 2];
        let mut offset = FIRST_BLOCK_OFFSET;
        for block in blocks.iter_mut().take(block_count) {
            let size = crate::reader::read_u32_le(input, offset).ok_or(
                ParseContainerError::TruncatedBlockTable {
                    offset,
                    buffer_len: input.len(),
                },
            )? as usize;

            let begin = offset + 4;
            let end = begin + size;
            if end > input.len() {
                return Err(ParseContainerError::TruncatedBlockTable {
                    offset,
                    buffer_len: input.len(),
                });
            }

            *block = Some(&input[begin..end]);
            offset = end;
        }

        // the body starts after a gap with unknown content
        let body_start = offset + BODY_GAP;
        if body_start > input.len() {
            return Err(ParseContainerError::TruncatedBlockTable {
                offset,
                buffer_len: input.len(),
            });
        }

        Ok(Self {
            game_begin: blocks[0],
            game_end: blocks[1],
            body: &input[body_start..],
            legacy: false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_blocks(blocks: &[&[u8]], body: &[u8]) -> Vec<u8> {
        let mut out = vec![0x12, 0x32, 0x34, 0x11];
        out.extend((blocks.len() as u32).to_le_bytes());
        for block in blocks {
            out.extend((block.len() as u32).to_le_bytes());
            out.extend_from_slice(block);
        }
        out.extend([0u8; 8]);
        out.extend_from_slice(body);
        out
    }

    #[test]
    fn legacy() {
        let mut input = vec![0u8; 8];
        input.extend([0x78, 0xDA, 0x01, 0x02]);

        let container = Container::parse(&input).unwrap();

        assert!(container.legacy);
        assert_eq!(None, container.game_begin);
        assert_eq!(None, container.game_end);
        assert_eq!(&[0x78, 0xDA, 0x01, 0x02], container.body);
    }

    #[test]
    fn two_blocks() {
        let input = with_blocks(&[b"{}"], &[0xAB, 0xCD]);

        let container = Container::parse(&input).unwrap();

        assert!(!container.legacy);
        assert_eq!(Some(b"{}".as_slice()), container.game_begin);
        assert_eq!(None, container.game_end);
        assert_eq!(&[0xAB, 0xCD], container.body);
    }

    #[test]
    fn three_blocks() {
        let input = with_blocks(&[b"begin", b"end"], &[0xEE]);

        let container = Container::parse(&input).unwrap();

        assert_eq!(Some(b"begin".as_slice()), container.game_begin);
        assert_eq!(Some(b"end".as_slice()), container.game_end);
        assert_eq!(&[0xEE], container.body);
    }

    #[test]
    fn recompose() {
        // header, size-prefixed blocks, gap and body cover the input
        // exactly, with no gaps and no overlaps
        let input = with_blocks(&[b"begin", b"end"], &[0x01, 0x02, 0x03]);

        let container = Container::parse(&input).unwrap();

        let mut rebuilt = input[..8].to_vec();
        for block in [container.game_begin, container.game_end].into_iter().flatten() {
            rebuilt.extend((block.len() as u32).to_le_bytes());
            rebuilt.extend_from_slice(block);
        }
        rebuilt.extend([0u8; 8]);
        rebuilt.extend_from_slice(container.body);

        assert_eq!(input, rebuilt);
    }

    #[test]
    fn rejects_block_count() {
        let input = with_blocks(&[b"a", b"b", b"c"], &[]);

        assert!(matches!(
            Container::parse(&input),
            Err(ParseContainerError::UnexpectedBlockCount(3))
        ));

        let empty = with_blocks(&[], &[]);
        assert!(matches!(
            Container::parse(&empty),
            Err(ParseContainerError::UnexpectedBlockCount(0))
        ));
    }

    #[test]
    fn rejects_truncated_block() {
        let mut input = vec![0u8; 4];
        input.extend(1u32.to_le_bytes());
        input.extend(100u32.to_le_bytes());
        input.extend([0u8; 4]);

        assert!(matches!(
            Container::parse(&input),
            Err(ParseContainerError::TruncatedBlockTable { .. })
        ));
    }

    #[test]
    fn rejects_missing_gap() {
        let mut input = vec![0u8; 4];
        input.extend(1u32.to_le_bytes());
        input.extend(2u32.to_le_bytes());
        input.extend([0x7B, 0x7D]);
        input.extend([0u8; 4]);

        assert!(matches!(
            Container::parse(&input),
            Err(ParseContainerError::TruncatedBlockTable { .. })
        ));
    }

    #[test]
    fn rejects_short_input() {
        assert!(matches!(
            Container::parse(&[0x01, 0x02]),
            Err(ParseContainerError::MissingHeader)
        ));
    }
}
