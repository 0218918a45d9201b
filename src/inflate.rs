use std::io::Read;

#[derive(Debug)]
pub enum InflateError {
    Inflate(std::io::Error),
}

/// Inflates the zlib stream at the start of `body` into a fresh buffer.
///
/// The body may carry trailing bytes after the end of the stream (the
/// encryption pads to its block size), those are ignored. A stream that
/// ends without reaching its zlib end marker is an error.
pub fn inflate(body: &[u8]) -> Result<Vec<u8>, InflateError> {
    let mut out = Vec::new();
    flate2::read::ZlibDecoder::new(body)
        .read_to_end(&mut out)
        .map_err(InflateError::Inflate)?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    use flate2::write::ZlibEncoder;
    use flate2::Compression;
    use std::io::Write;

    fn deflate(input: &[u8]) -> Vec<u8> {
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(input).unwrap();
        encoder.finish().unwrap()
    }

    #[test]
    fn roundtrip() {
        let input = b"replay body bytes".repeat(100);

        let inflated = inflate(&deflate(&input)).unwrap();

        assert_eq!(input, inflated);
    }

    #[test]
    fn trailing_padding_ignored() {
        let input = vec![0x42u8; 256];

        let mut body = deflate(&input);
        body.extend([0u8; 7]);

        assert_eq!(input, inflate(&body).unwrap());
    }

    #[test]
    fn truncated_stream() {
        let body = deflate(&[0x01u8; 512]);

        assert!(inflate(&body[..body.len() / 2]).is_err());
    }

    #[test]
    fn garbage() {
        assert!(inflate(&[0x00, 0x01, 0x02, 0x03]).is_err());
    }
}
