use std::io::Write;

use bzip2::write::BzEncoder;
use flate2::write::GzEncoder;

/// Default gzip compression level
pub const GZIP_DEFAULT_LEVEL: u8 = 6;
/// Default lz4 compression level
pub const LZ4_DEFAULT_LEVEL: u8 = 0;
/// Default zstd compression level
pub const ZSTD_DEFAULT_LEVEL: u8 = 0;

/// Compression format for record files
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Compression {
    Bzip2,
    /// gzip with the given level (0 to 9)
    Gzip(u8),
    /// lz4 with the given level (0 to 16)
    Lz4(u8),
    /// zstd with the given level (0 to 19)
    Zstd(u8),
}

impl Compression {
    /// Highest supported compression level, `None` if the level is fixed
    pub fn max_level(&self) -> Option<u8> {
        match self {
            Compression::Bzip2 => None,
            Compression::Gzip(_) => Some(9),
            Compression::Lz4(_) => Some(16),
            Compression::Zstd(_) => Some(19),
        }
    }

    /// Conventional file name extension
    pub fn extension(&self) -> &'static str {
        match self {
            Compression::Bzip2 => "bz2",
            Compression::Gzip(_) => "gz",
            Compression::Lz4(_) => "lz4",
            Compression::Zstd(_) => "zst",
        }
    }
}

/// Wrap `writer` such that everything written to it gets compressed
pub fn compress_writer<'a, W: 'a + Write>(
    writer: W,
    compression: Option<Compression>,
) -> Result<Box<dyn Write + 'a>, std::io::Error> {
    let Some(compression) = compression else {
        return Ok(Box::new(writer));
    };
    let out: Box<dyn Write + 'a> = match compression {
        Compression::Bzip2 => {
            Box::new(BzEncoder::new(writer, bzip2::Compression::best()))
        }
        Compression::Gzip(lvl) => Box::new(GzEncoder::new(
            writer,
            flate2::Compression::new(lvl.into()),
        )),
        Compression::Lz4(lvl) => Box::new(
            lz4::EncoderBuilder::new()
                .auto_flush(true)
                .level(lvl.into())
                .build(writer)?,
        ),
        Compression::Zstd(lvl) => {
            Box::new(zstd::Encoder::new(writer, lvl.into())?.auto_finish())
        }
    };
    Ok(out)
}

#[cfg(test)]
mod tests {
    use std::io::Read;

    use super::*;

    fn decompress(compression: Compression, data: &[u8]) -> Vec<u8> {
        let mut decoded = Vec::new();
        match compression {
            Compression::Bzip2 => {
                bzip2::read::BzDecoder::new(data).read_to_end(&mut decoded)
            }
            Compression::Gzip(_) => {
                flate2::read::GzDecoder::new(data).read_to_end(&mut decoded)
            }
            Compression::Lz4(_) => lz4::Decoder::new(data)
                .and_then(|mut d| d.read_to_end(&mut decoded)),
            Compression::Zstd(_) => zstd::Decoder::new(data)
                .and_then(|mut d| d.read_to_end(&mut decoded)),
        }
        .unwrap();
        decoded
    }

    #[test]
    fn decompressible() {
        let text = b"event: 0\njets: []\n";
        for compression in [
            Compression::Bzip2,
            Compression::Gzip(GZIP_DEFAULT_LEVEL),
            Compression::Lz4(LZ4_DEFAULT_LEVEL),
            Compression::Lz4(16),
            Compression::Zstd(ZSTD_DEFAULT_LEVEL),
        ] {
            let mut buf = Vec::new();
            {
                let mut out = compress_writer(&mut buf, Some(compression)).unwrap();
                out.write_all(text).unwrap();
            }
            assert_ne!(buf.as_slice(), text);
            let decoded = decompress(compression, &buf);
            assert_eq!(decoded.as_slice(), text, "{compression:?}");
        }
    }
}
