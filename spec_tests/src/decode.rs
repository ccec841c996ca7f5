use snap::raw::{Decoder, Encoder};

/// Decompresses a raw (unframed) snappy block, the encoding of every `.ssz_snappy` fixture.
pub fn snappy_decode(bytes: &[u8]) -> Result<Vec<u8>, snap::Error> {
    Decoder::new().decompress_vec(bytes)
}

pub fn snappy_encode(bytes: &[u8]) -> Result<Vec<u8>, snap::Error> {
    Encoder::new().compress_vec(bytes)
}
