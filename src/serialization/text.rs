use super::{DecodeError, EncodeError, Snapshot};
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;

impl Snapshot {
    /// Encode this snapshot as a single line of text: the binary envelope, zlib compressed, then
    /// base64 encoded.
    ///
    /// ```
    /// use hdrhist::{Histogram, Snapshot};
    ///
    /// let mut h = Histogram::<u64>::new_with_max(3_600_000, 3).unwrap();
    /// h.record(1500).unwrap();
    ///
    /// let line = h.export().unwrap().to_base64().unwrap();
    /// let restored: Histogram<u64> =
    ///     Histogram::import(&Snapshot::from_base64(&line).unwrap()).unwrap();
    /// assert_eq!(h, restored);
    /// ```
    pub fn to_base64(&self) -> Result<String, EncodeError> {
        let mut compressor = ZlibEncoder::new(Vec::new(), Compression::default());
        self.write_to(&mut compressor)?;
        let compressed = compressor.finish()?;

        Ok(base64::encode(&compressed))
    }

    /// Decode a snapshot produced by `to_base64`. Surrounding whitespace is ignored.
    pub fn from_base64(text: &str) -> Result<Snapshot, DecodeError> {
        let compressed = base64::decode(text.trim())?;
        let mut decompressor = ZlibDecoder::new(compressed.as_slice());
        Snapshot::read_from(&mut decompressor)
    }
}
