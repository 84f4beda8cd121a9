//! Frame decoding over a byte stream.
//!
//! [FrameDecoder] owns the receive buffer for a single connection and applies the
//! resynchronization policy on top of [decode_stream]. [read_frames] drives a decoder from any
//! [Read], e.g., a serial port or a recorded log, and [FrameWriter] produces such a log.
use std::io::{ErrorKind, Read, Write};

use tracing::{debug, trace, warn};

use crate::catalogue::MAX_PAYLOAD_LEN;
use crate::packet::{decode_stream, Frame, PacketHeader};
use crate::{Error, Result};

/// Stateful, non-blocking frame decoder for one connection.
///
/// Bytes are appended with [FrameDecoder::push] and frames are pulled with
/// [FrameDecoder::next_frame]. When a header cannot be trusted (length out of bounds, or a
/// known packet id with the wrong length) the decoder discards one byte at a time until it
/// finds a header naming a catalogue packet id with its exact length. If that takes more than
/// the resync limit the decoder fails permanently with [Error::ResyncExhausted].
///
/// # Example
/// ```
/// use gpstlm::catalogue::{CommandAck, Payload};
/// use gpstlm::packet::encode_frame;
/// use gpstlm::stream::FrameDecoder;
///
/// let dat = encode_frame(CommandAck::ID.apid(), 0, &CommandAck::default().encode()).unwrap();
/// let mut decoder = FrameDecoder::default();
/// decoder.push(&dat[..4]);
/// assert!(decoder.next_frame().unwrap().is_none());
/// decoder.push(&dat[4..]);
/// assert!(decoder.next_frame().unwrap().is_some());
/// ```
#[derive(Debug)]
pub struct FrameDecoder {
    buf: Vec<u8>,
    max_payload: usize,
    resync_limit: usize,
    length_check: bool,

    // True while hunting for a trustworthy header after a desync
    syncing: bool,
    // Bytes discarded during the current resync
    resync_discarded: usize,
    // Bytes discarded over the lifetime of the decoder
    discarded: usize,
    failed: bool,
}

impl Default for FrameDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameDecoder {
    /// Default maximum number of bytes discarded while resynchronizing.
    pub const DEFAULT_RESYNC_LIMIT: usize = 4096;

    #[must_use]
    pub fn new() -> Self {
        FrameDecoder {
            buf: Vec::new(),
            max_payload: MAX_PAYLOAD_LEN,
            resync_limit: Self::DEFAULT_RESYNC_LIMIT,
            length_check: true,
            syncing: false,
            resync_discarded: 0,
            discarded: 0,
            failed: false,
        }
    }

    /// Largest header payload length considered sane.
    #[must_use]
    pub fn with_max_payload(mut self, max: usize) -> Self {
        self.max_payload = max;
        self
    }

    /// Bytes that may be discarded while resynchronizing before giving up.
    #[must_use]
    pub fn with_resync_limit(mut self, limit: usize) -> Self {
        self.resync_limit = limit;
        self
    }

    /// Whether a known packet id with a non-catalogue length is treated as a desync.
    #[must_use]
    pub fn with_length_check(mut self, check: bool) -> Self {
        self.length_check = check;
        self
    }

    /// Append received bytes.
    pub fn push(&mut self, dat: &[u8]) {
        self.buf.extend_from_slice(dat);
    }

    /// Bytes buffered but not yet consumed.
    #[must_use]
    pub fn buffered(&self) -> usize {
        self.buf.len()
    }

    /// Total bytes discarded while resynchronizing.
    #[must_use]
    pub fn discarded(&self) -> usize {
        self.discarded
    }

    #[must_use]
    pub fn is_syncing(&self) -> bool {
        self.syncing
    }

    /// Pull the next complete frame, if any.
    ///
    /// Returns `Ok(None)` when more bytes are needed.
    ///
    /// # Errors
    /// [Error::ResyncExhausted] once resynchronization has discarded more than the configured
    /// limit. The decoder stays failed after that.
    pub fn next_frame(&mut self) -> Result<Option<Frame>> {
        if self.failed {
            return Err(Error::ResyncExhausted {
                discarded: self.resync_discarded,
            });
        }
        loop {
            match self.check_header().and_then(|()| decode_stream(&self.buf, self.max_payload)) {
                Ok(None) => return Ok(None),
                Ok(Some((frame, consumed))) => {
                    self.buf.drain(..consumed);
                    if self.syncing {
                        debug!(discarded = self.resync_discarded, header = ?frame.header, "resynchronized");
                        self.syncing = false;
                        self.resync_discarded = 0;
                    }
                    trace!(header = ?frame.header, "frame");
                    return Ok(Some(frame));
                }
                Err(err) if err.is_desync() => {
                    if !self.syncing {
                        warn!(%err, "lost sync");
                        self.syncing = true;
                    }
                    if self.resync_discarded >= self.resync_limit {
                        warn!(discarded = self.resync_discarded, "resync limit reached");
                        self.failed = true;
                        return Err(Error::ResyncExhausted {
                            discarded: self.resync_discarded,
                        });
                    }
                    self.buf.drain(..1);
                    self.resync_discarded += 1;
                    self.discarded += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }

    /// Validate the buffered header, if there is one, before waiting on its payload.
    fn check_header(&self) -> Result<()> {
        let Ok(header) = PacketHeader::decode(&self.buf) else {
            return Ok(());
        };
        let length = header.payload_length as usize;
        if length > self.max_payload {
            return Err(Error::Desync {
                length,
                max: self.max_payload,
            });
        }
        match header.packet_id() {
            Ok(id) if (self.length_check || self.syncing) && id.payload_len() != length => {
                Err(Error::PayloadSizeMismatch {
                    id,
                    expected: id.payload_len(),
                    actual: length,
                })
            }
            // Only catalogue ids are trusted to re-establish sync
            Err(_) if self.syncing => Err(Error::Desync {
                length,
                max: self.max_payload,
            }),
            _ => Ok(()),
        }
    }
}

/// Iterator over the frames read from a [Read].
pub struct FrameReaderIter<R>
where
    R: Read,
{
    reader: R,
    decoder: FrameDecoder,
    chunk: Vec<u8>,
    done: bool,
}

impl<R> FrameReaderIter<R>
where
    R: Read,
{
    const CHUNK_SIZE: usize = 4096;

    pub fn new(reader: R, decoder: FrameDecoder) -> Self {
        FrameReaderIter {
            reader,
            decoder,
            chunk: vec![0u8; Self::CHUNK_SIZE],
            done: false,
        }
    }

    /// The underlying decoder, e.g., to check how many bytes were discarded.
    pub fn decoder(&self) -> &FrameDecoder {
        &self.decoder
    }
}

impl<R> Iterator for FrameReaderIter<R>
where
    R: Read,
{
    type Item = Result<Frame>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        loop {
            match self.decoder.next_frame() {
                Ok(Some(frame)) => return Some(Ok(frame)),
                Ok(None) => {}
                Err(err) => {
                    self.done = true;
                    return Some(Err(err));
                }
            }

            let n = match self.reader.read(&mut self.chunk) {
                Ok(n) => n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => {
                    self.done = true;
                    return Some(Err(Error::Io(err)));
                }
            };
            if n == 0 {
                if self.decoder.buffered() > 0 {
                    debug!(
                        bytes = self.decoder.buffered(),
                        "dropping incomplete frame at end of stream"
                    );
                }
                self.done = true;
                return None;
            }
            self.decoder.push(&self.chunk[..n]);
        }
    }
}

/// Return an iterator providing [Frame]s read from a byte stream using a default
/// [FrameDecoder].
///
/// # Examples
/// ```
/// use gpstlm::stream::read_frames;
///
/// let dat: &[u8] = &[
///     // header: command ack, sequence 1, 8 bytes
///     0x0, 0xb, 0x0, 0x1, 0x0, 0x8,
///     // command id 7, command count 3
///     0x0, 0x0, 0x0, 0x7, 0x0, 0x0, 0x0, 0x3,
/// ];
///
/// read_frames(dat).for_each(|zult| {
///     let frame = zult.unwrap();
///     assert_eq!(frame.header.apid, 11);
/// });
/// ```
pub fn read_frames<R>(reader: R) -> FrameReaderIter<R>
where
    R: Read,
{
    FrameReaderIter::new(reader, FrameDecoder::default())
}

/// Appends frames verbatim to a writer. A log is simply the concatenation of frames.
pub struct FrameWriter<W>
where
    W: Write,
{
    writer: W,
    count: usize,
}

impl<W> FrameWriter<W>
where
    W: Write,
{
    pub fn new(writer: W) -> Self {
        FrameWriter { writer, count: 0 }
    }

    /// Write already-encoded frame bytes.
    ///
    /// # Errors
    /// Any ``std::io::Error`` writing
    pub fn write_bytes(&mut self, dat: &[u8]) -> Result<()> {
        self.writer.write_all(dat)?;
        self.count += 1;
        Ok(())
    }

    /// # Errors
    /// Any ``std::io::Error`` writing
    pub fn write_frame(&mut self, frame: &Frame) -> Result<()> {
        self.write_bytes(&frame.encode())
    }

    /// Number of frames written.
    #[must_use]
    pub fn count(&self) -> usize {
        self.count
    }

    /// # Errors
    /// Any ``std::io::Error`` flushing
    pub fn flush(&mut self) -> Result<()> {
        Ok(self.writer.flush()?)
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalogue::{Clock, CommandAck, PacketId, Payload};
    use crate::packet::encode_frame;

    fn ack_frame(seq: u16) -> Vec<u8> {
        let ack = CommandAck {
            command_id: 7,
            command_count: 3,
        };
        encode_frame(CommandAck::ID.apid(), seq, &ack.encode()).unwrap()
    }

    #[test]
    fn incremental_feed() {
        let dat = ack_frame(9);
        let mut decoder = FrameDecoder::default();
        for (i, b) in dat.iter().enumerate() {
            decoder.push(&[*b]);
            let zult = decoder.next_frame().unwrap();
            if i < dat.len() - 1 {
                assert!(zult.is_none(), "unexpected frame at byte {i}");
            } else {
                let frame = zult.unwrap();
                assert_eq!(frame.header.sequence_count, 9);
                assert_eq!(frame.wire_len(), dat.len());
            }
        }
        assert_eq!(decoder.buffered(), 0);
    }

    #[test]
    fn back_to_back_frames() {
        let mut decoder = FrameDecoder::default();
        decoder.push(&ack_frame(1));
        decoder.push(&ack_frame(2));

        assert_eq!(decoder.next_frame().unwrap().unwrap().header.sequence_count, 1);
        assert_eq!(decoder.next_frame().unwrap().unwrap().header.sequence_count, 2);
        assert!(decoder.next_frame().unwrap().is_none());
        assert_eq!(decoder.buffered(), 0);
    }

    #[test]
    fn resync_after_bad_length() {
        let mut decoder = FrameDecoder::default();
        // header claiming an impossible length, then 10 bytes of junk
        decoder.push(&[0x0, 0x4, 0x0, 0x1, 0xff, 0xff]);
        decoder.push(&[0x0; 10]);
        decoder.push(&ack_frame(2));

        let frame = decoder.next_frame().unwrap().unwrap();
        assert_eq!(frame.header.sequence_count, 2);
        assert_eq!(decoder.discarded(), 16);
        assert!(!decoder.is_syncing());
    }

    #[test]
    fn resync_after_wrong_catalogue_length() {
        let mut decoder = FrameDecoder::default();
        // clock frame with the length of a command ack
        decoder.push(&encode_frame(Clock::ID.apid(), 1, &[0u8; 8]).unwrap());
        decoder.push(&ack_frame(2));

        let frame = decoder.next_frame().unwrap().unwrap();
        assert_eq!(frame.header.packet_id().unwrap(), PacketId::CommandAck);
        assert_eq!(decoder.discarded(), 14);
    }

    #[test]
    fn resync_limit() {
        let mut decoder = FrameDecoder::default().with_resync_limit(8);
        decoder.push(&[0x0, 0x4, 0x0, 0x1, 0xff, 0xff]);
        decoder.push(&[0x0; 32]);

        assert!(matches!(
            decoder.next_frame(),
            Err(Error::ResyncExhausted { discarded: 8 })
        ));
        // stays failed, even with good data
        decoder.push(&ack_frame(1));
        assert!(decoder.next_frame().is_err());
    }

    #[test]
    fn unknown_id_is_consumed() {
        let mut decoder = FrameDecoder::default();
        decoder.push(&encode_frame(0x300, 1, &[1, 2, 3, 4]).unwrap());
        decoder.push(&ack_frame(2));

        let frame = decoder.next_frame().unwrap().unwrap();
        assert_eq!(frame.header.apid, 0x300);
        assert_eq!(frame.payload, [1, 2, 3, 4]);
        let frame = decoder.next_frame().unwrap().unwrap();
        assert_eq!(frame.header.sequence_count, 2);
        assert_eq!(decoder.discarded(), 0);
    }

    #[test]
    fn length_check_disabled() {
        let mut decoder = FrameDecoder::default().with_length_check(false);
        decoder.push(&encode_frame(Clock::ID.apid(), 1, &[0u8; 8]).unwrap());
        let frame = decoder.next_frame().unwrap().unwrap();
        assert_eq!(frame.payload.len(), 8);
    }

    #[test]
    fn reader_drops_truncated_tail() {
        let mut dat = ack_frame(1);
        dat.extend_from_slice(&ack_frame(2)[..10]);

        let frames: Vec<Frame> = read_frames(&dat[..]).map(Result::unwrap).collect();
        assert_eq!(frames.len(), 1);
    }

    #[test]
    fn writer_roundtrip() {
        let mut writer = FrameWriter::new(Vec::new());
        writer.write_bytes(&ack_frame(1)).unwrap();
        let frame = read_frames(&ack_frame(2)[..]).next().unwrap().unwrap();
        writer.write_frame(&frame).unwrap();
        assert_eq!(writer.count(), 2);

        let log = writer.into_inner();
        let frames: Vec<Frame> = read_frames(&log[..]).map(Result::unwrap).collect();
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[1], frame);
    }
}
