use std::collections::BTreeMap;

use crate::catalogue::{Apid, PacketId};
use crate::packet::{Frame, PacketHeader};

/// Calculate the number of missing sequence counts.
///
/// `cur` is the current sequence count. `last` is the sequence count seen before `cur`.
/// Counts wrap modulo 2^16, so `last == cur` means a full wrap was missed.
#[must_use]
pub fn missing_packets(cur: u16, last: u16) -> u16 {
    cur.wrapping_sub(last).wrapping_sub(1)
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ApidSummary {
    pub count: usize,
    pub bytes: usize,
}

/// Tracks stats on a frame stream.
///
/// The sequence count belongs to the sender rather than to a packet id, so gaps are measured
/// across all frames in arrival order.
///
/// # Example
/// ```
/// use gpstlm::catalogue::{CommandAck, Payload};
/// use gpstlm::packet::encode_frame;
/// use gpstlm::stream::read_frames;
/// use gpstlm::Summary;
///
/// let mut dat = encode_frame(CommandAck::ID.apid(), 1, &CommandAck::default().encode()).unwrap();
/// dat.extend(encode_frame(CommandAck::ID.apid(), 3, &CommandAck::default().encode()).unwrap());
///
/// let mut summary = Summary::default();
/// read_frames(&dat[..]).filter_map(Result::ok).for_each(|f| summary.add(&f));
/// assert_eq!(summary.count, 2);
/// assert_eq!(summary.missing, 1);
/// ```
#[derive(Debug, Default, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Summary {
    /// Frames seen
    pub count: usize,
    /// Wire bytes of all frames seen, headers included
    pub bytes: usize,
    /// Sequence counts skipped
    pub missing: usize,
    /// Frames whose packet id is not in the catalogue
    pub unknown: usize,
    /// Frames whose length did not match the catalogue
    pub rejected: usize,
    pub apids: BTreeMap<Apid, ApidSummary>,

    #[cfg_attr(feature = "serde", serde(skip))]
    last_header: Option<PacketHeader>,
}

impl Summary {
    pub fn add(&mut self, frame: &Frame) {
        let hdr = frame.header;
        self.count += 1;
        self.bytes += frame.wire_len();

        let apid = self.apids.entry(hdr.apid).or_default();
        apid.count += 1;
        apid.bytes += frame.wire_len();

        match PacketId::try_from(hdr.apid) {
            Ok(id) if id.payload_len() != frame.payload.len() => self.rejected += 1,
            Ok(_) => {}
            Err(_) => self.unknown += 1,
        }

        if let Some(last) = self.last_header {
            self.missing += missing_packets(hdr.sequence_count, last.sequence_count) as usize;
        }
        self.last_header = Some(hdr);
    }

    /// Sequence count of the most recent frame.
    #[must_use]
    pub fn last_sequence_count(&self) -> Option<u16> {
        self.last_header.map(|h| h.sequence_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalogue::{CommandAck, Payload};
    use crate::packet::encode_frame;

    fn frame(apid: Apid, seq: u16, payload: &[u8]) -> Frame {
        Frame {
            header: PacketHeader {
                apid,
                sequence_count: seq,
                payload_length: payload.len() as u16,
            },
            payload: payload.to_vec(),
        }
    }

    #[test]
    fn test_missing_packets() {
        assert_eq!(missing_packets(5, 4), 0);
        assert_eq!(missing_packets(5, 3), 1);
        assert_eq!(missing_packets(0, u16::MAX), 0);
        assert_eq!(missing_packets(0, u16::MAX - 1), 1);
        assert_eq!(missing_packets(0, 0), u16::MAX);
    }

    #[test]
    fn summary() {
        let ack = CommandAck::default().encode();
        let mut dat = encode_frame(CommandAck::ID.apid(), 1, &ack).unwrap();
        dat.extend(encode_frame(CommandAck::ID.apid(), 2, &ack).unwrap());

        let mut summary = Summary::default();
        summary.add(&frame(CommandAck::ID.apid(), 1, &ack));
        summary.add(&frame(CommandAck::ID.apid(), 2, &ack));

        assert_eq!(summary.count, 2);
        assert_eq!(summary.bytes, dat.len());
        assert_eq!(summary.missing, 0);
        assert_eq!(summary.apids.len(), 1);
        assert_eq!(summary.apids[&11].count, 2);
        assert_eq!(summary.apids[&11].bytes, 28);
        assert_eq!(summary.last_sequence_count(), Some(2));
    }

    #[test]
    fn summary_counts_gaps_across_ids() {
        let mut summary = Summary::default();
        summary.add(&frame(CommandAck::ID.apid(), u16::MAX, &[0; 8]));
        // different id, sequence wrapped, one frame missing in between
        summary.add(&frame(0x200, 1, &[0; 4]));
        // wrong length for a known id
        summary.add(&frame(CommandAck::ID.apid(), 2, &[0; 4]));

        assert_eq!(summary.count, 3);
        assert_eq!(summary.missing, 1);
        assert_eq!(summary.unknown, 1);
        assert_eq!(summary.rejected, 1);
        assert_eq!(summary.apids.len(), 2);
    }
}
