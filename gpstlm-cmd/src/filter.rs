use std::collections::HashSet;
use std::io::{Read, Write};

use anyhow::{bail, Context, Result};
use gpstlm::catalogue::Apid;
use gpstlm::stream::{FrameReaderIter, FrameWriter};
use tracing::{info, trace};

/// Selects frames by packet id. Values are first included, then excluded.
#[derive(Debug, Default, Clone)]
pub struct ApidFilter {
    include: HashSet<Apid>,
    exclude: HashSet<Apid>,
}

impl ApidFilter {
    pub fn new(include: &[Apid], exclude: &[Apid]) -> Self {
        ApidFilter {
            include: include.iter().copied().collect(),
            exclude: exclude.iter().copied().collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.include.is_empty() && self.exclude.is_empty()
    }

    pub fn accept(&self, apid: Apid) -> bool {
        if !self.include.is_empty() && !self.include.contains(&apid) {
            trace!(apid, "skip not included");
            return false;
        }
        if self.exclude.contains(&apid) {
            trace!(apid, "skip excluded");
            return false;
        }
        true
    }
}

pub fn filter<R, W>(frames: FrameReaderIter<R>, writer: W, apids: &ApidFilter) -> Result<()>
where
    R: Read,
    W: Write,
{
    if apids.is_empty() {
        bail!("no filters specified");
    }

    let mut writer = FrameWriter::new(writer);
    let mut total = 0;
    for frame in frames {
        let frame = frame.context("reading frames")?;
        total += 1;
        if !apids.accept(frame.header.apid) {
            continue;
        }
        writer.write_frame(&frame).context("writing frame")?;
    }
    writer.flush().context("flushing output")?;
    info!(total, written = writer.count(), "filtered");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use gpstlm::catalogue::{Clock, CommandAck};
    use gpstlm::stream::read_frames;
    use gpstlm::Producer;

    #[test]
    fn filter_by_apid() {
        let producer = Producer::default();
        let mut dat = producer.send(&Clock::default()).unwrap();
        dat.extend(producer.send(&CommandAck::default()).unwrap());
        dat.extend(producer.send(&Clock::default()).unwrap());

        let mut out = Vec::new();
        filter(read_frames(&dat[..]), &mut out, &ApidFilter::new(&[4], &[])).unwrap();

        let seqs: Vec<u16> = read_frames(&out[..])
            .map(|f| f.unwrap().header.sequence_count)
            .collect();
        assert_eq!(seqs, [0, 2]);
    }

    #[test]
    fn include_then_exclude() {
        let apids = ApidFilter::new(&[1, 2, 3], &[2]);
        assert!(apids.accept(1));
        assert!(!apids.accept(2));
        assert!(!apids.accept(4));
        assert!(ApidFilter::new(&[], &[2]).accept(4));
    }

    #[test]
    fn requires_a_filter() {
        let dat: Vec<u8> = Vec::new();
        assert!(filter(read_frames(&dat[..]), Vec::new(), &ApidFilter::default()).is_err());
    }
}
