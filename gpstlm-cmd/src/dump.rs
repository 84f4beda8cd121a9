use std::io::{Read, Write};

use anyhow::{Context, Result};
use gpstlm::stream::FrameReaderIter;
use gpstlm::{Message, PacketHeader};
use serde::Serialize;
use tracing::{debug, info};

use crate::filter::ApidFilter;

#[derive(Serialize)]
struct Record<'a> {
    header: &'a PacketHeader,
    message: &'a Message,
}

/// Write one JSON object per decodable frame. Frames that do not decode are logged and skipped.
pub fn dump<R, W>(frames: FrameReaderIter<R>, mut writer: W, apids: &ApidFilter) -> Result<()>
where
    R: Read,
    W: Write,
{
    let mut written = 0;
    let mut skipped = 0;
    for frame in frames {
        let frame = frame.context("reading frames")?;
        if !apids.accept(frame.header.apid) {
            continue;
        }
        let message = match frame
            .header
            .packet_id()
            .and_then(|id| Message::decode(id, &frame.payload))
        {
            Ok(message) => message,
            Err(err) => {
                debug!(header = ?frame.header, %err, "skipping frame");
                skipped += 1;
                continue;
            }
        };
        let record = Record {
            header: &frame.header,
            message: &message,
        };
        serde_json::to_writer(&mut writer, &record).context("serializing to json")?;
        writer.write_all(b"\n").context("writing output")?;
        written += 1;
    }
    writer.flush().context("flushing output")?;
    info!(written, skipped, "dumped");

    Ok(())
}
