use std::io::{Read, Write};
use std::path::Path;

use anyhow::{Context, Result};
use gpstlm::catalogue::{Apid, PacketId};
use gpstlm::stream::FrameReaderIter;
use gpstlm::Summary;
use handlebars::handlebars_helper;
use serde::Serialize;
use tracing::warn;

/// Output format for `gpstlm info`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Format {
    Json,
    Text,
}

#[derive(Debug, Clone, Serialize)]
struct Row {
    apid: Apid,
    name: String,
    count: usize,
    bytes: usize,
}

#[derive(Debug, Clone, Serialize)]
struct Info {
    filename: String,
    summary: Summary,
    /// Bytes thrown away while resynchronizing
    discarded: usize,
    /// Set if decoding stopped early
    error: Option<String>,
    rows: Vec<Row>,
}

fn summarize<R: Read>(fpath: &Path, mut frames: FrameReaderIter<R>) -> Info {
    let mut summary = Summary::default();
    let mut error = None;
    for zult in frames.by_ref() {
        match zult {
            Ok(frame) => summary.add(&frame),
            Err(err) => {
                warn!(%err, "decoding stopped");
                error = Some(err.to_string());
            }
        }
    }

    let rows = summary
        .apids
        .iter()
        .map(|(apid, s)| Row {
            apid: *apid,
            name: PacketId::try_from(*apid)
                .map_or_else(|_| "unknown".to_string(), |id| format!("{id:?}")),
            count: s.count,
            bytes: s.bytes,
        })
        .collect();

    Info {
        filename: fpath.to_string_lossy().to_string(),
        summary,
        discarded: frames.decoder().discarded(),
        error,
        rows,
    }
}

/// Summarize the log at `fpath` and write the report to `out`.
pub fn info<R, W>(fpath: &Path, frames: FrameReaderIter<R>, format: Format, mut out: W) -> Result<()>
where
    R: Read,
    W: Write,
{
    let info = summarize(fpath, frames);
    if format == Format::Json {
        serde_json::to_writer_pretty(&mut out, &info).context("serializing to json")?;
        out.write_all(b"\n").context("writing output")?;
    } else {
        let text = render_text(&info).context("rendering info")?;
        out.write_all(text.as_bytes()).context("writing output")?;
    }
    out.flush().context("flushing output")
}

fn render_text(info: &Info) -> Result<String> {
    handlebars_helper!(left_pad: |num: u64, v: Json| {
        let v = match v {
            serde_json::Value::String(s) => s.to_owned(),
            serde_json::Value::Null => String::new(),
            _ => v.to_string()
        };
        let num = usize::try_from(num).unwrap_or(0).max(v.len());
        format!("{v:>num$}")
    });
    handlebars_helper!(right_pad: |num: u64, v: str| {
        let num = usize::try_from(num).unwrap_or(0);
        format!("{v:<num$}")
    });
    let mut hb = handlebars::Handlebars::new();
    hb.register_helper("lpad", Box::new(left_pad));
    hb.register_helper("rpad", Box::new(right_pad));
    hb.register_template_string("info", TEXT_TEMPLATE)
        .context("registering template")?;

    hb.render("info", &info).context("rendering text")
}

const TEXT_TEMPLATE: &str = r"{{ filename }}
===============================================================
Frames:    {{ summary.count }}
Bytes:     {{ summary.bytes }}
Missing:   {{ summary.missing }}
Unknown:   {{ summary.unknown }}
Rejected:  {{ summary.rejected }}
Discarded: {{ discarded }}
{{ #if error }}Error:     {{ error }}
{{ /if }}---------------------------------------------------------------
  APID  Name                       Count           Bytes
---------------------------------------------------------------
{{ #each rows }}{{ lpad 6 apid }}  {{ rpad 20 name }}{{ lpad 12 count }}  {{ lpad 14 bytes }}
{{/each }}
";
