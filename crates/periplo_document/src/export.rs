use thiserror::Error;

use periplo_staticmap::MapArtifact;
use periplo_staticmap::builder::MapImage;
use periplo_staticmap::sketch::{DrawOp, VectorSketch};

use crate::blocks::{Block, ItineraryDocument, Positioned};

const DEFAULT_FILE_STEM: &str = "itinerario-supervision";

/// Page-based renderer primitives the hosting application provides (a pdf
/// writer, in practice). The composer never touches files itself.
pub trait PageSink {
    fn add_page(&mut self) -> anyhow::Result<()>;

    fn text(&mut self, x: f64, y: f64, text: &str) -> anyhow::Result<()>;

    fn image(&mut self, x: f64, y: f64, width: f64, height: f64, image: &MapImage)
    -> anyhow::Result<()>;

    fn rect(&mut self, x: f64, y: f64, width: f64, height: f64) -> anyhow::Result<()>;

    fn line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64) -> anyhow::Result<()>;
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("could not produce the document: {0}")]
    Sink(#[from] anyhow::Error),
}

/// Replays a composed document against the sink. Aborts on the first sink
/// failure; a partially written document is never considered valid.
pub fn export(document: &ItineraryDocument, sink: &mut impl PageSink) -> Result<(), ExportError> {
    let line_height = document.spec.line_height;

    for page in &document.pages {
        sink.add_page()?;
        for positioned in &page.blocks {
            render_block(positioned, line_height, sink)?;
        }
    }

    Ok(())
}

pub fn document_file_name(route_name: Option<&str>) -> String {
    let stem = route_name
        .map(sanitize_stem)
        .filter(|stem| !stem.is_empty())
        .unwrap_or_else(|| DEFAULT_FILE_STEM.to_string());

    format!("{stem}.pdf")
}

fn sanitize_stem(name: &str) -> String {
    let mut stem = String::with_capacity(name.len());
    let mut last_dash = true;

    for c in name.chars() {
        if c.is_alphanumeric() {
            stem.extend(c.to_lowercase());
            last_dash = false;
        } else if !last_dash {
            stem.push('-');
            last_dash = true;
        }
    }

    stem.trim_end_matches('-').to_string()
}

fn render_block(
    positioned: &Positioned,
    line_height: f64,
    sink: &mut impl PageSink,
) -> Result<(), ExportError> {
    let Positioned {
        x,
        y,
        width,
        height,
        block,
    } = positioned;
    let (x, y, width, height) = (*x, *y, *width, *height);

    match block {
        Block::PageHeader { title, subtitle } => {
            sink.text(x, y, title)?;
            sink.text(x, y + line_height, subtitle)?;
            sink.line(x, y + height - 1.0, x + width, y + height - 1.0)?;
        }
        Block::Banner {
            route_name,
            date,
            mode_label,
            supervisor,
        } => {
            sink.rect(x, y, width, height)?;
            sink.text(x + 2.0, y + line_height, route_name)?;
            let mut detail = format!("{date} · {mode_label}");
            if let Some(supervisor) = supervisor {
                detail.push_str(" · ");
                detail.push_str(supervisor);
            }
            sink.text(x + 2.0, y + 2.0 * line_height, &detail)?;
        }
        Block::MetricCell { label, value } => {
            sink.rect(x, y, width, height)?;
            sink.text(x + 2.0, y + line_height, label)?;
            sink.text(x + 2.0, y + 2.0 * line_height, value)?;
        }
        Block::Map { artifact } => match artifact {
            MapArtifact::Image(image) => sink.image(x, y, width, height, image)?,
            MapArtifact::Sketch(sketch) => render_sketch(sketch, x, y, width, sink)?,
            MapArtifact::Placeholder(placeholder) => {
                sink.rect(x, y, width, height)?;
                sink.text(x + 2.0, y + height / 2.0, &placeholder.caption)?;
            }
        },
        Block::LegCard { title, lines } => {
            sink.rect(x, y, width, height)?;
            sink.text(x + 2.0, y + line_height, title)?;
            for (index, line) in lines.iter().enumerate() {
                sink.text(x + 2.0, y + (index as f64 + 2.0) * line_height, line)?;
            }
        }
        Block::SectionTitle { text } => {
            sink.text(x, y + line_height, text)?;
        }
        Block::RosterEntry { stop_name, lines } => {
            sink.text(x, y + line_height, stop_name)?;
            for (index, line) in lines.iter().enumerate() {
                sink.text(x + 4.0, y + (index as f64 + 2.0) * line_height, line)?;
            }
        }
        Block::SignatureLine { label } | Block::SupervisorSignature { label } => {
            sink.line(x, y + height - line_height, x + width, y + height - line_height)?;
            sink.text(x, y + height, label)?;
        }
    }

    Ok(())
}

/// The sketch has its own square coordinate space; scale it into the
/// block's footprint.
fn render_sketch(
    sketch: &VectorSketch,
    x: f64,
    y: f64,
    width: f64,
    sink: &mut impl PageSink,
) -> anyhow::Result<()> {
    let scale = if sketch.size > 0.0 {
        width / sketch.size
    } else {
        1.0
    };

    sink.rect(x, y, width, width)?;

    for op in &sketch.ops {
        match op {
            DrawOp::Segment { from, to } => {
                sink.line(
                    x + from.0 * scale,
                    y + from.1 * scale,
                    x + to.0 * scale,
                    y + to.1 * scale,
                )?;
            }
            DrawOp::Marker { at, radius, .. } => {
                let r = radius * scale;
                sink.rect(x + at.0 * scale - r, y + at.1 * scale - r, 2.0 * r, 2.0 * r)?;
            }
        }
    }

    Ok(())
}
