use std::error::Error;
use std::io::{self, Read, Seek, Write};

use pdf_text_core::{page_text, Document, TextElement, TextRun};

/// Turns the core's positioned runs into plain text.
///
/// Runs between two separators are merged into one; each implementation
/// then decides how a page's merged runs become lines.
pub trait TextProcessor {
    fn write_page<W: Write>(&self, out: &mut W, runs: &[TextRun]) -> io::Result<()>;

    fn process<R: Read + Seek, W: Write>(
        &self,
        doc: &mut Document<R>,
        out: &mut W,
    ) -> Result<(), Box<dyn Error>> {
        let pages = doc.pages()?;
        for page in &pages {
            let mut elements = page_text(doc, page)?;
            let mut runs: Vec<TextRun> = Vec::new();
            let mut current: Option<TextRun> = None;
            while let Some(element) = elements.next_element()? {
                match element {
                    TextElement::NewPage => {}
                    TextElement::Text(run) => match &mut current {
                        Some(merged) => {
                            merged.s.push_str(&run.s);
                            merged.width = run.x + run.width - merged.x;
                        }
                        None => current = Some(run),
                    },
                    TextElement::NewText => {
                        if let Some(merged) = current.take() {
                            runs.push(merged);
                        }
                    }
                }
            }
            if let Some(merged) = current.take() {
                runs.push(merged);
            }
            if !runs.is_empty() {
                self.write_page(out, &runs)?;
                out.write_all(b"\x0c")?;
            }
        }
        Ok(())
    }
}

/// Reconstructs the page layout by quantising run positions to a character
/// grid derived from the dominant font size and space width.
pub struct LayoutProcessor;

impl TextProcessor for LayoutProcessor {
    fn write_page<W: Write>(&self, out: &mut W, runs: &[TextRun]) -> io::Result<()> {
        let font_size = dominant_or_fallback(
            runs.iter().map(|r| r.font_size),
        );
        let font_space_width = dominant_or_fallback(
            runs.iter().map(|r| r.font_space_width * r.font_size),
        ) / 1000.0;

        let mut ordered: Vec<&TextRun> = runs.iter().collect();
        ordered.sort_by(|a, b| {
            (-a.y, a.x)
                .partial_cmp(&(-b.y, b.x))
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let mut last_cx: i64 = 0;
        let mut last_cy: i64 = 0;
        let mut last_ty: f64 = 0.0;
        for run in ordered {
            let cy = (run.y / font_size) as i64;
            let mut line_steps = last_cy - cy;
            // Tightly leaded lines count as a single step.
            if line_steps > 1 && (last_ty - run.y) < 1.5 * font_size {
                line_steps = 1;
            }
            last_cy = cy;
            last_ty = run.y;

            let cx = if font_space_width > 0.0 {
                (run.x / font_space_width) as i64
            } else {
                0
            };
            if line_steps != 0 {
                last_cx = 0;
            }
            let column_steps = cx - last_cx;
            for _ in 0..line_steps.max(0) {
                out.write_all(b"\n")?;
            }
            if column_steps > 0 {
                for _ in 0..column_steps {
                    out.write_all(b" ")?;
                }
                last_cx = cx + run.s.chars().count() as i64;
            }
            out.write_all(run.s.as_bytes())?;
        }
        out.write_all(b"\n")
    }
}

/// One run per line, in content-stream order.
pub struct RawProcessor;

impl TextProcessor for RawProcessor {
    fn write_page<W: Write>(&self, out: &mut W, runs: &[TextRun]) -> io::Result<()> {
        for run in runs {
            out.write_all(run.s.as_bytes())?;
            out.write_all(b"\n")?;
        }
        Ok(())
    }
}

/// The most frequent value, falling back to the smallest positive value,
/// then to 10.
fn dominant_or_fallback(values: impl Iterator<Item = f64> + Clone) -> f64 {
    use std::collections::HashMap;
    let mut counts: HashMap<u64, (usize, f64)> = HashMap::new();
    for v in values.clone() {
        let entry = counts.entry(v.to_bits()).or_insert((0, v));
        entry.0 += 1;
    }
    let dominant = counts
        .values()
        .max_by_key(|(count, _)| *count)
        .map(|(_, v)| *v)
        .unwrap_or(0.0);
    if dominant > 0.0 {
        return dominant;
    }
    values
        .filter(|v| *v > 0.0)
        .fold(None, |min: Option<f64>, v| {
            Some(min.map_or(v, |m| m.min(v)))
        })
        .unwrap_or(10.0)
}
