use super::{RecognitionResult, Recognizer, TextToken};
use anyhow::{Context, Result};
use image::RgbImage;
use std::process::Command;

/// Recognizer backed by the `tesseract` CLI in TSV mode. Each call writes
/// the region to a temporary PNG and parses the word rows of the TSV that
/// comes back on stdout.
pub struct TesseractRecognizer;

impl Recognizer for TesseractRecognizer {
    fn recognize(&self, region: &RgbImage) -> Result<RecognitionResult> {
        let png = tempfile::Builder::new()
            .prefix("hardsub-region-")
            .suffix(".png")
            .tempfile()
            .context("failed to create temporary region image")?;
        region
            .save(png.path())
            .context("failed to encode region image")?;

        let output = Command::new("tesseract")
            .arg(png.path())
            .arg("stdout")
            .arg("tsv")
            .output()
            .context("failed to run tesseract; is it installed?")?;

        if !output.status.success() {
            anyhow::bail!(
                "tesseract exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }

        parse_tsv(&output.stdout)
    }
}

/// Parses tesseract TSV output into tokens. Structural rows (page, block,
/// paragraph, line) carry conf -1 and no text; word rows carry a fractional
/// confidence percentage, rounded here to an integer.
pub fn parse_tsv(raw: &[u8]) -> Result<RecognitionResult> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .quoting(false)
        .flexible(true)
        .from_reader(raw);

    let headers = reader
        .headers()
        .context("tesseract TSV output had no header row")?
        .clone();
    let conf_idx = headers
        .iter()
        .position(|h| h == "conf")
        .context("tesseract TSV output missing 'conf' column")?;
    let text_idx = headers
        .iter()
        .position(|h| h == "text")
        .context("tesseract TSV output missing 'text' column")?;

    let mut tokens = Vec::new();
    for record in reader.records() {
        let record = record.context("malformed tesseract TSV row")?;
        let Some(confidence) = record
            .get(conf_idx)
            .and_then(|v| v.trim().parse::<f32>().ok())
        else {
            continue;
        };
        let text = record.get(text_idx).unwrap_or("").trim();
        if confidence < 0.0 || text.is_empty() {
            continue;
        }
        tokens.push(TextToken {
            text: text.to_string(),
            confidence: confidence.round() as i32,
        });
    }

    Ok(RecognitionResult { tokens })
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str =
        "level\tpage_num\tblock_num\tpar_num\tline_num\tword_num\tleft\ttop\twidth\theight\tconf\ttext";

    fn tsv(rows: &[&str]) -> Vec<u8> {
        let mut out = String::from(HEADER);
        for row in rows {
            out.push('\n');
            out.push_str(row);
        }
        out.into_bytes()
    }

    #[test]
    fn test_parses_word_rows() {
        let raw = tsv(&[
            "1\t1\t0\t0\t0\t0\t0\t0\t320\t40\t-1\t",
            "5\t1\t1\t1\t1\t1\t4\t6\t90\t28\t96.57\tHello",
            "5\t1\t1\t1\t1\t2\t102\t6\t88\t28\t91.02\tworld",
        ]);

        let result = parse_tsv(&raw).unwrap();
        assert_eq!(result.joined_text(), "Hello world");
        assert_eq!(result.min_confidence(), Some(91));
    }

    #[test]
    fn test_structural_rows_are_not_tokens() {
        let raw = tsv(&[
            "1\t1\t0\t0\t0\t0\t0\t0\t320\t40\t-1\t",
            "2\t1\t1\t0\t0\t0\t4\t6\t300\t30\t-1\t",
            "4\t1\t1\t1\t1\t0\t4\t6\t300\t30\t-1\t",
        ]);

        let result = parse_tsv(&raw).unwrap();
        assert!(result.tokens.is_empty());
        assert_eq!(result.min_confidence(), None);
    }

    #[test]
    fn test_blank_page_yields_empty_result() {
        let raw = tsv(&[]);
        let result = parse_tsv(&raw).unwrap();
        assert_eq!(result.joined_text(), "");
    }

    #[test]
    fn test_confidences_round_to_integers() {
        let raw = tsv(&["5\t1\t1\t1\t1\t1\t4\t6\t90\t28\t69.50\tmaybe"]);
        let result = parse_tsv(&raw).unwrap();
        assert_eq!(result.tokens[0].confidence, 70);
    }
}
