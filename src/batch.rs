//! Batch mode: read dialogues from a CSV, write the same rows back with a
//! `generated_soap` column appended.

use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use thiserror::Error;
use tracing::info;

use crate::generation::{generate_note, GenerationLimits, TextGenerator, TokenCodec};
use crate::note::{NoteRecord, RunSummary};

/// Required input column.
pub const DIALOGUE_COLUMN: &str = "dialogue";

/// Column appended to the output.
pub const OUTPUT_COLUMN: &str = "generated_soap";

#[derive(Debug, Error)]
pub enum BatchError {
    #[error("Input CSV must contain a column named 'dialogue'. Columns found: {found:?}")]
    MissingDialogueColumn { found: Vec<String> },
}

/// Run the pipeline over every row of `input_csv`. The column check happens
/// before any generation work; a generation failure aborts the run.
pub async fn run_batch(
    input_csv: &Path,
    output_csv: &Path,
    generator: &dyn TextGenerator,
    codec: &dyn TokenCodec,
    limits: &GenerationLimits,
) -> Result<RunSummary> {
    let mut reader = csv::Reader::from_path(input_csv)
        .with_context(|| format!("Failed to open input CSV {:?}", input_csv))?;
    let headers = reader
        .headers()
        .context("Failed to read CSV headers")?
        .clone();

    let dialogue_idx = headers
        .iter()
        .position(|h| h == DIALOGUE_COLUMN)
        .ok_or_else(|| BatchError::MissingDialogueColumn {
            found: headers.iter().map(String::from).collect(),
        })?;

    let mut writer = csv::Writer::from_path(output_csv)
        .with_context(|| format!("Failed to create output CSV {:?}", output_csv))?;
    let mut out_headers = headers.clone();
    out_headers.push_field(OUTPUT_COLUMN);
    writer.write_record(&out_headers)?;

    let mut summary = RunSummary::new();
    for (i, row) in reader.records().enumerate() {
        let record = row.with_context(|| format!("Failed to read CSV row {}", i + 1))?;
        let dialogue = record.get(dialogue_idx).unwrap_or("");

        let start = Instant::now();
        let note = generate_note(dialogue, generator, codec, limits)
            .await
            .with_context(|| format!("Generation failed for row {}", i + 1))?;
        let latency_ms = start.elapsed().as_millis() as u64;

        let mut out_record = record.clone();
        out_record.push_field(&note);
        writer.write_record(&out_record)?;

        info!("Row {} done in {}ms", i + 1, latency_ms);
        summary.add(NoteRecord::new(dialogue, &note, latency_ms));
    }

    writer.flush().context("Failed to flush output CSV")?;
    summary.finalize();
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::DecodingConfig;
    use async_trait::async_trait;

    struct FixedGenerator;

    #[async_trait]
    impl TextGenerator for FixedGenerator {
        async fn generate(&self, _prompt: &str, _config: &DecodingConfig) -> Result<String> {
            Ok("S: Reports itchy rash after switching detergent.\nO: Scattered red spots on both forearms observed during exam.".to_string())
        }
    }

    struct PassthroughCodec;

    impl TokenCodec for PassthroughCodec {
        fn encode(&self, text: &str) -> Result<Vec<u32>> {
            Ok(vec![0; text.split_whitespace().count()])
        }

        fn decode(&self, _ids: &[u32]) -> Result<String> {
            Ok("decoded window".to_string())
        }
    }

    #[tokio::test]
    async fn test_missing_dialogue_column_fails_fast() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.csv");
        let output = dir.path().join("out.csv");
        std::fs::write(&input, "id,transcript\n1,hello there\n").unwrap();

        let err = run_batch(
            &input,
            &output,
            &FixedGenerator,
            &PassthroughCodec,
            &GenerationLimits::default(),
        )
        .await
        .unwrap_err();

        let msg = format!("{err:#}");
        assert!(msg.contains("dialogue"));
        assert!(msg.contains("transcript"));
        assert!(!output.exists());
    }

    #[tokio::test]
    async fn test_batch_appends_generated_soap_column() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.csv");
        let output = dir.path().join("out.csv");
        std::fs::write(
            &input,
            "id,dialogue\n1,doctor my arms are itchy since the new soap\n2,hi\n",
        )
        .unwrap();

        let summary = run_batch(
            &input,
            &output,
            &FixedGenerator,
            &PassthroughCodec,
            &GenerationLimits::default(),
        )
        .await
        .unwrap();

        assert_eq!(summary.count(), 2);

        let written = std::fs::read_to_string(&output).unwrap();
        let mut reader = csv::Reader::from_reader(written.as_bytes());
        let headers = reader.headers().unwrap().clone();
        assert_eq!(headers.iter().last().unwrap(), OUTPUT_COLUMN);

        let rows: Vec<csv::StringRecord> =
            reader.records().collect::<std::result::Result<_, _>>().unwrap();
        assert_eq!(rows.len(), 2);
        // Row 1 goes through the full pipeline; its note is structurally repaired
        assert!(rows[0].get(2).unwrap().starts_with("S: "));
        // Row 2 is below the minimum word count
        assert!(rows[1].get(2).unwrap().contains("Insufficient dialogue"));
    }
}
