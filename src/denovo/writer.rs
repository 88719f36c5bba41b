use crate::denovo::infer::InferenceResult;
use crate::denovo::site::Site;
use crate::utils::Result;
use std::fs::File;
use std::io::{BufWriter, Write};

/// Writes per-site trio calls as tab-separated rows.
pub struct CallsWriter {
    writer: BufWriter<File>,
    output_path: String,
}

impl CallsWriter {
    pub fn new(output_path: &str) -> Result<CallsWriter> {
        let file = File::create(output_path)
            .map_err(|e| format!("Failed to create {}: {}", output_path, e))?;
        let mut writer = BufWriter::new(file);
        writeln!(writer, "chrom\tpos\tfather_gt\tmother_gt\tchild_gt\tdenovo")
            .map_err(|e| format!("Failed to write to {}: {}", output_path, e))?;
        Ok(CallsWriter {
            writer,
            output_path: output_path.to_string(),
        })
    }

    pub fn write(&mut self, site: &Site, result: &InferenceResult) {
        let row = format!(
            "{}\t{}\t{}\t{}\t{}\t{}",
            site.chrom,
            site.pos,
            result.trio.father,
            result.trio.mother,
            result.trio.child,
            result.is_denovo
        );
        if let Err(e) = writeln!(self.writer, "{}", row) {
            log::error!("Failed to write to {}: {}", self.output_path, e);
        }
    }

    pub fn finish(mut self) -> Result<()> {
        self.writer
            .flush()
            .map_err(|e| format!("Failed to flush {}: {}", self.output_path, e))
    }
}
