use super::Result;
use flate2::read::MultiGzDecoder;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Opens a sites file for line-by-line reading, transparently decoding
/// gzip when the file name ends in .gz or .gzip.
pub fn open_sites_reader(path: &Path) -> Result<Box<dyn BufRead>> {
    let file = File::open(path).map_err(|e| format!("File {}: {}", path.display(), e))?;
    let is_gzipped = matches!(
        path.extension().and_then(|ext| ext.to_str()),
        Some("gz") | Some("gzip")
    );
    if is_gzipped {
        let gz_decoder = MultiGzDecoder::new(file);
        if gz_decoder.header().is_none() {
            return Err(format!("Invalid gzip header: {}", path.display()));
        }
        Ok(Box::new(BufReader::new(gz_decoder)))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}
