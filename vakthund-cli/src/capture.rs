//! ## vakthund-cli::capture
//! **Capture-file reader.**
//!
//! The capture-file reader is a named external collaborator (spec §1):
//! "reads a file into a contiguous byte buffer". No pcap framing, no
//! packet dissection — just the bytes the engines scan.

#[derive(Debug, thiserror::Error)]
#[error("failed to read capture file {path}: {source}")]
pub struct CaptureLoadError {
    path: String,
    #[source]
    source: std::io::Error,
}

pub fn load_capture(path: &str) -> Result<Vec<u8>, CaptureLoadError> {
    std::fs::read(path).map_err(|source| CaptureLoadError {
        path: path.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn reads_file_contents_verbatim() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"GET /etc/passwd HTTP/1.0\r\n").unwrap();
        let buf = load_capture(file.path().to_str().unwrap()).unwrap();
        assert_eq!(buf, b"GET /etc/passwd HTTP/1.0\r\n");
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(load_capture("/nonexistent/capture.bin").is_err());
    }
}
