//! Ordered audio assembly and artifact writing.
//!
//! The backend's output format is concatenation-safe (sequential
//! constant-bitrate MP3 frames), so assembling the final stream is raw byte
//! concatenation in strictly increasing segment-index order.

use std::collections::HashMap;
use std::path::Path;

use time::OffsetDateTime;
use time::format_description;
use tracing::info;

use crate::{AuditoError, Result};

/// Timestamp layout for artifact file names, e.g. `20260826153012.mp3`.
const FILE_NAME_FORMAT: &str = "[year][month][day][hour][minute][second]";

/// Concatenates per-segment audio buffers in index order.
///
/// Every index in `0..expected` must be present; a missing index means a
/// dispatch unit was lost and the run cannot produce a coherent stream.
pub fn concat_in_order(mut parts: HashMap<usize, Vec<u8>>, expected: usize) -> Result<Vec<u8>> {
    let total: usize = parts.values().map(Vec::len).sum();
    let mut audio = Vec::with_capacity(total);
    for index in 0..expected {
        let part = parts
            .remove(&index)
            .ok_or_else(|| AuditoError::Assembly(format!("missing audio for segment {index}")))?;
        audio.extend_from_slice(&part);
    }
    Ok(audio)
}

/// Writes the assembled audio under `dir` with a timestamp-derived name.
///
/// Creates the directory if needed and returns the file name (not the full
/// path) of the written artifact.
pub async fn write_audio(dir: &Path, audio: &[u8]) -> Result<String> {
    let name = artifact_name()?;
    tokio::fs::create_dir_all(dir).await?;
    tokio::fs::write(dir.join(&name), audio).await?;
    info!(name, bytes = audio.len(), "audio artifact written");
    Ok(name)
}

fn artifact_name() -> Result<String> {
    let layout = format_description::parse_borrowed::<2>(FILE_NAME_FORMAT)
        .map_err(|e| AuditoError::Assembly(e.to_string()))?;
    let stamp = OffsetDateTime::now_utc()
        .format(&layout)
        .map_err(|e| AuditoError::Assembly(e.to_string()))?;
    Ok(format!("{stamp}.mp3"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_concat_in_index_order() {
        let parts = HashMap::from([
            (2, b"third".to_vec()),
            (0, b"first-".to_vec()),
            (1, b"second-".to_vec()),
        ]);
        let audio = concat_in_order(parts, 3).unwrap();
        assert_eq!(audio, b"first-second-third");
    }

    #[test]
    fn test_concat_missing_index_is_fatal() {
        let parts = HashMap::from([(0, b"first".to_vec()), (2, b"third".to_vec())]);
        let result = concat_in_order(parts, 3);
        match result {
            Err(AuditoError::Assembly(message)) => assert!(message.contains("segment 1")),
            other => panic!("expected assembly error, got {other:?}"),
        }
    }

    #[test]
    fn test_concat_empty_run() {
        let audio = concat_in_order(HashMap::new(), 0).unwrap();
        assert!(audio.is_empty());
    }

    #[test]
    fn test_artifact_name_shape() {
        let name = artifact_name().unwrap();
        assert!(name.ends_with(".mp3"));
        // 14 digits: year(4) month(2) day(2) hour(2) minute(2) second(2)
        let stamp = name.trim_end_matches(".mp3");
        assert_eq!(stamp.len(), 14);
        assert!(stamp.chars().all(|c| c.is_ascii_digit()));
    }

    #[tokio::test]
    async fn test_write_audio_creates_dir_and_file() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("audio");

        let name = write_audio(&dir, b"bytes").await.unwrap();
        let written = std::fs::read(dir.join(&name)).unwrap();
        assert_eq!(written, b"bytes");
    }
}
