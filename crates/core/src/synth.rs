//! Concurrent synthesis dispatch.
//!
//! Each segment of the assembled article is posted to the speech-synthesis
//! backend as its own request, all in flight at once. Results are collected
//! keyed by segment index, so completion order never matters; a single
//! failed segment fails the whole run and aborts the requests still in
//! flight.

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use tokio::task::JoinSet;
use tracing::{debug, info};

use crate::assemble::{concat_in_order, write_audio};
use crate::segment::{Segment, split_into_segments};
use crate::{AuditoError, Result};

/// Configuration for the synthesis backend and segmentation.
///
/// The fixed request fields (`idx`, `ctp`, `cod`, `pit`, `pdt`,
/// `_res_tag_`) are part of the backend contract and are not configurable.
#[derive(Debug, Clone)]
pub struct SynthConfig {
    /// Synthesis endpoint URL.
    pub endpoint: String,
    /// Locale code sent as `lan`.
    pub language: String,
    /// Speech speed sent as `spd`.
    pub speed: u32,
    /// Voice id sent as `per`.
    pub voice: u32,
    /// Volume sent as `vol`.
    pub volume: u32,
    /// Client id sent as `cuid`.
    pub client_id: String,
    /// Maximum segment length in characters.
    pub segment_len: usize,
    /// Per-request timeout in seconds.
    pub timeout: u64,
}

impl Default for SynthConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://tsn.baidu.com/text2audio".to_string(),
            language: "zh".to_string(),
            speed: 10,
            voice: 5118,
            volume: 8,
            client_id: "baidu_speech_demo".to_string(),
            segment_len: 500,
            timeout: 120,
        }
    }
}

/// Synthesizes one segment, returning its raw MP3 bytes.
///
/// The backend signals success purely through the response content type:
/// anything other than `audio/mp3` is a failure, and the body (usually a
/// JSON error) is carried in the error message.
pub async fn synthesize_segment(client: &Client, config: &SynthConfig, text: &str) -> Result<Vec<u8>> {
    let form = [
        ("lan", config.language.clone()),
        ("spd", config.speed.to_string()),
        ("tex", urlencoding::encode(text).into_owned()),
        ("per", config.voice.to_string()),
        ("idx", "1".to_string()),
        ("cuid", config.client_id.clone()),
        ("ctp", "1".to_string()),
        ("cod", "2".to_string()),
        ("vol", config.volume.to_string()),
        ("pit", "5".to_string()),
        ("pdt", "220".to_string()),
        ("_res_tag_", "audio".to_string()),
    ];

    let response = client
        .post(&config.endpoint)
        .form(&form)
        .send()
        .await
        .map_err(|e| {
            if e.is_timeout() {
                AuditoError::Timeout { timeout: config.timeout }
            } else {
                AuditoError::HttpError(e)
            }
        })?;

    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();

    if !content_type.starts_with("audio/mp3") {
        let body = response.text().await.unwrap_or_default();
        return Err(AuditoError::Synthesis(format!(
            "backend returned {content_type:?}: {body}"
        )));
    }

    Ok(response.bytes().await?.to_vec())
}

/// Dispatches every segment concurrently and collects the audio keyed by
/// segment index.
///
/// Fan-out degree equals the segment count. The first failure fails the run
/// and aborts the requests still in flight; all spawned tasks are drained
/// before returning so nothing writes into the result map afterwards.
pub async fn dispatch_segments(segments: Vec<Segment>, config: &SynthConfig) -> Result<HashMap<usize, Vec<u8>>> {
    let client = Client::builder()
        .timeout(Duration::from_secs(config.timeout))
        .build()
        .map_err(AuditoError::HttpError)?;

    let mut tasks = JoinSet::new();
    let expected = segments.len();
    for segment in segments {
        let client = client.clone();
        let config = config.clone();
        tasks.spawn(async move {
            let audio = synthesize_segment(&client, &config, &segment.text).await?;
            debug!(index = segment.index, bytes = audio.len(), "segment synthesized");
            Ok::<(usize, Vec<u8>), AuditoError>((segment.index, audio))
        });
    }

    let mut collected = HashMap::with_capacity(expected);
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(Ok((index, audio))) => {
                collected.insert(index, audio);
            }
            Ok(Err(e)) => {
                tasks.abort_all();
                while tasks.join_next().await.is_some() {}
                return Err(e);
            }
            Err(e) if e.is_cancelled() => {}
            Err(e) => {
                tasks.abort_all();
                while tasks.join_next().await.is_some() {}
                return Err(AuditoError::Synthesis(format!("synthesis task panicked: {e}")));
            }
        }
    }
    Ok(collected)
}

/// Synthesizes a whole article text into one MP3 file under `dir`.
///
/// Segments the text, dispatches all segments concurrently, concatenates
/// the per-segment audio in index order, and writes the result to a
/// timestamp-named file. Returns the file name of the written artifact.
pub async fn synthesize_to_file(text: &str, dir: &Path, config: &SynthConfig) -> Result<String> {
    let segments = split_into_segments(text, config.segment_len);
    let expected = segments.len();
    info!(segments = expected, chars = text.chars().count(), "dispatching synthesis");

    let parts = dispatch_segments(segments, config).await?;
    let audio = concat_in_order(parts, expected)?;
    write_audio(dir, &audio).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config_for(server: &MockServer) -> SynthConfig {
        SynthConfig { endpoint: format!("{}/text2audio", server.uri()), ..Default::default() }
    }

    fn mp3_response(body: &[u8]) -> ResponseTemplate {
        ResponseTemplate::new(200)
            .set_body_bytes(body)
            .insert_header("Content-Type", "audio/mp3")
    }

    #[tokio::test]
    async fn test_synthesize_segment_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/text2audio"))
            .and(body_string_contains("lan=zh"))
            .and(body_string_contains("_res_tag_=audio"))
            .respond_with(mp3_response(b"MP3BYTES"))
            .expect(1)
            .mount(&server)
            .await;

        let config = config_for(&server);
        let client = Client::new();
        let audio = synthesize_segment(&client, &config, "你好").await.unwrap();
        assert_eq!(audio, b"MP3BYTES");
    }

    #[tokio::test]
    async fn test_synthesize_segment_text_is_percent_encoded() {
        let server = MockServer::start().await;
        // "下" percent-encodes to %E4%B8%8B; the form layer then escapes the
        // percent signs, so the wire body carries %25E4...
        Mock::given(method("POST"))
            .and(body_string_contains("tex=%25E4%25B8%258B"))
            .respond_with(mp3_response(b"ok"))
            .expect(1)
            .mount(&server)
            .await;

        let config = config_for(&server);
        let client = Client::new();
        synthesize_segment(&client, &config, "下").await.unwrap();
    }

    #[tokio::test]
    async fn test_synthesize_segment_wrong_content_type_fails() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(r#"{"err_no":500}"#)
                    .insert_header("Content-Type", "application/json"),
            )
            .mount(&server)
            .await;

        let config = config_for(&server);
        let client = Client::new();
        let result = synthesize_segment(&client, &config, "text").await;
        match result {
            Err(AuditoError::Synthesis(message)) => assert!(message.contains("err_no")),
            other => panic!("expected synthesis error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_dispatch_collects_all_indices() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(mp3_response(b"part"))
            .expect(3)
            .mount(&server)
            .await;

        let segments = split_into_segments(&"x".repeat(1200), 500);
        let parts = dispatch_segments(segments, &config_for(&server)).await.unwrap();

        assert_eq!(parts.len(), 3);
        for index in 0..3 {
            assert_eq!(parts[&index], b"part");
        }
    }

    #[tokio::test]
    async fn test_dispatch_fails_when_any_segment_fails() {
        let server = MockServer::start().await;
        // One specific segment answers with the wrong content type.
        Mock::given(method("POST"))
            .and(body_string_contains("tex=BBBB"))
            .respond_with(ResponseTemplate::new(200).set_body_string("quota exceeded"))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .respond_with(mp3_response(b"fine"))
            .mount(&server)
            .await;

        let text = format!("{}{}{}", "A".repeat(4), "B".repeat(4), "C".repeat(4));
        let segments = split_into_segments(&text, 4);
        let result = dispatch_segments(segments, &config_for(&server)).await;
        assert!(matches!(result, Err(AuditoError::Synthesis(_))));
    }

    #[tokio::test]
    async fn test_synthesize_to_file_concatenates_in_index_order() {
        let server = MockServer::start().await;
        for (marker, audio) in [("AAAA", "first-"), ("BBBB", "second-"), ("CC", "third")] {
            Mock::given(method("POST"))
                .and(body_string_contains(format!("tex={marker}")))
                .respond_with(mp3_response(audio.as_bytes()))
                .expect(1)
                .mount(&server)
                .await;
        }

        let dir = tempfile::tempdir().unwrap();
        let text = format!("{}{}{}", "A".repeat(4), "B".repeat(4), "C".repeat(2));
        let config = SynthConfig { segment_len: 4, ..config_for(&server) };
        let name = synthesize_to_file(&text, dir.path(), &config).await.unwrap();

        assert!(name.ends_with(".mp3"));
        let written = std::fs::read(dir.path().join(&name)).unwrap();
        assert_eq!(written, b"first-second-third");
    }

    #[tokio::test]
    async fn test_synthesize_to_file_failure_writes_nothing() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("no audio"))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let result = synthesize_to_file("some text", dir.path(), &config_for(&server)).await;

        assert!(result.is_err());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
