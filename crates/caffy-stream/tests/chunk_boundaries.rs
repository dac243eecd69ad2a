// End-to-end behavior of the assembler over async byte streams.
// Inputs are re-chunked at every possible boundary to check that delivery
// shape never changes the result.

use bytes::Bytes;
use caffy_stream::{assemble, AssembledTurn, StreamAssembler, StreamError, TurnEnd, TurnObserver};
use futures_util::stream;

const SESSION: &str = "1234abcd-56ef-78ab-90cd-1234567890ab";

#[derive(Default)]
struct Recorder {
    messages: Vec<String>,
    sessions: Vec<String>,
}

impl TurnObserver for Recorder {
    fn on_message(&mut self, full_message: &str) {
        self.messages.push(full_message.to_string());
    }
    fn on_session_id(&mut self, session_id: &str) {
        self.sessions.push(session_id.to_string());
    }
}

fn body(chunks: Vec<Vec<u8>>) -> impl futures_util::Stream<Item = Result<Bytes, std::io::Error>> {
    stream::iter(chunks.into_iter().map(|c| Ok(Bytes::from(c))))
}

fn feed(chunks: &[&[u8]]) -> (AssembledTurn, Recorder) {
    let mut rec = Recorder::default();
    let mut asm = StreamAssembler::new();
    for c in chunks {
        asm.push_chunk(c, &mut rec);
    }
    (asm.finish(&mut rec), rec)
}

fn sample_stream() -> String {
    format!(
        "data: {{\"content\": \"금리 인하는 \"}}\n\n\
         data: {{\"content\": \"왜 중요할까요? 📈 \"}}\n\n\
         SESSION_ID: {SESSION}\n\
         data: plain words\n\
         stray server line\n\
         data: {{\"content\": \"\\\"quoted\\\" end\"}}\n\
         data: [DONE]\n\
         data: {{\"content\": \"ignored\"}}\n"
    )
}

#[test]
fn every_two_way_split_matches_single_chunk() {
    let input = sample_stream();
    let bytes = input.as_bytes();
    let (whole, _) = feed(&[bytes]);

    assert_eq!(
        whole.message,
        "금리 인하는 왜 중요할까요? 📈 plain wordsstray server line \"quoted\" end"
    );
    assert_eq!(whole.session_id.as_deref(), Some(SESSION));
    assert_eq!(whole.end, TurnEnd::Done);

    for split in 0..=bytes.len() {
        let (turn, rec) = feed(&[&bytes[..split], &bytes[split..]]);
        assert_eq!(turn, whole, "split at byte {split}");
        assert_eq!(rec.sessions, vec![SESSION], "split at byte {split}");
    }
}

#[test]
fn byte_at_a_time_matches_single_chunk() {
    let input = sample_stream();
    let (whole, whole_rec) = feed(&[input.as_bytes()]);

    let singles: Vec<&[u8]> = input.as_bytes().chunks(1).collect();
    let (turn, rec) = feed(&singles);

    assert_eq!(turn, whole);
    assert_eq!(rec.messages.last(), whole_rec.messages.last());
}

#[test]
fn growth_is_prefix_monotonic() {
    let input = sample_stream();
    let chunks: Vec<&[u8]> = input.as_bytes().chunks(7).collect();
    let (_, rec) = feed(&chunks);

    assert!(!rec.messages.is_empty());
    for pair in rec.messages.windows(2) {
        assert!(
            pair[1].starts_with(&pair[0]) && pair[1].len() > pair[0].len(),
            "{:?} does not extend {:?}",
            pair[1],
            pair[0]
        );
    }
}

#[tokio::test]
async fn content_frames_then_done() {
    let chunks = vec![
        b"data: {\"content\":\"A\"}\n".to_vec(),
        b"data: {\"content\":\"B\"}\n".to_vec(),
        b"data: [DONE]\n".to_vec(),
        b"data: {\"content\":\"C\"}\n".to_vec(),
    ];
    let mut rec = Recorder::default();
    let turn = assemble(body(chunks), &mut rec).await.expect("stream ok");

    assert_eq!(turn.message, "AB");
    assert_eq!(turn.end, TurnEnd::Done);
    assert_eq!(rec.messages, vec!["A", "AB"]);
}

#[tokio::test]
async fn session_marker_split_across_chunks_reported_once() {
    let chunks = vec![
        b"data: {\"content\":\"hi\"}\nSESSION_".to_vec(),
        format!("ID: {SESSION}\n").into_bytes(),
        b"data: [DONE]\n".to_vec(),
    ];
    let mut rec = Recorder::default();
    let turn = assemble(body(chunks), &mut rec).await.expect("stream ok");

    assert_eq!(turn.session_id.as_deref(), Some(SESSION));
    assert_eq!(rec.sessions, vec![SESSION]);
}

#[tokio::test]
async fn session_marker_without_trailing_newline_is_reconciled() {
    let chunks = vec![
        b"data: {\"content\":\"hi\"}\n".to_vec(),
        format!("SESSION_ID: {SESSION}").into_bytes(),
    ];
    let mut rec = Recorder::default();
    let turn = assemble(body(chunks), &mut rec).await.expect("stream ok");

    assert_eq!(turn.session_id.as_deref(), Some(SESSION));
    assert_eq!(rec.sessions, vec![SESSION]);
    assert_eq!(turn.end, TurnEnd::EndOfStream);
}

#[tokio::test]
async fn non_json_data_is_kept_literally() {
    let chunks = vec![b"data: {\"content\":\"x \"}\ndata: not-json-text\n".to_vec()];
    let mut rec = Recorder::default();
    let turn = assemble(body(chunks), &mut rec).await.expect("stream ok");

    assert_eq!(turn.message, "x not-json-text");
}

#[tokio::test]
async fn empty_stream_fires_no_callbacks() {
    let mut rec = Recorder::default();
    let turn = assemble(body(Vec::new()), &mut rec).await.expect("stream ok");

    assert_eq!(turn.message, "");
    assert_eq!(turn.session_id, None);
    assert_eq!(turn.end, TurnEnd::EndOfStream);
    assert!(rec.messages.is_empty());
    assert!(rec.sessions.is_empty());
}

#[tokio::test]
async fn transport_error_propagates_with_partial_text() {
    let items: Vec<Result<Bytes, std::io::Error>> = vec![
        Ok(Bytes::from_static(b"data: {\"content\":\"half\"}\n")),
        Err(std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset by peer")),
        Ok(Bytes::from_static(b"data: {\"content\":\"never\"}\n")),
    ];
    let mut rec = Recorder::default();
    let err = assemble(stream::iter(items), &mut rec)
        .await
        .expect_err("transport failure must surface");

    assert!(matches!(err, StreamError::Transport { .. }));
    assert_eq!(err.partial_message(), "half");
    assert!(err.to_string().contains("reset by peer"));
    assert_eq!(rec.messages, vec!["half"]);
}
