//! Integration tests for ragchat using mock chunk sources.

mod common;

use futures::StreamExt;
use ragchat::{ChatSession, ClientConfig, Error, StreamEvent, StreamState};

use common::{byte_chunks, citation, failing_source, single_chunk, source, ScenarioBuilder};

fn session() -> ChatSession {
    ChatSession::with_config(ClientConfig::builder().build().expect("default config"))
}

#[tokio::test]
async fn full_stream_updates_transcript() {
    let body = ScenarioBuilder::new()
        .delta("The budget ")
        .delta("was approved.")
        .citations(r#"[{"id":"doc:1","title":"Minutes","post_id":"p-7"}]"#)
        .body();

    let s = session();
    let mut stream = s
        .send_with_source("who approved the budget?", source(single_chunk(&body)))
        .expect("send should be admitted");

    let mut saw_citations = false;
    let mut saw_completed = false;
    let mut text = String::new();

    while let Some(event) = stream.next().await {
        match event.expect("should not error") {
            StreamEvent::Delta { text: t } => text.push_str(&t),
            StreamEvent::Citations(c) => {
                saw_citations = true;
                assert_eq!(c.len(), 1);
                assert!(c[0].has_preview());
            }
            StreamEvent::Completed => saw_completed = true,
            StreamEvent::Aborted => panic!("stream was not cancelled"),
        }
    }

    assert!(saw_citations, "should receive Citations");
    assert!(saw_completed, "should receive Completed");
    assert_eq!(text, "The budget was approved.");
    assert_eq!(s.state(), StreamState::Completed);

    let transcript = s.transcript();
    assert_eq!(transcript.len(), 2);
    assert_eq!(transcript[0].content, "who approved the budget?");
    assert_eq!(transcript[1].content, "The budget was approved.");
    assert_eq!(transcript[1].citations[0].id, "doc:1");
}

#[tokio::test]
async fn hello_world_deltas_concatenate() {
    let body = ScenarioBuilder::new()
        .delta("Hel")
        .delta("lo, ")
        .delta("world")
        .body();

    let s = session();
    let text = s
        .send_with_source("q", source(single_chunk(&body)))
        .expect("admitted")
        .collect_text()
        .await
        .expect("completes");

    assert_eq!(text, "Hello, world");
    assert_eq!(s.last_answer().expect("answer").content, "Hello, world");
}

#[tokio::test]
async fn chunk_boundary_invariance() {
    // The same bytes delivered with arbitrary boundaries, including
    // splits mid-delimiter and mid-multibyte-character, must produce an
    // identical transcript.
    let body = ScenarioBuilder::new()
        .delta("안녕, ")
        .keepalive()
        .citations(r#"[{"id":"a"},{"id":"b"}]"#)
        .delta("세계!")
        .citations(r#"[{"id":"c"}]"#)
        .body();

    let expected_session = session();
    let text = expected_session
        .send_with_source("q", source(single_chunk(&body)))
        .expect("admitted")
        .collect_text()
        .await
        .expect("completes");
    let expected = expected_session.last_answer().expect("answer");
    assert_eq!(text, "안녕, 세계!");
    assert_eq!(expected.citations, vec![citation("c")]);

    for size in 1..=body.len() {
        let s = session();
        s.send_with_source("q", source(byte_chunks(&body, size)))
            .expect("admitted")
            .collect_text()
            .await
            .expect("completes");
        let answer = s.last_answer().expect("answer");
        assert_eq!(answer.content, expected.content, "chunk size {size}");
        assert_eq!(answer.citations, expected.citations, "chunk size {size}");
    }
}

#[tokio::test]
async fn citations_replace_not_append() {
    let body = ScenarioBuilder::new()
        .citations(r#"[{"id":"a"},{"id":"b"}]"#)
        .delta("text")
        .citations(r#"[{"id":"c"}]"#)
        .body();

    let s = session();
    s.send_with_source("q", source(single_chunk(&body)))
        .expect("admitted")
        .collect_text()
        .await
        .expect("completes");

    assert_eq!(s.last_answer().expect("answer").citations, vec![citation("c")]);
}

#[tokio::test]
async fn malformed_citation_does_not_kill_stream() {
    let body = ScenarioBuilder::new()
        .delta("before")
        .citations(r#"[{"id":"a""#) // truncated JSON
        .delta(" after")
        .body();

    let s = session();
    let text = s
        .send_with_source("q", source(single_chunk(&body)))
        .expect("admitted")
        .collect_text()
        .await
        .expect("stream must survive the malformed payload");

    assert_eq!(text, "before after");
    assert_eq!(s.state(), StreamState::Completed);
    assert!(s.last_answer().expect("answer").citations.is_empty());
}

#[tokio::test]
async fn stop_after_two_deltas_keeps_exactly_those() {
    let body = ScenarioBuilder::new()
        .delta("one ")
        .delta("two ")
        .delta("three")
        .body();

    let s = session();
    // One frame per chunk so each poll applies exactly one delta.
    let mut stream = s
        .send_with_source("q", source(byte_chunks(&body, "data: one \n\n".len())))
        .expect("admitted");

    let first = stream.next().await.expect("first").expect("ok");
    assert_eq!(first.text(), Some("one "));
    let second = stream.next().await.expect("second").expect("ok");
    assert_eq!(second.text(), Some("two "));

    s.stop();
    s.stop(); // idempotent

    let terminal = stream.next().await.expect("terminal").expect("ok");
    assert_eq!(terminal, StreamEvent::Aborted);
    assert!(stream.next().await.is_none(), "stream ends after abort");

    assert_eq!(s.state(), StreamState::Aborted);
    assert_eq!(s.last_answer().expect("answer").content, "one two ");
    assert!(s.last_error().is_none(), "cancellation surfaces no error");
}

#[tokio::test]
async fn completion_observed_before_stop_wins() {
    let body = ScenarioBuilder::new().delta("done").body();

    let s = session();
    let text = s
        .send_with_source("q", source(single_chunk(&body)))
        .expect("admitted")
        .collect_text()
        .await
        .expect("completes");
    assert_eq!(text, "done");

    // The stream already completed; stop must not rewrite the outcome.
    s.stop();
    assert_eq!(s.state(), StreamState::Completed);
}

#[tokio::test]
async fn send_while_streaming_is_rejected_without_reset() {
    let body = ScenarioBuilder::new().delta("a").body();

    let s = session();
    let stream = s
        .send_with_source("first", source(single_chunk(&body)))
        .expect("admitted");

    let rejected = s.send_with_source("second", source(single_chunk(&body)));
    assert!(matches!(rejected, Err(Error::Busy)));

    // No second open assistant message; the in-flight turn is untouched.
    let transcript = s.transcript();
    assert_eq!(transcript.len(), 2);
    assert_eq!(transcript[0].content, "first");

    let text = stream.collect_text().await.expect("completes");
    assert_eq!(text, "a");
}

#[tokio::test]
async fn transport_error_fails_with_partial_content() {
    let body = ScenarioBuilder::new().delta("partial ").delta("answer").body();

    let s = session();
    let mut stream = s
        .send_with_source("q", failing_source(single_chunk(&body)))
        .expect("admitted");

    let mut text = String::new();
    let mut errors = 0;
    while let Some(event) = stream.next().await {
        match event {
            Ok(StreamEvent::Delta { text: t }) => text.push_str(&t),
            Ok(other) => panic!("unexpected event {other:?}"),
            Err(e) => {
                errors += 1;
                assert!(e.is_transport());
            }
        }
    }

    assert_eq!(errors, 1, "exactly one surfaced error");
    assert_eq!(text, "partial answer");
    assert_eq!(s.state(), StreamState::Failed);
    assert_eq!(s.last_answer().expect("answer").content, "partial answer");
    let message = s.last_error().expect("failure message recorded");
    assert!(message.contains("500"));
}

#[tokio::test]
async fn transport_error_with_no_deltas_leaves_empty_open_message() {
    let s = session();
    let mut stream = s
        .send_with_source("q", failing_source(vec![]))
        .expect("admitted");

    let first = stream.next().await.expect("one item");
    assert!(first.is_err());
    assert!(stream.next().await.is_none());

    assert_eq!(s.state(), StreamState::Failed);
    let answer = s.last_answer().expect("open message exists");
    assert!(answer.content.is_empty());
}

#[tokio::test]
async fn noise_frames_are_ignored() {
    let body = ScenarioBuilder::new()
        .keepalive()
        .raw("event: citations") // marker without data
        .raw("retry: 3000") // unrecognized field
        .delta("only this")
        .keepalive()
        .body();

    let s = session();
    let text = s
        .send_with_source("q", source(single_chunk(&body)))
        .expect("admitted")
        .collect_text()
        .await
        .expect("completes");

    assert_eq!(text, "only this");
}

#[tokio::test]
async fn trailing_undelimited_fragment_is_discarded() {
    // The final frame never receives its delimiter; its content must not
    // be applied.
    let mut body = ScenarioBuilder::new().delta("kept").body();
    body.push_str("data: lost");

    let s = session();
    let text = s
        .send_with_source("q", source(single_chunk(&body)))
        .expect("admitted")
        .collect_text()
        .await
        .expect("completes");

    assert_eq!(text, "kept");
    assert_eq!(s.last_answer().expect("answer").content, "kept");
}

#[tokio::test]
async fn stop_preserves_citations_accumulated_so_far() {
    let body = ScenarioBuilder::new()
        .delta("text")
        .citations(r#"[{"id":"a"}]"#)
        .delta("more")
        .body();

    let s = session();
    let mut stream = s
        .send_with_source("q", source(single_chunk(&body)))
        .expect("admitted");

    // Drain the three content events, then cancel before the natural end
    // of a longer stream would be observed.
    let mut seen = 0;
    while seen < 3 {
        let event = stream.next().await.expect("event").expect("ok");
        assert!(!event.is_terminal());
        seen += 1;
    }
    s.stop();
    drop(stream);

    assert_eq!(s.state(), StreamState::Aborted);
    let answer = s.last_answer().expect("answer");
    assert_eq!(answer.content, "textmore");
    assert_eq!(answer.citations, vec![citation("a")]);
}

#[tokio::test]
async fn observer_sees_events_in_order() {
    use ragchat::StreamObserver;
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    struct Recorder {
        log: Mutex<Vec<String>>,
    }

    impl StreamObserver for Recorder {
        fn on_delta(&self, text: &str) {
            self.log.lock().unwrap().push(format!("delta:{text}"));
        }
        fn on_citations(&self, citations: &[ragchat::Citation]) {
            self.log.lock().unwrap().push(format!("citations:{}", citations.len()));
        }
        fn on_finished(&self, state: StreamState) {
            self.log.lock().unwrap().push(format!("finished:{state}"));
        }
    }

    let recorder = Arc::new(Recorder::default());
    let config = ClientConfig::builder()
        .observer(recorder.clone())
        .build()
        .expect("config");
    let s = ChatSession::with_config(config);

    let body = ScenarioBuilder::new()
        .delta("hi")
        .citations(r#"[{"id":"a"},{"id":"b"}]"#)
        .body();
    s.send_with_source("q", source(single_chunk(&body)))
        .expect("admitted")
        .collect_text()
        .await
        .expect("completes");

    let log = recorder.log.lock().unwrap().clone();
    assert_eq!(log, vec!["delta:hi", "citations:2", "finished:completed"]);
}

#[tokio::test]
async fn multi_turn_transcript_grows_and_prior_turns_freeze() {
    let s = session();

    let first = ScenarioBuilder::new().delta("answer one").body();
    s.send_with_source("one", source(single_chunk(&first)))
        .expect("admitted")
        .collect_text()
        .await
        .expect("completes");

    let second = ScenarioBuilder::new()
        .delta("answer two")
        .citations(r#"[{"id":"x"}]"#)
        .body();
    s.send_with_source("two", source(single_chunk(&second)))
        .expect("admitted")
        .collect_text()
        .await
        .expect("completes");

    let transcript = s.transcript();
    assert_eq!(transcript.len(), 4);
    assert_eq!(transcript[1].content, "answer one");
    assert!(transcript[1].citations.is_empty(), "first turn untouched");
    assert_eq!(transcript[3].content, "answer two");
    assert_eq!(transcript[3].citations, vec![citation("x")]);
}
