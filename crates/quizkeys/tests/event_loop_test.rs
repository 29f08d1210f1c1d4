// Integration tests for FrameEventLoop
//
// Runs with a paused tokio clock so poll ticks are deterministic.
//
// Tests cover:
// - Keydowns delivered through the key channel
// - Relay messages arriving on the inbox
// - The poll timer picking up a quiz that renders after load
// - Shutdown when the key channel closes

mod common;

use quizkeys::dom::{DomSurface, ElementSpec};
use quizkeys::runtime::{FrameEventLoop, MailboxPort, SharedDocument, mailbox};
use quizkeys::{AgentOptions, FrameAgent, FrameId, KeyEvent, KeyInput, RelayMessage};
use std::time::Duration;

#[tokio::test(start_paused = true)]
async fn test_keydown_through_running_loop() {
    common::init_tracing();
    let (doc, ids) = common::quiz_page("https://quiz.example/");
    let shared = SharedDocument::new(doc);
    let (_mailbox, inbox) = mailbox();
    let agent = FrameAgent::new(shared.clone(), MailboxPort::for_top(), AgentOptions::default());

    let (event_loop, keys) = FrameEventLoop::new(agent, inbox);
    let handle = tokio::spawn(event_loop.run());

    keys.send(KeyEvent::new(KeyInput::digit(2), None)).unwrap();
    keys.send(KeyEvent::new(KeyInput::space(), None)).unwrap();
    drop(keys);

    let agent = handle.await.unwrap();
    assert_eq!(shared.lock().clicks(), &[ids.lyon, ids.next]);
    assert!(agent.dispatcher().memo().detected());
}

#[tokio::test(start_paused = true)]
async fn test_relay_message_through_inbox() {
    common::init_tracing();
    let (doc, ids) = common::quiz_page("https://quiz.example/embed");
    let shared = SharedDocument::new(doc);
    let (mailbox, inbox) = mailbox();
    let agent = FrameAgent::new(shared.clone(), MailboxPort::for_top(), AgentOptions::default());

    let (event_loop, keys) = FrameEventLoop::new(agent, inbox);
    let handle = tokio::spawn(event_loop.run());

    let message = RelayMessage::broadcast(KeyInput::digit(1), FrameId::new("parent"))
        .to_value()
        .unwrap();
    mailbox.send(message).unwrap();
    // Let the loop drain its inbox before unloading it
    tokio::time::sleep(Duration::from_millis(10)).await;
    drop(keys);

    handle.await.unwrap();
    assert_eq!(shared.lock().clicks(), &[ids.paris]);
}

#[tokio::test(start_paused = true)]
async fn test_poll_detects_quiz_rendered_after_load() {
    common::init_tracing();
    let shared = SharedDocument::new(common::plain_page("https://lazy.example/"));
    let (_mailbox, inbox) = mailbox();
    let options = AgentOptions::default().poll_interval(Duration::from_millis(250));
    let agent = FrameAgent::new(shared.clone(), MailboxPort::for_top(), options);

    let (event_loop, keys) = FrameEventLoop::new(agent, inbox);
    let handle = tokio::spawn(event_loop.run());

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(!shared.has_focus());

    let answer = {
        let mut doc = shared.lock();
        let body = doc.body();
        doc.append(body, ElementSpec::button("A. True")).unwrap()
    };

    // Next tick is at 250ms
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(shared.lock().focused(), Some(answer));
    assert!(shared.has_focus());

    drop(keys);
    let agent = handle.await.unwrap();
    assert!(agent.dispatcher().memo().focus_prepared());
    assert!(shared.lock().clicks().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_loop_survives_closed_inbox() {
    common::init_tracing();
    let (doc, ids) = common::quiz_page("https://quiz.example/");
    let shared = SharedDocument::new(doc);
    let (mailbox, inbox) = mailbox();
    drop(mailbox);
    let agent = FrameAgent::new(shared.clone(), MailboxPort::for_top(), AgentOptions::default());

    let (event_loop, keys) = FrameEventLoop::new(agent, inbox);
    let handle = tokio::spawn(event_loop.run());

    tokio::time::sleep(Duration::from_millis(1500)).await;
    keys.send(KeyEvent::new(KeyInput::digit(1), None)).unwrap();
    drop(keys);

    handle.await.unwrap();
    assert_eq!(shared.lock().clicks(), &[ids.paris]);
}
