// Shared helpers for integration tests
//
// Note: Functions appear "unused" because each test binary compiles separately,
// but they ARE used across multiple test files. Suppress false-positive warnings.
#![allow(dead_code)]

use quizkeys::NodeId;
use quizkeys::dom::{ElementSpec, MemoryDocument};
use tracing_subscriber::EnvFilter;

/// Installs a test-friendly subscriber once; controlled by RUST_LOG.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Node ids of the controls on `quiz_page`
pub struct QuizControls {
    pub paris: NodeId,
    pub lyon: NodeId,
    pub next: NodeId,
}

/// "A. Paris", "B. Lyon", "Next"
pub fn quiz_page(url: &str) -> (MemoryDocument, QuizControls) {
    let mut doc = MemoryDocument::parse(url).expect("valid URL");
    let body = doc.body();
    doc.append(body, ElementSpec::new("h2").text("Capital of France?"))
        .expect("append heading");
    let paris = doc
        .append(body, ElementSpec::button("A. Paris"))
        .expect("append answer A");
    let lyon = doc
        .append(body, ElementSpec::button("B. Lyon"))
        .expect("append answer B");
    let next = doc
        .append(body, ElementSpec::button("Next"))
        .expect("append next");
    (doc, QuizControls { paris, lyon, next })
}

/// A page with buttons that do not look like a quiz
pub fn plain_page(url: &str) -> MemoryDocument {
    let mut doc = MemoryDocument::parse(url).expect("valid URL");
    let body = doc.body();
    for label in ["Share", "Settings", "Sign in"] {
        doc.append(body, ElementSpec::button(label))
            .expect("append button");
    }
    doc
}
