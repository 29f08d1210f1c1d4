// Quiz detection - scanning, classification and target selection
//
// Everything in here is synchronous and side-effect free apart from the DOM
// reads the scanner performs.

pub mod classifier;
pub mod scanner;
pub mod selector;

pub use classifier::{AnswerLetter, is_quiz_context, label_starts_with_answer};
pub use scanner::{Candidate, scan, scan_root};
pub use selector::{score, select};
