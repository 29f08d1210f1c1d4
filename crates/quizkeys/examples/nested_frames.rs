// Nested frames example - a quiz two iframes deep
//
// Shows: a host page with a sidebar frame and an LMS shell frame, the quiz
// living inside a shadow root in the shell's child frame, keys pressed in
// the sidebar reaching it through the top frame

use quizkeys::dom::{ElementSpec, MemoryDocument};
use quizkeys::runtime::FrameTree;
use quizkeys::{AgentOptions, KeyInput};

fn page(url: &str, buttons: &[&str]) -> anyhow::Result<MemoryDocument> {
    let mut doc = MemoryDocument::parse(url)?;
    let body = doc.body();
    for label in buttons {
        doc.append(body, ElementSpec::button(*label))?;
    }
    Ok(doc)
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let mut tree = FrameTree::new(AgentOptions::new().debug(true));
    let top = tree.add_top(page("https://course.example/", &["Menu", "Profile"])?)?;
    let sidebar = tree.add_child(top, page("https://chat.example/", &["Send"])?)?;
    let shell = tree.add_child(top, page("https://lms.example/shell", &["Exit"])?)?;

    let mut quiz_doc = MemoryDocument::parse("https://lms.example/quiz/7")?;
    let body = quiz_doc.body();
    let host = quiz_doc.append(body, ElementSpec::new("quiz-player"))?;
    let root = quiz_doc.attach_shadow(host)?;
    for label in ["A) 7", "B) 8", "C) 9", "Previous", "Next"] {
        quiz_doc.append(root, ElementSpec::button(label))?;
    }
    let quiz = tree.add_child(shell, quiz_doc)?;

    tree.load_all();

    for input in [KeyInput::digit(3), KeyInput::space()] {
        println!("Pressing {} in the sidebar", input.code);
        let outcome = tree.press(sidebar, input)?;
        println!("  sidebar: {:?}", outcome);
        for delivery in tree.settle() {
            println!("  {}: {:?}", delivery.frame, delivery.outcome);
        }
    }

    println!("Clicks in quiz frame: {:?}", tree.document(quiz)?.clicks());
    Ok(())
}
