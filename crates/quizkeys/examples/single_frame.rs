// Single frame example - answer a quiz from the keyboard
//
// Shows: building a page, the focus pass on load, digit and Space keys,
// keys typed into a text field being left alone

use quizkeys::dom::{ElementSpec, MemoryDocument};
use quizkeys::runtime::MailboxPort;
use quizkeys::{AgentOptions, FrameAgent, KeyEvent, KeyInput};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let mut doc = MemoryDocument::parse("https://quiz.example/lesson-3")?;
    let body = doc.body();
    doc.append(body, ElementSpec::new("h2").text("Which planet is largest?"))?;
    let notes = doc.append(body, ElementSpec::new("textarea"))?;
    for label in ["A. Mars", "B. Jupiter", "C. Venus", "D. Mercury"] {
        doc.append(body, ElementSpec::button(label))?;
    }
    doc.append(body, ElementSpec::button("Hint"))?;
    doc.append(body, ElementSpec::button("Next"))?;

    let options = AgentOptions::from_env()?;
    let mut agent = FrameAgent::new(doc, MailboxPort::for_top(), options);

    let quiz = agent.on_load();
    println!("Quiz detected on load: {}", quiz);
    println!("Focused element: {:?}", agent.dom().focused());

    // Typing "2" into the notes field is just typing
    let mut typing = KeyEvent::new(KeyInput::digit(2), Some(notes));
    println!("'2' in textarea -> {:?}", agent.on_keydown(&mut typing));

    for input in [KeyInput::digit(5), KeyInput::digit(2), KeyInput::space()] {
        let label = input.code.clone();
        let mut event = KeyEvent::new(input, None);
        let outcome = agent.on_keydown(&mut event);
        println!(
            "{} -> {:?} (default prevented: {})",
            label,
            outcome,
            event.default_prevented()
        );
    }

    println!("Clicked: {:?}", agent.dom().clicks());
    Ok(())
}
