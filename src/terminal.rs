//! Terminal chat simulator — stdin/stdout REPL over a local dialogue engine.

use std::sync::Arc;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::broadcast::error::RecvError;

use crate::dialogue::{DialogueEngine, DialogueEvent, Message};

/// Map a typed line to an option label.
///
/// A number picks the option at that 1-based position; anything else is
/// taken as the label itself.
pub fn resolve_input(options: &[String], line: &str) -> Option<String> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    match line.parse::<usize>() {
        Ok(n) if (1..=options.len()).contains(&n) => Some(options[n - 1].clone()),
        Ok(_) => None,
        Err(_) => Some(line.to_string()),
    }
}

/// Render a message the way the chat widget shows it.
pub fn render_message(message: &Message) -> String {
    let who = if message.is_bot() { "РАЗБЛОК" } else { "Вы" };
    let mut out = format!("{who}: {}", message.text);
    for (i, option) in message.options.iter().enumerate() {
        out.push_str(&format!("\n  [{}] {}", i + 1, option));
    }
    out
}

fn print_event(event: &DialogueEvent) {
    match event {
        DialogueEvent::Typing { active: true } => eprintln!("…печатает"),
        DialogueEvent::Typing { active: false } => {}
        DialogueEvent::Message { message } => println!("\n{}\n", render_message(message)),
        DialogueEvent::Reset { messages } => {
            for message in messages {
                println!("\n{}\n", render_message(message));
            }
        }
        DialogueEvent::OpenExternal { url } => println!("\n→ {url}\n"),
    }
}

/// Run the simulator until EOF or `/quit`.
pub async fn run(engine: Arc<DialogueEngine>) {
    let mut rx = engine.subscribe();
    let printer = tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(event) => print_event(&event),
                Err(RecvError::Lagged(n)) => tracing::warn!(missed = n, "Terminal lagged"),
                Err(RecvError::Closed) => break,
            }
        }
    });

    for message in engine.messages().await {
        println!("\n{}\n", render_message(&message));
    }

    let stdin = BufReader::new(tokio::io::stdin());
    if let Err(e) = read_choices(&engine, stdin, tokio::io::stderr()).await {
        tracing::error!("Error reading stdin: {}", e);
    }

    printer.abort();
}

/// Feed typed lines to the engine, prompting on `prompt`.
///
/// Choices the engine ignores get no reply here.
async fn read_choices<R, W>(
    engine: &Arc<DialogueEngine>,
    input: R,
    mut prompt: W,
) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = input.lines();
    prompt.write_all(b"> ").await?;
    prompt.flush().await?;

    while let Some(line) = lines.next_line().await? {
        if line.trim() == "/quit" {
            break;
        }
        let options = engine.snapshot().await.options;
        if let Some(label) = resolve_input(&options, &line) {
            engine.select_option(&label).await;
        }
        prompt.write_all(b"> ").await?;
        prompt.flush().await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TypingTiming;

    fn options() -> Vec<String> {
        vec!["Счет заблокировали".into(), "Нужна консультация".into()]
    }

    #[test]
    fn numbers_pick_options() {
        assert_eq!(
            resolve_input(&options(), " 2 ").as_deref(),
            Some("Нужна консультация")
        );
        assert_eq!(resolve_input(&options(), "0"), None);
        assert_eq!(resolve_input(&options(), "3"), None);
    }

    #[test]
    fn text_is_taken_as_label() {
        assert_eq!(
            resolve_input(&options(), "Начать заново").as_deref(),
            Some("Начать заново")
        );
        assert_eq!(resolve_input(&options(), "   "), None);
    }

    #[tokio::test(start_paused = true)]
    async fn ignored_choices_print_nothing() {
        let engine = DialogueEngine::new(TypingTiming::default(), "https://t.me/razblok_bot");
        let mut prompt = Vec::new();

        let input = "7\nХочу скидку\n/quit\nНужна консультация\n";

        read_choices(&engine, input.as_bytes(), &mut prompt)
            .await
            .unwrap();

        assert_eq!(String::from_utf8(prompt).unwrap(), "> > > ");
        assert_eq!(engine.messages().await.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn choice_while_typing_is_silent() {
        let engine = DialogueEngine::new(TypingTiming::default(), "https://t.me/razblok_bot");
        let mut prompt = Vec::new();

        read_choices(&engine, "1\nНужна консультация\n".as_bytes(), &mut prompt)
            .await
            .unwrap();

        assert_eq!(String::from_utf8(prompt).unwrap(), "> > > ");
        assert_eq!(
            engine.phase().await,
            crate::dialogue::TypingPhase::AwaitingFirstAppend
        );
    }

    #[tokio::test]
    async fn greeting_renders_numbered_options() {
        let engine = DialogueEngine::new(TypingTiming::default(), "https://t.me/razblok_bot");
        let rendered = render_message(&engine.messages().await[0]);
        assert!(rendered.starts_with("РАЗБЛОК: Привет!"));
        assert!(rendered.contains("[1] Счет заблокировали"));
        assert!(rendered.contains("[3] Нужна консультация"));
    }
}
