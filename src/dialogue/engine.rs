//! Dialogue engine — plays scripted scenarios into an append-only transcript.

use std::sync::Arc;

use tokio::sync::{RwLock, broadcast};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use super::model::{DialogueEvent, Message, Selection, Snapshot};
use super::script::{self, EdgeTarget, NodeId};
use super::state::TypingPhase;
use crate::config::TypingTiming;

/// Default broadcast channel capacity.
const DEFAULT_BROADCAST_CAPACITY: usize = 64;

/// Mutable part of a conversation.
struct Conversation {
    messages: Vec<Message>,
    phase: TypingPhase,
    /// Bumped on restart so timers of an abandoned scenario become no-ops.
    generation: u64,
    pending: Option<JoinHandle<()>>,
}

impl Conversation {
    fn fresh(generation: u64) -> Self {
        Self {
            messages: vec![Message::bot(1, NodeId::START)],
            phase: TypingPhase::Idle,
            generation,
            pending: None,
        }
    }

    fn next_id(&self) -> u64 {
        self.messages.len() as u64 + 1
    }
}

/// Which message a timer step appends.
#[derive(Debug, Clone, Copy)]
enum Append {
    Echo(NodeId),
    Reply(NodeId),
}

/// One visitor's scripted conversation.
///
/// Picking an option resolves it against the edges of the last bot reply and
/// plays the scenario in a background task: typing, echo, pause, typing,
/// reply. Every change is broadcast as a [`DialogueEvent`].
pub struct DialogueEngine {
    timing: TypingTiming,
    external_url: String,
    conversation: RwLock<Conversation>,
    tx: broadcast::Sender<DialogueEvent>,
}

impl DialogueEngine {
    /// Create an engine with the greeting preloaded.
    pub fn new(timing: TypingTiming, external_url: impl Into<String>) -> Arc<Self> {
        let (tx, _rx) = broadcast::channel(DEFAULT_BROADCAST_CAPACITY);
        Arc::new(Self {
            timing,
            external_url: external_url.into(),
            conversation: RwLock::new(Conversation::fresh(0)),
            tx,
        })
    }

    /// Subscribe to live events.
    pub fn subscribe(&self) -> broadcast::Receiver<DialogueEvent> {
        self.tx.subscribe()
    }

    /// Copy of the transcript.
    pub async fn messages(&self) -> Vec<Message> {
        self.conversation.read().await.messages.clone()
    }

    /// Current phase of the append sequence.
    pub async fn phase(&self) -> TypingPhase {
        self.conversation.read().await.phase
    }

    /// Whether the typing indicator is showing.
    pub async fn is_typing(&self) -> bool {
        self.phase().await.is_typing()
    }

    /// Transcript, typing flag and the options that can be picked now.
    pub async fn snapshot(&self) -> Snapshot {
        let conv = self.conversation.read().await;
        let options = if conv.phase.accepts_selection() {
            conv.messages
                .last()
                .map(|m| m.options.clone())
                .unwrap_or_default()
        } else {
            Vec::new()
        };
        Snapshot {
            messages: conv.messages.clone(),
            typing: conv.phase.is_typing(),
            options,
        }
    }

    /// Pick an option by its label.
    ///
    /// Restart and the external link are honored from any state. Any other
    /// label must be offered by the last bot reply and no scenario may be
    /// playing; otherwise the choice is ignored without a trace beyond debug.
    pub async fn select_option(self: &Arc<Self>, label: &str) -> Selection {
        match script::reserved(label) {
            Some(EdgeTarget::Restart) => {
                self.restart().await;
                return Selection::Restarted;
            }
            Some(EdgeTarget::External) => {
                info!(url = %self.external_url, "Opening external chat");
                let url = self.external_url.clone();
                let _ = self.tx.send(DialogueEvent::OpenExternal { url: url.clone() });
                return Selection::OpenExternal { url };
            }
            _ => {}
        }

        let mut conv = self.conversation.write().await;

        if !conv.phase.accepts_selection() {
            debug!(label, phase = %conv.phase, "Ignoring choice while bot is typing");
            return Selection::Ignored;
        }

        let target = conv
            .messages
            .last()
            .and_then(|m| m.node)
            .and_then(|node| node.edge(label))
            .map(|edge| edge.target);

        let next = match target {
            Some(EdgeTarget::Advance(node)) => node,
            _ => {
                debug!(label, "Ignoring unrecognized choice");
                return Selection::Ignored;
            }
        };

        conv.phase = conv.phase.next();
        let _ = self.tx.send(DialogueEvent::Typing { active: true });

        let generation = conv.generation;
        let engine = Arc::clone(self);
        conv.pending = Some(tokio::spawn(async move {
            engine.play(generation, next).await;
        }));

        debug!(label, node = ?next, "Scenario scheduled");
        Selection::Scheduled
    }

    /// Reset the transcript to the greeting, abandoning any scenario in flight.
    pub async fn restart(&self) {
        let mut conv = self.conversation.write().await;
        let was_typing = conv.phase.is_typing();
        if let Some(handle) = conv.pending.take() {
            handle.abort();
        }
        let generation = conv.generation + 1;
        *conv = Conversation::fresh(generation);

        let _ = self.tx.send(DialogueEvent::Reset {
            messages: conv.messages.clone(),
        });
        if was_typing {
            let _ = self.tx.send(DialogueEvent::Typing { active: false });
        }
        debug!(generation = conv.generation, "Conversation restarted");
    }

    /// Timer steps of one scenario.
    async fn play(&self, generation: u64, node: NodeId) {
        tokio::time::sleep(self.timing.echo_delay).await;
        if !self.step(generation, Some(Append::Echo(node))).await {
            return;
        }

        tokio::time::sleep(self.timing.pause).await;
        if !self.step(generation, None).await {
            return;
        }

        tokio::time::sleep(self.timing.reply_delay).await;
        self.step(generation, Some(Append::Reply(node))).await;
    }

    /// Advance the phase by one timer step. Returns false if the scenario
    /// was abandoned in the meantime.
    async fn step(&self, generation: u64, append: Option<Append>) -> bool {
        let mut conv = self.conversation.write().await;
        if conv.generation != generation {
            return false;
        }

        let next = conv.phase.next();
        debug_assert!(conv.phase.can_transition_to(next));
        conv.phase = next;

        if let Some(append) = append {
            let id = conv.next_id();
            let message = match append {
                Append::Echo(node) => Message::echo(id, node),
                Append::Reply(node) => Message::bot(id, node),
            };
            conv.messages.push(message.clone());
            let _ = self.tx.send(DialogueEvent::Message { message });
        }

        let _ = self.tx.send(DialogueEvent::Typing {
            active: next.is_typing(),
        });

        if next == TypingPhase::Idle {
            conv.pending = None;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::dialogue::model::Author;
    use crate::dialogue::script::{EXTERNAL_LABEL, RESTART_LABEL};

    const CHAT_URL: &str = "https://t.me/razblok_bot";

    fn engine() -> Arc<DialogueEngine> {
        DialogueEngine::new(TypingTiming::default(), CHAT_URL)
    }

    /// Let every timer of a scenario fire.
    async fn settle() {
        tokio::time::sleep(TypingTiming::default().total() + Duration::from_millis(1)).await;
    }

    async fn texts(engine: &DialogueEngine) -> Vec<String> {
        engine.messages().await.into_iter().map(|m| m.text).collect()
    }

    #[tokio::test(start_paused = true)]
    async fn starts_with_greeting() {
        let engine = engine();
        let snapshot = engine.snapshot().await;
        assert_eq!(snapshot.messages.len(), 1);
        assert_eq!(snapshot.messages[0].id, 1);
        assert!(snapshot.messages[0].is_bot());
        assert!(!snapshot.typing);
        assert_eq!(
            snapshot.options,
            vec![
                "Счет заблокировали",
                "Хочу проверить операцию",
                "Нужна консультация"
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn timers_fire_in_order() {
        let engine = engine();
        assert_eq!(
            engine.select_option("Нужна консультация").await,
            Selection::Scheduled
        );
        assert_eq!(engine.phase().await, TypingPhase::AwaitingFirstAppend);
        assert!(engine.snapshot().await.options.is_empty());

        tokio::time::sleep(Duration::from_millis(299)).await;
        assert_eq!(engine.messages().await.len(), 1);
        assert!(engine.is_typing().await);

        tokio::time::sleep(Duration::from_millis(2)).await; // t = 301
        let messages = engine.messages().await;
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[1].author, Author::User);
        assert_eq!(messages[1].text, "Нужна консультация");
        assert_eq!(engine.phase().await, TypingPhase::AwaitingSecondTypingStart);
        assert!(!engine.is_typing().await);

        tokio::time::sleep(Duration::from_millis(500)).await; // t = 801
        assert_eq!(engine.phase().await, TypingPhase::AwaitingSecondAppend);
        assert!(engine.is_typing().await);
        assert_eq!(engine.messages().await.len(), 2);

        tokio::time::sleep(Duration::from_millis(1000)).await; // t = 1801
        let messages = engine.messages().await;
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[2].author, Author::Bot);
        assert_eq!(messages[2].id, 3);
        assert_eq!(engine.phase().await, TypingPhase::Idle);
        assert_eq!(
            engine.snapshot().await.options,
            vec![EXTERNAL_LABEL, RESTART_LABEL]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn law_115_path_yields_seven_messages() {
        let engine = engine();
        for label in ["Счет заблокировали", "115-ФЗ", "Получил оплату от клиента"] {
            assert_eq!(engine.select_option(label).await, Selection::Scheduled);
            settle().await;
        }

        let messages = engine.messages().await;
        assert_eq!(messages.len(), 7);
        let ids: Vec<u64> = messages.iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5, 6, 7]);

        let authors: Vec<Author> = messages.iter().map(|m| m.author).collect();
        use Author::*;
        assert_eq!(authors, vec![Bot, User, Bot, User, Bot, User, Bot]);

        let texts = texts(&engine).await;
        assert_eq!(texts[1], "Счет заблокировали");
        assert_eq!(texts[3], "115-ФЗ");
        assert_eq!(texts[5], "Получил оплату от клиента");
        assert!(texts[6].starts_with("Вижу проблему!"));
        assert_eq!(
            messages[6].options,
            vec!["Открыть в Telegram", "Начать заново"]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn unknown_labels_leave_transcript_unchanged() {
        let engine = engine();
        for label in ["", "hello", "115-ФЗ", "Снял наличные", "счет заблокировали"] {
            assert_eq!(engine.select_option(label).await, Selection::Ignored);
        }
        settle().await;
        assert_eq!(engine.messages().await.len(), 1);
        assert_eq!(engine.phase().await, TypingPhase::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn unscripted_choice_is_a_no_op() {
        let engine = engine();
        engine.select_option("Счет заблокировали").await;
        settle().await;
        let before = texts(&engine).await;

        assert_eq!(engine.select_option("161-ФЗ").await, Selection::Ignored);
        assert_eq!(engine.select_option("Служба безопасности").await, Selection::Ignored);
        settle().await;
        assert_eq!(texts(&engine).await, before);
    }

    #[tokio::test(start_paused = true)]
    async fn choices_are_ignored_while_a_scenario_plays() {
        let engine = engine();
        engine.select_option("Счет заблокировали").await;
        assert_eq!(
            engine.select_option("Хочу проверить операцию").await,
            Selection::Ignored
        );
        settle().await;
        assert_eq!(engine.messages().await.len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn restart_from_any_state_yields_greeting() {
        let engine = engine();
        let greeting = texts(&engine).await;

        // From the greeting itself.
        assert_eq!(engine.select_option(RESTART_LABEL).await, Selection::Restarted);
        assert_eq!(texts(&engine).await, greeting);

        // From a terminal node.
        engine.select_option("Хочу проверить операцию").await;
        settle().await;
        assert_eq!(engine.messages().await.len(), 3);
        engine.select_option(RESTART_LABEL).await;
        let snapshot = engine.snapshot().await;
        assert_eq!(snapshot.messages.len(), 1);
        assert_eq!(snapshot.options.len(), 3);

        // Mid-scenario, after the echo landed: nothing stale may follow.
        engine.select_option("Счет заблокировали").await;
        tokio::time::sleep(Duration::from_millis(400)).await;
        assert_eq!(engine.messages().await.len(), 2);
        engine.select_option(RESTART_LABEL).await;
        assert!(!engine.is_typing().await);
        settle().await;
        assert_eq!(texts(&engine).await, greeting);
        assert_eq!(engine.phase().await, TypingPhase::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn external_link_never_touches_transcript() {
        let engine = engine();
        let mut rx = engine.subscribe();

        let outcome = engine.select_option(EXTERNAL_LABEL).await;
        assert_eq!(
            outcome,
            Selection::OpenExternal {
                url: CHAT_URL.to_string()
            }
        );
        assert_eq!(engine.messages().await.len(), 1);

        match rx.recv().await.unwrap() {
            DialogueEvent::OpenExternal { url } => assert_eq!(url, CHAT_URL),
            other => panic!("Expected OpenExternal, got {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn events_follow_the_typing_sequence() {
        let engine = engine();
        let mut rx = engine.subscribe();

        engine.select_option("Нужна консультация").await;
        settle().await;

        let mut kinds = Vec::new();
        while let Ok(event) = rx.try_recv() {
            kinds.push(match event {
                DialogueEvent::Typing { active: true } => "typing_on",
                DialogueEvent::Typing { active: false } => "typing_off",
                DialogueEvent::Message { message } if message.is_bot() => "bot",
                DialogueEvent::Message { .. } => "user",
                DialogueEvent::Reset { .. } => "reset",
                DialogueEvent::OpenExternal { .. } => "external",
            });
        }
        assert_eq!(
            kinds,
            vec!["typing_on", "user", "typing_off", "typing_on", "bot", "typing_off"]
        );
    }
}
