//! The scripted conversation as a graph of dialogue nodes.
//!
//! Every node is one bot reply together with the user choice that leads to
//! it. Edges carry the option labels shown under the reply and what picking
//! each of them does.

use serde::Serialize;

/// Label of the option that starts the conversation over.
pub const RESTART_LABEL: &str = "Начать заново";

/// Label of the option that continues the conversation in Telegram.
pub const EXTERNAL_LABEL: &str = "Открыть в Telegram";

/// A dialogue state. Each variant owns one bot reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeId {
    Greeting,
    AccountBlocked,
    Law115,
    PaymentReceived,
    CheckOperation,
    Consultation,
}

/// What happens when an option is picked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeTarget {
    /// Play the scenario leading into another node.
    Advance(NodeId),
    /// Reset the transcript to the greeting.
    Restart,
    /// Leave the page for the external chat.
    External,
    /// Offered but unscripted; picking it does nothing.
    Unscripted,
}

/// An option under a bot reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge {
    pub label: &'static str,
    pub target: EdgeTarget,
}

const fn advance(label: &'static str, node: NodeId) -> Edge {
    Edge {
        label,
        target: EdgeTarget::Advance(node),
    }
}

const fn unscripted(label: &'static str) -> Edge {
    Edge {
        label,
        target: EdgeTarget::Unscripted,
    }
}

const CLOSING_EDGES: [Edge; 2] = [
    Edge {
        label: EXTERNAL_LABEL,
        target: EdgeTarget::External,
    },
    Edge {
        label: RESTART_LABEL,
        target: EdgeTarget::Restart,
    },
];

const GREETING_EDGES: [Edge; 3] = [
    advance("Счет заблокировали", NodeId::AccountBlocked),
    advance("Хочу проверить операцию", NodeId::CheckOperation),
    advance("Нужна консультация", NodeId::Consultation),
];

const ACCOUNT_BLOCKED_EDGES: [Edge; 3] = [
    advance("115-ФЗ", NodeId::Law115),
    unscripted("161-ФЗ"),
    unscripted("Служба безопасности"),
];

const LAW_115_EDGES: [Edge; 3] = [
    advance("Получил оплату от клиента", NodeId::PaymentReceived),
    unscripted("Перевел деньги партнеру"),
    unscripted("Снял наличные"),
];

impl NodeId {
    /// Where every conversation starts.
    pub const START: NodeId = NodeId::Greeting;

    /// The user's echoed choice that precedes this node's reply.
    ///
    /// `None` for the greeting, which is never reached through a choice.
    pub fn echo(&self) -> Option<&'static str> {
        match self {
            Self::Greeting => None,
            Self::AccountBlocked => Some("Счет заблокировали"),
            Self::Law115 => Some("115-ФЗ"),
            Self::PaymentReceived => Some("Получил оплату от клиента"),
            Self::CheckOperation => Some("Хочу проверить операцию"),
            Self::Consultation => Some("Нужна консультация"),
        }
    }

    /// The bot's reply text.
    pub fn reply(&self) -> &'static str {
        match self {
            Self::Greeting => {
                "Привет! Я РАЗБЛОК — помогу разобраться с блокировкой счета. Расскажи, что случилось?"
            }
            Self::AccountBlocked => {
                "Понимаю, что сейчас паника. Сейчас разберемся! Скажи, что написано в уведомлении от банка? \"115-ФЗ\", \"161-ФЗ\" или \"служба безопасности\"?"
            }
            Self::Law115 => {
                "Ясно! Это блокировка по закону о противодействии отмыванию денег. Обычно причины:\n\n\
                 • \"Транзитные\" операции (пришло → сразу ушло)\n\
                 • Подозрительные контрагенты\n\
                 • Операции без экономического смысла\n\n\
                 Сейчас узнаю детали. Какая была последняя крупная операция по счету?"
            }
            Self::PaymentReceived => {
                "Вижу проблему! Банк подозревает \"транзитность\": деньги пришли и сразу ушли. Это классическая причина блокировки.\n\n\
                 ✅ Что нужно сделать:\n\n\
                 1. Подготовить договор с клиентом\n\
                 2. Показать акт выполненных работ\n\
                 3. Объяснить экономический смысл операции\n\n\
                 Я сгенерирую все документы за 5 минут. Продолжим в Telegram?"
            }
            Self::CheckOperation => {
                "Отлично! Проверка до блокировки — лучшая стратегия 🛡️\n\n\
                 Расскажи об операции:\n\
                 • Сумма\n\
                 • Кому отправляешь\n\
                 • За что (назначение платежа)\n\n\
                 Я проанализирую риски по базе 115-ФЗ."
            }
            Self::Consultation => {
                "Конечно! Я отвечу на любые вопросы по 115-ФЗ:\n\n\
                 • Почему блокируют счета\n\
                 • Как избежать блокировки\n\
                 • Что делать, если уже заблокировали\n\
                 • Как правильно оформлять операции\n\n\
                 Задай свой вопрос в Telegram — отвечу за 30 секунд!"
            }
        }
    }

    /// Options offered under this node's reply, in display order.
    pub fn edges(&self) -> &'static [Edge] {
        match self {
            Self::Greeting => &GREETING_EDGES,
            Self::AccountBlocked => &ACCOUNT_BLOCKED_EDGES,
            Self::Law115 => &LAW_115_EDGES,
            Self::PaymentReceived | Self::CheckOperation | Self::Consultation => &CLOSING_EDGES,
        }
    }

    /// Option labels in display order.
    pub fn option_labels(&self) -> Vec<String> {
        self.edges().iter().map(|e| e.label.to_string()).collect()
    }

    /// Find the edge with exactly this label.
    pub fn edge(&self, label: &str) -> Option<Edge> {
        self.edges().iter().find(|e| e.label == label).copied()
    }

    /// Every node in the script.
    pub fn all() -> [NodeId; 6] {
        [
            Self::Greeting,
            Self::AccountBlocked,
            Self::Law115,
            Self::PaymentReceived,
            Self::CheckOperation,
            Self::Consultation,
        ]
    }
}

/// How a picked label resolves, independent of where the conversation is.
///
/// Restart and external link are recognized from any state.
pub fn reserved(label: &str) -> Option<EdgeTarget> {
    match label {
        RESTART_LABEL => Some(EdgeTarget::Restart),
        EXTERNAL_LABEL => Some(EdgeTarget::External),
        _ => None,
    }
}
