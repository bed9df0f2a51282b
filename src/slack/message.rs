use crate::{alert::Alert, report::CommandResultSet};
use serde::{Serialize, Serializer};

/// One Slack block
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatBlock {
    Header(String),
    Section(String),
}

impl Serialize for ChatBlock {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        #[derive(Serialize)]
        struct Text<'a> {
            #[serde(rename = "type")]
            kind: &'static str,
            text: &'a str,
        }

        #[derive(Serialize)]
        struct Block<'a> {
            #[serde(rename = "type")]
            kind: &'static str,
            text: Text<'a>,
        }

        let (kind, text_kind, text) = match self {
            ChatBlock::Header(text) => ("header", "plain_text", text),
            ChatBlock::Section(text) => ("section", "mrkdwn", text),
        };

        Block {
            kind,
            text: Text {
                kind: text_kind,
                text,
            },
        }
        .serialize(serializer)
    }
}

#[derive(Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct ChatMessage {
    pub blocks: Vec<ChatBlock>,
}

/// Build the message for an alert: its description, then a title and a code
/// block for each command, in the order the agent returned them
pub fn format_report(alert: &Alert, report: &CommandResultSet) -> ChatMessage {
    let mut blocks = Vec::with_capacity(1 + report.len() * 2);

    blocks.push(ChatBlock::Header(alert.annotations.description.clone()));

    for command in &report.commands {
        blocks.push(ChatBlock::Section(format!("*{}*", command.title)));
        blocks.push(ChatBlock::Section(format!("```{}```", command.output)));
    }

    ChatMessage { blocks }
}
