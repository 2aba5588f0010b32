use serde::{Deserialize, Serialize};

use crate::agent::AgentInputItem;

/// Who produced a chat turn. `System` turns are local only (error notices
/// and the like) and never reach the agent service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
}

/// One message of a conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: Role,
    pub content: String,
}

impl ChatTurn {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }
}

/// Convert prior turns into agent input items, keeping their order and
/// dropping `system` turns.
pub fn to_agent_input(turns: &[ChatTurn]) -> Vec<AgentInputItem> {
    turns.iter().filter_map(to_agent_item).collect()
}

fn to_agent_item(turn: &ChatTurn) -> Option<AgentInputItem> {
    match turn.role {
        Role::User => Some(AgentInputItem::user(turn.content.as_str())),
        Role::Assistant => Some(AgentInputItem::assistant(turn.content.as_str())),
        Role::System => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mixed_history() -> Vec<ChatTurn> {
        vec![
            ChatTurn::user("React vs Vue"),
            ChatTurn::assistant("Both are fine."),
            ChatTurn::system("Error: network down"),
            ChatTurn::user(""),
            ChatTurn::system("Error: again"),
            ChatTurn::assistant("Second answer"),
        ]
    }

    #[test]
    fn test_empty_history() {
        assert!(to_agent_input(&[]).is_empty());
    }

    #[test]
    fn test_drops_only_system_turns_in_order() {
        let turns = mixed_history();
        let items = to_agent_input(&turns);

        let kept: Vec<&ChatTurn> = turns.iter().filter(|t| t.role != Role::System).collect();
        assert_eq!(items.len(), kept.len());
        for (item, turn) in items.iter().zip(kept) {
            assert_eq!(item.text(), turn.content);
            assert_eq!(item.is_user(), turn.role == Role::User);
        }
    }

    #[test]
    fn test_assistant_items_are_completed() {
        let items = to_agent_input(&mixed_history());
        for item in items.iter().filter(|i| !i.is_user()) {
            assert!(item.is_completed());
        }
    }

    #[test]
    fn test_content_is_verbatim() {
        let text = "  Next.js 15の新機能\n\t**bold**  ";
        let items = to_agent_input(&[ChatTurn::user(text), ChatTurn::assistant(text)]);
        assert_eq!(items[0].text(), text);
        assert_eq!(items[1].text(), text);
    }

    #[test]
    fn test_only_system_turns() {
        let turns = vec![ChatTurn::system("a"), ChatTurn::system("b")];
        assert!(to_agent_input(&turns).is_empty());
    }

    #[test]
    fn test_turn_wire_format() {
        let turn: ChatTurn =
            serde_json::from_str(r#"{"role":"assistant","content":"hi"}"#).unwrap();
        assert_eq!(turn, ChatTurn::assistant("hi"));
        assert!(serde_json::from_str::<ChatTurn>(r#"{"role":"tool","content":"x"}"#).is_err());
    }
}
