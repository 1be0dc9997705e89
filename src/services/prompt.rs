use crate::models::{ConversationTurn, RetrievedChunk};

/// How many history turns are kept in the prompt window.
pub const HISTORY_WINDOW: usize = 5;

/// How many retrieved chunks are rendered into the prompt.
pub const CONTEXT_CHUNKS: usize = 3;

/// System instructions for the chat advisor.
pub const SYSTEM_PROMPT: &str = "你是一位专业的护肤顾问AI助手，拥有丰富的护肤品知识。你的任务是：

1. 基于EWG（Environmental Working Group）护肤品数据库的信息，为用户提供专业、准确的护肤建议
2. 根据用户的肤质、问题和需求，推荐合适的护肤品
3. 解释产品成分及其功效
4. 提供科学的护肤步骤和使用建议
5. 回答要友好、专业，用中文回答

重要原则：
- 只推荐数据库中有的产品
- 说明推荐理由（成分、功效等）
- 提醒可能的注意事项（如敏感成分、使用顺序等）
- 如果不确定，诚实告知用户";

/// Instructions for the vision analysis, asking for the exact section layout
/// the analysis parser understands.
pub const VISION_PROMPT: &str = "你是一位专业的皮肤分析师。请仔细分析这张皮肤照片，并提供详细的分析报告。

请按以下格式回答：

**肤质类型**: [干性/油性/混合性/敏感性/中性]

**主要问题**:
- [问题1]
- [问题2]
- [问题3]

**护肤建议**:
1. [建议1]
2. [建议2]
3. [建议3]

**产品关键词**: [用于搜索产品的关键词，用逗号分隔]

请用中文回答，专业且友好。";

/// Assemble the bounded prompt handed to the completion service: system
/// instructions first, then a window of history, then the current message
/// with the retrieved context appended. Performs no I/O.
pub fn build_prompt(
    system_instructions: &str,
    history: &[ConversationTurn],
    retrieved: &[RetrievedChunk],
    current_message: &str,
) -> Vec<ConversationTurn> {
    let mut messages = vec![ConversationTurn::system(system_instructions)];

    let window_start = history.len().saturating_sub(HISTORY_WINDOW);
    for turn in &history[window_start..] {
        if !turn.content.is_empty() {
            messages.push(turn.clone());
        }
    }

    let content = format!("{}\n{}", current_message, render_context(retrieved));
    messages.push(ConversationTurn::user(content));

    messages
}

/// Render up to [`CONTEXT_CHUNKS`] retrieved chunks as a numbered block, with
/// a source line when the chunk carries one.
pub fn render_context(retrieved: &[RetrievedChunk]) -> String {
    let mut block = String::from("\n\n相关护肤品信息：\n");

    for (i, chunk) in retrieved.iter().take(CONTEXT_CHUNKS).enumerate() {
        block.push_str(&format!("\n{}. {}\n", i + 1, chunk.text));
        if let Some(book) = chunk.metadata.get("book") {
            block.push_str(&format!("   来源: {}\n", book));
        }
    }

    block
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn chunk(text: &str, book: Option<&str>) -> RetrievedChunk {
        let mut metadata = HashMap::new();
        if let Some(book) = book {
            metadata.insert("book".to_string(), book.to_string());
        }
        RetrievedChunk {
            text: text.to_string(),
            metadata,
            distance: 0.2,
        }
    }

    #[test]
    fn system_instructions_come_first() {
        let prompt = build_prompt(SYSTEM_PROMPT, &[], &[], "求推荐洁面");
        assert_eq!(prompt[0].role, crate::models::Role::System);
        assert_eq!(prompt[0].content, SYSTEM_PROMPT);
    }

    #[test]
    fn history_is_windowed_to_last_five_turns() {
        let history: Vec<ConversationTurn> = (0..8)
            .map(|i| ConversationTurn::user(format!("turn {}", i)))
            .collect();

        let prompt = build_prompt("sys", &history, &[], "current");
        // system + 5 history + current
        assert_eq!(prompt.len(), 7);
        assert_eq!(prompt[1].content, "turn 3");
        assert_eq!(prompt[5].content, "turn 7");
    }

    #[test]
    fn empty_history_turns_are_skipped() {
        let history = vec![
            ConversationTurn::user("question"),
            ConversationTurn::assistant(""),
            ConversationTurn::user("another"),
        ];

        let prompt = build_prompt("sys", &history, &[], "current");
        assert_eq!(prompt.len(), 4);
        assert!(prompt.iter().all(|t| !t.content.is_empty()));
    }

    #[test]
    fn final_turn_carries_message_and_context() {
        let retrieved = vec![chunk("深层清洁洁面乳", Some("Foam Wash"))];
        let prompt = build_prompt("sys", &[], &retrieved, "求推荐洁面");

        let last = prompt.last().unwrap();
        assert_eq!(last.role, crate::models::Role::User);
        assert!(last.content.starts_with("求推荐洁面"));
        assert!(last.content.contains("相关护肤品信息"));
        assert!(last.content.contains("1. 深层清洁洁面乳"));
        assert!(last.content.contains("来源: Foam Wash"));
    }

    #[test]
    fn context_block_caps_at_three_chunks() {
        let retrieved: Vec<RetrievedChunk> = (0..5)
            .map(|i| chunk(&format!("chunk {}", i), None))
            .collect();

        let block = render_context(&retrieved);
        assert!(block.contains("3. chunk 2"));
        assert!(!block.contains("4. chunk 3"));
    }
}
