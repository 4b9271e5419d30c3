//! Ordered chat transcript with one controller-owned open slot.
//!
//! While a session streams, the assistant row appended at session start is the
//! open slot. Chunk application is the only mutation allowed on it; every
//! other edit that would touch it is rejected with [`MutationError`].

use std::ops::Range;

use chatbench_models::{Message, Role};
use thiserror::Error;

/// Rejected transcript edit.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MutationError {
    #[error("message {index} is not the last message (transcript has {len})")]
    NotLast { index: usize, len: usize },

    #[error("message {index} is not an assistant message")]
    NotAssistant { index: usize },

    #[error("message {index} is being streamed")]
    OpenSlot { index: usize },

    #[error("range {start}..{end} is out of bounds (transcript has {len})")]
    OutOfBounds { start: usize, end: usize, len: usize },

    #[error("range {start}..{end} overlaps the streaming message at {slot}")]
    OverlapsOpenSlot { start: usize, end: usize, slot: usize },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transcript {
    messages: Vec<Message>,
    open_slot: Option<usize>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_messages(messages: Vec<Message>) -> Self {
        Self {
            messages,
            open_slot: None,
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Message> {
        self.messages.get(index)
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// Index of the message currently being streamed, if any.
    pub fn open_slot(&self) -> Option<usize> {
        self.open_slot
    }

    /// Push a message to the end and return its index.
    pub fn append(&mut self, message: Message) -> usize {
        self.messages.push(message);
        self.messages.len() - 1
    }

    /// Overwrite the content of the last message, which must be an
    /// assistant reply that is not being streamed.
    pub fn replace_content_at(
        &mut self,
        index: usize,
        content: impl Into<String>,
    ) -> Result<(), MutationError> {
        let len = self.messages.len();
        if len == 0 || index != len - 1 {
            return Err(MutationError::NotLast { index, len });
        }
        if self.open_slot == Some(index) {
            return Err(MutationError::OpenSlot { index });
        }
        let message = &mut self.messages[index];
        if message.role != Role::Assistant {
            return Err(MutationError::NotAssistant { index });
        }
        message.content = content.into();
        Ok(())
    }

    /// Remove `range`, returning the removed messages.
    ///
    /// Rows before the open slot may be removed; the slot index follows them.
    pub fn remove_range(&mut self, range: Range<usize>) -> Result<Vec<Message>, MutationError> {
        let Range { start, end } = range;
        let len = self.messages.len();
        if start > end || end > len {
            return Err(MutationError::OutOfBounds { start, end, len });
        }
        if let Some(slot) = self.open_slot {
            if (start..end).contains(&slot) {
                return Err(MutationError::OverlapsOpenSlot { start, end, slot });
            }
            if slot >= end {
                self.open_slot = Some(slot - (end - start));
            }
        }
        Ok(self.messages.drain(start..end).collect())
    }

    /// Remove the message at `index` and everything after it.
    pub fn remove_from(&mut self, index: usize) -> Result<Vec<Message>, MutationError> {
        self.remove_range(index..self.messages.len().max(index))
    }

    /// Non-system rows, in order.
    pub fn conversation(&self) -> Vec<Message> {
        self.messages
            .iter()
            .filter(|m| m.role != Role::System)
            .cloned()
            .collect()
    }

    /// Replace the whole transcript with `outbound` plus an empty assistant
    /// row, which becomes the open slot.
    pub(crate) fn begin_session(&mut self, outbound: Vec<Message>) -> usize {
        self.messages = outbound;
        let slot = self.append(Message::assistant(""));
        self.open_slot = Some(slot);
        slot
    }

    pub(crate) fn apply_chunk(&mut self, chunk: &str) -> bool {
        match self.open_slot.and_then(|slot| self.messages.get_mut(slot)) {
            Some(message) => {
                message.content.push_str(chunk);
                true
            }
            None => false,
        }
    }

    pub(crate) fn close_slot(&mut self) -> Option<usize> {
        self.open_slot.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Transcript {
        Transcript::from_messages(vec![
            Message::system("sys"),
            Message::user("hi"),
            Message::assistant("hello"),
        ])
    }

    #[test]
    fn test_replace_last_assistant() {
        let mut transcript = sample();
        transcript.replace_content_at(2, "edited").unwrap();
        assert_eq!(transcript.last().unwrap().content, "edited");
    }

    #[test]
    fn test_replace_rejects_non_last_index() {
        let mut transcript = sample();
        assert_eq!(
            transcript.replace_content_at(1, "x"),
            Err(MutationError::NotLast { index: 1, len: 3 })
        );
        assert_eq!(transcript, sample());
    }

    #[test]
    fn test_replace_rejects_user_row() {
        let mut transcript = sample();
        transcript.append(Message::user("again"));
        assert_eq!(
            transcript.replace_content_at(3, "x"),
            Err(MutationError::NotAssistant { index: 3 })
        );
    }

    #[test]
    fn test_replace_rejects_open_slot() {
        let mut transcript = Transcript::new();
        let slot = transcript.begin_session(vec![Message::system("s"), Message::user("u")]);
        assert_eq!(
            transcript.replace_content_at(slot, "x"),
            Err(MutationError::OpenSlot { index: slot })
        );
    }

    #[test]
    fn test_replace_on_empty_transcript() {
        let mut transcript = Transcript::new();
        assert!(matches!(
            transcript.replace_content_at(0, "x"),
            Err(MutationError::NotLast { .. })
        ));
    }

    #[test]
    fn test_remove_range_out_of_bounds() {
        let mut transcript = sample();
        assert_eq!(
            transcript.remove_range(1..5),
            Err(MutationError::OutOfBounds {
                start: 1,
                end: 5,
                len: 3
            })
        );
    }

    #[test]
    fn test_remove_range_shifts_open_slot() {
        let mut transcript = Transcript::new();
        transcript.begin_session(vec![
            Message::system("s"),
            Message::user("a"),
            Message::user("b"),
        ]);
        assert_eq!(transcript.open_slot(), Some(3));

        let removed = transcript.remove_range(1..3).unwrap();
        assert_eq!(removed.len(), 2);
        assert_eq!(transcript.open_slot(), Some(1));

        assert!(transcript.apply_chunk("ok"));
        assert_eq!(transcript.get(1).unwrap().content, "ok");
    }

    #[test]
    fn test_remove_range_rejects_open_slot() {
        let mut transcript = Transcript::new();
        transcript.begin_session(vec![Message::system("s"), Message::user("a")]);
        assert!(matches!(
            transcript.remove_range(1..3),
            Err(MutationError::OverlapsOpenSlot { slot: 2, .. })
        ));
        assert_eq!(transcript.len(), 3);
    }

    #[test]
    fn test_remove_from_drops_tail() {
        let mut transcript = sample();
        let removed = transcript.remove_from(1).unwrap();
        assert_eq!(removed.len(), 2);
        assert_eq!(transcript.len(), 1);
        assert!(transcript.remove_from(1).unwrap().is_empty());
        assert!(transcript.remove_from(4).is_err());
    }

    #[test]
    fn test_conversation_skips_system_rows() {
        let conversation = sample().conversation();
        assert_eq!(conversation.len(), 2);
        assert!(conversation.iter().all(|m| m.role != Role::System));
    }

    #[test]
    fn test_chunks_ignored_without_open_slot() {
        let mut transcript = sample();
        assert!(!transcript.apply_chunk("x"));
        assert_eq!(transcript, sample());
    }
}
