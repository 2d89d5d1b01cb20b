//! Newest-first message buffer for one open conversation.
//!
//! Index 0 is always the most recent known message. Server ids are unique
//! within the buffer; temporary ids mark optimistic sends until they are
//! reconciled or rolled back.

use std::collections::HashSet;

use super::message::{DisplayMessage, MessageId};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ConversationBuffer {
    entries: Vec<DisplayMessage>,
}

impl ConversationBuffer {
    pub fn messages(&self) -> &[DisplayMessage] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, id: &MessageId) -> bool {
        self.position(id).is_some()
    }

    /// Replaces the contents with a first page, kept in server order.
    pub fn initial_load(&mut self, records: Vec<DisplayMessage>) {
        self.entries = dedup_by_id(records, &HashSet::new());
    }

    /// Appends an older page at the tail.
    pub fn append_older(&mut self, records: Vec<DisplayMessage>) {
        let known = self.known_server_ids();
        let older = dedup_by_id(records, &known);
        self.entries.extend(older);
    }

    /// Prepends records not yet buffered, preserving their relative order.
    /// Returns the number of entries added.
    pub fn merge_newer(&mut self, records: Vec<DisplayMessage>) -> usize {
        let known = self.known_server_ids();
        let fresh = dedup_by_id(records, &known);
        let added = fresh.len();

        if added > 0 {
            self.entries.splice(0..0, fresh);
        }

        added
    }

    pub fn insert_optimistic(&mut self, draft: DisplayMessage) {
        self.entries.insert(0, draft);
    }

    /// Replaces the optimistic entry in place with its confirmed record.
    /// Returns false when `temp_id` is not buffered.
    pub fn reconcile(&mut self, temp_id: &MessageId, real: DisplayMessage) -> bool {
        let Some(index) = self.position(temp_id) else {
            return false;
        };

        if self.contains(&real.id) {
            // A poll already delivered the confirmed record.
            self.entries.remove(index);
        } else {
            self.entries[index] = real;
        }

        true
    }

    /// Removes the optimistic entry. Returns false when `temp_id` is not buffered.
    pub fn rollback(&mut self, temp_id: &MessageId) -> bool {
        match self.position(temp_id) {
            Some(index) => {
                self.entries.remove(index);
                true
            }
            None => false,
        }
    }

    fn position(&self, id: &MessageId) -> Option<usize> {
        self.entries.iter().position(|entry| &entry.id == id)
    }

    fn known_server_ids(&self) -> HashSet<MessageId> {
        self.entries
            .iter()
            .filter(|entry| !entry.id.is_temporary())
            .map(|entry| entry.id.clone())
            .collect()
    }
}

fn dedup_by_id(records: Vec<DisplayMessage>, known: &HashSet<MessageId>) -> Vec<DisplayMessage> {
    let mut seen = HashSet::new();
    records
        .into_iter()
        .filter(|record| !known.contains(&record.id) && seen.insert(record.id.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, TimeZone, Utc};

    use super::*;
    use crate::domain::message::MessageDirection;

    fn at(seconds: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + seconds, 0).unwrap()
    }

    fn entry(id: &str, seconds: i64) -> DisplayMessage {
        DisplayMessage {
            id: MessageId::from(id),
            direction: MessageDirection::Received,
            sender_label: Some("Peer".to_owned()),
            sender_avatar: None,
            body: format!("message {id}"),
            attachment: None,
            formatted_time: String::new(),
            created_at: Some(at(seconds)),
            is_read: false,
        }
    }

    fn server(id: i64) -> DisplayMessage {
        entry(&id.to_string(), id)
    }

    fn ids(buffer: &ConversationBuffer) -> Vec<&str> {
        buffer.messages().iter().map(|m| m.id.as_str()).collect()
    }

    fn assert_newest_first(buffer: &ConversationBuffer) {
        for pair in buffer.messages().windows(2) {
            assert!(
                pair[0].created_at >= pair[1].created_at,
                "{} is older than {}",
                pair[0].id,
                pair[1].id
            );
        }
    }

    fn loaded(ids: &[i64]) -> ConversationBuffer {
        let mut buffer = ConversationBuffer::default();
        buffer.initial_load(ids.iter().copied().map(server).collect());
        buffer
    }

    #[test]
    fn initial_load_replaces_contents_in_server_order() {
        let mut buffer = loaded(&[9, 8]);

        buffer.initial_load(vec![server(5), server(4), server(3)]);

        assert_eq!(ids(&buffer), ["5", "4", "3"]);
    }

    #[test]
    fn append_older_extends_tail_without_reordering() {
        let mut buffer = loaded(&[5, 4]);

        buffer.append_older(vec![server(3), server(2)]);

        assert_eq!(ids(&buffer), ["5", "4", "3", "2"]);
    }

    #[test]
    fn append_older_skips_records_already_buffered() {
        // A poll can shift page boundaries so the next page overlaps.
        let mut buffer = loaded(&[6, 5, 4]);

        buffer.append_older(vec![server(4), server(3)]);

        assert_eq!(ids(&buffer), ["6", "5", "4", "3"]);
    }

    #[test]
    fn merge_newer_prepends_only_unknown_records() {
        let mut buffer = loaded(&[5, 4, 3]);

        let added = buffer.merge_newer(vec![server(6), server(5)]);

        assert_eq!(added, 1);
        assert_eq!(ids(&buffer), ["6", "5", "4", "3"]);
    }

    #[test]
    fn merge_newer_keeps_relative_order_of_new_block() {
        let mut buffer = loaded(&[5]);

        buffer.merge_newer(vec![server(8), server(7), server(6), server(5)]);

        assert_eq!(ids(&buffer), ["8", "7", "6", "5"]);
        assert_newest_first(&buffer);
    }

    #[test]
    fn merge_newer_twice_is_a_no_op_the_second_time() {
        let mut buffer = loaded(&[5, 4]);
        let page = vec![server(7), server(6), server(5)];

        buffer.merge_newer(page.clone());
        let after_first = buffer.clone();
        let added = buffer.merge_newer(page);

        assert_eq!(added, 0);
        assert_eq!(buffer, after_first);
    }

    #[test]
    fn merge_newer_drops_duplicates_inside_one_batch() {
        let mut buffer = loaded(&[5]);

        buffer.merge_newer(vec![server(6), server(6)]);

        assert_eq!(ids(&buffer), ["6", "5"]);
    }

    #[test]
    fn merge_newer_matches_by_id_not_position() {
        let mut buffer = loaded(&[5, 4, 3]);

        let added = buffer.merge_newer(vec![server(3)]);

        assert_eq!(added, 0);
        assert_eq!(ids(&buffer), ["5", "4", "3"]);
    }

    #[test]
    fn optimistic_round_trip_keeps_position() {
        let mut buffer = loaded(&[5, 4]);
        let temp_id = MessageId::temporary(1);
        buffer.insert_optimistic(entry(temp_id.as_str(), 10));
        buffer.merge_newer(vec![server(6)]);

        let replaced = buffer.reconcile(&temp_id, server(7));

        assert!(replaced);
        assert_eq!(ids(&buffer), ["6", "7", "5", "4"]);
    }

    #[test]
    fn reconcile_of_unknown_temp_id_is_a_no_op() {
        let mut buffer = loaded(&[5, 4]);
        let before = buffer.clone();

        let replaced = buffer.reconcile(&MessageId::temporary(1), server(6));

        assert!(!replaced);
        assert_eq!(buffer, before);
    }

    #[test]
    fn reconcile_after_poll_delivered_real_record_leaves_single_entry() {
        let mut buffer = loaded(&[5]);
        let temp_id = MessageId::temporary(1);
        buffer.insert_optimistic(entry(temp_id.as_str(), 6));
        buffer.merge_newer(vec![server(6), server(5)]);

        buffer.reconcile(&temp_id, server(6));

        assert_eq!(ids(&buffer), ["6", "5"]);
    }

    #[test]
    fn rollback_restores_previous_id_set() {
        let mut buffer = loaded(&[5, 4]);
        let before = ids(&buffer).join(",");
        let temp_id = MessageId::temporary(1);
        buffer.insert_optimistic(entry(temp_id.as_str(), 10));

        let removed = buffer.rollback(&temp_id);

        assert!(removed);
        assert_eq!(ids(&buffer).join(","), before);
    }

    #[test]
    fn rollback_of_unknown_temp_id_is_a_no_op() {
        let mut buffer = loaded(&[5]);

        assert!(!buffer.rollback(&MessageId::temporary(1)));
        assert_eq!(ids(&buffer), ["5"]);
    }

    #[test]
    fn mixed_operation_sequence_stays_newest_first() {
        let mut buffer = loaded(&[10, 9, 8]);

        buffer.append_older(vec![server(7), server(6)]);
        buffer.merge_newer(vec![server(12), server(11), server(10)]);
        let first = MessageId::temporary(1);
        buffer.insert_optimistic(entry(first.as_str(), 13));
        buffer.reconcile(&first, server(13));
        let second = MessageId::temporary(2);
        buffer.insert_optimistic(entry(second.as_str(), 14));
        buffer.rollback(&second);
        buffer.merge_newer(vec![server(15), server(14), server(13)]);
        buffer.append_older(vec![server(5)]);

        assert_eq!(
            ids(&buffer),
            ["15", "14", "13", "12", "11", "10", "9", "8", "7", "6", "5"]
        );
        assert_newest_first(&buffer);
    }
}
