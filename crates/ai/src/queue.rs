//! Deduplicating priority container of pending action proposals.
use tracing::trace;

use crate::action::ActionBasket;

/// Pending [`ActionBasket`]s, at most one per action name.
///
/// Pushing a name that is already queued keeps the higher relevance and
/// drops the newcomer; the surviving basket keeps its original position
/// and creation time. Pop and peek scan for the highest relevance; equal
/// relevance resolves to the basket queued first.
#[derive(Debug, Default)]
pub struct Queue {
    baskets: Vec<ActionBasket>,
}

impl Queue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, basket: ActionBasket) {
        if let Some(existing) = self
            .baskets
            .iter_mut()
            .find(|existing| existing.name() == basket.name())
        {
            if existing.relevance() < basket.relevance() {
                existing.set_relevance(basket.relevance());
            }
            return;
        }

        self.baskets.push(basket);
    }

    fn best_index(&self) -> Option<usize> {
        let mut best: Option<(usize, f32)> = None;
        for (index, basket) in self.baskets.iter().enumerate() {
            match best {
                Some((_, relevance)) if basket.relevance() <= relevance => {}
                _ => best = Some((index, basket.relevance())),
            }
        }
        best.map(|(index, _)| index)
    }

    /// Remove and return the highest-relevance basket.
    pub fn pop(&mut self) -> Option<ActionBasket> {
        let index = self.best_index()?;
        Some(self.baskets.remove(index))
    }

    /// The basket [`pop`](Self::pop) would return.
    pub fn peek(&self) -> Option<&ActionBasket> {
        self.best_index().map(|index| &self.baskets[index])
    }

    pub fn len(&self) -> usize {
        self.baskets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.baskets.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.baskets.iter().any(|basket| basket.name() == name)
    }

    pub fn relevance_of(&self, name: &str) -> Option<f32> {
        self.baskets
            .iter()
            .find(|basket| basket.name() == name)
            .map(ActionBasket::relevance)
    }

    /// Drop baskets at least `ttl_ms` old. A zero TTL disables expiry.
    pub fn remove_expired(&mut self, now_ms: u64, ttl_ms: u64) -> usize {
        if ttl_ms == 0 {
            return 0;
        }

        let before = self.baskets.len();
        self.baskets.retain(|basket| {
            let expired = basket.is_expired(now_ms, ttl_ms);
            if expired {
                trace!(target: "ai::queue", action = basket.name(), "basket expired");
            }
            !expired
        });
        before - self.baskets.len()
    }

    pub fn clear(&mut self) {
        self.baskets.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &ActionBasket> {
        self.baskets.iter()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::action::ActionNode;
    use crate::event::Event;

    fn basket(name: &str, relevance: f32, created_ms: u64) -> ActionBasket {
        ActionBasket::new(
            ActionNode::new(name),
            relevance,
            false,
            Event::default(),
            created_ms,
        )
    }

    #[test]
    fn push_keeps_one_basket_per_name_at_max_relevance() {
        let pushes = [
            ("melee", 10.0),
            ("heal", 30.0),
            ("melee", 25.0),
            ("heal", 5.0),
            ("flee", 1.0),
            ("melee", 12.0),
        ];

        let mut queue = Queue::new();
        let mut expected: HashMap<&str, f32> = HashMap::new();
        for (name, relevance) in pushes {
            queue.push(basket(name, relevance, 0));
            let max = expected.entry(name).or_insert(relevance);
            *max = max.max(relevance);
        }

        assert_eq!(queue.len(), expected.len());
        for (name, relevance) in expected {
            assert_eq!(queue.relevance_of(name), Some(relevance));
        }
    }

    #[test]
    fn pop_returns_maximum_and_peek_agrees() {
        let mut queue = Queue::new();
        queue.push(basket("a", 1.0, 0));
        queue.push(basket("b", 7.0, 0));
        queue.push(basket("c", 3.0, 0));

        let mut order = Vec::new();
        while let Some(peeked) = queue.peek().map(|b| b.name().to_string()) {
            let popped = queue.pop().expect("peek saw a basket");
            assert_eq!(popped.name(), peeked);
            assert!(!queue.contains(&peeked));
            order.push(peeked);
        }
        assert_eq!(order, vec!["b", "c", "a"]);
        assert!(queue.pop().is_none());
    }

    #[test]
    fn ties_resolve_to_first_queued() {
        let mut queue = Queue::new();
        queue.push(basket("first", 5.0, 0));
        queue.push(basket("second", 5.0, 0));
        queue.push(basket("zero", 0.0, 0));
        assert_eq!(queue.pop().map(|b| b.name().to_string()).as_deref(), Some("first"));
        assert_eq!(queue.pop().map(|b| b.name().to_string()).as_deref(), Some("second"));
        assert_eq!(queue.pop().map(|b| b.name().to_string()).as_deref(), Some("zero"));
    }

    #[test]
    fn upgraded_basket_keeps_its_position() {
        let mut queue = Queue::new();
        queue.push(basket("a", 1.0, 0));
        queue.push(basket("b", 4.0, 0));
        queue.push(basket("a", 4.0, 50));
        assert_eq!(queue.peek().map(|b| b.name()), Some("a"));
        assert_eq!(queue.peek().map(|b| b.created_ms()), Some(0));
    }

    #[test]
    fn expiry_boundary() {
        let mut queue = Queue::new();
        queue.push(basket("old", 1.0, 1_000));

        assert_eq!(queue.remove_expired(5_999, 5_000), 0);
        assert!(queue.contains("old"));

        assert_eq!(queue.remove_expired(6_000, 5_000), 1);
        assert!(queue.is_empty());
    }

    #[test]
    fn zero_ttl_disables_expiry() {
        let mut queue = Queue::new();
        queue.push(basket("a", 1.0, 0));
        assert_eq!(queue.remove_expired(u64::MAX, 0), 0);
        assert_eq!(queue.len(), 1);
    }
}
