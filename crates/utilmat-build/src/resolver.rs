// crates/utilmat-build/src/resolver.rs
//
// Identifier resolution: join rating events against the catalog.
//
// Events whose item id is not in the catalog are dropped and counted. This
// is a policy, not a failure; nothing is raised for them.

use utilmat_core::{Catalog, RatingEvent, ResolvedEvent};

/// Resolved events of one batch plus the number of events dropped.
#[derive(Debug, Clone, Default)]
pub struct Resolution {
    /// Events with a known item id, in input order.
    pub events: Vec<ResolvedEvent>,
    /// Events whose item id was absent from the catalog.
    pub unknown_items: usize,
}

/// Attach item names to a batch of events, keeping input order.
pub fn resolve_events<I>(events: I, catalog: &Catalog) -> Resolution
where
    I: IntoIterator<Item = RatingEvent>,
{
    let events = events.into_iter();
    let mut resolution = Resolution {
        events: Vec::with_capacity(events.size_hint().0),
        unknown_items: 0,
    };

    for event in events {
        match catalog.name_of(&event.item_id) {
            Some(name) => resolution.events.push(ResolvedEvent {
                user_id: event.user_id,
                item_name: name.to_string(),
                rating: event.rating,
            }),
            None => resolution.unknown_items += 1,
        }
    }

    resolution
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_items_get_names() {
        let catalog = Catalog::from_pairs([("1", "Alpha"), ("2", "Beta")]);
        let events = vec![RatingEvent::new("U1", "1", 5.0), RatingEvent::new("U2", "2", 3.0)];

        let resolution = resolve_events(events, &catalog);

        assert_eq!(resolution.unknown_items, 0);
        assert_eq!(
            resolution.events,
            vec![
                ResolvedEvent {
                    user_id: "U1".into(),
                    item_name: "Alpha".into(),
                    rating: 5.0
                },
                ResolvedEvent {
                    user_id: "U2".into(),
                    item_name: "Beta".into(),
                    rating: 3.0
                },
            ]
        );
    }

    #[test]
    fn unknown_items_are_dropped_and_counted() {
        let catalog = Catalog::from_pairs([("1", "Alpha")]);
        let events = vec![
            RatingEvent::new("U1", "9", 4.0),
            RatingEvent::new("U1", "1", 5.0),
            RatingEvent::new("U2", "9", 1.0),
        ];

        let resolution = resolve_events(events, &catalog);

        assert_eq!(resolution.unknown_items, 2);
        assert_eq!(resolution.events.len(), 1);
        assert_eq!(resolution.events[0].item_name, "Alpha");
    }

    #[test]
    fn shared_names_resolve_to_the_same_name() {
        let catalog = Catalog::from_pairs([("1", "Heat"), ("2", "Heat")]);
        let events = vec![RatingEvent::new("U1", "1", 4.0), RatingEvent::new("U1", "2", 2.0)];

        let resolution = resolve_events(events, &catalog);

        assert!(resolution.events.iter().all(|e| e.item_name == "Heat"));
    }
}
