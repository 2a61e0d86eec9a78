//! Property-based tests for the editor core: name allocation, cascade
//! integrity, epoch bookkeeping, and document round-trips under randomized
//! command sequences.

use proptest::prelude::*;

use fideo_graph::{
    GraphDocument, GraphStore, NodeId, OfflineProvider, Session, UniqueNames, Vec2, WireSpec,
    Work, WorkQueue,
};

const KINDS: &[&str] = &["Oscillator", "Gain", "Delay", "BiquadFilter", "Noise"];

fn apply(works: Vec<Work>) -> (GraphStore, OfflineProvider, Session) {
    let mut store = GraphStore::new();
    let mut provider = OfflineProvider::new();
    let mut session = Session::default();
    let mut queue = WorkQueue::new();
    for work in works {
        queue.push(work);
    }
    queue.apply_all(&mut store, &mut provider, &mut session);
    (store, provider, session)
}

fn create(kind: &str, index: usize) -> Work {
    Work::CreateNode {
        kind: kind.to_string(),
        name: String::new(),
        pos: Vec2::new((index as f32) * 40.0, (index as f32) * 24.0),
        group: None,
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// Any sequence of default-named creations yields pairwise distinct
    /// display names.
    #[test]
    fn generated_names_are_pairwise_distinct(
        picks in prop::collection::vec(0usize..KINDS.len(), 1..40),
    ) {
        let works = picks
            .iter()
            .enumerate()
            .map(|(i, k)| create(KINDS[*k], i))
            .collect();
        let (store, _, _) = apply(works);

        let mut seen = std::collections::HashSet::new();
        for node in store.nodes() {
            prop_assert!(seen.insert(node.name.clone()), "duplicate name {}", node.name);
        }
    }

    /// The allocator is deterministic: two allocators fed the same request
    /// sequence produce the same names.
    #[test]
    fn name_allocation_is_deterministic(
        picks in prop::collection::vec(0usize..KINDS.len(), 1..60),
    ) {
        let mut a = UniqueNames::new();
        let mut b = UniqueNames::new();
        for pick in &picks {
            prop_assert_eq!(a.allocate(KINDS[*pick]), b.allocate(KINDS[*pick]));
        }
    }

    /// Deleting any node leaves no record referring to it: no pins, no
    /// resolved connections, no group membership.
    #[test]
    fn cascade_leaves_no_dangling_references(
        picks in prop::collection::vec(0usize..KINDS.len(), 2..12),
        edges in prop::collection::vec((0usize..12, 0usize..12), 0..20),
        victim in 0usize..12,
    ) {
        let works: Vec<Work> = picks
            .iter()
            .enumerate()
            .map(|(i, k)| create(KINDS[*k], i))
            .collect();
        let (mut store, mut provider, mut session) = apply(works);
        let ids: Vec<NodeId> = store.nodes().map(|n| n.id).collect();

        let mut queue = WorkQueue::new();
        for (from, to) in edges {
            let (from, to) = (ids[from % ids.len()], ids[to % ids.len()]);
            let (Some(from_pin), Some(to_pin)) =
                (store.output_with_index(from, 0), store.input_with_index(to, 0))
            else {
                continue;
            };
            queue.push(Work::ConnectBusOutToBusIn {
                wire: WireSpec::Resolved { from_node: from, from_pin, to_node: to, to_pin },
            });
        }
        let victim = ids[victim % ids.len()];
        queue.push(Work::DeleteNode { node: victim });
        queue.apply_all(&mut store, &mut provider, &mut session);

        prop_assert!(store.node(victim).is_none());
        for pin in store.pins() {
            prop_assert!(pin.node != victim);
        }
        for connection in store.connections() {
            prop_assert!(connection.from_node != victim && connection.to_node != victim);
        }
    }

    /// The work epoch advances exactly once per successful creation, and a
    /// save makes `needs_saving` false without touching the work count.
    #[test]
    fn epoch_counts_successful_mutations(
        picks in prop::collection::vec(0usize..KINDS.len(), 1..20),
    ) {
        let works: Vec<Work> = picks
            .iter()
            .enumerate()
            .map(|(i, k)| create(KINDS[*k], i))
            .collect();
        let count = works.len() as u64;
        let (_, _, mut session) = apply(works);

        prop_assert_eq!(session.epochs.work, count);
        prop_assert!(session.epochs.needs_saving());
        session.epochs.unify();
        prop_assert!(!session.epochs.needs_saving());
        prop_assert_eq!(session.epochs.work, count);
    }

    /// Capturing, replaying, and capturing again is a fixed point of the
    /// document schema, for any chain-shaped graph.
    #[test]
    fn document_capture_is_a_replay_fixed_point(
        picks in prop::collection::vec(0usize..KINDS.len(), 1..10),
    ) {
        let mut works: Vec<Work> = picks
            .iter()
            .enumerate()
            .map(|(i, k)| create(KINDS[*k], i))
            .collect();
        works.insert(0, Work::CreateRuntimeContext {
            name: String::new(),
            pos: Vec2::new(900.0, 100.0),
        });
        let (mut store, mut provider, mut session) = apply(works);

        // chain neighbors where arity allows
        let ids: Vec<NodeId> = store.nodes().map(|n| n.id).collect();
        let mut queue = WorkQueue::new();
        for pair in ids.windows(2) {
            let (Some(from_pin), Some(to_pin)) = (
                store.output_with_index(pair[0], 0),
                store.input_with_index(pair[1], 0),
            ) else {
                continue;
            };
            queue.push(Work::ConnectBusOutToBusIn {
                wire: WireSpec::Resolved {
                    from_node: pair[0],
                    from_pin,
                    to_node: pair[1],
                    to_pin,
                },
            });
        }
        queue.apply_all(&mut store, &mut provider, &mut session);

        let first = GraphDocument::capture(&store);
        let mut queue = WorkQueue::new();
        for work in first.replay() {
            queue.push(work);
        }
        queue.apply_all(&mut store, &mut provider, &mut session);
        let second = GraphDocument::capture(&store);

        prop_assert_eq!(first, second);
    }
}
