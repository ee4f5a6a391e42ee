//! Property-based tests for patch structure.
//!
//! Random edit sequences must keep the link invariants, and any reachable
//! patch must survive a dump/parse round trip unchanged.

use std::collections::HashSet;

use patchbay::{NodeId, PatchSettings, Patcher, Registry};
use proptest::prelude::*;

/// Object types with their argument text, picked by index.
const KINDS: &[(&str, &str)] = &[
    ("bang", ""),
    ("route", "a b"),
    ("route", "x"),
    ("trigger", "b f l"),
    ("gate", "2"),
    ("pack", "0 0 0"),
    ("+", "1"),
    ("print", "p"),
    ("message", "hello 1"),
];

#[derive(Clone, Debug)]
enum Edit {
    Create(usize),
    Delete(usize),
    Connect(usize, usize, usize, usize),
    Disconnect(usize),
    SetArgs(usize, usize),
    Name(usize, u8),
}

fn edit() -> impl Strategy<Value = Edit> {
    prop_oneof![
        3 => (0..KINDS.len()).prop_map(Edit::Create),
        1 => any::<usize>().prop_map(Edit::Delete),
        4 => (any::<usize>(), 0usize..4, any::<usize>(), 0usize..4).prop_map(|(a, o, b, i)| Edit::Connect(a, o, b, i)),
        1 => any::<usize>().prop_map(Edit::Disconnect),
        1 => (any::<usize>(), 0usize..5).prop_map(|(n, t)| Edit::SetArgs(n, t)),
        1 => (any::<usize>(), 0u8..4).prop_map(|(n, l)| Edit::Name(n, l)),
    ]
}

fn pick(patcher: &Patcher, n: usize) -> Option<NodeId> {
    match patcher.object_count() {
        0 => None,
        count => patcher.handle_at(n % count).map(|info| info.id()),
    }
}

fn apply(patcher: &mut Patcher, edit: &Edit) {
    match *edit {
        Edit::Create(k) => {
            let (kind, args) = KINDS[k];
            patcher.create_object(kind, args).unwrap();
        }
        Edit::Delete(n) => {
            if let Some(id) = pick(patcher, n) {
                patcher.delete_object(id).unwrap();
            }
        }
        Edit::Connect(a, outlet, b, inlet) => {
            if let (Some(from), Some(to)) = (pick(patcher, a), pick(patcher, b)) {
                // out-of-range ports are rejected, never half-applied
                let _ = patcher.connect(from, outlet, to, inlet);
            }
        }
        Edit::Disconnect(n) => {
            let links = patcher.links();
            if !links.is_empty() {
                let l = links[n % links.len()];
                patcher.disconnect(l.from, l.outlet, l.to, l.inlet).unwrap();
            }
        }
        Edit::SetArgs(n, tokens) => {
            if let Some(id) = pick(patcher, n) {
                let args = ["t0", "t1", "t2", "t3", "t4"][..tokens].join(" ");
                // only some types accept arbitrary text
                let _ = patcher.set_args(id, &args);
            }
        }
        Edit::Name(n, label) => {
            if let Some(id) = pick(patcher, n) {
                let _ = patcher.set_name(id, Some(&format!("n{}", label)));
            }
        }
    }
}

fn assert_links_consistent(patcher: &Patcher) -> Result<(), TestCaseError> {
    let links = patcher.links();
    let unique: HashSet<_> = links.iter().collect();
    prop_assert_eq!(unique.len(), links.len(), "duplicate link");

    for link in &links {
        let from = patcher.handle(link.from);
        let to = patcher.handle(link.to);
        prop_assert!(from.is_some() && to.is_some(), "dangling link {:?}", link);
        prop_assert!(link.outlet < from.map_or(0, |f| f.outlets()), "outlet out of range {:?}", link);
        prop_assert!(link.inlet < to.map_or(0, |t| t.inlets()), "inlet out of range {:?}", link);
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    /// Any edit sequence keeps every link attached to live, in-range ports,
    /// and the processing side ends up with the same objects.
    #[test]
    fn edits_preserve_link_invariants(edits in prop::collection::vec(edit(), 1..60)) {
        let (mut patcher, mut processor) = Patcher::new(PatchSettings::default());
        for edit in &edits {
            apply(&mut patcher, edit);
            assert_links_consistent(&patcher)?;
        }

        processor.process();
        patcher.poll();
        prop_assert_eq!(processor.object_count(), patcher.object_count());
    }

    /// Deleting any node leaves no link that mentions it.
    #[test]
    fn delete_removes_every_touching_link(edits in prop::collection::vec(edit(), 1..40), victim in any::<usize>()) {
        let (mut patcher, _processor) = Patcher::new(PatchSettings::default());
        for edit in &edits {
            apply(&mut patcher, edit);
        }

        if let Some(id) = pick(&patcher, victim) {
            let untouched = patcher.links().into_iter().filter(|l| !l.touches(id)).count();
            patcher.delete_object(id).unwrap();
            prop_assert!(patcher.handle(id).is_none());
            prop_assert!(patcher.links().iter().all(|l| !l.touches(id)));
            prop_assert_eq!(patcher.links().len(), untouched);
        }
    }

    /// dump -> parse into a fresh patcher -> dump is the identity.
    #[test]
    fn dump_parse_round_trip(edits in prop::collection::vec(edit(), 1..40)) {
        let (mut patcher, _processor) = Patcher::new(PatchSettings::default());
        for edit in &edits {
            apply(&mut patcher, edit);
        }
        let dumped = patcher.dump().unwrap();

        let (mut fresh, _fresh_processor) = Patcher::new(PatchSettings::default());
        fresh.parse(&dumped).unwrap();
        prop_assert_eq!(fresh.dump().unwrap(), dumped);
        prop_assert_eq!(fresh.links(), patcher.links());
    }

    /// Canonical argument text parses back to the same parameters.
    #[test]
    fn canonical_args_reparse(value in -1.0e6f32..1.0e6f32, count in -100i32..100) {
        let registry = Registry::new();
        for (kind, args) in [("float", value.to_string()), ("+", value.to_string()), ("gate", count.to_string())] {
            let first = registry.instantiate(kind, &args).unwrap();
            let again = registry.instantiate(kind, &first.params.to_args()).unwrap();
            prop_assert_eq!(&first.params, &again.params);
            prop_assert_eq!(first.shape, again.shape);
        }
    }
}
