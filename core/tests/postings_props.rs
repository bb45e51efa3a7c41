use hashdex_core::{DocId, PostingsList};
use proptest::prelude::*;
use std::collections::{BTreeMap, BTreeSet};

type Occurrences = BTreeMap<DocId, BTreeSet<u32>>;

fn occurrences() -> impl Strategy<Value = Occurrences> {
    prop::collection::btree_map(0u32..400, prop::collection::btree_set(0u32..1000, 1..6), 0..25)
}

fn build(occ: &Occurrences) -> PostingsList {
    let mut list = PostingsList::new();
    for (doc, offsets) in occ {
        for off in offsets {
            list.add(*doc, *off, 0.0);
        }
    }
    list
}

proptest! {
    #[test]
    fn add_keeps_lists_ordered(occ in occurrences()) {
        let list = build(&occ);
        let ids = list.doc_ids();
        prop_assert!(ids.windows(2).all(|w| w[0] < w[1]));
        for e in &list {
            prop_assert!(e.offsets().windows(2).all(|w| w[0] < w[1]));
        }
        prop_assert_eq!(list.len(), occ.len());
    }

    #[test]
    fn text_encoding_round_trips(occ in occurrences()) {
        let list = build(&occ);
        let parsed: PostingsList = list.to_string().parse().unwrap();
        prop_assert_eq!(parsed, list);
    }

    #[test]
    fn intersect_with_self_is_identity(occ in occurrences()) {
        let list = build(&occ);
        prop_assert_eq!(PostingsList::intersect(&list, &list).doc_ids(), list.doc_ids());
    }

    #[test]
    fn intersect_is_symmetric(a in occurrences(), b in occurrences()) {
        let (a, b) = (build(&a), build(&b));
        prop_assert_eq!(PostingsList::intersect(&a, &b).doc_ids(), PostingsList::intersect(&b, &a).doc_ids());
    }

    #[test]
    fn union_is_ordered_and_complete(a in occurrences(), b in occurrences()) {
        let (la, lb) = (build(&a), build(&b));
        let u = la.union(&lb, true);
        let expected: Vec<DocId> = a.keys().chain(b.keys()).copied().collect::<BTreeSet<_>>().into_iter().collect();
        prop_assert_eq!(u.doc_ids(), expected);
        for e in &u {
            prop_assert!(e.offsets().windows(2).all(|w| w[0] < w[1]));
        }
    }
}
