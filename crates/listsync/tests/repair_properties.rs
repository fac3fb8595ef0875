//! Repair Property Tests
//!
//! Model-based checks of replace repair: applying the other command and then
//! the repaired replace must overwrite the same element the original replace
//! targeted, or re-insert the value when that element is gone.

mod common;

use assert_matches::assert_matches;
use common::{apply_to, list_id, token};
use listsync::{
    AddToList, CommandRepairer, ListCommand, ListSyncError, RemoveFromList, RemoveFromListExcept,
    ReplaceInList, ReplaceOrAddInList, SequentialVersionTokens, Value, VersionChange,
};
use proptest::prelude::*;
use std::collections::BTreeSet;

fn repairer() -> CommandRepairer<SequentialVersionTokens> {
    CommandRepairer::new(SequentialVersionTokens::new(0x5eed))
}

fn original(len: usize) -> Vec<Value> {
    (0..len).map(|n| Value::simple(n as u64)).collect()
}

fn subject(index: usize) -> ReplaceInList {
    ReplaceInList {
        list_id: list_id(1),
        index,
        value: Value::simple("subject"),
        version_change: VersionChange::new(token(0), token(1)),
    }
}

fn other_change() -> VersionChange {
    VersionChange::new(token(0), token(2))
}

/// (list length, replaced index, concurrent command)
fn scenario() -> impl Strategy<Value = (usize, usize, ListCommand)> {
    (1usize..16).prop_flat_map(|len| {
        let other = prop_oneof![
            (0..=len).prop_map(|index| ListCommand::from(AddToList {
                list_id: list_id(1),
                index,
                value: Value::simple("other"),
                version_change: other_change(),
            })),
            (0..len).prop_map(|index| ListCommand::from(RemoveFromList {
                list_id: list_id(1),
                index,
                version_change: other_change(),
            })),
            (0..len).prop_map(|index| ListCommand::from(ReplaceInList {
                list_id: list_id(1),
                index,
                value: Value::simple("other"),
                version_change: other_change(),
            })),
            proptest::collection::btree_set(0..len, 0..=len).prop_map(|retained| {
                ListCommand::from(RemoveFromListExcept {
                    list_id: list_id(1),
                    retained,
                    version_change: other_change(),
                })
            }),
        ];
        (Just(len), 0..len, other)
    })
}

fn is_same_slot_replace(index: usize, other: &ListCommand) -> bool {
    matches!(other, ListCommand::Replace(replace) if replace.index == index)
}

proptest! {
    #[test]
    fn repaired_replace_targets_same_element((len, index, other) in scenario()) {
        let list = original(len);
        let target = list[index].clone();
        let mut after_other = list.clone();
        apply_to(&mut after_other, &other);

        let result = repairer().repair_local_command(&subject(index), &other);
        if is_same_slot_replace(index, &other) {
            let is_unresolved = matches!(result, Err(ListSyncError::UnresolvedConflict { .. }));
            prop_assert!(is_unresolved);
            return Ok(());
        }
        let repaired = result.unwrap();
        prop_assert_eq!(repaired.version_change().from, other_change().to);
        prop_assert_eq!(repaired.value(), &Value::simple("subject"));

        let mut after_repair = after_other.clone();
        apply_to(&mut after_repair, &repaired.clone().into());

        match repaired {
            ReplaceOrAddInList::Replace(replace) => {
                prop_assert_eq!(&after_other[replace.index], &target);
                prop_assert_eq!(after_repair.len(), after_other.len());
            }
            ReplaceOrAddInList::Add(add) => {
                prop_assert!(!after_other.contains(&target));
                prop_assert!(add.index <= after_other.len());
                prop_assert_eq!(after_repair.len(), after_other.len() + 1);
            }
        }
        prop_assert!(after_repair.contains(&Value::simple("subject")));
    }

    #[test]
    fn independent_replace_only_changes_version(len in 2usize..32, i in 0usize..32, j in 0usize..32) {
        let (i, j) = (i % len, j % len);
        prop_assume!(i != j);
        let other: ListCommand = ReplaceInList {
            list_id: list_id(1),
            index: j,
            value: Value::simple("other"),
            version_change: other_change(),
        }
        .into();

        let original_subject = subject(i);
        let repaired = repairer().repair_local_command(&original_subject, &other).unwrap();
        let ReplaceOrAddInList::Replace(repaired) = repaired else {
            return Err(TestCaseError::fail("independent replace must stay a replace"));
        };
        prop_assert_eq!(repaired.index, original_subject.index);
        prop_assert_eq!(&repaired.value, &original_subject.value);
        prop_assert_ne!(repaired.version_change, original_subject.version_change);
    }
}

#[test]
fn index_shift_examples() {
    let shifted = |other: ListCommand| {
        let repaired = repairer().repair_local_command(&subject(5), &other).unwrap();
        match repaired {
            ReplaceOrAddInList::Replace(replace) => replace.index,
            ReplaceOrAddInList::Add(add) => panic!("unexpected add {add:?}"),
        }
    };
    let add = |index| {
        ListCommand::from(AddToList {
            list_id: list_id(1),
            index,
            value: Value::simple("other"),
            version_change: other_change(),
        })
    };
    let remove = |index| {
        ListCommand::from(RemoveFromList {
            list_id: list_id(1),
            index,
            version_change: other_change(),
        })
    };

    assert_eq!(shifted(add(2)), 6);
    assert_eq!(shifted(add(9)), 5);
    assert_eq!(shifted(remove(2)), 4);
    assert_eq!(shifted(remove(9)), 5);
}

#[test]
fn replace_of_removed_slot_becomes_add() {
    let remove = ListCommand::from(RemoveFromList {
        list_id: list_id(1),
        index: 3,
        version_change: other_change(),
    });
    let repaired = repairer()
        .repair_local_command(&subject(3), &remove)
        .unwrap();

    assert_matches!(repaired, ReplaceOrAddInList::Add(add) => {
        assert_eq!(add.index, 3);
        assert_eq!(add.value, Value::simple("subject"));
        assert_eq!(add.version_change.from, token(2));
    });
}

#[test]
fn remove_except_keeps_retained_slot() {
    let except = ListCommand::from(RemoveFromListExcept {
        list_id: list_id(1),
        retained: BTreeSet::from([0, 3, 5]),
        version_change: other_change(),
    });
    let r = repairer();

    assert_eq!(
        r.repair_local_command(&subject(3), &except).unwrap().index(),
        1
    );
    let dropped_slot = r.repair_local_command(&subject(4), &except).unwrap();
    assert_matches!(dropped_slot, ReplaceOrAddInList::Add(AddToList { index: 3, .. }));
}
