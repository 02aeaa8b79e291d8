use std::collections::BTreeSet;

use fpk_reconcile::diff;
use fpk_testkit::{boolean_flag, group};

/// Added ∪ removed target groups must account exactly for the symmetric
/// difference of the group id sets between initial and submitted.
#[test]
fn scenario_group_delta_equals_symmetric_difference() {
    let initial = boolean_flag()
        .variation_rule(
            "true",
            vec![],
            vec![
                group("a", "A", "r-a"),
                group("b", "B", "r-b"),
                group("c", "C", "r-c"),
            ],
        )
        .build();
    let submitted = boolean_flag()
        .variation_rule(
            "true",
            vec![],
            vec![
                group("b", "B", "r-b"),
                group("d", "D", ""),
                group("e", "E", ""),
            ],
        )
        .build();

    let d = diff(&initial, &submitted);
    assert_eq!(d.variations.len(), 1);
    let vd = &d.variations[0];

    let delta_ids: BTreeSet<&str> = vd
        .added_target_groups
        .iter()
        .chain(vd.removed_target_groups.iter())
        .map(|g| g.id.as_str())
        .collect();

    let initial_ids: BTreeSet<&str> = ["a", "b", "c"].into_iter().collect();
    let submitted_ids: BTreeSet<&str> = ["b", "d", "e"].into_iter().collect();
    let expected: BTreeSet<&str> = initial_ids
        .symmetric_difference(&submitted_ids)
        .copied()
        .collect();

    assert_eq!(delta_ids, expected);
    // And no overlap between added and removed.
    assert_eq!(
        vd.added_target_groups.len() + vd.removed_target_groups.len(),
        delta_ids.len()
    );
}
