//! Divide-and-conquer balancer.
//!
//! Refines a partition in place by swapping single members between the
//! highest- and lowest-average groups of a range. Ranges are refined
//! smallest first: each half of a range is balanced before the merged
//! range is.
//!
//! The extremes of a range are picked by rounded group average, the value
//! callers see. The swap search itself runs on integer tenths: with sums
//! `s_a`, `s_b` and sizes `n_a`, `n_b`, and sizes fixed by a swap, the gap
//! between two averages is compared through `|s_a * n_b - s_b * n_a|`.
//! Sums and products are taken in `i128`.

use serde::Serialize;
use tracing::{debug, warn};

use crate::partitioner::{Group, Partition};

/// Default upper bound on swap rounds per merged range.
pub const DEFAULT_MAX_ROUNDS: usize = fairgroup_core::config::DEFAULT_MAX_ROUNDS;

/// One performed exchange between two groups.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Swap {
    /// Index of the group that had the higher average.
    pub high_group: usize,
    /// Index of the group that had the lower average.
    pub low_group: usize,
    /// Member moved from the high group to the low group.
    pub moved_down: String,
    /// Member moved from the low group to the high group.
    pub moved_up: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BalanceReport {
    /// Swaps in the order they were performed.
    pub swaps: Vec<Swap>,
    /// Ranges whose swap loop stopped at the round cap.
    pub capped_ranges: usize,
}

#[derive(Debug, Clone)]
pub struct Balancer {
    max_rounds: usize,
}

impl Default for Balancer {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ROUNDS)
    }
}

impl Balancer {
    pub fn new(max_rounds: usize) -> Self {
        Self {
            max_rounds: max_rounds.max(1),
        }
    }

    pub fn max_rounds(&self) -> usize {
        self.max_rounds
    }

    /// Balance every group of the partition.
    pub fn balance(&self, partition: &mut Partition) -> BalanceReport {
        let mut report = BalanceReport::default();
        if !partition.is_empty() {
            let right = partition.len() - 1;
            self.balance_range(partition, 0, right, &mut report);
        }
        report
    }

    /// Balance groups `left..=right`: both halves first, then the whole.
    pub fn balance_range(
        &self,
        partition: &mut Partition,
        left: usize,
        right: usize,
        report: &mut BalanceReport,
    ) {
        if left >= right {
            return;
        }
        let mid = left + (right - left) / 2;
        self.balance_range(partition, left, mid, report);
        self.balance_range(partition, mid + 1, right, report);
        self.merge_and_balance(partition, left, right, report);
    }

    /// Repeatedly swap between the highest- and lowest-average group in
    /// `left..=right` until no swap helps or the round cap is reached.
    /// Returns the number of swaps performed.
    pub fn merge_and_balance(
        &self,
        partition: &mut Partition,
        left: usize,
        right: usize,
        report: &mut BalanceReport,
    ) -> usize {
        if left >= right || right >= partition.len() {
            return 0;
        }

        let mut swaps = 0;
        for _ in 0..self.max_rounds {
            let (max_index, min_index) = extremes(partition, left, right);
            if max_index == min_index {
                return swaps;
            }
            match improve_by_swapping(partition, max_index, min_index) {
                Some(swap) => {
                    report.swaps.push(swap);
                    swaps += 1;
                }
                None => return swaps,
            }
        }

        warn!(
            left,
            right,
            rounds = self.max_rounds,
            "swap loop hit round cap"
        );
        report.capped_ranges += 1;
        swaps
    }
}

/// Indices of the highest- and lowest-average groups in `left..=right`.
/// Ties go to the first group scanned.
fn extremes(partition: &Partition, left: usize, right: usize) -> (usize, usize) {
    let groups = &partition.groups;
    let (mut max_index, mut min_index) = (left, left);
    let first = groups[left].average();
    let (mut max_avg, mut min_avg) = (first, first);
    for (i, group) in groups.iter().enumerate().take(right + 1).skip(left + 1) {
        let avg = group.average();
        if avg > max_avg {
            max_avg = avg;
            max_index = i;
        }
        if avg < min_avg {
            min_avg = avg;
            min_index = i;
        }
    }
    (max_index, min_index)
}

/// Try one swap between group `high` (higher average) and group `low`.
///
/// Walks both groups from their top grade with two cursors, advancing the
/// cursor on the smaller grade, and keeps the pair that shrinks the gap
/// between the two averages the most. A candidate is taken only if its gap
/// is strictly smaller than the best seen so far, starting from the gap
/// before any swap. At most one swap is performed.
pub fn improve_by_swapping(partition: &mut Partition, high: usize, low: usize) -> Option<Swap> {
    if high == low {
        return None;
    }

    let best = {
        let g_high = partition.groups.get(high)?;
        let g_low = partition.groups.get(low)?;
        if g_high.is_empty() || g_low.is_empty() {
            return None;
        }

        let (s_high, n_high) = (g_high.sum_tenths(), g_high.len() as i128);
        let (s_low, n_low) = (g_low.sum_tenths(), g_low.len() as i128);
        let gap = |a: i128, b: i128| (a * n_low - b * n_high).abs();

        let mut best_gap = gap(s_high, s_low);
        let mut best = None;

        let (high_members, low_members) = (g_high.members(), g_low.members());
        let (mut p, mut q) = (0, 0);
        while p < high_members.len() && q < low_members.len() {
            let up = high_members[p].tenths();
            let down = low_members[q].tenths();
            let new_high = s_high - up + down;
            let new_low = s_low - down + up;
            let new_gap = gap(new_high, new_low);
            if new_gap < best_gap {
                best_gap = new_gap;
                best = Some((p, q));
            }

            if up < down {
                p += 1;
            } else {
                q += 1;
            }
        }
        best
    };

    let (p, q) = best?;
    let moved_down = partition.groups[high].remove(p);
    let moved_up = partition.groups[low].remove(q);

    debug!(
        high_group = high,
        low_group = low,
        moved_down = %moved_down.name,
        moved_up = %moved_up.name,
        "swapped members"
    );

    let swap = Swap {
        high_group: high,
        low_group: low,
        moved_down: moved_down.name.clone(),
        moved_up: moved_up.name.clone(),
    };
    partition.groups[high].insert_sorted(moved_up);
    partition.groups[low].insert_sorted(moved_down);
    Some(swap)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    use fairgroup_core::{GradeRange, Individual};

    use crate::aggregate::spread;
    use crate::partitioner::partition;
    use crate::roster::{Roster, roster_order};

    fn roster_of(grades: &[(&str, f64)]) -> Roster {
        let mut roster = Roster::new();
        roster.extend(grades.iter().map(|(n, g)| Individual::new(*n, *g)));
        roster
    }

    fn averages(p: &Partition) -> Vec<f64> {
        p.groups.iter().map(|g| g.average()).collect()
    }

    /// Deterministic grades in [1.0, 5.0] from a small LCG.
    fn generated_roster(n: usize, seed: u64) -> Roster {
        let mut state = seed;
        let mut roster = Roster::new();
        for i in 0..n {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            let tenths = 10 + (state >> 33) % 41;
            roster.add(Individual::new(format!("s{i:03}"), tenths as f64 / 10.0));
        }
        roster
    }

    #[test]
    fn already_balanced_needs_no_swaps() {
        let roster = roster_of(&[("A", 5.0), ("B", 4.0), ("C", 3.0), ("D", 2.0), ("E", 1.0)]);
        let mut p = partition(roster.snapshot(), 2).unwrap();

        let report = Balancer::default().balance(&mut p);

        assert!(report.swaps.is_empty());
        assert_eq!(averages(&p), vec![3.0, 3.0]);
        assert_eq!(p.sizes(), vec![3, 2]);
    }

    #[test]
    fn single_swap_closes_gap() {
        // Draw gives [a5, c3] avg 4.0 and [b4, d1] avg 2.5.
        let roster = roster_of(&[("a", 5.0), ("b", 4.0), ("c", 3.0), ("d", 1.0)]);
        let mut p = partition(roster.snapshot(), 2).unwrap();
        assert_eq!(averages(&p), vec![4.0, 2.5]);

        let report = Balancer::default().balance(&mut p);

        assert_eq!(
            report.swaps,
            vec![Swap {
                high_group: 0,
                low_group: 1,
                moved_down: "a".to_string(),
                moved_up: "b".to_string(),
            }]
        );
        assert_eq!(averages(&p), vec![3.5, 3.0]);
    }

    #[test]
    fn swap_strictly_shrinks_pair_gap() {
        let roster = roster_of(&[("a", 5.0), ("b", 4.0), ("c", 3.0), ("d", 1.0)]);
        let mut p = partition(roster.snapshot(), 2).unwrap();
        let before = p.groups[0].average() - p.groups[1].average();

        assert!(improve_by_swapping(&mut p, 0, 1).is_some());
        let after = (p.groups[0].average() - p.groups[1].average()).abs();
        assert!(after < before);

        // No further improving pair exists for this split.
        assert!(improve_by_swapping(&mut p, 0, 1).is_none());
    }

    #[test]
    fn swapped_members_land_in_sorted_position() {
        let roster = roster_of(&[("a", 5.0), ("b", 4.0), ("c", 3.0), ("d", 1.0)]);
        let mut p = partition(roster.snapshot(), 2).unwrap();
        Balancer::default().balance(&mut p);

        for group in &p.groups {
            let mut sorted = group.members().to_vec();
            sorted.sort_by(roster_order);
            assert_eq!(group.members(), sorted.as_slice());
        }
    }

    #[test]
    fn same_index_is_not_swapped() {
        let roster = roster_of(&[("a", 5.0), ("b", 1.0)]);
        let mut p = partition(roster.snapshot(), 1).unwrap();
        assert!(improve_by_swapping(&mut p, 0, 0).is_none());
    }

    #[test]
    fn single_member_single_group_is_untouched() {
        let roster = roster_of(&[("solo", 3.7)]);
        let mut p = partition(roster.snapshot(), 1).unwrap();

        let report = Balancer::default().balance(&mut p);

        assert!(report.swaps.is_empty());
        assert_eq!(averages(&p), vec![3.7]);
    }

    #[test]
    fn round_cap_stops_the_loop() {
        // One round allows the a<->b swap; the cap is hit before the loop
        // can find out that no further swap helps.
        let roster = roster_of(&[("a", 5.0), ("b", 4.0), ("c", 3.0), ("d", 1.0)]);
        let mut p = partition(roster.snapshot(), 2).unwrap();
        let balancer = Balancer::new(1);
        let mut report = BalanceReport::default();

        let swaps = balancer.merge_and_balance(&mut p, 0, 1, &mut report);

        assert_eq!(swaps, 1);
        assert_eq!(report.swaps.len(), 1);
        assert_eq!(report.capped_ranges, 1);
    }

    #[test]
    fn uncapped_loop_reports_no_capped_ranges() {
        let roster = roster_of(&[("a", 5.0), ("b", 4.0), ("c", 3.0), ("d", 1.0)]);
        let mut p = partition(roster.snapshot(), 2).unwrap();
        let mut report = BalanceReport::default();

        let swaps = Balancer::new(2).merge_and_balance(&mut p, 0, 1, &mut report);

        assert_eq!(swaps, 1);
        assert_eq!(report.capped_ranges, 0);
    }

    #[test]
    fn zero_round_cap_is_raised_to_one() {
        assert_eq!(Balancer::new(0).max_rounds(), 1);
    }

    #[test]
    fn out_of_bounds_range_is_noop() {
        let roster = roster_of(&[("a", 5.0), ("b", 1.0)]);
        let mut p = partition(roster.snapshot(), 2).unwrap();
        let mut report = BalanceReport::default();
        assert_eq!(Balancer::default().merge_and_balance(&mut p, 0, 5, &mut report), 0);
    }

    #[test]
    fn unequal_group_sizes_still_converge() {
        // Sizes 3,3,3,2. The best swaps for the two-member group lift its
        // average past the other group's, which must not stop the loop.
        let grades = [4.3, 4.3, 4.1, 4.1, 3.9, 3.6, 2.8, 2.7, 2.5, 1.9, 1.3];
        let mut roster = Roster::new();
        for (i, grade) in grades.iter().enumerate() {
            roster.add(Individual::new(format!("s{i:02}"), *grade));
        }
        let mut p = partition(roster.snapshot(), 4).unwrap();
        assert_eq!(averages(&p), vec![3.6, 3.3, 2.7, 3.4]);
        assert_eq!(spread(&p), 0.9);

        let report = Balancer::default().balance(&mut p);

        assert_eq!(report.swaps.len(), 5);
        assert_eq!(report.capped_ranges, 0);
        assert_eq!(averages(&p), vec![3.2, 3.4, 3.2, 3.2]);
        assert_eq!(spread(&p), 0.2);
        assert_eq!(p.sizes(), vec![3, 3, 3, 2]);
    }

    #[test]
    fn extremes_use_rounded_averages_with_first_index_on_ties() {
        // Exact averages 3.02, 3.0 and 2.96 all round to 3.0.
        let roster = roster_of(&[
            ("a", 3.1),
            ("b", 3.0),
            ("c", 3.0),
            ("d", 3.0),
            ("e", 3.0),
            ("f", 3.0),
            ("g", 3.0),
            ("h", 3.0),
            ("i", 3.0),
            ("j", 3.0),
            ("k", 3.0),
            ("l", 3.0),
            ("m", 3.0),
            ("n", 3.0),
            ("o", 2.8),
        ]);
        let mut p = partition(roster.snapshot(), 3).unwrap();
        assert_eq!(averages(&p), vec![3.0, 3.0, 3.0]);
        assert_eq!(extremes(&p, 0, 2), (0, 0));

        let report = Balancer::default().balance(&mut p);
        assert!(report.swaps.is_empty());
    }

    #[test]
    fn huge_grades_balance_without_overflow() {
        let mut roster = Roster::with_range(GradeRange::new(0.0, 1e18));
        roster.add(Individual::new("a", 1e18));
        roster.add(Individual::new("b", 9e17));
        roster.add(Individual::new("c", 1.0));
        let mut p = partition(roster.snapshot(), 2).unwrap();

        Balancer::default().balance(&mut p);

        assert_eq!(p.sizes(), vec![2, 1]);
        assert_eq!(p.member_count(), 3);
    }

    #[test]
    fn balancing_preserves_coverage_and_sizes() {
        for seed in 1..=5 {
            for n in [1, 2, 5, 9, 17, 30] {
                let roster = generated_roster(n, seed);
                for k in 1..=n.min(6) {
                    let mut p = partition(roster.snapshot(), k).unwrap();
                    let sizes_before = p.sizes();

                    Balancer::default().balance(&mut p);

                    assert_eq!(p.sizes(), sizes_before);
                    let max = *p.sizes().iter().max().unwrap();
                    let min = *p.sizes().iter().min().unwrap();
                    assert!(max - min <= 1);

                    let names: HashSet<&str> = p
                        .groups
                        .iter()
                        .flat_map(|g| g.members().iter().map(|m| m.name.as_str()))
                        .collect();
                    assert_eq!(names.len(), roster.len());
                    assert_eq!(p.member_count(), roster.len());
                    assert!(names.iter().all(|n| roster.contains(n)));
                }
            }
        }
    }

    #[test]
    fn balancing_never_widens_spread() {
        for seed in 1..=8 {
            let roster = generated_roster(23, seed);
            for k in 2..=7 {
                let mut p = partition(roster.snapshot(), k).unwrap();
                let before = spread(&p);

                Balancer::default().balance(&mut p);

                assert!(spread(&p) <= before, "seed {seed} k {k}");
            }
        }
    }

    #[test]
    fn rebalancing_a_balanced_range_performs_no_swaps() {
        for seed in 1..=5 {
            let roster = generated_roster(19, seed);
            for k in 2..=5 {
                let mut p = partition(roster.snapshot(), k).unwrap();
                let balancer = Balancer::default();
                let report = balancer.balance(&mut p);
                if report.capped_ranges > 0 {
                    continue;
                }

                let mut again = BalanceReport::default();
                let swaps = balancer.merge_and_balance(&mut p, 0, k - 1, &mut again);
                assert_eq!(swaps, 0);
                assert!(again.swaps.is_empty());
            }
        }
    }

    #[test]
    fn balancing_is_deterministic() {
        let roster = generated_roster(31, 42);
        let run = || {
            let mut p = partition(roster.snapshot(), 5).unwrap();
            let report = Balancer::default().balance(&mut p);
            (p, report)
        };

        let (p1, r1) = run();
        let (p2, r2) = run();
        assert_eq!(p1, p2);
        assert_eq!(r1, r2);
    }
}
