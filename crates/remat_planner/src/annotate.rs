//! Schedule annotation.
//!
//! Folds a flat operation [`Sequence`] back onto the original stages,
//! assigning each stage an ordered list of checkpoint-region ids, one
//! per nesting depth. The forward phase (everything before `Loss`)
//! yields depth-0 regions; the backward phase re-executes
//! rematerialised prefixes at tighter memory, opening nested
//! recomputation windows whose regions append deeper ids. A final
//! normalisation pads every member of a top-level region with `None`
//! up to the region's maximum depth, so siblings always report
//! equal-length lists.
//!
//! The annotation is returned as a fresh value; the caller's stage
//! groups are never mutated.

use remat_core::{Operation, ScheduleAnnotation, Sequence};

/// Annotate `num_stages` stages from a reconstructed schedule.
pub fn annotate(sequence: &Sequence, num_stages: usize) -> ScheduleAnnotation {
    let mut stages: Vec<Vec<Option<usize>>> = vec![Vec::new(); num_stages];

    let ops = sequence.ops();
    let loss_pos = sequence.loss_position().unwrap_or(ops.len());
    let fwd_ops = &ops[..loss_pos];
    let bwd_ops = if loss_pos < ops.len() {
        &ops[loss_pos + 1..]
    } else {
        &[]
    };

    let mut ckpt_idx = 0usize;
    let mut in_ckpt = false;
    let mut region: Vec<usize> = Vec::new();

    // Forward phase: depth-0 checkpoint regions. A ForwardCheck opens
    // a region (or closes the current one and opens the next); a
    // ForwardEnable closes it; ForwardNograd stages join it.
    for op in fwd_ops {
        if in_ckpt {
            match op {
                Operation::ForwardNograd(i) => region.push(*i),
                Operation::ForwardEnable(_) => {
                    assign(&mut stages, &region, ckpt_idx);
                    ckpt_idx += 1;
                    region.clear();
                    in_ckpt = false;
                }
                Operation::ForwardCheck(i) => {
                    assign(&mut stages, &region, ckpt_idx);
                    ckpt_idx += 1;
                    region.clear();
                    region.push(*i);
                }
                _ => {}
            }
        } else if let Operation::ForwardCheck(i) = op {
            in_ckpt = true;
            region.push(*i);
        }
    }

    // Backward phase: any forward work here is a recomputation window
    // nested inside some outer region. Each window restarts the id
    // counter and appends one id per stage it touches; the window
    // closes on the next Backward.
    let mut in_recompute = false;
    for op in bwd_ops {
        if in_recompute {
            match op {
                Operation::ForwardNograd(i) => region.push(*i),
                Operation::ForwardEnable(_) => {
                    assign(&mut stages, &region, ckpt_idx);
                    ckpt_idx += 1;
                    region.clear();
                }
                Operation::ForwardCheck(i) => {
                    assign(&mut stages, &region, ckpt_idx);
                    ckpt_idx += 1;
                    region.clear();
                    region.push(*i);
                }
                Operation::Backward(_) => {
                    assign(&mut stages, &region, ckpt_idx);
                    region.clear();
                    in_recompute = false;
                }
                Operation::Loss => {}
            }
        } else if !matches!(op, Operation::Backward(_)) {
            in_recompute = true;
            ckpt_idx = 0;
            region.clear();
            if let Operation::ForwardCheck(i) = op {
                region.push(*i);
            }
        }
    }

    pad_top_level_regions(&mut stages);
    ScheduleAnnotation::from_stages(stages)
}

/// Append a region id to every collected member stage.
fn assign(stages: &mut [Vec<Option<usize>>], region: &[usize], ckpt_idx: usize) {
    for &stage in region {
        stages[stage].push(Some(ckpt_idx));
    }
}

/// Pad id lists so siblings in one top-level region report the same
/// nesting depth.
///
/// A top-level region is a maximal contiguous run of stages sharing
/// the same depth-0 id; nested recomputation can touch its members
/// unevenly, leaving ragged list lengths behind.
fn pad_top_level_regions(stages: &mut [Vec<Option<usize>>]) {
    let mut start = 0;
    while start < stages.len() {
        let Some(id) = depth0(&stages[start]) else {
            start += 1;
            continue;
        };
        let mut end = start;
        while end + 1 < stages.len() && depth0(&stages[end + 1]) == Some(id) {
            end += 1;
        }
        let depth = stages[start..=end]
            .iter()
            .map(|ids| ids.len())
            .max()
            .unwrap_or(0);
        for ids in &mut stages[start..=end] {
            ids.resize(depth, None);
        }
        start = end + 1;
    }
}

fn depth0(ids: &[Option<usize>]) -> Option<usize> {
    ids.first().copied().flatten()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seq(ops: &[Operation]) -> Sequence {
        ops.iter().copied().collect()
    }

    // ========================================
    // Forward Phase Tests
    // ========================================

    #[test]
    fn test_forward_region_closed_by_enable() {
        let sequence = seq(&[
            Operation::ForwardCheck(0),
            Operation::ForwardNograd(1),
            Operation::ForwardNograd(2),
            Operation::ForwardEnable(3),
            Operation::Loss,
            Operation::Backward(3),
        ]);
        let ann = annotate(&sequence, 4);

        assert_eq!(ann.stage(0), &[Some(0)]);
        assert_eq!(ann.stage(1), &[Some(0)]);
        assert_eq!(ann.stage(2), &[Some(0)]);
        assert_eq!(ann.stage(3), &[] as &[Option<usize>]);
    }

    #[test]
    fn test_adjacent_regions_get_distinct_ids() {
        let sequence = seq(&[
            Operation::ForwardCheck(0),
            Operation::ForwardNograd(1),
            Operation::ForwardCheck(2),
            Operation::ForwardNograd(3),
            Operation::ForwardEnable(4),
            Operation::Loss,
            Operation::Backward(4),
        ]);
        let ann = annotate(&sequence, 5);

        assert_eq!(ann.stage(0), &[Some(0)]);
        assert_eq!(ann.stage(1), &[Some(0)]);
        assert_eq!(ann.stage(2), &[Some(1)]);
        assert_eq!(ann.stage(3), &[Some(1)]);
        assert_eq!(ann.stage(4), &[] as &[Option<usize>]);
    }

    #[test]
    fn test_stages_outside_regions_unannotated() {
        let sequence = seq(&[
            Operation::ForwardEnable(0),
            Operation::ForwardEnable(1),
            Operation::Loss,
            Operation::Backward(1),
            Operation::Backward(0),
        ]);
        let ann = annotate(&sequence, 2);

        assert!(ann.stage(0).is_empty());
        assert!(ann.stage(1).is_empty());
    }

    // ========================================
    // Backward Phase Tests
    // ========================================

    #[test]
    fn test_nested_recompute_appends_and_pads() {
        // Forward: one region over stages 0..=2, stage 3 enabled.
        // Backward: stages 0..=1 recompute inside a nested window.
        let sequence = seq(&[
            Operation::ForwardCheck(0),
            Operation::ForwardNograd(1),
            Operation::ForwardNograd(2),
            Operation::ForwardEnable(3),
            Operation::Loss,
            Operation::Backward(3),
            Operation::ForwardCheck(0),
            Operation::ForwardNograd(1),
            Operation::ForwardEnable(2),
            Operation::Backward(2),
            Operation::Backward(1),
            Operation::Backward(0),
        ]);
        let ann = annotate(&sequence, 4);

        // Stages 0 and 1 carry the nested window's id at depth 1;
        // stage 2 is padded so the top-level region stays rectangular.
        assert_eq!(ann.stage(0), &[Some(0), Some(0)]);
        assert_eq!(ann.stage(1), &[Some(0), Some(0)]);
        assert_eq!(ann.stage(2), &[Some(0), None]);
        assert_eq!(ann.stage(3), &[] as &[Option<usize>]);

        // Equal-length lists within the top-level region.
        let lens: Vec<usize> = (0..3).map(|s| ann.stage(s).len()).collect();
        assert_eq!(lens, vec![2, 2, 2]);
    }

    #[test]
    fn test_backward_window_restarts_id_counter() {
        // Two separate backward windows both start their ids at 0.
        let sequence = seq(&[
            Operation::ForwardCheck(0),
            Operation::ForwardNograd(1),
            Operation::ForwardCheck(2),
            Operation::ForwardNograd(3),
            Operation::ForwardEnable(4),
            Operation::Loss,
            Operation::Backward(4),
            Operation::ForwardCheck(2),
            Operation::ForwardNograd(3),
            Operation::Backward(3),
            Operation::Backward(2),
            Operation::ForwardCheck(0),
            Operation::ForwardNograd(1),
            Operation::Backward(1),
            Operation::Backward(0),
        ]);
        let ann = annotate(&sequence, 5);

        assert_eq!(ann.stage(0), &[Some(0), Some(0)]);
        assert_eq!(ann.stage(1), &[Some(0), Some(0)]);
        assert_eq!(ann.stage(2), &[Some(1), Some(0)]);
        assert_eq!(ann.stage(3), &[Some(1), Some(0)]);
    }

    // ========================================
    // Normalisation Tests
    // ========================================

    #[test]
    fn test_padding_only_within_matching_region() {
        // Two top-level regions with different nesting depths: padding
        // never leaks across the region boundary.
        let sequence = seq(&[
            Operation::ForwardCheck(0),
            Operation::ForwardNograd(1),
            Operation::ForwardCheck(2),
            Operation::ForwardNograd(3),
            Operation::ForwardEnable(4),
            Operation::Loss,
            Operation::Backward(4),
            Operation::ForwardCheck(2),
            Operation::ForwardNograd(3),
            Operation::Backward(3),
            Operation::Backward(2),
            Operation::Backward(1),
            Operation::Backward(0),
        ]);
        let ann = annotate(&sequence, 5);

        // Region of stages 0..=1 saw no nested window: depth 1.
        assert_eq!(ann.stage(0), &[Some(0)]);
        assert_eq!(ann.stage(1), &[Some(0)]);
        // Region of stages 2..=3 nests one window: depth 2.
        assert_eq!(ann.stage(2), &[Some(1), Some(0)]);
        assert_eq!(ann.stage(3), &[Some(1), Some(0)]);
    }

    #[test]
    fn test_sequence_without_loss_annotates_forward_only() {
        let sequence = seq(&[
            Operation::ForwardCheck(0),
            Operation::ForwardNograd(1),
            Operation::ForwardEnable(2),
        ]);
        let ann = annotate(&sequence, 3);
        assert_eq!(ann.stage(0), &[Some(0)]);
        assert_eq!(ann.stage(1), &[Some(0)]);
        assert!(ann.stage(2).is_empty());
    }
}
