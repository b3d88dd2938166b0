use crate::shape::Shape;

/// Visit the contiguous innermost runs of a `count`-shaped block copied between two row-major
/// arrays.
///
/// `f(src_index, dst_index, len)` receives linear element indices; `src_offset` / `dst_offset`
/// are the block origins inside `src_extent` / `dst_extent`. Bounds are checked by the caller.
pub(crate) fn for_each_run(
    src_extent: &Shape,
    src_offset: &Shape,
    dst_extent: &Shape,
    dst_offset: &Shape,
    count: &Shape,
    mut f: impl FnMut(usize, usize, usize),
) {
    let rank = count.rank();
    if rank == 0 {
        f(0, 0, 1);
        return;
    }
    if count.iter().any(|&c| c == 0) {
        return;
    }

    let src_strides = src_extent.strides();
    let dst_strides = dst_extent.strides();
    let run = count[rank - 1];
    let mut idx = Shape::zeros(rank - 1);

    loop {
        let mut src = src_offset[rank - 1];
        let mut dst = dst_offset[rank - 1];
        for k in 0..rank - 1 {
            src += (src_offset[k] + idx[k]) * src_strides[k];
            dst += (dst_offset[k] + idx[k]) * dst_strides[k];
        }
        f(src, dst, run);

        // odometer over the outer dimensions
        let mut k = rank - 1;
        loop {
            if k == 0 {
                return;
            }
            k -= 1;
            idx[k] += 1;
            if idx[k] < count[k] {
                break;
            }
            idx[k] = 0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn runs(src_extent: [usize; 2], src_offset: [usize; 2], count: [usize; 2]) -> Vec<(usize, usize, usize)> {
        let mut out = Vec::new();
        for_each_run(
            &Shape::from(src_extent),
            &Shape::from(src_offset),
            &Shape::from(count),
            &Shape::zeros(2),
            &Shape::from(count),
            |s, d, n| out.push((s, d, n)),
        );
        out
    }

    #[test]
    fn block_inside_grid() {
        assert_eq!(
            runs([4, 5], [1, 2], [2, 3]),
            vec![(7, 0, 3), (12, 3, 3)]
        );
    }

    #[test]
    fn full_rows_are_single_runs_per_row() {
        assert_eq!(
            runs([3, 4], [0, 0], [3, 4]),
            vec![(0, 0, 4), (4, 4, 4), (8, 8, 4)]
        );
    }

    #[test]
    fn empty_and_scalar_blocks() {
        assert!(runs([3, 4], [0, 0], [0, 4]).is_empty());

        let mut out = Vec::new();
        let empty = Shape::new();
        for_each_run(&empty, &empty, &empty, &empty, &empty, |s, d, n| out.push((s, d, n)));
        assert_eq!(out, vec![(0, 0, 1)]);
    }

    #[test]
    fn three_dimensional_block() {
        let mut out = Vec::new();
        for_each_run(
            &Shape::from([3, 4, 5]),
            &Shape::from([1, 1, 1]),
            &Shape::from([2, 2, 2]),
            &Shape::zeros(3),
            &Shape::from([2, 2, 2]),
            |s, d, n| out.push((s, d, n)),
        );
        assert_eq!(out, vec![(26, 0, 2), (31, 2, 2), (46, 4, 2), (51, 6, 2)]);
    }
}
