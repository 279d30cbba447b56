//! Moore-neighbour boundary tracing.

#[cfg(test)]
#[path = "trace_test.rs"]
mod trace_test;

/// The eight neighbour offsets, clockwise from north (y grows downwards).
const DIRECTIONS: [(i64, i64); 8] = [(0, -1), (1, -1), (1, 0), (1, 1), (0, 1), (-1, 1), (-1, 0), (-1, -1)];

/// Direction the trace is considered to have entered the start pixel from (west).
const INITIAL_ENTRY: usize = 6;

/// Walk the outer boundary of a region starting at its topmost-leftmost pixel.
///
/// At each step the neighbours are probed clockwise, beginning one step past
/// the direction back to the previous pixel. The walk stops when it returns
/// to `start`, when a pixel has no member neighbours, or after `max_steps`
/// moves. The returned sequence begins with `start`.
pub fn trace_boundary<F>(start: (i64, i64), max_steps: usize, is_member: F) -> Vec<(i64, i64)>
where
    F: Fn(i64, i64) -> bool,
{
    let mut boundary = vec![start];
    let mut current = start;
    let mut entry = INITIAL_ENTRY;
    let mut steps = 0;

    loop {
        let next = (0..8).map(|k| (entry + 1 + k) % 8).find_map(|dir| {
            let (dx, dy) = DIRECTIONS[dir];
            let candidate = (current.0 + dx, current.1 + dy);
            is_member(candidate.0, candidate.1).then_some((candidate, dir))
        });
        let Some((pixel, dir)) = next else {
            break;
        };
        current = pixel;
        entry = (dir + 4) % 8;
        boundary.push(current);

        if current == start || steps >= max_steps {
            break;
        }
        steps += 1;
    }
    boundary
}

/// Keep every `stride`-th point, starting with the first.
#[must_use]
pub fn downsample<T: Copy>(points: &[T], stride: usize) -> Vec<T> {
    points.iter().step_by(stride.max(1)).copied().collect()
}
