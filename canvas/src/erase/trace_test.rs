use std::collections::HashSet;

use super::*;

fn square(size: i64) -> HashSet<(i64, i64)> {
    (0..size).flat_map(|y| (0..size).map(move |x| (x, y))).collect()
}

#[test]
fn lone_pixel_traces_to_itself() {
    let boundary = trace_boundary((0, 0), 100, |x, y| (x, y) == (0, 0));
    assert_eq!(boundary, vec![(0, 0)]);
}

#[test]
fn two_by_two_square_is_walked_clockwise() {
    let pixels = square(2);
    let boundary = trace_boundary((0, 0), 100, |x, y| pixels.contains(&(x, y)));
    assert_eq!(boundary, vec![(0, 0), (1, 0), (1, 1), (0, 1), (0, 0)]);
}

#[test]
fn square_boundary_visits_only_edge_pixels() {
    let pixels = square(10);
    let boundary = trace_boundary((0, 0), 1000, |x, y| pixels.contains(&(x, y)));
    assert_eq!(boundary.len(), 37);
    assert_eq!(boundary.last(), Some(&(0, 0)));
    assert!(boundary.iter().all(|&(x, y)| x == 0 || x == 9 || y == 0 || y == 9));
}

#[test]
fn trace_stops_at_step_cap() {
    let pixels = square(10);
    let boundary = trace_boundary((0, 0), 3, |x, y| pixels.contains(&(x, y)));
    assert_eq!(boundary.len(), 5);
}

#[test]
fn downsample_keeps_every_nth_from_first() {
    let points: Vec<i32> = (0..8).collect();
    assert_eq!(downsample(&points, 2), vec![0, 2, 4, 6]);
    assert_eq!(downsample(&points, 3), vec![0, 3, 6]);
    assert_eq!(downsample(&points, 0), points);
}
