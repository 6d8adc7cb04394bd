//! Segmentation Integration Tests
//!
//! Tests for partitioning, ordering and the greedy overflow rule.

use std::collections::HashSet;
use std::num::NonZeroUsize;

use rolecheck::review::{per_segment_target, segment};

fn n(v: usize) -> NonZeroUsize {
    NonZeroUsize::new(v).unwrap()
}

fn articles(sizes: &[usize]) -> Vec<(String, usize)> {
    sizes
        .iter()
        .enumerate()
        .map(|(i, &c)| (format!("art{:03}", i + 1), c))
        .collect()
}

#[test]
fn test_worked_example_three_articles_two_segments() {
    // 5 + 3 + 4 = 12 entities, target ceil(12 / 2) = 6.
    // art1 opens the first segment (5). Adding art2 would make 8 > 6, so the
    // segment closes first. Adding art3 to art2 would make 7 > 6, so art3
    // starts a third segment.
    let input = articles(&[5, 3, 4]);
    assert_eq!(per_segment_target(12, n(2)), 6);

    let segments = segment(&input, n(2));
    let ids: Vec<Vec<String>> = segments.iter().map(|s| s.article_ids.clone()).collect();
    assert_eq!(ids, vec![vec!["art001"], vec!["art002"], vec!["art003"]]);
    let counts: Vec<usize> = segments.iter().map(|s| s.entity_count).collect();
    assert_eq!(counts, vec![5, 3, 4]);
}

#[test]
fn test_segments_partition_articles_in_order() {
    let shapes: Vec<(Vec<usize>, usize)> = vec![
        (vec![1, 2, 3, 4, 5, 6, 7], 3),
        (vec![10, 1, 1, 1, 1], 4),
        (vec![2; 20], 5),
        (vec![7], 3),
        (vec![3, 9, 1, 1, 8, 2, 2, 6], 1),
        (vec![1, 1, 1], 10),
    ];

    for (sizes, target) in shapes {
        let input = articles(&sizes);
        let segments = segment(&input, n(target));

        // Union is every article, in ascending id order
        let flattened: Vec<&String> = segments.iter().flat_map(|s| s.article_ids.iter()).collect();
        let expected: Vec<&String> = input.iter().map(|(id, _)| id).collect();
        assert_eq!(flattened, expected, "sizes {:?} target {}", sizes, target);

        // Pairwise disjoint
        let unique: HashSet<&String> = flattened.iter().copied().collect();
        assert_eq!(unique.len(), flattened.len());

        // No empty segment, and a segment only exceeds the target when it is a single article
        let per_target = per_segment_target(sizes.iter().sum(), n(target));
        for s in &segments {
            assert!(!s.is_empty());
            if s.entity_count > per_target {
                assert_eq!(s.len(), 1, "oversized multi-article segment for {:?}", sizes);
            }
        }
    }
}

#[test]
fn test_input_order_does_not_matter() {
    let forward = vec![
        ("a".to_string(), 2),
        ("b".to_string(), 2),
        ("c".to_string(), 2),
    ];
    let mut reversed = forward.clone();
    reversed.reverse();

    assert_eq!(segment(&forward, n(2)), segment(&reversed, n(2)));
}

#[test]
fn test_empty_language() {
    let segments = segment(&[], n(3));
    assert_eq!(segments.len(), 1);
    assert!(segments[0].is_empty());
    assert_eq!(segments[0].entity_count, 0);
}
