//! Node split strategies.
//!
//! When a node holds `max_fanout + 1` items the tree asks its
//! [`SplitStrategy`] how to divide them. Strategies only see the items'
//! envelopes and answer with two groups of positions; the tree moves the
//! entries or child nodes itself.

use std::cmp::Ordering;

use crate::envelope::Envelope;

/// Two disjoint groups of item positions covering every input item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Partition {
    pub first: Vec<usize>,
    pub second: Vec<usize>,
}

impl Partition {
    /// Checks that the groups cover `0..len` exactly once and that each has
    /// at least `min_fanout` members.
    pub fn is_valid(&self, len: usize, min_fanout: usize) -> bool {
        if self.first.len() < min_fanout || self.second.len() < min_fanout {
            return false;
        }
        if self.first.len() + self.second.len() != len {
            return false;
        }
        let mut seen = vec![false; len];
        for &index in self.first.iter().chain(&self.second) {
            if index >= len || seen[index] {
                return false;
            }
            seen[index] = true;
        }
        true
    }
}

/// Decides how an overflowing node's items are divided between two nodes.
///
/// Implementations receive at least `2 * min_fanout` envelopes and must
/// return a partition in which both groups hold at least `min_fanout` items.
pub trait SplitStrategy: Send + Sync {
    /// Short identifier used in diagnostics.
    fn name(&self) -> &'static str;

    fn partition(&self, boxes: &[Envelope], min_fanout: usize) -> Partition;
}

/// The R*-tree split.
///
/// ChooseSplitAxis picks the axis whose sorted orderings have the smallest
/// total margin over all legal split points; ChooseSplitIndex then picks, on
/// that axis, the split with the least overlap between the two groups and,
/// on ties, the least combined area.
#[derive(Debug, Clone, Copy, Default)]
pub struct StarSplit;

/// Guttman's quadratic split.
///
/// Cheaper per split than [`StarSplit`] but tends to produce more overlap.
#[derive(Debug, Clone, Copy, Default)]
pub struct QuadraticSplit;

/// Union of each prefix `[0..=i]` of `order`.
fn prefix_bounds(boxes: &[Envelope], order: &[usize]) -> Vec<Envelope> {
    let mut out = Vec::with_capacity(order.len());
    let mut acc = boxes[order[0]].clone();
    out.push(acc.clone());
    for &index in &order[1..] {
        acc.expand(&boxes[index]);
        out.push(acc.clone());
    }
    out
}

/// Union of each suffix `[i..]` of `order`.
fn suffix_bounds(boxes: &[Envelope], order: &[usize]) -> Vec<Envelope> {
    let mut out = prefix_bounds(boxes, &order.iter().rev().copied().collect::<Vec<_>>());
    out.reverse();
    out
}

/// One sorted ordering together with its prefix/suffix unions.
struct Distribution {
    order: Vec<usize>,
    prefix: Vec<Envelope>,
    suffix: Vec<Envelope>,
}

impl Distribution {
    fn new(boxes: &[Envelope], order: Vec<usize>) -> Self {
        let prefix = prefix_bounds(boxes, &order);
        let suffix = suffix_bounds(boxes, &order);
        Self {
            order,
            prefix,
            suffix,
        }
    }

    /// Bounds of the two groups when the first `k` items go left.
    fn groups(&self, k: usize) -> (&Envelope, &Envelope) {
        (&self.prefix[k - 1], &self.suffix[k])
    }
}

fn sorted_by(boxes: &[Envelope], key: impl Fn(&Envelope) -> (f64, f64)) -> Vec<usize> {
    let mut order: Vec<usize> = (0..boxes.len()).collect();
    order.sort_by(|&a, &b| {
        let (a1, a2) = key(&boxes[a]);
        let (b1, b2) = key(&boxes[b]);
        a1.total_cmp(&b1).then(a2.total_cmp(&b2))
    });
    order
}

impl StarSplit {
    /// The by-lower and by-upper orderings along one axis.
    fn distributions(boxes: &[Envelope], axis: usize) -> [Distribution; 2] {
        let by_lower = sorted_by(boxes, |e| (e.lower()[axis], e.upper()[axis]));
        let by_upper = sorted_by(boxes, |e| (e.upper()[axis], e.lower()[axis]));
        [
            Distribution::new(boxes, by_lower),
            Distribution::new(boxes, by_upper),
        ]
    }

    fn choose_split_axis(boxes: &[Envelope], split_points: &[usize]) -> usize {
        let dimension = boxes[0].dimension();
        let mut best_axis = 0;
        let mut best_margin = f64::INFINITY;

        for axis in 0..dimension {
            let mut margin = 0.0;
            for distribution in Self::distributions(boxes, axis).iter() {
                for &k in split_points {
                    let (left, right) = distribution.groups(k);
                    margin += left.perimeter() + right.perimeter();
                }
            }
            if margin < best_margin {
                best_margin = margin;
                best_axis = axis;
            }
        }
        best_axis
    }

    fn choose_split_index(
        boxes: &[Envelope],
        axis: usize,
        split_points: &[usize],
    ) -> Partition {
        let distributions = Self::distributions(boxes, axis);
        let mut best: Option<(f64, f64, usize, usize)> = None;

        for (which, distribution) in distributions.iter().enumerate() {
            for &k in split_points {
                let (left, right) = distribution.groups(k);
                let overlap = left.overlap_area(right);
                let area = left.area() + right.area();
                let better = match best {
                    None => true,
                    Some((best_overlap, best_area, _, _)) => {
                        match overlap.total_cmp(&best_overlap) {
                            Ordering::Less => true,
                            Ordering::Equal => area < best_area,
                            Ordering::Greater => false,
                        }
                    }
                };
                if better {
                    best = Some((overlap, area, which, k));
                }
            }
        }

        let (_, _, which, k) = best.expect("at least one split point");
        let order = &distributions[which].order;
        Partition {
            first: order[..k].to_vec(),
            second: order[k..].to_vec(),
        }
    }
}

impl SplitStrategy for StarSplit {
    fn name(&self) -> &'static str {
        "star"
    }

    fn partition(&self, boxes: &[Envelope], min_fanout: usize) -> Partition {
        let len = boxes.len();
        assert!(
            len >= 2 && len >= 2 * min_fanout,
            "cannot split {} items into groups of at least {}",
            len,
            min_fanout
        );
        let min_fanout = min_fanout.max(1);
        let split_points: Vec<usize> = (min_fanout..=len - min_fanout).collect();

        let axis = Self::choose_split_axis(boxes, &split_points);
        Self::choose_split_index(boxes, axis, &split_points)
    }
}

impl QuadraticSplit {
    /// The pair wasting the most area when covered by one box.
    fn pick_seeds(boxes: &[Envelope]) -> (usize, usize) {
        let mut seeds = (0, 1);
        let mut worst = f64::NEG_INFINITY;
        for i in 0..boxes.len() {
            for j in (i + 1)..boxes.len() {
                let waste = boxes[i].union(&boxes[j]).area() - boxes[i].area() - boxes[j].area();
                if waste > worst {
                    worst = waste;
                    seeds = (i, j);
                }
            }
        }
        seeds
    }
}

impl SplitStrategy for QuadraticSplit {
    fn name(&self) -> &'static str {
        "quadratic"
    }

    fn partition(&self, boxes: &[Envelope], min_fanout: usize) -> Partition {
        let len = boxes.len();
        assert!(
            len >= 2 && len >= 2 * min_fanout,
            "cannot split {} items into groups of at least {}",
            len,
            min_fanout
        );

        let (seed_a, seed_b) = Self::pick_seeds(boxes);
        let mut first = vec![seed_a];
        let mut second = vec![seed_b];
        let mut first_bounds = boxes[seed_a].clone();
        let mut second_bounds = boxes[seed_b].clone();
        let mut remaining: Vec<usize> = (0..len).filter(|&i| i != seed_a && i != seed_b).collect();

        while !remaining.is_empty() {
            // a group that needs every remaining item to reach the minimum takes them all
            if first.len() + remaining.len() <= min_fanout {
                first.append(&mut remaining);
                break;
            }
            if second.len() + remaining.len() <= min_fanout {
                second.append(&mut remaining);
                break;
            }

            // PickNext: the item with the strongest preference for one group
            let (position, grow_first, grow_second) = remaining
                .iter()
                .enumerate()
                .map(|(position, &index)| {
                    (
                        position,
                        first_bounds.enlargement(&boxes[index]),
                        second_bounds.enlargement(&boxes[index]),
                    )
                })
                .max_by(|a, b| (a.1 - a.2).abs().total_cmp(&(b.1 - b.2).abs()))
                .expect("remaining is not empty");
            let index = remaining.swap_remove(position);

            let to_first = match grow_first.total_cmp(&grow_second) {
                Ordering::Less => true,
                Ordering::Greater => false,
                Ordering::Equal => match first_bounds.area().total_cmp(&second_bounds.area()) {
                    Ordering::Less => true,
                    Ordering::Greater => false,
                    Ordering::Equal => first.len() <= second.len(),
                },
            };
            if to_first {
                first_bounds.expand(&boxes[index]);
                first.push(index);
            } else {
                second_bounds.expand(&boxes[index]);
                second.push(index);
            }
        }

        Partition { first, second }
    }
}
