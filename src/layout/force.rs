// src/layout/force.rs

//! Deterministic force-directed placement (Fruchterman–Reingold).
//!
//! No randomness: nodes start on a circle in model order and the cooling
//! schedule is fixed, so identical input always yields identical output.

use std::collections::HashMap;
use std::f64::consts::PI;

use crate::layout::LayoutOptions;
use crate::layout::builtin::{Extent, components, pack_components};

const ITERATIONS: usize = 200;
const MIN_DISTANCE: f64 = 0.01;

/// Positions (top-left, relative to the content origin) for every extent.
pub fn place(
    extents: &[Extent],
    links: &[(usize, usize)],
    options: &LayoutOptions,
) -> Vec<(f64, f64)> {
    let parts = components(extents.len(), links)
        .into_iter()
        .map(|members| {
            let positions = place_component(&members, extents, links, options);
            (members, positions)
        })
        .collect();

    pack_components(
        extents.len(),
        parts,
        extents,
        options.direction,
        options.component_spacing,
    )
}

fn place_component(
    members: &[usize],
    extents: &[Extent],
    links: &[(usize, usize)],
    options: &LayoutOptions,
) -> Vec<(f64, f64)> {
    let n = members.len();
    if n == 1 {
        return vec![(0.0, 0.0)];
    }

    let largest = members
        .iter()
        .map(|&i| extents[i].width.max(extents[i].height))
        .fold(0.0, f64::max);
    let k = (largest + options.node_spacing).max(1.0);

    let local: HashMap<usize, usize> =
        members.iter().enumerate().map(|(li, &gi)| (gi, li)).collect();
    let springs: Vec<(usize, usize)> = links
        .iter()
        .filter_map(|(s, t)| Some((*local.get(s)?, *local.get(t)?)))
        .collect();

    let radius = (k * n as f64 / (2.0 * PI)).max(k);
    let mut centers: Vec<(f64, f64)> = (0..n)
        .map(|i| {
            let angle = 2.0 * PI * i as f64 / n as f64;
            (radius * angle.cos(), radius * angle.sin())
        })
        .collect();

    let mut temperature = radius;
    let cooling = temperature / ITERATIONS as f64;

    for _ in 0..ITERATIONS {
        let mut shift = vec![(0.0_f64, 0.0_f64); n];

        for a in 0..n {
            for b in (a + 1)..n {
                let (dx, dy, d) = delta(centers[a], centers[b], a, b);
                let force = k * k / d;
                let (fx, fy) = (dx / d * force, dy / d * force);
                shift[a].0 += fx;
                shift[a].1 += fy;
                shift[b].0 -= fx;
                shift[b].1 -= fy;
            }
        }

        for &(s, t) in &springs {
            let (dx, dy, d) = delta(centers[s], centers[t], s, t);
            let force = d * d / k;
            let (fx, fy) = (dx / d * force, dy / d * force);
            shift[s].0 -= fx;
            shift[s].1 -= fy;
            shift[t].0 += fx;
            shift[t].1 += fy;
        }

        for (c, (sx, sy)) in centers.iter_mut().zip(shift) {
            let len = (sx * sx + sy * sy).sqrt();
            if len > 0.0 {
                let step = len.min(temperature);
                c.0 += sx / len * step;
                c.1 += sy / len * step;
            }
        }

        temperature = (temperature - cooling).max(0.0);
    }

    // Centers to top-left corners, then move the component to the origin.
    let corners: Vec<(f64, f64)> = members
        .iter()
        .zip(&centers)
        .map(|(&i, &(cx, cy))| (cx - extents[i].width / 2.0, cy - extents[i].height / 2.0))
        .collect();
    let min_x = corners.iter().map(|c| c.0).fold(f64::INFINITY, f64::min);
    let min_y = corners.iter().map(|c| c.1).fold(f64::INFINITY, f64::min);

    corners
        .into_iter()
        .map(|(x, y)| (x - min_x, y - min_y))
        .collect()
}

/// Vector from `b` to `a` and its length, never shorter than
/// [`MIN_DISTANCE`]. Coincident points are pushed apart along a fixed axis
/// chosen from their indices.
fn delta(a: (f64, f64), b: (f64, f64), ia: usize, ib: usize) -> (f64, f64, f64) {
    let (mut dx, mut dy) = (a.0 - b.0, a.1 - b.1);
    let mut d = (dx * dx + dy * dy).sqrt();
    if d < MIN_DISTANCE {
        let sign = if ia < ib { 1.0 } else { -1.0 };
        dx = MIN_DISTANCE * sign;
        dy = 0.0;
        d = MIN_DISTANCE;
    }
    (dx, dy, d)
}
