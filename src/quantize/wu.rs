//! Wu variance-minimizing color quantization.
//!
//! Greedy orthogonal bipartitioning over a 32³ histogram of cumulated color
//! moments: the box with the greatest within-box variance is split at the
//! position that minimizes the combined variance of the halves, until the
//! requested number of boxes exists or no box can be split further. Each
//! box's weighted mean becomes one palette entry.
//!
//! After Xiaolin Wu, "Color quantization by dynamic programming and
//! principal analysis", ACM Transactions on Graphics 11(4), 1992.

use alloc::vec;
use alloc::vec::Vec;

use rgb::RGB;

use crate::palette::RgbQuad;

/// Histogram side: channel values collapse to 5 bits, indices 1..=32.
/// Index 0 stays empty so cumulated moments have a zero border.
const SIDE: usize = 33;

#[derive(Clone, Copy, PartialEq, Eq)]
enum Axis {
    Red,
    Green,
    Blue,
}

/// Half-open box over histogram bins: `(r0, r1]` etc.
#[derive(Clone, Copy, Default)]
struct Cube {
    r0: usize,
    r1: usize,
    g0: usize,
    g1: usize,
    b0: usize,
    b1: usize,
    vol: usize,
}

struct Moments {
    wt: Vec<i64>,
    mr: Vec<i64>,
    mg: Vec<i64>,
    mb: Vec<i64>,
    m2: Vec<f64>,
}

#[inline]
fn at(r: usize, g: usize, b: usize) -> usize {
    (r * SIDE + g) * SIDE + b
}

fn histogram(pixels: &[RGB<u8>]) -> Moments {
    let cells = SIDE * SIDE * SIDE;
    let mut m = Moments {
        wt: vec![0; cells],
        mr: vec![0; cells],
        mg: vec![0; cells],
        mb: vec![0; cells],
        m2: vec![0.0; cells],
    };
    for px in pixels {
        let (r, g, b) = (px.r as usize, px.g as usize, px.b as usize);
        let i = at((r >> 3) + 1, (g >> 3) + 1, (b >> 3) + 1);
        m.wt[i] += 1;
        m.mr[i] += r as i64;
        m.mg[i] += g as i64;
        m.mb[i] += b as i64;
        m.m2[i] += (r * r + g * g + b * b) as f64;
    }
    m
}

/// Convert per-bin moments to cumulated 3-D prefix moments.
fn cumulate(m: &mut Moments) {
    for r in 1..SIDE {
        let mut area = [0i64; SIDE];
        let mut area_r = [0i64; SIDE];
        let mut area_g = [0i64; SIDE];
        let mut area_b = [0i64; SIDE];
        let mut area2 = [0.0f64; SIDE];
        for g in 1..SIDE {
            let mut line = 0i64;
            let mut line_r = 0i64;
            let mut line_g = 0i64;
            let mut line_b = 0i64;
            let mut line2 = 0.0f64;
            for b in 1..SIDE {
                let i = at(r, g, b);
                line += m.wt[i];
                line_r += m.mr[i];
                line_g += m.mg[i];
                line_b += m.mb[i];
                line2 += m.m2[i];
                area[b] += line;
                area_r[b] += line_r;
                area_g[b] += line_g;
                area_b[b] += line_b;
                area2[b] += line2;
                let prev = at(r - 1, g, b);
                m.wt[i] = m.wt[prev] + area[b];
                m.mr[i] = m.mr[prev] + area_r[b];
                m.mg[i] = m.mg[prev] + area_g[b];
                m.mb[i] = m.mb[prev] + area_b[b];
                m.m2[i] = m.m2[prev] + area2[b];
            }
        }
    }
}

/// Sum of a cumulated moment over a box, by inclusion-exclusion.
fn vol(c: &Cube, mmt: &[i64]) -> i64 {
    mmt[at(c.r1, c.g1, c.b1)] - mmt[at(c.r1, c.g1, c.b0)] - mmt[at(c.r1, c.g0, c.b1)]
        + mmt[at(c.r1, c.g0, c.b0)]
        - mmt[at(c.r0, c.g1, c.b1)]
        + mmt[at(c.r0, c.g1, c.b0)]
        + mmt[at(c.r0, c.g0, c.b1)]
        - mmt[at(c.r0, c.g0, c.b0)]
}

fn vol_f(c: &Cube, mmt: &[f64]) -> f64 {
    mmt[at(c.r1, c.g1, c.b1)] - mmt[at(c.r1, c.g1, c.b0)] - mmt[at(c.r1, c.g0, c.b1)]
        + mmt[at(c.r1, c.g0, c.b0)]
        - mmt[at(c.r0, c.g1, c.b1)]
        + mmt[at(c.r0, c.g1, c.b0)]
        + mmt[at(c.r0, c.g0, c.b1)]
        - mmt[at(c.r0, c.g0, c.b0)]
}

/// The part of `vol` that is constant over all cut positions along `axis`
/// (the lower-face term).
fn bottom(c: &Cube, axis: Axis, mmt: &[i64]) -> i64 {
    match axis {
        Axis::Red => {
            -mmt[at(c.r0, c.g1, c.b1)] + mmt[at(c.r0, c.g1, c.b0)] + mmt[at(c.r0, c.g0, c.b1)]
                - mmt[at(c.r0, c.g0, c.b0)]
        }
        Axis::Green => {
            -mmt[at(c.r1, c.g0, c.b1)] + mmt[at(c.r1, c.g0, c.b0)] + mmt[at(c.r0, c.g0, c.b1)]
                - mmt[at(c.r0, c.g0, c.b0)]
        }
        Axis::Blue => {
            -mmt[at(c.r1, c.g1, c.b0)] + mmt[at(c.r1, c.g0, c.b0)] + mmt[at(c.r0, c.g1, c.b0)]
                - mmt[at(c.r0, c.g0, c.b0)]
        }
    }
}

/// The part of `vol` that varies with cut position `pos` along `axis`.
fn top(c: &Cube, axis: Axis, pos: usize, mmt: &[i64]) -> i64 {
    match axis {
        Axis::Red => {
            mmt[at(pos, c.g1, c.b1)] - mmt[at(pos, c.g1, c.b0)] - mmt[at(pos, c.g0, c.b1)]
                + mmt[at(pos, c.g0, c.b0)]
        }
        Axis::Green => {
            mmt[at(c.r1, pos, c.b1)] - mmt[at(c.r1, pos, c.b0)] - mmt[at(c.r0, pos, c.b1)]
                + mmt[at(c.r0, pos, c.b0)]
        }
        Axis::Blue => {
            mmt[at(c.r1, c.g1, pos)] - mmt[at(c.r1, c.g0, pos)] - mmt[at(c.r0, c.g1, pos)]
                + mmt[at(c.r0, c.g0, pos)]
        }
    }
}

/// Weighted within-box variance.
fn variance(c: &Cube, m: &Moments) -> f64 {
    let dr = vol(c, &m.mr) as f64;
    let dg = vol(c, &m.mg) as f64;
    let db = vol(c, &m.mb) as f64;
    let w = vol(c, &m.wt) as f64;
    if w <= 0.0 {
        return 0.0;
    }
    vol_f(c, &m.m2) - (dr * dr + dg * dg + db * db) / w
}

struct Whole {
    r: i64,
    g: i64,
    b: i64,
    w: i64,
}

/// Best cut position along `axis` and the variance reduction it achieves.
/// Returns `(gain, Some(pos))`, or `None` when no position keeps both
/// halves non-empty.
fn maximize(c: &Cube, axis: Axis, first: usize, last: usize, whole: &Whole, m: &Moments) -> (f64, Option<usize>) {
    let base_r = bottom(c, axis, &m.mr);
    let base_g = bottom(c, axis, &m.mg);
    let base_b = bottom(c, axis, &m.mb);
    let base_w = bottom(c, axis, &m.wt);

    let mut max = 0.0f64;
    let mut cut = None;
    for pos in first..last {
        let mut half_r = base_r + top(c, axis, pos, &m.mr);
        let mut half_g = base_g + top(c, axis, pos, &m.mg);
        let mut half_b = base_b + top(c, axis, pos, &m.mb);
        let mut half_w = base_w + top(c, axis, pos, &m.wt);
        if half_w == 0 {
            continue;
        }
        let mut temp =
            ((half_r * half_r + half_g * half_g + half_b * half_b) as f64) / half_w as f64;

        half_r = whole.r - half_r;
        half_g = whole.g - half_g;
        half_b = whole.b - half_b;
        half_w = whole.w - half_w;
        if half_w == 0 {
            continue;
        }
        temp += ((half_r * half_r + half_g * half_g + half_b * half_b) as f64) / half_w as f64;

        if temp > max {
            max = temp;
            cut = Some(pos);
        }
    }
    (max, cut)
}

/// Split `set1` at the best cut; on success `set2` receives the upper half.
fn cut(set1: &mut Cube, set2: &mut Cube, m: &Moments) -> bool {
    let whole = Whole {
        r: vol(set1, &m.mr),
        g: vol(set1, &m.mg),
        b: vol(set1, &m.mb),
        w: vol(set1, &m.wt),
    };

    let (max_r, cut_r) = maximize(set1, Axis::Red, set1.r0 + 1, set1.r1, &whole, m);
    let (max_g, cut_g) = maximize(set1, Axis::Green, set1.g0 + 1, set1.g1, &whole, m);
    let (max_b, cut_b) = maximize(set1, Axis::Blue, set1.b0 + 1, set1.b1, &whole, m);

    // Red wins ties, then green: a fixed order keeps the split deterministic.
    let (axis, pos) = if max_r >= max_g && max_r >= max_b {
        match cut_r {
            Some(p) => (Axis::Red, p),
            None => return false,
        }
    } else if max_g >= max_r && max_g >= max_b {
        match cut_g {
            Some(p) => (Axis::Green, p),
            None => return false,
        }
    } else {
        match cut_b {
            Some(p) => (Axis::Blue, p),
            None => return false,
        }
    };

    *set2 = *set1;
    match axis {
        Axis::Red => {
            set1.r1 = pos;
            set2.r0 = pos;
        }
        Axis::Green => {
            set1.g1 = pos;
            set2.g0 = pos;
        }
        Axis::Blue => {
            set1.b1 = pos;
            set2.b0 = pos;
        }
    }
    set1.vol = (set1.r1 - set1.r0) * (set1.g1 - set1.g0) * (set1.b1 - set1.b0);
    set2.vol = (set2.r1 - set2.r0) * (set2.g1 - set2.g0) * (set2.b1 - set2.b0);
    true
}

/// Build up to `max_colors` palette entries for `pixels`. Produces fewer
/// entries when the image holds fewer distinct histogram bins.
pub(crate) fn build_palette(pixels: &[RGB<u8>], max_colors: usize) -> Vec<RgbQuad> {
    if max_colors == 0 || pixels.is_empty() {
        return Vec::new();
    }

    let mut m = histogram(pixels);
    cumulate(&mut m);

    let mut cubes = vec![Cube::default(); max_colors];
    cubes[0] = Cube {
        r0: 0,
        r1: SIDE - 1,
        g0: 0,
        g1: SIDE - 1,
        b0: 0,
        b1: SIDE - 1,
        vol: 0,
    };
    let mut vv = vec![0.0f64; max_colors];

    let mut count = max_colors;
    let mut next = 0usize;
    let mut i = 1usize;
    while i < max_colors {
        let mut upper = Cube::default();
        let mut lower = cubes[next];
        if cut(&mut lower, &mut upper, &m) {
            cubes[next] = lower;
            cubes[i] = upper;
            vv[next] = if cubes[next].vol > 1 {
                variance(&cubes[next], &m)
            } else {
                0.0
            };
            vv[i] = if cubes[i].vol > 1 {
                variance(&cubes[i], &m)
            } else {
                0.0
            };
        } else {
            // This box cannot split; exclude it and try the next best.
            vv[next] = 0.0;
            i -= 1;
        }

        next = 0;
        let mut temp = vv[0];
        for (k, &v) in vv.iter().enumerate().take(i + 1).skip(1) {
            if v > temp {
                temp = v;
                next = k;
            }
        }
        if temp <= 0.0 {
            count = i + 1;
            break;
        }
        i += 1;
    }

    let mut palette = Vec::with_capacity(count);
    for c in &cubes[..count] {
        let weight = vol(c, &m.wt);
        if weight > 0 {
            palette.push(RgbQuad::new(
                (vol(c, &m.mr) / weight) as u8,
                (vol(c, &m.mg) / weight) as u8,
                (vol(c, &m.mb) / weight) as u8,
            ));
        }
    }
    palette
}
