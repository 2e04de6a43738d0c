//! Plane geometry for the painter: rectangles, clipping and dash splitting

/// Axis-aligned rectangle in inches, `y` growing upwards
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

impl Rect {
    pub fn new(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self {
            x0: x0.min(x1),
            y0: y0.min(y1),
            x1: x0.max(x1),
            y1: y0.max(y1),
        }
    }

    /// Rectangle of size `(w, h)` whose point at fractions `(fx, fy)` sits on `at`
    pub fn anchored(at: (f64, f64), (w, h): (f64, f64), (fx, fy): (f64, f64)) -> Self {
        let x0 = at.0 - fx * w;
        let y0 = at.1 - fy * h;
        Self::new(x0, y0, x0 + w, y0 + h)
    }

    pub fn width(&self) -> f64 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f64 {
        self.y1 - self.y0
    }

    pub fn center(&self) -> (f64, f64) {
        ((self.x0 + self.x1) / 2.0, (self.y0 + self.y1) / 2.0)
    }

    pub fn contains(&self, (x, y): (f64, f64)) -> bool {
        x >= self.x0 && x <= self.x1 && y >= self.y0 && y <= self.y1
    }

    pub fn union(&self, other: &Rect) -> Rect {
        Rect {
            x0: self.x0.min(other.x0),
            y0: self.y0.min(other.y0),
            x1: self.x1.max(other.x1),
            y1: self.y1.max(other.y1),
        }
    }

    pub fn inflate(&self, by: f64) -> Rect {
        Rect {
            x0: self.x0 - by,
            y0: self.y0 - by,
            x1: self.x1 + by,
            y1: self.y1 + by,
        }
    }

    pub fn is_finite(&self) -> bool {
        [self.x0, self.y0, self.x1, self.y1].iter().all(|v| v.is_finite())
    }
}

/// Liang–Barsky clip of the segment `a`–`b`
pub fn clip_segment(a: (f64, f64), b: (f64, f64), clip: &Rect) -> Option<((f64, f64), (f64, f64))> {
    let (dx, dy) = (b.0 - a.0, b.1 - a.1);
    let mut t0: f64 = 0.0;
    let mut t1: f64 = 1.0;
    let checks = [
        (-dx, a.0 - clip.x0),
        (dx, clip.x1 - a.0),
        (-dy, a.1 - clip.y0),
        (dy, clip.y1 - a.1),
    ];
    for (p, q) in checks {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let r = q / p;
        if p < 0.0 {
            if r > t1 {
                return None;
            }
            t0 = t0.max(r);
        } else {
            if r < t0 {
                return None;
            }
            t1 = t1.min(r);
        }
    }
    Some((
        (a.0 + t0 * dx, a.1 + t0 * dy),
        (a.0 + t1 * dx, a.1 + t1 * dy),
    ))
}

/// Clip a polyline, splitting it into visible runs.
///
/// Non-finite vertices break the line.
pub fn clip_polyline(points: &[(f64, f64)], clip: Option<&Rect>) -> Vec<Vec<(f64, f64)>> {
    let mut runs: Vec<Vec<(f64, f64)>> = Vec::new();
    let mut current: Vec<(f64, f64)> = Vec::new();
    let finite = |p: &(f64, f64)| p.0.is_finite() && p.1.is_finite();

    let flush = |current: &mut Vec<(f64, f64)>, runs: &mut Vec<Vec<(f64, f64)>>| {
        if current.len() >= 2 {
            runs.push(std::mem::take(current));
        } else {
            current.clear();
        }
    };

    for pair in points.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        if !finite(&a) || !finite(&b) {
            flush(&mut current, &mut runs);
            continue;
        }
        let segment = match clip {
            Some(rect) => clip_segment(a, b, rect),
            None => Some((a, b)),
        };
        match segment {
            Some((start, end)) => {
                if current.last() != Some(&start) {
                    flush(&mut current, &mut runs);
                    current.push(start);
                }
                current.push(end);
                // Leaving the clip region ends the run
                if end != b {
                    flush(&mut current, &mut runs);
                }
            }
            None => flush(&mut current, &mut runs),
        }
    }
    flush(&mut current, &mut runs);
    runs
}

/// Sutherland–Hodgman clip of a closed polygon
pub fn clip_polygon(points: &[(f64, f64)], clip: &Rect) -> Vec<(f64, f64)> {
    type Inside = fn(&Rect, (f64, f64)) -> bool;
    type Cross = fn(&Rect, (f64, f64), (f64, f64)) -> (f64, f64);

    fn at_x(a: (f64, f64), b: (f64, f64), x: f64) -> (f64, f64) {
        let t = (x - a.0) / (b.0 - a.0);
        (x, a.1 + t * (b.1 - a.1))
    }
    fn at_y(a: (f64, f64), b: (f64, f64), y: f64) -> (f64, f64) {
        let t = (y - a.1) / (b.1 - a.1);
        (a.0 + t * (b.0 - a.0), y)
    }

    let edges: [(Inside, Cross); 4] = [
        (|r, p| p.0 >= r.x0, |r, a, b| at_x(a, b, r.x0)),
        (|r, p| p.0 <= r.x1, |r, a, b| at_x(a, b, r.x1)),
        (|r, p| p.1 >= r.y0, |r, a, b| at_y(a, b, r.y0)),
        (|r, p| p.1 <= r.y1, |r, a, b| at_y(a, b, r.y1)),
    ];

    let mut output: Vec<(f64, f64)> = points
        .iter()
        .copied()
        .filter(|p| p.0.is_finite() && p.1.is_finite())
        .collect();
    for (inside, cross) in edges {
        if output.is_empty() {
            break;
        }
        let input = std::mem::take(&mut output);
        let mut prev = input[input.len() - 1];
        for &point in &input {
            match (inside(clip, point), inside(clip, prev)) {
                (true, true) => output.push(point),
                (true, false) => {
                    output.push(cross(clip, prev, point));
                    output.push(point);
                }
                (false, true) => output.push(cross(clip, prev, point)),
                (false, false) => {}
            }
            prev = point;
        }
    }
    output
}

/// Split a polyline into dash runs following an on/off `pattern`
/// (same units as the coordinates)
pub fn dash_polyline(points: &[(f64, f64)], pattern: &[f64]) -> Vec<Vec<(f64, f64)>> {
    if pattern.is_empty() || pattern.iter().any(|d| *d <= 0.0) {
        return vec![points.to_vec()];
    }

    let mut dashes = Vec::new();
    let mut index = 0;
    let mut remaining = pattern[0];
    let mut current: Vec<(f64, f64)> = points.first().copied().into_iter().collect();

    for pair in points.windows(2) {
        let (mut a, b) = (pair[0], pair[1]);
        let mut length = ((b.0 - a.0).powi(2) + (b.1 - a.1).powi(2)).sqrt();
        while length > remaining {
            let t = remaining / length;
            let split = (a.0 + t * (b.0 - a.0), a.1 + t * (b.1 - a.1));
            if index % 2 == 0 {
                current.push(split);
                dashes.push(std::mem::take(&mut current));
            } else {
                current = vec![split];
            }
            length -= remaining;
            a = split;
            index = (index + 1) % pattern.len();
            remaining = pattern[index];
        }
        remaining -= length;
        if index % 2 == 0 {
            current.push(b);
        }
    }
    if index % 2 == 0 && current.len() >= 2 {
        dashes.push(current);
    }
    dashes
}

/// Vertices of a polygon approximating an ellipse
pub fn ellipse(center: (f64, f64), rx: f64, ry: f64, segments: usize) -> Vec<(f64, f64)> {
    (0..segments)
        .map(|i| {
            let theta = i as f64 / segments as f64 * std::f64::consts::TAU;
            (center.0 + rx * theta.cos(), center.1 + ry * theta.sin())
        })
        .collect()
}
