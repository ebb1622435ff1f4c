use super::types::{NodeBox, Point};

/// Point-equality tolerance in canvas pixels.
const EPSILON: f32 = 0.5;

/// A boundary point on a node box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Anchor {
    North,
    East,
    South,
    West,
}

/// Dominant axis of the relationship between two boxes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Horizontal,
    Vertical,
}

/// Position of `anchor` on `rect`, centred on the face.
pub fn anchor_point(rect: &NodeBox, anchor: Anchor) -> Point {
    let c = rect.center();
    match anchor {
        Anchor::North => Point::new(c.x, rect.top()),
        Anchor::East => Point::new(rect.right(), c.y),
        Anchor::South => Point::new(c.x, rect.bottom()),
        Anchor::West => Point::new(rect.left(), c.y),
    }
}

/// Dominant axis from `from` toward `to`. Ties go vertical.
pub fn dominant_axis(from: &NodeBox, to: &NodeBox) -> Axis {
    let a = from.center();
    let b = to.center();
    if (b.x - a.x).abs() > (b.y - a.y).abs() {
        Axis::Horizontal
    } else {
        Axis::Vertical
    }
}

/// Choose the anchor faces used as path endpoints for an edge `from -> to`.
pub fn anchor_faces(from: &NodeBox, to: &NodeBox) -> (Anchor, Anchor) {
    let a = from.center();
    let b = to.center();
    match dominant_axis(from, to) {
        Axis::Horizontal => {
            if b.x - a.x > 0.0 {
                (Anchor::East, Anchor::West)
            } else {
                (Anchor::West, Anchor::East)
            }
        }
        Axis::Vertical => {
            if b.y - a.y > 0.0 {
                (Anchor::South, Anchor::North)
            } else {
                (Anchor::North, Anchor::South)
            }
        }
    }
}

/// Resolve the source and target anchor points for an edge `from -> to`.
pub fn resolve_anchors(from: &NodeBox, to: &NodeBox) -> (Point, Point) {
    let (start, end) = anchor_faces(from, to);
    (anchor_point(from, start), anchor_point(to, end))
}

/// Check if an axis-aligned segment crosses the interior of a box.
/// Segments running along the boundary do not count.
pub fn segment_crosses_box(a: Point, b: Point, rect: &NodeBox) -> bool {
    if rect.width <= 0.0 || rect.height <= 0.0 {
        return false;
    }

    if (a.y - b.y).abs() < EPSILON {
        let y = a.y;
        let (min_x, max_x) = if a.x < b.x { (a.x, b.x) } else { (b.x, a.x) };
        y > rect.top() && y < rect.bottom() && max_x > rect.left() && min_x < rect.right()
    } else if (a.x - b.x).abs() < EPSILON {
        let x = a.x;
        let (min_y, max_y) = if a.y < b.y { (a.y, b.y) } else { (b.y, a.y) };
        x > rect.left() && x < rect.right() && max_y > rect.top() && min_y < rect.bottom()
    } else {
        // Diagonal segments never come out of the planner; be conservative.
        rect.contains_interior(a) || rect.contains_interior(b)
    }
}

/// Check if any segment of a polyline crosses the interior of `rect`.
pub fn path_crosses_box(points: &[Point], rect: &NodeBox) -> bool {
    points
        .windows(2)
        .any(|pair| segment_crosses_box(pair[0], pair[1], rect))
}

/// Push a point only if it differs from the last one.
pub fn push_if_different(points: &mut Vec<Point>, pt: Point) {
    if let Some(last) = points.last() {
        if last.distance(pt) < EPSILON {
            return;
        }
    }
    points.push(pt);
}

/// Drop duplicate points and interior points that sit on a straight run, so an
/// elbow between aligned anchors collapses to a single segment.
pub fn simplify_orthogonal(points: &[Point]) -> Vec<Point> {
    let mut deduped: Vec<Point> = Vec::with_capacity(points.len());
    for &p in points {
        push_if_different(&mut deduped, p);
    }

    let mut out: Vec<Point> = Vec::with_capacity(deduped.len());
    for &p in &deduped {
        if out.len() >= 2 {
            let a = out[out.len() - 2];
            let b = out[out.len() - 1];
            let same_row = (a.y - b.y).abs() < EPSILON && (b.y - p.y).abs() < EPSILON;
            let same_col = (a.x - b.x).abs() < EPSILON && (b.x - p.x).abs() < EPSILON;
            if same_row || same_col {
                out.pop();
            }
        }
        out.push(p);
    }
    out
}

/// Total length of a polyline.
pub fn polyline_length(points: &[Point]) -> f32 {
    points.windows(2).map(|pair| pair[0].distance(pair[1])).sum()
}

/// The point at `distance` along a polyline.
pub fn point_at_distance(points: &[Point], distance: f32) -> Point {
    let mut remaining = distance;
    for pair in points.windows(2) {
        let seg_len = pair[0].distance(pair[1]);
        if remaining <= seg_len {
            let t = remaining / seg_len.max(0.001);
            return Point::new(
                pair[0].x + (pair[1].x - pair[0].x) * t,
                pair[0].y + (pair[1].y - pair[0].y) * t,
            );
        }
        remaining -= seg_len;
    }
    points.last().copied().unwrap_or_default()
}

/// Number of direction changes along an orthogonal polyline.
#[cfg(test)]
pub fn bend_count(points: &[Point]) -> usize {
    points
        .windows(3)
        .filter(|w| {
            let first_horizontal = (w[0].y - w[1].y).abs() < EPSILON;
            let second_horizontal = (w[1].y - w[2].y).abs() < EPSILON;
            first_horizontal != second_horizontal
        })
        .count()
}

/// Whether every segment of the polyline is axis-aligned.
pub fn is_orthogonal(points: &[Point]) -> bool {
    points.windows(2).all(|pair| {
        (pair[0].x - pair[1].x).abs() < EPSILON || (pair[0].y - pair[1].y).abs() < EPSILON
    })
}
