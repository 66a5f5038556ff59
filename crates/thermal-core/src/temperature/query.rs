use crate::frame::{Point, TemperatureField};

/// Summary of the temperatures covered by a point, line or rectangle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TempStats {
    pub max: f32,
    pub min: f32,
    pub avg: f32,
    pub max_pos: Point,
    pub min_pos: Point,
    /// Number of pixels sampled.
    pub count: usize,
}

#[derive(Default)]
struct Accumulator {
    max: Option<(f32, Point)>,
    min: Option<(f32, Point)>,
    sum: f64,
    count: usize,
}

impl Accumulator {
    fn push(&mut self, value: f32, at: Point) {
        if self.max.map_or(true, |(m, _)| value > m) {
            self.max = Some((value, at));
        }
        if self.min.map_or(true, |(m, _)| value < m) {
            self.min = Some((value, at));
        }
        self.sum += value as f64;
        self.count += 1;
    }

    fn finish(self) -> Option<TempStats> {
        let (max, max_pos) = self.max?;
        let (min, min_pos) = self.min?;
        Some(TempStats {
            max,
            min,
            avg: (self.sum / self.count as f64) as f32,
            max_pos,
            min_pos,
            count: self.count,
        })
    }
}

impl TemperatureField {
    /// Statistics over every pixel; `None` only for an empty field.
    pub fn stats(&self) -> Option<TempStats> {
        let mut acc = Accumulator::default();
        for ((y, x), &v) in self.data.indexed_iter() {
            acc.push(v, Point::new(x, y));
        }
        acc.finish()
    }

    fn clamp(&self, x: i64, y: i64) -> Option<Point> {
        if self.width() == 0 || self.height() == 0 {
            return None;
        }
        Some(Point::new(
            x.clamp(0, self.width() as i64 - 1) as usize,
            y.clamp(0, self.height() as i64 - 1) as usize,
        ))
    }

    fn at(&self, p: Point) -> f32 {
        self.data[[p.y, p.x]]
    }
}

/// Temperature at `(x, y)`, clamped onto the field.
pub fn query_point(field: &TemperatureField, x: i64, y: i64) -> Option<TempStats> {
    let p = field.clamp(x, y)?;
    let mut acc = Accumulator::default();
    acc.push(field.at(p), p);
    acc.finish()
}

/// Temperatures along the Bresenham line between two points (inclusive).
///
/// Endpoints outside the field are clamped onto it first.
pub fn query_line(
    field: &TemperatureField,
    from: (i64, i64),
    to: (i64, i64),
) -> Option<TempStats> {
    let a = field.clamp(from.0, from.1)?;
    let b = field.clamp(to.0, to.1)?;

    let (mut x, mut y) = (a.x as i64, a.y as i64);
    let (x1, y1) = (b.x as i64, b.y as i64);
    let dx = (x1 - x).abs();
    let dy = -(y1 - y).abs();
    let sx = if x < x1 { 1 } else { -1 };
    let sy = if y < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    let mut acc = Accumulator::default();
    loop {
        let p = Point::new(x as usize, y as usize);
        acc.push(field.at(p), p);
        if x == x1 && y == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }
    acc.finish()
}

/// Temperatures inside the rectangle spanned by two corners (inclusive, any order).
pub fn query_rect(
    field: &TemperatureField,
    corner_a: (i64, i64),
    corner_b: (i64, i64),
) -> Option<TempStats> {
    let a = field.clamp(corner_a.0, corner_a.1)?;
    let b = field.clamp(corner_b.0, corner_b.1)?;
    let (x0, x1) = (a.x.min(b.x), a.x.max(b.x));
    let (y0, y1) = (a.y.min(b.y), a.y.max(b.y));

    let mut acc = Accumulator::default();
    for y in y0..=y1 {
        for x in x0..=x1 {
            let p = Point::new(x, y);
            acc.push(field.at(p), p);
        }
    }
    acc.finish()
}
