use crate::datatypes::Point;

#[derive(Clone, Copy, PartialEq, PartialOrd, Debug)]
pub(crate) struct V {
    pub x: f64,
    pub y: f64,
}

impl V {
    #[inline(always)]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    #[inline(always)]
    pub fn magnitude(&self) -> f64 {
        libm::hypot(self.x, self.y)
    }

    #[inline(always)]
    pub fn magnitude_squared(&self) -> f64 {
        self.x.powi(2) + self.y.powi(2)
    }

    #[inline(always)]
    pub fn euclidean_distance(self, rhs: Self) -> f64 {
        let d = self - rhs;
        d.magnitude()
    }

    /// Angle of this vector, counterclockwise from the +X axis, in (-pi, pi].
    #[inline(always)]
    pub fn angle(&self) -> f64 {
        libm::atan2(self.y, self.x)
    }
}

impl From<Point> for V {
    #[inline(always)]
    fn from(p: Point) -> Self {
        Self::new(p.x, p.y)
    }
}

impl std::ops::Sub<Self> for V {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self {
            x: self.x - rhs.x,
            y: self.y - rhs.y,
        }
    }
}

impl std::ops::Add<Self> for V {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self {
            x: self.x + rhs.x,
            y: self.y + rhs.y,
        }
    }
}

impl std::ops::Div<f64> for V {
    type Output = Self;

    fn div(self, rhs: f64) -> Self::Output {
        Self {
            x: self.x / rhs,
            y: self.y / rhs,
        }
    }
}
