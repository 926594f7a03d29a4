use serde::Deserialize;

#[derive(Debug, Clone, Copy, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    Horizontal,
    Vertical,
}

/// A periodic laser anchored at a cell.
///
/// During the first half of each period the beam is armed and grows one cell
/// per tick in both directions along its row (horizontal) or column
/// (vertical). During the second half it is off.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Deserialize)]
pub struct Laser {
    pub x: usize,
    pub y: usize,
    pub orientation: Orientation,
    pub period: usize,
}

impl Laser {
    pub fn new(x: usize, y: usize, orientation: Orientation, period: usize) -> Laser {
        Laser { x, y, orientation, period }
    }

    pub fn phase(&self, t: usize) -> usize {
        t % self.period
    }

    pub fn is_armed(&self, t: usize) -> bool {
        self.phase(t) < self.period / 2
    }

    /// Number of cells the beam covers on each side, anchor included.
    /// `None` while disarmed.
    pub fn half_length(&self, t: usize) -> Option<usize> {
        if self.is_armed(t) {
            Some(self.phase(t) + 1)
        } else {
            None
        }
    }

    /// Whether the beam covers cell `(x, y)` at clock `t`.
    pub fn hits(&self, t: usize, x: usize, y: usize) -> bool {
        let Some(half) = self.half_length(t) else {
            return false;
        };
        match self.orientation {
            Orientation::Horizontal => y == self.y && x.abs_diff(self.x) < half,
            Orientation::Vertical => x == self.x && y.abs_diff(self.y) < half,
        }
    }

    /// Cells covered at clock `t`, clipped to a `width` x `height` grid.
    pub fn beam_cells(&self, t: usize, width: usize, height: usize) -> Vec<(usize, usize)> {
        let Some(half) = self.half_length(t) else {
            return Vec::new();
        };
        let reach = half - 1;
        match self.orientation {
            Orientation::Horizontal if self.y < height => {
                let lo = self.x.saturating_sub(reach);
                let hi = (self.x + reach).min(width.saturating_sub(1));
                (lo..=hi).map(|x| (x, self.y)).collect()
            }
            Orientation::Vertical if self.x < width => {
                let lo = self.y.saturating_sub(reach);
                let hi = (self.y + reach).min(height.saturating_sub(1));
                (lo..=hi).map(|y| (self.x, y)).collect()
            }
            _ => Vec::new(),
        }
    }
}

fn gcd(a: usize, b: usize) -> usize {
    if b == 0 { a } else { gcd(b, a % b) }
}

/// Least common multiple of all laser periods; 1 when there are none.
/// Zero periods are skipped, they are rejected when the environment is built.
pub fn lcm_period(lasers: &[Laser]) -> usize {
    lasers.iter()
        .map(|l| l.period)
        .filter(|&p| p > 0)
        .fold(1, |acc, p| acc / gcd(acc, p) * p)
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(0, Some(1); "Phase zero covers anchor only")]
    #[test_case(1, Some(2); "Phase one")]
    #[test_case(2, Some(3); "Last armed phase")]
    #[test_case(3, None; "First disarmed phase")]
    #[test_case(5, None; "Last disarmed phase")]
    #[test_case(6, Some(1); "Wraps to next period")]
    fn half_length_by_phase(t: usize, expected: Option<usize>) {
        let laser = Laser::new(2, 2, Orientation::Horizontal, 6);
        assert_eq!(laser.half_length(t), expected);
    }

    #[test]
    fn armed_for_first_half_of_odd_period() {
        // period 5: armed phases 0 and 1 only
        let laser = Laser::new(0, 0, Orientation::Vertical, 5);
        let armed: Vec<bool> = (0..5).map(|t| laser.is_armed(t)).collect();
        assert_eq!(armed, vec![true, true, false, false, false]);
    }

    #[test]
    fn period_one_never_armed() {
        let laser = Laser::new(0, 0, Orientation::Vertical, 1);
        assert!((0..10).all(|t| !laser.is_armed(t)));
    }

    #[test]
    fn horizontal_beam_hits_on_its_row() {
        // Arrange
        let laser = Laser::new(3, 1, Orientation::Horizontal, 8);
        // Act / Assert
        assert!(laser.hits(0, 3, 1));
        assert!(!laser.hits(0, 4, 1));
        assert!(laser.hits(1, 4, 1));
        assert!(laser.hits(1, 2, 1));
        assert!(!laser.hits(1, 5, 1));
        assert!(laser.hits(3, 0, 1));
        assert!(!laser.hits(3, 3, 0));
        assert!(!laser.hits(4, 3, 1));
    }

    #[test_case(0, 1; "Phase zero stops at the anchor")]
    #[test_case(1, 2; "Phase one stops one cell out")]
    #[test_case(2, 3; "Phase two stops two cells out")]
    fn beam_stops_short_of_half_length(t: usize, distance: usize) {
        // Arrange
        let laser = Laser::new(3, 0, Orientation::Horizontal, 8);
        // Act / Assert
        assert_eq!(laser.half_length(t), Some(distance));
        assert!(laser.hits(t, 3 + distance - 1, 0));
        assert!(!laser.hits(t, 3 + distance, 0));
        assert!(!laser.hits(t, 3 - distance, 0));
    }

    #[test]
    fn vertical_beam_hits_on_its_column() {
        let laser = Laser::new(1, 3, Orientation::Vertical, 4);
        assert!(laser.hits(1, 1, 2));
        assert!(laser.hits(1, 1, 4));
        assert!(!laser.hits(1, 2, 3));
        assert!(!laser.hits(2, 1, 3));
    }

    #[test]
    fn beam_cells_are_clipped_to_grid() {
        // Arrange
        let laser = Laser::new(1, 0, Orientation::Horizontal, 10);
        // Act
        let cells = laser.beam_cells(3, 4, 2);
        // Assert
        assert_eq!(cells, vec![(0, 0), (1, 0), (2, 0), (3, 0)]);
        assert!(laser.beam_cells(5, 4, 2).is_empty());
    }

    #[test]
    fn beam_cells_agree_with_hits() {
        let laser = Laser::new(2, 2, Orientation::Vertical, 6);
        for t in 0..6 {
            let cells = laser.beam_cells(t, 5, 5);
            for x in 0..5 {
                for y in 0..5 {
                    assert_eq!(cells.contains(&(x, y)), laser.hits(t, x, y));
                }
            }
        }
    }

    #[test]
    fn lcm_of_periods() {
        let lasers = [
            Laser::new(0, 0, Orientation::Vertical, 4),
            Laser::new(0, 0, Orientation::Horizontal, 6),
        ];
        assert_eq!(lcm_period(&lasers), 12);
        assert_eq!(lcm_period(&[]), 1);
    }
}
