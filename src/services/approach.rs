use crate::domain::ApproachPair;
use crate::utils::angular_separation_deg;

/// Equatorial place of one body, degrees
#[derive(Debug, Clone, PartialEq)]
pub struct BodyPosition {
    pub name: String,
    pub right_ascension: f64,
    pub declination: f64,
}

/// Pairwise angular separations between tracked bodies
#[derive(Debug, Default, Clone, Copy)]
pub struct CloseApproachAnalyzer;

impl CloseApproachAnalyzer {
    /// Every unordered pair, grouped by the first body in input order.
    /// Positions that are not finite are left out.
    pub fn analyze(&self, positions: &[BodyPosition]) -> Vec<ApproachPair> {
        let usable: Vec<&BodyPosition> = positions
            .iter()
            .filter(|p| p.right_ascension.is_finite() && p.declination.is_finite())
            .collect();

        let mut pairs = Vec::with_capacity(usable.len() * usable.len().saturating_sub(1) / 2);
        for (i, a) in usable.iter().enumerate() {
            for b in &usable[i + 1..] {
                let sep = angular_separation_deg(
                    a.right_ascension,
                    a.declination,
                    b.right_ascension,
                    b.declination,
                );
                pairs.push(ApproachPair::new(&a.name, &b.name, sep));
            }
        }
        pairs
    }
}
