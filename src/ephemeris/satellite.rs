//! Earth satellites propagated with SGP4 from two-line elements.

use chrono::{DateTime, Utc};
use nalgebra::Vector3;
use sgp4::{Constants, Elements};

use super::sun;
use super::time::Epoch;
use super::{GeocentricState, Observable};
use crate::domain::SatelliteSpec;
use crate::errors::{AppError, AppResult};

const EARTH_RADIUS_KM: f64 = 6378.137;

pub struct SatelliteOrbit {
    name: String,
    elements: Elements,
    constants: Constants,
}

impl SatelliteOrbit {
    pub fn from_spec(spec: &SatelliteSpec) -> AppResult<Self> {
        let elements = Elements::from_tle(
            Some(spec.name.clone()),
            spec.tle_line1.trim().as_bytes(),
            spec.tle_line2.trim().as_bytes(),
        )
        .map_err(|e| AppError::invalid_elements(&spec.name, format!("{e:?}")))?;
        let constants = Constants::from_elements(&elements)
            .map_err(|e| AppError::invalid_elements(&spec.name, format!("{e:?}")))?;
        Ok(Self {
            name: spec.name.clone(),
            elements,
            constants,
        })
    }

    pub fn epoch(&self) -> DateTime<Utc> {
        self.elements.datetime.and_utc()
    }

    /// TEME position in km. TEME is taken as the true equator and equinox of
    /// date, which is well inside the accuracy of the elements.
    pub fn position(&self, at: DateTime<Utc>) -> AppResult<Vector3<f64>> {
        let propagation_error = |reason: String| AppError::Propagation {
            name: self.name.clone(),
            reason,
        };
        let minutes = self
            .elements
            .datetime_to_minutes_since_epoch(&at.naive_utc())
            .map_err(|e| propagation_error(format!("{e:?}")))?;
        let prediction = self
            .constants
            .propagate(minutes)
            .map_err(|e| propagation_error(format!("{e:?}")))?;
        Ok(Vector3::from_column_slice(&prediction.position))
    }
}

impl Observable for SatelliteOrbit {
    fn geocentric_state(&self, epoch: &Epoch) -> AppResult<GeocentricState> {
        Ok(GeocentricState {
            position: self.position(epoch.utc)?,
            magnitude: None,
            semidiameter: 0.0,
        })
    }
}

/// Cylindrical Earth shadow: lit when on the day side or outside the
/// shadow cylinder behind the Earth
pub fn is_sunlit(position: &Vector3<f64>, epoch: &Epoch) -> bool {
    let to_sun = sun::geocentric_vector(epoch).normalize();
    let along = position.dot(&to_sun);
    if along >= 0.0 {
        return true;
    }
    (position - to_sun * along).norm() > EARTH_RADIUS_KM
}
