//! Cost Estimator
//!
//! Price range lookup for a bike type and service type. Only the exact
//! lowercase tokens of the closed enumerations are accepted.

use crate::knowledge;
use crate::models::{BikeType, CostEstimate, ServiceType};

const NOT_APPLICABLE_NOTE: &str = "Service not required for this configuration.";

/// Estimate from raw tokens. Unknown tokens yield `None`.
pub fn estimate_cost(bike_type: &str, service_type: &str) -> Option<CostEstimate> {
    let bike = BikeType::from_token(bike_type)?;
    let service = ServiceType::from_token(service_type)?;
    estimate(bike, service)
}

pub fn estimate(bike: BikeType, service: ServiceType) -> Option<CostEstimate> {
    let (min, max) = knowledge::cost_range(bike, service)?;

    if min == 0 && max == 0 {
        return Some(CostEstimate {
            bike_type: bike,
            service_type: service,
            min: 0,
            max: 0,
            applicable: false,
            note: format!(
                "{} is not required for a {}. {}",
                service.display_name(),
                bike.display_name(),
                NOT_APPLICABLE_NOTE
            ),
        });
    }

    Some(CostEstimate {
        bike_type: bike,
        service_type: service,
        min,
        max,
        applicable: true,
        note: format!(
            "Estimated {} for a {}: ₹{} - ₹{}. Final cost is confirmed after inspection.",
            service.display_name(),
            bike.display_name(),
            min,
            max
        ),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_pair_has_an_estimate() {
        for bike in BikeType::ALL {
            for service in ServiceType::ALL {
                let estimate = estimate_cost(bike.token(), service.token())
                    .unwrap_or_else(|| panic!("{:?}/{:?}", bike, service));
                assert!(estimate.min <= estimate.max);
                assert_eq!(estimate.bike_type, bike);
                assert_eq!(estimate.service_type, service);
            }
        }
    }

    #[test]
    fn test_electric_oil_not_applicable() {
        let estimate = estimate_cost("electric", "oil").unwrap();
        assert_eq!(estimate.min, 0);
        assert_eq!(estimate.max, 0);
        assert!(!estimate.applicable);
        assert!(estimate.note.contains(NOT_APPLICABLE_NOTE));
    }

    #[test]
    fn test_regular_note() {
        let estimate = estimate_cost("sport", "brake").unwrap();
        assert!(estimate.applicable);
        assert!(estimate.min > 0);
        assert!(estimate.note.contains("Sports Bike"));
        assert!(estimate.note.contains("Brake Service"));
        assert!(estimate.note.contains("confirmed after inspection"));
    }

    #[test]
    fn test_invalid_tokens() {
        assert!(estimate_cost("moped", "general").is_none());
        assert!(estimate_cost("scooter", "paint").is_none());
        assert!(estimate_cost("", "").is_none());
        assert!(estimate_cost("Scooter", "general").is_none());
        assert!(estimate_cost(" scooter", "general").is_none());
    }
}
