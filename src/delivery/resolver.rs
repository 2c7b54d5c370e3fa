use regex::Regex;
use serde::Serialize;
use std::sync::OnceLock;

use crate::delivery::error::DeliveryError;
use crate::delivery::models::DeliveryZone;

/// Outcome of matching a neighborhood against the configured zones
#[derive(Debug, Clone, Serialize)]
pub struct ZoneResolution {
    pub available: bool,
    pub zone: Option<DeliveryZone>,
}

/// Resolve a neighborhood name to a delivery zone
///
/// With no zones configured at all the resolver fails open: delivery is
/// available everywhere with no zone attached. Otherwise the input and
/// every candidate neighborhood are compared after trim + lowercase, and
/// the first zone listing a matching neighborhood wins. Overlapping
/// neighborhoods across zones are a data-quality assumption, not
/// enforced here. Pickup orders never reach this resolver.
pub fn resolve(neighborhood: &str, zones: &[DeliveryZone]) -> ZoneResolution {
    if zones.is_empty() {
        return ZoneResolution {
            available: true,
            zone: None,
        };
    }

    let needle = normalize(neighborhood);

    for zone in zones {
        if zone
            .neighborhoods
            .iter()
            .any(|candidate| normalize(candidate) == needle)
        {
            return ZoneResolution {
                available: true,
                zone: Some(zone.clone()),
            };
        }
    }

    ZoneResolution {
        available: false,
        zone: None,
    }
}

fn normalize(s: &str) -> String {
    s.trim().to_lowercase()
}

fn non_digits() -> &'static Regex {
    static NON_DIGITS: OnceLock<Regex> = OnceLock::new();
    NON_DIGITS.get_or_init(|| Regex::new(r"\D").unwrap())
}

/// Normalize a CEP to `#####-###` form
///
/// Strips every non-digit and requires exactly eight digits to remain.
/// No postal lookup happens server-side; this only guards the shape.
pub fn normalize_cep(raw: &str) -> Result<String, DeliveryError> {
    let digits = non_digits().replace_all(raw, "");

    if digits.len() != 8 {
        return Err(DeliveryError::InvalidCep(
            "CEP must contain exactly 8 digits".to_string(),
        ));
    }

    Ok(format!("{}-{}", &digits[..5], &digits[5..]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn zone(id: i32, name: &str, neighborhoods: &[&str], fee: Decimal) -> DeliveryZone {
        DeliveryZone {
            id,
            name: name.to_string(),
            neighborhoods: neighborhoods.iter().map(|n| n.to_string()).collect(),
            delivery_fee: fee,
            estimated_time_min: 30,
            estimated_time_max: 60,
            display_order: 0,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_empty_zone_list_fails_open() {
        let resolution = resolve("Qualquer Bairro", &[]);

        assert!(resolution.available);
        assert!(resolution.zone.is_none());
    }

    #[test]
    fn test_match_is_normalized() {
        let zones = vec![zone(1, "Zona Central", &["centro"], dec!(5.00))];

        let resolution = resolve("  Centro  ", &zones);

        assert!(resolution.available);
        assert_eq!(resolution.zone.unwrap().id, 1);
    }

    #[test]
    fn test_no_match_is_unavailable() {
        let zones = vec![zone(1, "Zona Central", &["centro", "bela vista"], dec!(5.00))];

        let resolution = resolve("Jardins", &zones);

        assert!(!resolution.available);
        assert!(resolution.zone.is_none());
    }

    #[test]
    fn test_first_matching_zone_wins() {
        let zones = vec![
            zone(1, "Zona Central", &["centro"], dec!(5.00)),
            zone(2, "Zona Duplicada", &["centro"], dec!(9.00)),
        ];

        let resolution = resolve("centro", &zones);

        assert_eq!(resolution.zone.unwrap().id, 1);
    }

    #[test]
    fn test_fee_and_eta_come_from_matched_zone() {
        let zones = vec![
            zone(1, "Zona Central", &["centro"], dec!(5.00)),
            zone(2, "Zona Sul", &["vila mariana", "saude"], dec!(8.00)),
        ];

        let resolution = resolve("Vila Mariana", &zones);
        let matched = resolution.zone.unwrap();

        assert_eq!(matched.delivery_fee, dec!(8.00));
        assert_eq!(matched.estimated_time_min, 30);
        assert_eq!(matched.estimated_time_max, 60);
    }

    #[test]
    fn test_normalize_cep_accepts_common_shapes() {
        assert_eq!(normalize_cep("01310-100").unwrap(), "01310-100");
        assert_eq!(normalize_cep("01310100").unwrap(), "01310-100");
        assert_eq!(normalize_cep(" 01310 100 ").unwrap(), "01310-100");
    }

    #[test]
    fn test_normalize_cep_rejects_wrong_length() {
        assert!(normalize_cep("0131010").is_err());
        assert!(normalize_cep("013101000").is_err());
        assert!(normalize_cep("abcdefgh").is_err());
        assert!(normalize_cep("").is_err());
    }
}
