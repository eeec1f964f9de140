//! Static knowledge base
//!
//! Diagnosis templates, keyword sets, brand tips, fallback heuristics,
//! advisories and the cost matrix. Everything here is process-wide constant
//! data; callers get owned copies via [`KnowledgeEntry::to_record`].

use crate::models::{
    BikeType, DiagnosisRecord, FallbackKind, IssueCategory, ServiceType, Urgency,
};
use lazy_static::lazy_static;
use std::collections::HashMap;

/// One diagnosis template plus the keywords that trigger it
pub struct KnowledgeEntry {
    pub category: IssueCategory,
    pub title: &'static str,
    pub causes: &'static [&'static str],
    pub urgency: Urgency,
    pub cost_range: &'static str,
    pub tip: &'static str,
    /// Lowercase substrings; any hit selects the category
    pub keywords: &'static [&'static str],
}

impl KnowledgeEntry {
    pub fn to_record(&self) -> DiagnosisRecord {
        DiagnosisRecord {
            title: self.title.to_string(),
            causes: self.causes.iter().map(|c| c.to_string()).collect(),
            urgency: self.urgency,
            cost_range: self.cost_range.to_string(),
            tip: self.tip.to_string(),
        }
    }
}

/// Knowledge base in canonical category order
pub static KNOWLEDGE_BASE: [KnowledgeEntry; 8] = [
    KnowledgeEntry {
        category: IssueCategory::Start,
        title: "Starting Problem",
        causes: &[
            "Weak or discharged battery",
            "Fouled or worn spark plug",
            "Clogged carburettor or fuel injector",
            "Faulty self-start motor or relay",
        ],
        urgency: Urgency::Medium,
        cost_range: "₹300 - ₹2,500",
        tip: "Check the battery terminals and try the kick starter with the choke on before booking a visit.",
        keywords: &[
            "start", "kick", "crank", "ignition", "self motor", "won't turn on", "not turning on",
        ],
    },
    KnowledgeEntry {
        category: IssueCategory::Noise,
        title: "Abnormal Engine Noise",
        causes: &[
            "Loose or worn timing chain",
            "Valve clearance out of adjustment",
            "Worn engine bearings",
            "Loose exhaust or body panels",
        ],
        urgency: Urgency::High,
        cost_range: "₹500 - ₹5,000",
        tip: "Avoid high revs until a mechanic has listened to the engine. Knocking noises get worse quickly.",
        keywords: &[
            "noise", "rattl", "knock", "tick", "clank", "clunk", "whine", "sound",
        ],
    },
    KnowledgeEntry {
        category: IssueCategory::Brake,
        title: "Brake System Issue",
        causes: &[
            "Worn brake pads or shoes",
            "Air in the hydraulic brake line",
            "Low or contaminated brake fluid",
            "Warped or glazed brake disc",
        ],
        urgency: Urgency::High,
        cost_range: "₹400 - ₹3,000",
        tip: "Ride slowly and keep extra distance. Brake problems should be inspected the same day.",
        keywords: &[
            "brake", "braking", "squeak", "squeal", "stopping distance", "spongy",
        ],
    },
    KnowledgeEntry {
        category: IssueCategory::Oil,
        title: "Engine Oil Problem",
        causes: &[
            "Oil change overdue",
            "Leaking gasket or oil seal",
            "Wrong oil grade for the engine",
            "Burning oil from worn piston rings",
        ],
        urgency: Urgency::Medium,
        cost_range: "₹300 - ₹1,500",
        tip: "Check the oil level window on a flat surface. Top up with the grade in your owner's manual.",
        keywords: &["oil", "leak", "lubric", "grease"],
    },
    KnowledgeEntry {
        category: IssueCategory::Battery,
        title: "Battery / Electrical Issue",
        causes: &[
            "Battery at the end of its life",
            "Faulty regulator rectifier",
            "Loose or corroded wiring",
            "Blown fuse",
        ],
        urgency: Urgency::Medium,
        cost_range: "₹500 - ₹3,500",
        tip: "Turn off lights and indicators when parked and clean the battery terminals.",
        keywords: &[
            "battery", "horn", "headlight", "indicator", "electrical", "charging", "fuse", "wiring",
        ],
    },
    KnowledgeEntry {
        category: IssueCategory::Mileage,
        title: "Poor Fuel Mileage",
        causes: &[
            "Dirty air filter",
            "Under-inflated tyres",
            "Carburettor or injection tuning off",
            "Dragging brakes or tight chain",
        ],
        urgency: Urgency::Low,
        cost_range: "₹300 - ₹1,200",
        tip: "Keep tyre pressure at the recommended level and ride at steady speeds for better mileage.",
        keywords: &[
            "mileage", "fuel consumption", "fuel efficiency", "kmpl", "km per litre", "average", "petrol",
        ],
    },
    KnowledgeEntry {
        category: IssueCategory::Vibration,
        title: "Excessive Vibration",
        causes: &[
            "Unbalanced or damaged wheel",
            "Worn engine mounts",
            "Loose chain or sprocket wear",
            "Bent handlebar or fork",
        ],
        urgency: Urgency::Medium,
        cost_range: "₹400 - ₹2,500",
        tip: "Check the chain tension and wheel alignment. Avoid high speeds until inspected.",
        keywords: &["vibrat", "shak", "wobbl", "shimmy"],
    },
    KnowledgeEntry {
        category: IssueCategory::Overheat,
        title: "Engine Overheating",
        causes: &[
            "Low coolant or engine oil",
            "Blocked radiator or cooling fins",
            "Faulty cooling fan",
            "Lean fuel mixture",
        ],
        urgency: Urgency::High,
        cost_range: "₹500 - ₹4,000",
        tip: "Stop and let the engine cool down. Do not open the radiator cap while hot.",
        keywords: &["overheat", "heating", "too hot", "temperature", "coolant", "radiator"],
    },
];

/// Look up the template for a category
pub fn entry(category: IssueCategory) -> &'static KnowledgeEntry {
    // KNOWLEDGE_BASE is declared in IssueCategory::ALL order
    &KNOWLEDGE_BASE[category as usize]
}

//
// ================= Fallback heuristics =================
//

pub struct FallbackRule {
    pub kind: FallbackKind,
    pub triggers: &'static [&'static str],
    pub title: &'static str,
    pub causes: &'static [&'static str],
    pub urgency: Urgency,
    pub cost_range: &'static str,
    pub tip: &'static str,
}

impl FallbackRule {
    pub fn to_record(&self) -> DiagnosisRecord {
        DiagnosisRecord {
            title: self.title.to_string(),
            causes: self.causes.iter().map(|c| c.to_string()).collect(),
            urgency: self.urgency,
            cost_range: self.cost_range.to_string(),
            tip: self.tip.to_string(),
        }
    }
}

/// Tried in order; first hit wins
pub static FALLBACK_RULES: [FallbackRule; 3] = [
    FallbackRule {
        kind: FallbackKind::ColdStart,
        triggers: &["morning", "cold"],
        title: "Cold Start Difficulty",
        causes: &[
            "Thick engine oil at low temperature",
            "Weak battery in cold weather",
            "Choke not used or faulty",
        ],
        urgency: Urgency::Low,
        cost_range: "₹200 - ₹1,000",
        tip: "Use the choke for the first start of the day and let the engine idle for a minute.",
    },
    FallbackRule {
        kind: FallbackKind::Performance,
        triggers: &["slow", "pickup", "pick up", "power"],
        title: "Low Power / Poor Pickup",
        causes: &[
            "Clogged air filter",
            "Worn clutch plates",
            "Spark plug needs replacement",
            "Loose or worn drive chain",
        ],
        urgency: Urgency::Medium,
        cost_range: "₹500 - ₹2,500",
        tip: "A clean air filter and a fresh spark plug restore most of the lost pickup.",
    },
    FallbackRule {
        kind: FallbackKind::Smoking,
        triggers: &["smoke", "fume"],
        title: "Exhaust Smoke",
        causes: &[
            "Engine burning oil (blue smoke)",
            "Rich fuel mixture (black smoke)",
            "Worn piston rings or valve seals",
        ],
        urgency: Urgency::High,
        cost_range: "₹1,000 - ₹6,000",
        tip: "Note the smoke colour and avoid long rides until the engine is checked.",
    },
];

//
// ================= Brand tips =================
//

/// Known brands in scan order. Matched as whole words; the gap between words is optional.
pub const BRANDS: [&str; 8] = [
    "royal enfield",
    "honda",
    "hero",
    "bajaj",
    "tvs",
    "yamaha",
    "ktm",
    "suzuki",
];

const BRAND_TIPS: &[(&str, IssueCategory, &str)] = &[
    (
        "royal enfield",
        IssueCategory::Start,
        "Royal Enfield engines need a firm kick with the decompression lever. Check the battery if the self-start clicks.",
    ),
    (
        "royal enfield",
        IssueCategory::Vibration,
        "Some vibration is normal on Royal Enfield singles. Excessive shaking usually means worn engine mounts.",
    ),
    (
        "royal enfield",
        IssueCategory::Oil,
        "Royal Enfield engines consume some oil by design. Check the level every 500 km.",
    ),
    (
        "honda",
        IssueCategory::Battery,
        "Honda scooters drain the battery quickly if the combi-brake indicator relay is faulty. Get the relay tested.",
    ),
    (
        "honda",
        IssueCategory::Mileage,
        "Honda engines are tuned for economy. A drop in mileage usually points to a clogged air filter.",
    ),
    (
        "hero",
        IssueCategory::Mileage,
        "Hero commuters reach rated mileage with i3S enabled and tyres at 25/33 psi.",
    ),
    (
        "hero",
        IssueCategory::Start,
        "On Hero bikes a worn spark plug is the most common cause of hard starting.",
    ),
    (
        "bajaj",
        IssueCategory::Start,
        "Bajaj DTS-i engines have two spark plugs. Check both when starting is difficult.",
    ),
    (
        "bajaj",
        IssueCategory::Mileage,
        "On Bajaj bikes check the carburettor idle setting. It drifts after a few thousand km.",
    ),
    (
        "tvs",
        IssueCategory::Battery,
        "TVS scooters with USB chargers can drain the battery when left plugged in.",
    ),
    (
        "yamaha",
        IssueCategory::Noise,
        "Yamaha FZ and R15 engines tick when valve clearance is due. Ask for a valve adjustment.",
    ),
    (
        "yamaha",
        IssueCategory::Overheat,
        "Liquid-cooled Yamaha models need a coolant top-up every 10,000 km.",
    ),
    (
        "ktm",
        IssueCategory::Overheat,
        "KTM radiator fans switch on late in traffic. Check the fan fuse and coolant level.",
    ),
    (
        "ktm",
        IssueCategory::Brake,
        "KTM ABS needs fresh DOT 4 fluid every year. Spongy brakes often mean the fluid is due.",
    ),
    (
        "suzuki",
        IssueCategory::Oil,
        "Suzuki recommends semi-synthetic 10W-40 oil. Mineral oil shortens the change interval.",
    ),
];

/// Override tip for a brand and category, if one is registered
pub fn brand_tip(brand: &str, category: IssueCategory) -> Option<&'static str> {
    BRAND_TIPS
        .iter()
        .find(|(b, c, _)| *b == brand && *c == category)
        .map(|(_, _, tip)| *tip)
}

//
// ================= Advisories =================
//

pub const RAIN_TRIGGERS: &[&str] = &["rain", "monsoon"];
pub const COLD_TRIGGERS: &[&str] = &["winter", "cold", "morning"];

pub const RAIN_START_TIP: &str =
    "Water may have entered the spark plug cap or air filter. Dry the plug area and keep the bike covered during the monsoon.";
pub const RAIN_BRAKE_TIP: &str =
    "Wet brakes lose grip. Squeeze them gently a few times to dry the pads and keep a longer stopping distance in the rain.";
pub const COLD_START_TIP: &str =
    "Cold mornings thicken the oil and weaken the battery. Use the choke and let the engine warm up for a minute before riding.";

pub const CRITICAL_PHRASES: &[&str] = &[
    "can't ride",
    "cannot ride",
    "dangerous",
    "accident",
    "stopped suddenly",
    "completely stopped",
];

pub const URGENT_TIP: &str =
    "Do not ride the bike. Call our emergency line or book an emergency pickup so a mechanic can inspect it first.";

//
// ================= Cost matrix =================
//

const COST_TABLE: &[(BikeType, ServiceType, u32, u32)] = &[
    (BikeType::Scooter, ServiceType::General, 800, 1200),
    (BikeType::Scooter, ServiceType::Engine, 2500, 6000),
    (BikeType::Scooter, ServiceType::Brake, 400, 900),
    (BikeType::Scooter, ServiceType::Oil, 300, 500),
    (BikeType::Scooter, ServiceType::Electrical, 500, 1500),
    (BikeType::Scooter, ServiceType::Emergency, 500, 1000),
    (BikeType::Commuter, ServiceType::General, 900, 1500),
    (BikeType::Commuter, ServiceType::Engine, 3000, 8000),
    (BikeType::Commuter, ServiceType::Brake, 500, 1000),
    (BikeType::Commuter, ServiceType::Oil, 350, 600),
    (BikeType::Commuter, ServiceType::Electrical, 600, 1800),
    (BikeType::Commuter, ServiceType::Emergency, 600, 1200),
    (BikeType::Sport, ServiceType::General, 1500, 3000),
    (BikeType::Sport, ServiceType::Engine, 6000, 20000),
    (BikeType::Sport, ServiceType::Brake, 1200, 3000),
    (BikeType::Sport, ServiceType::Oil, 800, 1500),
    (BikeType::Sport, ServiceType::Electrical, 1000, 3500),
    (BikeType::Sport, ServiceType::Emergency, 1000, 2500),
    (BikeType::Cruiser, ServiceType::General, 1800, 3500),
    (BikeType::Cruiser, ServiceType::Engine, 7000, 25000),
    (BikeType::Cruiser, ServiceType::Brake, 1500, 3500),
    (BikeType::Cruiser, ServiceType::Oil, 1000, 2000),
    (BikeType::Cruiser, ServiceType::Electrical, 1200, 4000),
    (BikeType::Cruiser, ServiceType::Emergency, 1200, 3000),
    (BikeType::Electric, ServiceType::General, 600, 1200),
    (BikeType::Electric, ServiceType::Engine, 4000, 15000),
    (BikeType::Electric, ServiceType::Brake, 400, 900),
    // Electric bikes have no engine oil
    (BikeType::Electric, ServiceType::Oil, 0, 0),
    (BikeType::Electric, ServiceType::Electrical, 1500, 6000),
    (BikeType::Electric, ServiceType::Emergency, 800, 2000),
];

lazy_static! {
    static ref COST_MATRIX: HashMap<(BikeType, ServiceType), (u32, u32)> = COST_TABLE
        .iter()
        .map(|(bike, service, min, max)| ((*bike, *service), (*min, *max)))
        .collect();
}

pub fn cost_range(bike: BikeType, service: ServiceType) -> Option<(u32, u32)> {
    COST_MATRIX.get(&(bike, service)).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_knowledge_base_in_canonical_order() {
        for (i, category) in IssueCategory::ALL.iter().enumerate() {
            assert_eq!(KNOWLEDGE_BASE[i].category, *category);
            assert_eq!(entry(*category).category, *category);
        }
    }

    #[test]
    fn test_keywords_are_lowercase() {
        for entry in &KNOWLEDGE_BASE {
            assert!(!entry.keywords.is_empty());
            for kw in entry.keywords {
                assert_eq!(*kw, kw.to_lowercase());
            }
        }
    }

    #[test]
    fn test_brand_tips_reference_known_brands() {
        for (brand, _, _) in BRAND_TIPS {
            assert!(BRANDS.contains(brand), "unknown brand {}", brand);
        }
        assert!(brand_tip("royal enfield", IssueCategory::Start).is_some());
        assert!(brand_tip("royal enfield", IssueCategory::Mileage).is_none());
    }

    #[test]
    fn test_cost_matrix_bounds() {
        let mut zero_pairs = Vec::new();

        for bike in BikeType::ALL {
            for service in ServiceType::ALL {
                let (min, max) = cost_range(bike, service).expect("pair missing");
                assert!(min <= max);
                if min == 0 && max == 0 {
                    zero_pairs.push((bike, service));
                }
            }
        }

        assert_eq!(zero_pairs, vec![(BikeType::Electric, ServiceType::Oil)]);
    }
}
