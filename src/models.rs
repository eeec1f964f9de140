//! Core data models for the bike service assistant

use serde::{Deserialize, Serialize};
use std::fmt;

//
// ================= Enums =================
//

/// Closed set of diagnosable problem classes.
///
/// Declaration order is the canonical scan order used by the classifier,
/// and therefore the order that decides urgency ties.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum IssueCategory {
    Start,
    Noise,
    Brake,
    Oil,
    Battery,
    Mileage,
    Vibration,
    Overheat,
}

impl IssueCategory {
    pub const ALL: [IssueCategory; 8] = [
        IssueCategory::Start,
        IssueCategory::Noise,
        IssueCategory::Brake,
        IssueCategory::Oil,
        IssueCategory::Battery,
        IssueCategory::Mileage,
        IssueCategory::Vibration,
        IssueCategory::Overheat,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            IssueCategory::Start => "start",
            IssueCategory::Noise => "noise",
            IssueCategory::Brake => "brake",
            IssueCategory::Oil => "oil",
            IssueCategory::Battery => "battery",
            IssueCategory::Mileage => "mileage",
            IssueCategory::Vibration => "vibration",
            IssueCategory::Overheat => "overheat",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    Low,
    Medium,
    High,
}

impl Urgency {
    /// Tie-break rank: high=3, medium=2, low=1
    pub fn rank(&self) -> u8 {
        match self {
            Urgency::Low => 1,
            Urgency::Medium => 2,
            Urgency::High => 3,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum BikeType {
    Scooter,
    Commuter,
    Sport,
    Cruiser,
    Electric,
}

impl BikeType {
    pub const ALL: [BikeType; 5] = [
        BikeType::Scooter,
        BikeType::Commuter,
        BikeType::Sport,
        BikeType::Cruiser,
        BikeType::Electric,
    ];

    /// Exact, case-sensitive token match. Anything else is `None`.
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "scooter" => Some(BikeType::Scooter),
            "commuter" => Some(BikeType::Commuter),
            "sport" => Some(BikeType::Sport),
            "cruiser" => Some(BikeType::Cruiser),
            "electric" => Some(BikeType::Electric),
            _ => None,
        }
    }

    pub fn token(&self) -> &'static str {
        match self {
            BikeType::Scooter => "scooter",
            BikeType::Commuter => "commuter",
            BikeType::Sport => "sport",
            BikeType::Cruiser => "cruiser",
            BikeType::Electric => "electric",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            BikeType::Scooter => "Scooter",
            BikeType::Commuter => "Commuter Bike",
            BikeType::Sport => "Sports Bike",
            BikeType::Cruiser => "Cruiser",
            BikeType::Electric => "Electric Bike",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ServiceType {
    General,
    Engine,
    Brake,
    Oil,
    Electrical,
    Emergency,
}

impl ServiceType {
    pub const ALL: [ServiceType; 6] = [
        ServiceType::General,
        ServiceType::Engine,
        ServiceType::Brake,
        ServiceType::Oil,
        ServiceType::Electrical,
        ServiceType::Emergency,
    ];

    /// Exact, case-sensitive token match. Anything else is `None`.
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "general" => Some(ServiceType::General),
            "engine" => Some(ServiceType::Engine),
            "brake" => Some(ServiceType::Brake),
            "oil" => Some(ServiceType::Oil),
            "electrical" => Some(ServiceType::Electrical),
            "emergency" => Some(ServiceType::Emergency),
            _ => None,
        }
    }

    pub fn token(&self) -> &'static str {
        match self {
            ServiceType::General => "general",
            ServiceType::Engine => "engine",
            ServiceType::Brake => "brake",
            ServiceType::Oil => "oil",
            ServiceType::Electrical => "electrical",
            ServiceType::Emergency => "emergency",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ServiceType::General => "General Service",
            ServiceType::Engine => "Engine Repair",
            ServiceType::Brake => "Brake Service",
            ServiceType::Oil => "Oil Change",
            ServiceType::Electrical => "Electrical Work",
            ServiceType::Emergency => "Emergency Repair",
        }
    }
}

//
// ================= Diagnosis =================
//

/// A diagnosis as shown to the customer.
///
/// The knowledge base holds one template per category; callers always
/// receive an owned copy, so `urgency` and `tip` can be rewritten freely.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DiagnosisRecord {
    pub title: String,
    pub causes: Vec<String>,
    pub urgency: Urgency,
    pub cost_range: String,
    pub tip: String,
}

/// Secondary heuristics tried only when no knowledge base category matched
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FallbackKind {
    ColdStart,
    Performance,
    Smoking,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", content = "name", rename_all = "snake_case")]
pub enum DiagnosisSource {
    Category(IssueCategory),
    Fallback(FallbackKind),
}

impl DiagnosisSource {
    pub fn category(&self) -> Option<IssueCategory> {
        match self {
            DiagnosisSource::Category(category) => Some(*category),
            DiagnosisSource::Fallback(_) => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Diagnosis {
    pub source: DiagnosisSource,
    pub record: DiagnosisRecord,
}

//
// ================= Cost =================
//

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CostEstimate {
    pub bike_type: BikeType,
    pub service_type: ServiceType,
    pub min: u32,
    pub max: u32,
    /// False for the zero-cost sentinel: the service does not apply.
    pub applicable: bool,
    pub note: String,
}

//
// ================= Conversation =================
//

/// Conversational intents, listed in router priority order
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ConversationIntent {
    Greeting,
    Identity,
    Capability,
    Thanks,
    Pricing,
    Booking,
    Maintenance,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConversationalReply {
    pub intent: ConversationIntent,
    /// Multi-line canned reply. Line breaks are meaningful to renderers.
    pub text: String,
}

impl ConversationalReply {
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.text.lines()
    }
}

//
// ================= Pipeline Output =================
//

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AssistantReply {
    Conversation {
        intent: ConversationIntent,
        reply: String,
        lines: Vec<String>,
    },
    Diagnosis(Diagnosis),
    Unrecognized {
        message: String,
    },
}

impl fmt::Display for Urgency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Urgency::Low => "Low",
            Urgency::Medium => "Medium",
            Urgency::High => "High",
        };
        write!(f, "{}", s)
    }
}

impl fmt::Display for IssueCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
