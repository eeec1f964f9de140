//! Conversation Router
//!
//! Intercepts chat that is not a problem description (greetings, questions
//! about the assistant, thanks, pricing and booking questions, maintenance
//! advice) and answers it with a canned reply. Anything it does not
//! recognise is left for the diagnostic classifier.

use crate::classifier::normalize;
use crate::models::{ConversationIntent, ConversationalReply};
use lazy_static::lazy_static;
use regex::Regex;

/// Default upper bound (exclusive, in chars) for a message to count as thanks
pub const DEFAULT_THANKS_MAX_CHARS: usize = 30;

#[derive(Debug, Clone)]
pub struct RouterConfig {
    /// Longer messages that contain "thanks" are treated as descriptions
    pub thanks_max_chars: usize,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            thanks_max_chars: DEFAULT_THANKS_MAX_CHARS,
        }
    }
}

lazy_static! {
    static ref GREETING: Regex = Regex::new(
        r"^(hi+|hello+|hey+|hiya|namaste|yo|good\s+(morning|afternoon|evening))(\s+(there|team|bot))?[\s!.,?]*$"
    )
    .unwrap();
    static ref IDENTITY: Regex = Regex::new(
        r"\b(who are you|what are you|your name|are you (a |an )?(bot|robot|human|ai|real))\b"
    )
    .unwrap();
    static ref CAPABILITY: Regex = Regex::new(
        r"\b(what can you do|how can you help|what do you (do|offer)|what are your (features|services)|^help[\s!?.]*$)"
    )
    .unwrap();
    static ref THANKS: Regex =
        Regex::new(r"\b(thanks|thank you|thank u|thx|ty|much appreciated)\b").unwrap();
    static ref PRICING: Regex = Regex::new(
        r"\b(price list|pricing|your (prices|rates|charges)|service charges?|how much (do you|does a service|for a service))\b"
    )
    .unwrap();
    static ref BOOKING: Regex = Regex::new(
        r"\b(book|booking|appointment|schedule|reserve|available slots?)\b"
    )
    .unwrap();
    static ref MAINTENANCE: Regex = Regex::new(
        r"\b(maintenance tips?|how often|service interval|maintain my|keep my bike)\b"
    )
    .unwrap();
}

const GREETING_REPLY: &str = "Hello! Welcome to our bike repair shop.
Describe what is wrong with your bike and I will suggest likely causes and a cost range.
You can also ask about pricing or booking a service.";

const IDENTITY_REPLY: &str = "I am the shop's diagnosis assistant.
I match your description against common bike problems to suggest causes, urgency and a cost range.
A mechanic always confirms the diagnosis during inspection.";

const CAPABILITY_REPLY: &str = "Here is what I can help with:
Diagnose problems like starting trouble, noises, brakes, oil, battery, mileage, vibration and overheating.
Estimate service costs for your bike type.
Point you to booking a service or an emergency pickup.";

const THANKS_REPLY: &str = "You're welcome!
Ride safe, and tell me if anything else feels off with your bike.";

const PRICING_REPLY: &str = "Prices depend on your bike type and the service needed.
Use the cost estimator and pick your bike type and service for a price range.
Final cost is confirmed after inspection.";

const BOOKING_REPLY: &str = "You can book a service from the booking page.
Pick your bike type, service and a preferred date and time.
For breakdowns choose the emergency service and we will arrange a pickup.";

const MAINTENANCE_REPLY: &str = "A few maintenance basics:
Change the engine oil every 2,500 to 3,000 km.
Check tyre pressure every week.
Clean and lube the chain every 500 km.
Get a general service every 3 months or 3,000 km.";

/// Routes conversational messages to canned replies
pub struct ConversationRouter {
    config: RouterConfig,
}

impl ConversationRouter {
    pub fn new() -> Self {
        Self {
            config: RouterConfig::default(),
        }
    }

    pub fn with_config(config: RouterConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    /// Canned reply for a conversational message, or `None` when the text
    /// should go to the diagnostic classifier instead.
    pub fn route(&self, text: &str) -> Option<ConversationalReply> {
        let normalized = normalize(text.trim());
        if normalized.is_empty() {
            return None;
        }

        let intent = self.detect_intent(&normalized)?;
        Some(ConversationalReply {
            intent,
            text: reply_for(intent).to_string(),
        })
    }

    fn detect_intent(&self, normalized: &str) -> Option<ConversationIntent> {
        if GREETING.is_match(normalized) {
            Some(ConversationIntent::Greeting)
        } else if IDENTITY.is_match(normalized) {
            Some(ConversationIntent::Identity)
        } else if CAPABILITY.is_match(normalized) {
            Some(ConversationIntent::Capability)
        } else if THANKS.is_match(normalized)
            && normalized.chars().count() < self.config.thanks_max_chars
        {
            Some(ConversationIntent::Thanks)
        } else if PRICING.is_match(normalized) {
            Some(ConversationIntent::Pricing)
        } else if BOOKING.is_match(normalized) {
            Some(ConversationIntent::Booking)
        } else if MAINTENANCE.is_match(normalized) {
            Some(ConversationIntent::Maintenance)
        } else {
            None
        }
    }
}

impl Default for ConversationRouter {
    fn default() -> Self {
        Self::new()
    }
}

fn reply_for(intent: ConversationIntent) -> &'static str {
    match intent {
        ConversationIntent::Greeting => GREETING_REPLY,
        ConversationIntent::Identity => IDENTITY_REPLY,
        ConversationIntent::Capability => CAPABILITY_REPLY,
        ConversationIntent::Thanks => THANKS_REPLY,
        ConversationIntent::Pricing => PRICING_REPLY,
        ConversationIntent::Booking => BOOKING_REPLY,
        ConversationIntent::Maintenance => MAINTENANCE_REPLY,
    }
}

/// Route with the default configuration
pub fn route_conversation(text: &str) -> Option<ConversationalReply> {
    ConversationRouter::new().route(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn intent(text: &str) -> Option<ConversationIntent> {
        route_conversation(text).map(|reply| reply.intent)
    }

    #[test]
    fn test_greetings() {
        for text in ["hello", "Hi!", "  hey there  ", "Good Morning", "namaste"] {
            assert_eq!(intent(text), Some(ConversationIntent::Greeting), "{}", text);
        }
    }

    #[test]
    fn test_greeting_with_problem_is_not_a_greeting() {
        assert_eq!(intent("hi my bike won't start"), None);
        assert_eq!(intent("good morning, brakes are squeaking"), None);
    }

    #[test]
    fn test_identity_and_capability() {
        assert_eq!(intent("who are you?"), Some(ConversationIntent::Identity));
        assert_eq!(intent("are you a bot"), Some(ConversationIntent::Identity));
        assert_eq!(intent("what can you do"), Some(ConversationIntent::Capability));
        assert_eq!(intent("help"), Some(ConversationIntent::Capability));
    }

    #[test]
    fn test_thanks_is_length_bounded() {
        assert_eq!(intent("thanks!"), Some(ConversationIntent::Thanks));
        assert_eq!(intent("Thank you so much"), Some(ConversationIntent::Thanks));

        // 30 chars or more is a description, not thanks
        let long = "thanks, but the chain still rattles at speed";
        assert!(long.chars().count() >= DEFAULT_THANKS_MAX_CHARS);
        assert_eq!(intent(long), None);
    }

    #[test]
    fn test_thanks_threshold_is_configurable() {
        let router = ConversationRouter::with_config(RouterConfig {
            thanks_max_chars: 100,
        });
        let reply = router
            .route("thanks, but the chain still rattles at speed")
            .unwrap();
        assert_eq!(reply.intent, ConversationIntent::Thanks);
    }

    #[test]
    fn test_meta_questions() {
        assert_eq!(intent("what is your price list"), Some(ConversationIntent::Pricing));
        assert_eq!(intent("I want to book a service"), Some(ConversationIntent::Booking));
        assert_eq!(
            intent("how often should I change oil"),
            Some(ConversationIntent::Maintenance)
        );
    }

    #[test]
    fn test_priority_order() {
        // greeting is checked before anything else
        assert_eq!(intent("hello!!"), Some(ConversationIntent::Greeting));
        // pricing wins over booking
        assert_eq!(
            intent("pricing before I book"),
            Some(ConversationIntent::Pricing)
        );
    }

    #[test]
    fn test_problem_descriptions_pass_through() {
        assert_eq!(intent("engine makes a knocking noise"), None);
        assert_eq!(intent("brakes feel spongy"), None);
    }

    #[test]
    fn test_empty_input() {
        assert!(route_conversation("").is_none());
        assert!(route_conversation("   \n").is_none());
    }

    #[test]
    fn test_reply_is_multi_line() {
        let reply = route_conversation("hello").unwrap();
        assert!(reply.lines().count() > 1);
    }
}
