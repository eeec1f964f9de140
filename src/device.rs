//! Device and session metadata
//!
//! Derived from the User-Agent header and stored alongside logged
//! interactions. The classifier never sees it.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DeviceType {
    Mobile,
    Tablet,
    Desktop,
    Unknown,
}

impl DeviceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceType::Mobile => "mobile",
            DeviceType::Tablet => "tablet",
            DeviceType::Desktop => "desktop",
            DeviceType::Unknown => "unknown",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeviceContext {
    pub device_type: DeviceType,
    pub os: String,
}

impl DeviceContext {
    pub fn unknown() -> Self {
        Self {
            device_type: DeviceType::Unknown,
            os: "unknown".to_string(),
        }
    }

    pub fn from_user_agent(user_agent: Option<&str>) -> Self {
        let Some(ua) = user_agent.map(str::to_lowercase).filter(|ua| !ua.trim().is_empty())
        else {
            return Self::unknown();
        };

        // tablets first: iPad and Android tablet agents also look mobile-ish
        let device_type = if ua.contains("ipad") || ua.contains("tablet") {
            DeviceType::Tablet
        } else if ua.contains("mobi") || ua.contains("android") || ua.contains("iphone") {
            DeviceType::Mobile
        } else {
            DeviceType::Desktop
        };

        let os = if ua.contains("windows") {
            "windows"
        } else if ua.contains("iphone") || ua.contains("ipad") {
            "ios"
        } else if ua.contains("android") {
            "android"
        } else if ua.contains("mac os") || ua.contains("macintosh") {
            "macos"
        } else if ua.contains("linux") {
            "linux"
        } else {
            "unknown"
        };

        Self {
            device_type,
            os: os.to_string(),
        }
    }
}

impl Default for DeviceContext {
    fn default() -> Self {
        Self::unknown()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_agents() {
        let iphone = DeviceContext::from_user_agent(Some(
            "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X) Mobile/15E148",
        ));
        assert_eq!(iphone.device_type, DeviceType::Mobile);
        assert_eq!(iphone.os, "ios");

        let ipad = DeviceContext::from_user_agent(Some(
            "Mozilla/5.0 (iPad; CPU OS 16_6 like Mac OS X) Mobile/15E148",
        ));
        assert_eq!(ipad.device_type, DeviceType::Tablet);
        assert_eq!(ipad.os, "ios");

        let android = DeviceContext::from_user_agent(Some(
            "Mozilla/5.0 (Linux; Android 14; Pixel 8) Mobile Safari/537.36",
        ));
        assert_eq!(android.device_type, DeviceType::Mobile);
        assert_eq!(android.os, "android");

        let desktop = DeviceContext::from_user_agent(Some(
            "Mozilla/5.0 (Windows NT 10.0; Win64; x64) Chrome/120.0",
        ));
        assert_eq!(desktop.device_type, DeviceType::Desktop);
        assert_eq!(desktop.os, "windows");
    }

    #[test]
    fn test_missing_user_agent() {
        assert_eq!(DeviceContext::from_user_agent(None), DeviceContext::unknown());
        assert_eq!(DeviceContext::from_user_agent(Some("")), DeviceContext::unknown());
    }
}
