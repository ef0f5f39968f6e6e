use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactLink {
    pub label: String,
    pub url: String,
}

/// The domain-for-sale overlay and its contact modal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainListing {
    pub domain: String,
    pub description: String,
    pub price_usd: u32,
    pub includes: String,
    pub profile: ContactLink,
    pub broker: ContactLink,
    pub contacts: Vec<ContactLink>,
    pub feedback: ContactLink,
}

fn link(label: &str, url: &str) -> ContactLink {
    ContactLink {
        label: label.to_string(),
        url: url.to_string(),
    }
}

impl Default for DomainListing {
    fn default() -> Self {
        Self {
            domain: "whalewatch.live".to_string(),
            description: "Track cryptocurrency whale movements in real-time. \
                          Perfect for an active platform that updates users regularly."
                .to_string(),
            price_usd: 999,
            includes: "Includes production-ready startup app and premium domain.".to_string(),
            profile: link("@TrustChainX profile included.", "https://x.com/WhaleWatchLive"),
            broker: link("Stacklead.pro", "https://stacklead.pro"),
            contacts: vec![
                link("Telegram", "https://t.me/Kaiserkrab"),
                link("WhatsApp", "https://wa.me/40765263983"),
                link(
                    "Buy on Namecheap",
                    "https://www.namecheap.com/domains/registration/results/?domain=whalewatch.live",
                ),
            ],
            feedback: link("Follow us on Twitter", "https://x.com/stackleadpro"),
        }
    }
}
