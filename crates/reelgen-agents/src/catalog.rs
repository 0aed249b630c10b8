//! The fixed agent catalog
//!
//! Agents are immutable and defined at process start. The `balance` field is
//! a logical share of the single custodial wallet, used for display and
//! attribution only — it is not an enforced spending cap.

use reelgen_types::{AgentId, Amount};
use serde::Serialize;

/// A named agent persona with keyword affinities
#[derive(Debug, Clone, Serialize)]
pub struct Agent {
    pub id: AgentId,
    pub name: String,
    pub emoji: String,
    pub specialty: String,
    pub personality: String,
    /// Ranked match keywords, most characteristic first
    pub keywords: Vec<&'static str>,
    /// Logical balance in the shared wallet (informational only)
    pub balance: Amount,
}

/// The finite, ordered agent catalog
///
/// Order matters: ties in selection scoring break toward the
/// first-declared agent, and the first agent is the zero-match default.
#[derive(Debug, Clone)]
pub struct Catalog {
    agents: Vec<Agent>,
}

impl Catalog {
    /// The built-in five-agent catalog
    pub fn builtin() -> Self {
        let agents = vec![
            Agent {
                id: AgentId::new("director"),
                name: "Director Alex".into(),
                emoji: "🎬".into(),
                specialty: "Cinematic vision and storytelling".into(),
                personality: "Creative, visionary, focused on composition and narrative flow"
                    .into(),
                keywords: vec![
                    "cinematic",
                    "movie",
                    "film",
                    "story",
                    "dramatic",
                    "scene",
                    "action",
                    "adventure",
                    "thriller",
                    "romance",
                ],
                balance: Amount::from_usdc(2.50),
            },
            Agent {
                id: AgentId::new("marketer"),
                name: "Marketing Maven".into(),
                emoji: "📈".into(),
                specialty: "Commercial and advertising content".into(),
                personality: "Results-driven, persuasive, focused on brand impact and conversion"
                    .into(),
                keywords: vec![
                    "advertisement",
                    "commercial",
                    "product",
                    "brand",
                    "marketing",
                    "promotion",
                    "business",
                    "corporate",
                    "sales",
                ],
                balance: Amount::from_usdc(1.80),
            },
            Agent {
                id: AgentId::new("artist"),
                name: "Artistic Soul".into(),
                emoji: "🎨".into(),
                specialty: "Abstract and creative visuals".into(),
                personality:
                    "Imaginative, experimental, focused on aesthetic beauty and artistic expression"
                        .into(),
                keywords: vec![
                    "abstract",
                    "art",
                    "creative",
                    "artistic",
                    "colors",
                    "visual",
                    "aesthetic",
                    "beauty",
                    "surreal",
                    "experimental",
                ],
                balance: Amount::from_usdc(3.20),
            },
            Agent {
                id: AgentId::new("educator"),
                name: "Tech Teacher".into(),
                emoji: "🔬".into(),
                specialty: "Educational and technical content".into(),
                personality: "Clear, methodical, focused on accuracy and learning outcomes".into(),
                keywords: vec![
                    "tutorial",
                    "education",
                    "technical",
                    "demo",
                    "how-to",
                    "explanation",
                    "learning",
                    "training",
                    "guide",
                ],
                balance: Amount::from_usdc(0.90),
            },
            Agent {
                id: AgentId::new("entertainer"),
                name: "Fun Creator".into(),
                emoji: "🎪".into(),
                specialty: "Entertainment and viral content".into(),
                personality: "Energetic, playful, focused on engagement and shareability".into(),
                keywords: vec![
                    "funny",
                    "entertainment",
                    "viral",
                    "meme",
                    "comedy",
                    "fun",
                    "party",
                    "celebration",
                    "dance",
                    "music",
                ],
                balance: Amount::from_usdc(4.10),
            },
        ];
        Self { agents }
    }

    /// All agents, in declaration order
    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    /// The default agent for zero-match prompts (first in the catalog)
    pub fn default_agent(&self) -> &Agent {
        &self.agents[0]
    }

    /// Look up an agent by id
    pub fn get(&self, id: &AgentId) -> Option<&Agent> {
        self.agents.iter().find(|a| &a.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_catalog_has_five_agents() {
        let catalog = Catalog::builtin();
        assert_eq!(catalog.agents().len(), 5);
    }

    #[test]
    fn default_agent_is_the_director() {
        let catalog = Catalog::builtin();
        assert_eq!(catalog.default_agent().id.as_str(), "director");
    }

    #[test]
    fn lookup_by_id() {
        let catalog = Catalog::builtin();
        let artist = catalog.get(&AgentId::new("artist")).expect("artist exists");
        assert_eq!(artist.name, "Artistic Soul");
        assert!(catalog.get(&AgentId::new("ghost")).is_none());
    }
}
