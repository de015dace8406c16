//! Word-pack catalog.
//!
//! A small built-in catalog is seeded at construction time; community or
//! AI-generated packs can be admitted at runtime after shape validation.
//! Generation itself happens outside this server.

use chrono::Duration;

use super::AppState;
use crate::error::GameError;
use crate::types::*;

/// Shape of a pack offered for admission, before it gets an id.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct NewWordPack {
    pub title: String,
    pub description: String,
    pub kind: PackKind,
    pub difficulty: Difficulty,
    pub language: String,
    pub pairs: Vec<WordPair>,
    pub is_public: bool,
}

fn pair(civilian: &str, undercover: &str) -> WordPair {
    WordPair {
        civilian: civilian.to_string(),
        undercover: undercover.to_string(),
    }
}

/// The built-in catalog. Creation times are staggered so the recency
/// ordering of the seeded packs is stable.
pub(super) fn builtin_packs() -> Vec<WordPack> {
    let now = chrono::Utc::now();
    let seed = |offset: i64, title: &str, description: &str, difficulty, pairs| WordPack {
        id: ulid::Ulid::new().to_string(),
        title: title.to_string(),
        description: description.to_string(),
        kind: PackKind::Curated,
        difficulty,
        language: "en".to_string(),
        pairs,
        is_public: true,
        created_at: now - Duration::seconds(offset),
    };

    vec![
        seed(
            3,
            "General",
            "Everyday things everyone can clue around",
            Difficulty::Easy,
            vec![
                pair("Apple", "Orange"),
                pair("Cat", "Dog"),
                pair("Coffee", "Tea"),
                pair("Beach", "Pool"),
                pair("Bicycle", "Motorcycle"),
                pair("Rain", "Snow"),
            ],
        ),
        seed(
            2,
            "Culture",
            "Food, arts and places from around the world",
            Difficulty::Medium,
            vec![
                pair("Pizza", "Pasta"),
                pair("Sushi", "Ramen"),
                pair("Opera", "Ballet"),
                pair("Museum", "Gallery"),
                pair("Carnival", "Festival"),
            ],
        ),
        seed(
            1,
            "Technology",
            "Gadgets and software for the terminally online",
            Difficulty::Medium,
            vec![
                pair("Laptop", "Tablet"),
                pair("Email", "Letter"),
                pair("Keyboard", "Mouse"),
                pair("Password", "Fingerprint"),
                pair("Robot", "Drone"),
            ],
        ),
    ]
}

/// Reject packs that would break pair selection: empty pair lists, blank
/// words, or a pair whose two words are the same.
fn validate_pairs(pairs: &[WordPair]) -> Result<(), GameError> {
    if pairs.is_empty() {
        return Err(GameError::ValidationError(
            "a word pack needs at least one pair".to_string(),
        ));
    }
    for (i, pair) in pairs.iter().enumerate() {
        let civilian = pair.civilian.trim();
        let undercover = pair.undercover.trim();
        if civilian.is_empty() || undercover.is_empty() {
            return Err(GameError::ValidationError(format!(
                "pair {} has an empty word",
                i
            )));
        }
        if civilian.eq_ignore_ascii_case(undercover) {
            return Err(GameError::ValidationError(format!(
                "pair {} uses the same word twice",
                i
            )));
        }
    }
    Ok(())
}

impl AppState {
    /// Public catalog, most recently created first.
    pub async fn public_packs(&self) -> Vec<WordPack> {
        let mut listed: Vec<WordPack> = self
            .packs
            .read()
            .await
            .values()
            .filter(|p| p.is_public)
            .cloned()
            .collect();
        listed.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        listed
    }

    pub async fn pack(&self, pack_id: &PackId) -> Result<WordPack, GameError> {
        self.packs
            .read()
            .await
            .get(pack_id)
            .cloned()
            .ok_or_else(|| GameError::NotFound(format!("word pack {}", pack_id)))
    }

    /// Admit an externally supplied pack into the catalog.
    pub async fn add_pack(&self, new: NewWordPack) -> Result<WordPack, GameError> {
        if new.title.trim().is_empty() {
            return Err(GameError::ValidationError(
                "pack title must not be empty".to_string(),
            ));
        }
        validate_pairs(&new.pairs)?;

        let pack = WordPack {
            id: ulid::Ulid::new().to_string(),
            title: new.title,
            description: new.description,
            kind: new.kind,
            difficulty: new.difficulty,
            language: new.language,
            pairs: new.pairs,
            is_public: new.is_public,
            created_at: chrono::Utc::now(),
        };

        self.packs
            .write()
            .await
            .insert(pack.id.clone(), pack.clone());
        tracing::info!("Admitted word pack {} ({:?})", pack.title, pack.kind);
        Ok(pack)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn community_pack(pairs: Vec<WordPair>) -> NewWordPack {
        NewWordPack {
            title: "Animals".to_string(),
            description: "Beasts of land and sea".to_string(),
            kind: PackKind::Community,
            difficulty: Difficulty::Easy,
            language: "en".to_string(),
            pairs,
            is_public: true,
        }
    }

    #[tokio::test]
    async fn test_public_packs_newest_first() {
        let state = AppState::new();
        let packs = state.public_packs().await;

        assert_eq!(packs.len(), 3);
        assert_eq!(packs[0].title, "Technology");
        assert_eq!(packs[2].title, "General");
    }

    #[tokio::test]
    async fn test_added_pack_leads_the_listing() {
        let state = AppState::new();
        state
            .add_pack(community_pack(vec![pair("Shark", "Dolphin")]))
            .await
            .unwrap();

        let packs = state.public_packs().await;
        assert_eq!(packs.len(), 4);
        assert_eq!(packs[0].title, "Animals");
    }

    #[tokio::test]
    async fn test_private_pack_hidden_from_listing() {
        let state = AppState::new();
        let mut new = community_pack(vec![pair("Shark", "Dolphin")]);
        new.is_public = false;

        let pack = state.add_pack(new).await.unwrap();
        let listed = state.public_packs().await;
        assert!(listed.iter().all(|p| p.id != pack.id));

        // Still resolvable by id for the room that selected it.
        assert!(state.pack(&pack.id).await.is_ok());
    }

    #[tokio::test]
    async fn test_empty_pack_rejected() {
        let state = AppState::new();
        let result = state.add_pack(community_pack(vec![])).await;
        assert!(matches!(result, Err(GameError::ValidationError(_))));
    }

    #[tokio::test]
    async fn test_blank_word_rejected() {
        let state = AppState::new();
        let result = state
            .add_pack(community_pack(vec![pair("Shark", "  ")]))
            .await;
        assert!(matches!(result, Err(GameError::ValidationError(_))));
    }

    #[tokio::test]
    async fn test_identical_pair_rejected() {
        let state = AppState::new();
        let result = state
            .add_pack(community_pack(vec![pair("Shark", "shark")]))
            .await;
        assert!(matches!(result, Err(GameError::ValidationError(_))));
    }

    #[test]
    fn test_builtin_packs_pass_their_own_validation() {
        for pack in builtin_packs() {
            assert!(validate_pairs(&pack.pairs).is_ok(), "pack {}", pack.title);
        }
    }
}
