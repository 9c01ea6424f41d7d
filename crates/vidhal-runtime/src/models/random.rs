//! Chance-level baseline model.

use std::sync::Arc;

use lazy_static::lazy_static;
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use regex::Regex;
use serde_json::Value as JsonValue;

use vidhal_core::VideoItem;

use super::{ModelError, ModelFactory, Prompt, VideoModel};

lazy_static! {
    /// Option line of a rendered options block ("B. a dog running").
    static ref OPTION_LINE: Regex = Regex::new(r"(?m)^([A-Z])\.\s").unwrap();
}

/// Answers without looking at the video.
///
/// Ordering prompts get a random permutation of the option letters,
/// everything else a single random letter.
pub struct RandomModel {
    rng: Mutex<StdRng>,
}

impl RandomModel {
    /// Create a model; a seed makes its answers reproducible.
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            rng: Mutex::new(rng),
        }
    }
}

fn option_letters(text: &str) -> Vec<&str> {
    OPTION_LINE
        .captures_iter(text)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str()))
        .collect()
}

impl VideoModel for RandomModel {
    fn name(&self) -> &str {
        "random"
    }

    fn generate_response(&self, _item: &VideoItem, prompt: &Prompt) -> Result<String, ModelError> {
        let mut letters = option_letters(&prompt.main);
        if letters.is_empty() {
            return Err(ModelError::Generation("No options found in prompt".into()));
        }

        let mut rng = self.rng.lock();
        if prompt.main.contains("order") {
            letters.shuffle(&mut *rng);
            Ok(letters.join(", "))
        } else {
            letters
                .choose(&mut *rng)
                .map(|letter| letter.to_string())
                .ok_or_else(|| ModelError::Generation("No options found in prompt".into()))
        }
    }
}

/// Creates [`RandomModel`]s from `{"seed": <u64>}`.
pub struct RandomModelFactory;

impl ModelFactory for RandomModelFactory {
    fn model_type(&self) -> &'static str {
        "random"
    }

    fn create(&self, config: &JsonValue) -> Result<Arc<dyn VideoModel>, ModelError> {
        self.validate_config(config)?;
        let seed = config.get("seed").and_then(JsonValue::as_u64);
        Ok(Arc::new(RandomModel::new(seed)))
    }

    fn validate_config(&self, config: &JsonValue) -> Result<(), ModelError> {
        match config.get("seed") {
            None | Some(JsonValue::Null) => Ok(()),
            Some(seed) if seed.is_u64() => Ok(()),
            Some(other) => Err(ModelError::InvalidConfig(format!(
                "seed must be a non-negative integer, got {}",
                other
            ))),
        }
    }

    fn default_config(&self) -> JsonValue {
        serde_json::json!({ "seed": null })
    }

    fn description(&self) -> &'static str {
        "Random baseline (ignores the video)"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::BTreeSet;
    use std::path::PathBuf;

    fn item() -> VideoItem {
        VideoItem {
            video_id: "v1".into(),
            captions: Default::default(),
            aspect: None,
            video_path: PathBuf::from("v1.mp4"),
        }
    }

    fn prompt(main: &str) -> Prompt {
        Prompt {
            main: main.to_string(),
            system: None,
        }
    }

    const OPTIONS: &str = "A. A dog runs\nB. A dog sits\nC. A cat runs";

    #[test]
    fn test_choice_is_one_of_the_options() {
        let model = RandomModel::new(Some(1));
        let prompt = prompt(&format!("Choose the best caption.\n\n{}", OPTIONS));

        for _ in 0..20 {
            let answer = model.generate_response(&item(), &prompt).unwrap();
            assert!(["A", "B", "C"].contains(&answer.as_str()), "{}", answer);
        }
    }

    #[test]
    fn test_ordering_is_a_permutation() {
        let model = RandomModel::new(Some(2));
        let prompt = prompt(&format!("Rank the captions in order.\n\n{}", OPTIONS));

        let answer = model.generate_response(&item(), &prompt).unwrap();
        let letters: BTreeSet<&str> = answer.split(", ").collect();
        assert_eq!(letters, BTreeSet::from(["A", "B", "C"]));
    }

    #[test]
    fn test_seeded_models_agree() {
        let prompt = prompt(&format!("Rank the captions in order.\n\n{}", OPTIONS));
        let first = RandomModel::new(Some(9));
        let second = RandomModel::new(Some(9));

        for _ in 0..5 {
            assert_eq!(
                first.generate_response(&item(), &prompt).unwrap(),
                second.generate_response(&item(), &prompt).unwrap()
            );
        }
    }

    #[test]
    fn test_prompt_without_options_fails() {
        let model = RandomModel::new(None);
        let result = model.generate_response(&item(), &prompt("Nothing to choose from"));
        assert!(matches!(result, Err(ModelError::Generation(_))));
    }

    #[test]
    fn test_factory_validates_seed() {
        let factory = RandomModelFactory;
        assert!(factory.create(&serde_json::json!({"seed": 3})).is_ok());
        assert!(factory.create(&serde_json::json!({})).is_ok());
        assert!(matches!(
            factory.validate_config(&serde_json::json!({"seed": "abc"})),
            Err(ModelError::InvalidConfig(_))
        ));
    }

    proptest! {
        #[test]
        fn test_ordering_answer_parses_back_to_the_offered_letters(seed in any::<u64>(), n in 1usize..=26) {
            let options: Vec<String> = (0..n)
                .map(|i| format!("{}. caption {}", (b'A' + i as u8) as char, i))
                .collect();
            let prompt = prompt(&format!("Rank the captions in order.\n\n{}", options.join("\n")));

            let answer = RandomModel::new(Some(seed)).generate_response(&item(), &prompt).unwrap();
            let mut parsed = vidhal_core::parse_ordering(&answer, n);
            parsed.sort_unstable();

            let expected: Vec<char> = (0..n).map(|i| (b'A' + i as u8) as char).collect();
            prop_assert_eq!(parsed, expected);
        }
    }
}
