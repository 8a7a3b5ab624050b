//! Phrase-triggered direct messages.

use rand::seq::SliceRandom;

pub const RAT_FACTS: [&str; 6] = [
    "Rats can laugh when they are tickled.",
    "A group of rats is called a mischief.",
    "Rats are excellent swimmers and can tread water for up to three days.",
    "Rats groom themselves several times a day.",
    "A rat's teeth never stop growing.",
    "Rats can recognise other individual rats and remember them.",
];

pub const HELLO_THERE_GIF: &str =
    "https://tenor.com/view/grevious-general-kenobi-star-wars-gif-11406339";
pub const BEANS_IMAGE: &str = "https://i.imgur.com/GkyCNCH.jpg";
pub const BEANS_FOOTER: &str = "You thought i was gone? Shh";

/// Which meme a message triggers, checked in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    RatFact,
    HelloThere,
    Beans,
}

impl Trigger {
    #[must_use]
    pub fn find(content: &str) -> Option<Self> {
        let content = content.to_lowercase();
        if content.contains("rat fact") {
            Some(Self::RatFact)
        } else if content.contains("hello there") {
            Some(Self::HelloThere)
        } else if content.contains("beans") {
            Some(Self::Beans)
        } else {
            None
        }
    }
}

/// A random rat fact.
#[must_use]
pub fn rat_fact() -> &'static str {
    RAT_FACTS
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or(RAT_FACTS[0])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trigger_priority() {
        assert_eq!(Trigger::find("Any RAT FACT today?"), Some(Trigger::RatFact));
        assert_eq!(Trigger::find("hello there, beans"), Some(Trigger::HelloThere));
        assert_eq!(Trigger::find("I like BEANS"), Some(Trigger::Beans));
        assert_eq!(Trigger::find("nothing to see"), None);
    }

    #[test]
    fn test_rat_fact_is_known() {
        assert!(RAT_FACTS.contains(&rat_fact()));
    }
}
