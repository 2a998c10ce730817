use tracker_core::types::RewardMatchEvent;

/// Renders reward notifications
#[derive(Debug, Clone)]
pub struct MessageTemplate {
    explorer_base_url: String,
    ticker: String,
}

impl MessageTemplate {
    pub fn new(explorer_base_url: &str, ticker: &str) -> Self {
        Self {
            explorer_base_url: explorer_base_url.trim_end_matches('/').to_string(),
            ticker: ticker.to_string(),
        }
    }

    pub fn block_link(&self, event: &RewardMatchEvent) -> String {
        format!("{}/blocks/{}", self.explorer_base_url, event.block_hash)
    }

    /// Message body in Telegram's legacy Markdown
    pub fn render(&self, event: &RewardMatchEvent) -> String {
        format!(
            "Congratulations {}, you found a new block! 🎉\n\
             Reward: {} {}\n\
             [View block on explorer]({})",
            escape_markdown(&event.username),
            event.reward,
            self.ticker,
            self.block_link(event),
        )
    }
}

/// Usernames are free text; an unpaired `_` or `*` makes Telegram reject the message
fn escape_markdown(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '_' | '*' | '`' | '[') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracker_core::types::{Reward, TipHash};

    fn event(username: &str) -> RewardMatchEvent {
        RewardMatchEvent {
            username: username.to_string(),
            address: "addr1".to_string(),
            reward: Reward::from_raw(123_456_789),
            block_hash: TipHash::from("abc"),
        }
    }

    #[test]
    fn test_render() {
        let template = MessageTemplate::new("https://explorer.sedracoin.com/", "SDR");
        assert_eq!(
            template.render(&event("alice")),
            "Congratulations alice, you found a new block! 🎉\n\
             Reward: 1.23456789 SDR\n\
             [View block on explorer](https://explorer.sedracoin.com/blocks/abc)"
        );
    }

    #[test]
    fn test_render_escapes_username() {
        let template = MessageTemplate::new("https://x", "SDR");
        let text = template.render(&event("big_miner*"));
        assert!(text.starts_with("Congratulations big\\_miner\\*,"));
    }
}
