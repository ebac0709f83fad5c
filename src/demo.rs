//! Autoplay driver for `parley demo`.
//!
//! Types each story-book prompt as if at a keyboard, submits it, waits for
//! the turn to finish and moves on. A stop request interrupts typing and
//! is checked again before each submission; a turn already in flight runs
//! to completion.

use std::io::{self, Write};
use std::ops::RangeInclusive;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use anyhow::{bail, Result};
use colored::Colorize;
use rand::Rng;

use crate::config::Config;
use crate::constants::STORY_BOOK;
use crate::engine::{ConversationEngine, TurnOutcome};

const BUSY_POLL: Duration = Duration::from_millis(50);

pub struct Autoplay {
    /// Per-character typing delay range in milliseconds.
    typing: RangeInclusive<u64>,
    review: Duration,
    start: Duration,
}

impl Autoplay {
    pub fn from_config(config: &Config) -> Self {
        Self {
            typing: config.typing_range(),
            review: config.review_delay(),
            start: config.start_delay(),
        }
    }

    /// Plays the story book from index `from`. Returns how many prompts
    /// were submitted.
    pub async fn run(
        &self,
        engine: &ConversationEngine,
        from: usize,
        stop: &AtomicBool,
    ) -> Result<usize> {
        if from >= STORY_BOOK.len() {
            bail!(
                "story index {} out of range (0-{})",
                from,
                STORY_BOOK.len() - 1
            );
        }
        sleep(self.start).await;

        let mut played = 0;
        for (index, prompt) in STORY_BOOK.iter().enumerate().skip(from) {
            if stop.load(Ordering::Acquire) {
                break;
            }
            while engine.is_busy() {
                tokio::time::sleep(BUSY_POLL).await;
            }

            if !self.type_out(prompt, stop).await || stop.load(Ordering::Acquire) {
                break;
            }
            match engine.submit(prompt).await {
                TurnOutcome::Completed { rounds } => {
                    tracing::info!(index, rounds, "story complete");
                }
                TurnOutcome::Faulted { rounds } => {
                    tracing::warn!(index, rounds, "story ended with a stream fault");
                }
                TurnOutcome::Dropped(reason) => {
                    tracing::warn!(index, %reason, "story prompt dropped");
                    continue;
                }
            }
            played += 1;

            if stop.load(Ordering::Acquire) {
                break;
            }
            sleep(self.review).await;
        }

        if stop.load(Ordering::Acquire) {
            tracing::info!(played, "autoplay stopped");
        }
        Ok(played)
    }

    /// Echoes `prompt` one character at a time. Returns false if `stop` was
    /// raised before the whole prompt was typed.
    async fn type_out(&self, prompt: &str, stop: &AtomicBool) -> bool {
        print!("{} ", ">".green().bold());
        io::stdout().flush().ok();
        for ch in prompt.chars() {
            let delay = rand::thread_rng().gen_range(self.typing.clone());
            sleep(Duration::from_millis(delay)).await;
            if stop.load(Ordering::Acquire) {
                println!();
                return false;
            }
            print!("{}", ch);
            io::stdout().flush().ok();
        }
        println!();
        true
    }
}

/// Records a Ctrl+C press against `stop`. The first press asks autoplay to
/// wind down; returns true on any later press, which should end the process.
pub fn interrupt(stop: &AtomicBool) -> bool {
    stop.swap(true, Ordering::AcqRel)
}

async fn sleep(duration: Duration) {
    if !duration.is_zero() {
        tokio::time::sleep(duration).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::scripted::Pacing;
    use crate::source::StoryBookSource;
    use crate::tools::directory::Directory;
    use crate::tools::ToolRegistry;
    use std::sync::Arc;

    fn instant() -> Autoplay {
        Autoplay {
            typing: 0..=0,
            review: Duration::ZERO,
            start: Duration::ZERO,
        }
    }

    fn engine() -> ConversationEngine {
        let tools = ToolRegistry::with_directory(Directory::new().shared());
        ConversationEngine::new(
            Arc::new(StoryBookSource::new(Pacing::default())),
            Arc::new(tools),
        )
    }

    #[tokio::test]
    async fn test_plays_from_index() {
        let engine = engine();
        let stop = AtomicBool::new(false);
        let played = instant().run(&engine, 6, &stop).await.unwrap();
        assert_eq!(played, 2);
        assert_eq!(
            engine.history().last().unwrap().text(),
            "Group not found."
        );
    }

    #[tokio::test]
    async fn test_stop_flag_prevents_submission() {
        let engine = engine();
        let stop = AtomicBool::new(true);
        assert_eq!(instant().run(&engine, 0, &stop).await.unwrap(), 0);
        assert!(engine.history().is_empty());
    }

    #[tokio::test]
    async fn test_stop_while_typing_skips_submission() {
        let engine = engine();
        let stop = AtomicBool::new(false);
        let slow = Autoplay {
            typing: 2..=2,
            ..instant()
        };
        let raise = async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            stop.store(true, Ordering::Release);
        };
        let (played, ()) = tokio::join!(slow.run(&engine, 7, &stop), raise);
        assert_eq!(played.unwrap(), 0);
        assert!(engine.history().is_empty());
    }

    #[test]
    fn test_second_interrupt_requests_exit() {
        let stop = AtomicBool::new(false);
        assert!(!interrupt(&stop));
        assert!(stop.load(Ordering::Acquire));
        assert!(interrupt(&stop));
    }

    #[tokio::test]
    async fn test_out_of_range_start() {
        let engine = engine();
        let stop = AtomicBool::new(false);
        let err = instant().run(&engine, 8, &stop).await.unwrap_err();
        assert_eq!(err.to_string(), "story index 8 out of range (0-7)");
    }
}
