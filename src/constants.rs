//! Centralized constants for parley.
//!
//! Default delays, seed ranges, demo prompts, and the name pools used to
//! generate directory data live here so they can be changed in one place.

/// Application name used in CLI output and directory paths.
pub const APP_NAME: &str = "parley";

/// Configuration filename.
pub const CONFIG_FILENAME: &str = "config.toml";

/// Per-project configuration filename.
pub const PROJECT_CONFIG_FILENAME: &str = "parley.toml";

/// Readline history filename.
pub const HISTORY_FILENAME: &str = "chat_history.txt";

/// Text appended to a responder message whose stream faulted.
pub const STREAM_FAILURE_TEXT: &str = "Error processing response.";

// --- Demo pacing (milliseconds) ---

/// Pause before a scripted reply starts streaming.
pub const DEMO_THINK_MS: u64 = 2200;

/// Pause before each streamed character.
pub const DEMO_CHAR_MS: u64 = 35;

/// Simulated latency of every tool call.
pub const DEMO_TOOL_MS: u64 = 2000;

/// Pause between a tool round and the next responder message.
pub const DEMO_ROUND_PAUSE_MS: u64 = 500;

/// Per-character typing delay range used by autoplay.
pub const DEMO_TYPING_MIN_MS: u64 = 50;
pub const DEMO_TYPING_MAX_MS: u64 = 100;

/// Pause after a turn before autoplay types the next prompt.
pub const DEMO_REVIEW_MS: u64 = 1500;

/// Pause before autoplay types its first prompt.
pub const DEMO_START_MS: u64 = 1500;

// --- Directory seeding ---

pub const SEED_USERS_MIN: usize = 3;
pub const SEED_USERS_MAX: usize = 6;
pub const SEED_GROUPS_MIN: usize = 1;
pub const SEED_GROUPS_MAX: usize = 2;

/// Email domain of seeded users.
pub const SEED_EMAIL_DOMAIN: &str = "company.com";

/// Email domain of users produced by `generateRandomUserResource`.
pub const GENERATED_EMAIL_DOMAIN: &str = "example.com";

// --- Story book ---

/// Prompts the scripted source knows how to answer, in demo order.
pub const STORY_BOOK: [&str; 8] = [
    "Get all users currently in the system",
    "Create a new random user",
    "Add the user you just created to 'Engineering' group. If 'Engineering' group does not exist, create it first.",
    "Remove that user from 'Engineering' group",
    "Update that user's email to 'alice.engineer@demo.com'",
    "Rename the 'Engineering' group to 'Deprecated Group'",
    "List all groups that have no members",
    "Delete the 'Deprecated Group'",
];

/// Reply to any prompt outside the story book.
pub const DEMO_FALLBACK_TEXT: &str = "I am running in demo mode. \
Type /stories to see the prompts I understand, or run `parley demo` to watch them play.";

// --- Name pools ---

pub const FIRST_NAMES: &[&str] = &[
    "James", "Mary", "John", "Patricia", "Robert", "Jennifer", "Michael", "Linda", "William",
    "Elizabeth", "David", "Barbara", "Richard", "Susan", "Joseph", "Jessica", "Thomas", "Sarah",
    "Charles", "Karen",
];

pub const LAST_NAMES: &[&str] = &[
    "Smith", "Johnson", "Williams", "Brown", "Jones", "Garcia", "Miller", "Davis", "Rodriguez",
    "Martinez", "Hernandez", "Lopez", "Gonzalez", "Wilson", "Anderson", "Thomas", "Taylor",
    "Moore", "Jackson", "Martin",
];

pub const DEPARTMENTS: &[&str] = &[
    "Engineering", "Sales", "Marketing", "HR", "Finance", "Legal", "Support", "Product",
    "Design", "Operations",
];

pub const GROUP_SUFFIXES: &[&str] = &["Team", "Group", "Squad", "Unit", "Department", "Guild"];
