//! Gating thresholds and well-known catalog keys used by the selection rules.
//!
//! The rule set refers to a handful of careers, sliders and toggles by id.
//! Keeping them together means the catalog and the engine only have to agree
//! on this file.

// Level gates --------------------------------------------------------------
pub const LEVEL_MIN: u8 = 0;
pub const LEVEL_MAX: u8 = 60;
pub const CLASS_UNLOCK_LEVEL: u8 = 5;
pub const SPECIALIZATION_UNLOCK_LEVEL: u8 = 15;
pub const ADVENTURE_CAREER_UNLOCK_LEVEL: u8 = 5;
pub const RELIGION_CAREER_UNLOCK_LEVEL: u8 = 10;

// Careers ------------------------------------------------------------------
pub const CAREER_ADVENTURE: &str = "career_adventure";
pub const CAREER_RELIGION: &str = "career_religion";
pub const CAREER_COMMERCE: &str = "career_commerce";
pub const CAREER_INSTITUT: &str = "career_institut";

// Sliders ------------------------------------------------------------------
pub const POLITICAL_POINTS_KEY: &str = "political_points_input";
pub const POLITICAL_POINTS_MIN: i32 = -300;
pub const POLITICAL_POINTS_MAX: i32 = 300;

pub const INSTITUT_RANK_KEY: &str = "career_institut_rank";
pub const INSTITUT_DIRECTOR_TIER: i32 = 3;

// Toggles ------------------------------------------------------------------
pub const CARD_TOGGLE_KEYS: [&str; 5] = [
    "card_hearts",
    "card_diamonds",
    "card_clubs",
    "card_spades",
    "card_royal",
];

// Classes ------------------------------------------------------------------
/// Only this class makes use of the manual absorption bonus.
pub const ABSORPTION_CLASS: &str = "corrompu";
