use crate::betting::Action;
use crate::cards::{Card, Suit};
use crate::evaluator::best_of;
use crate::game::{Chips, Stage};
use crate::hand::HoleCards;
use crate::view::PublicView;
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::time::Duration;

use super::{AgentKind, PlayerAgent};

/// Difficulty tiers for bot play style and mistake rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
    Expert,
}

/// Configuration for a bot's play style and randomness.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct BotProfile {
    pub difficulty: Difficulty,
    pub tightness: f64,
    pub aggression: f64,
    pub bluff: f64,
    pub tilt: f64,
    /// Simulated thinking time, drawn uniformly per decision.
    pub min_delay_ms: u64,
    pub max_delay_ms: u64,
    pub rng_seed: Option<u64>,
}

impl BotProfile {
    /// Create a profile with tuned defaults for a difficulty tier.
    pub fn for_difficulty(difficulty: Difficulty) -> Self {
        let (tightness, aggression, bluff, tilt) = match difficulty {
            Difficulty::Easy => (0.3, 0.18, 0.03, 0.3),
            Difficulty::Medium => (0.5, 0.35, 0.05, 0.15),
            Difficulty::Hard => (0.62, 0.48, 0.08, 0.08),
            Difficulty::Expert => (0.72, 0.6, 0.12, 0.05),
        };
        Self {
            difficulty,
            tightness,
            aggression,
            bluff,
            tilt,
            min_delay_ms: 0,
            max_delay_ms: 0,
            rng_seed: None,
        }
    }

    /// Set a deterministic RNG seed for reproducible decisions.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng_seed = Some(seed);
        self
    }

    pub fn with_delay_ms(mut self, min: u64, max: u64) -> Self {
        self.min_delay_ms = min;
        self.max_delay_ms = max.max(min);
        self
    }
}

impl Default for BotProfile {
    fn default() -> Self {
        Self::for_difficulty(Difficulty::Medium)
    }
}

/// What the bot can see of the table on its turn.
struct BotContext {
    stage: Stage,
    position: PositionBucket,
    hole: HoleCards,
    board: Vec<Card>,
    pot: Chips,
    to_call: Chips,
    current_bet: Chips,
    min_raise_to: Option<Chips>,
    max_raise_to: Option<Chips>,
    stack: Chips,
}

impl BotContext {
    fn from_view(view: &PublicView) -> Option<Self> {
        let me = view.viewer_seat()?;
        let legal = view.legal_actions?;
        let dealt: Vec<usize> = view
            .seats
            .iter()
            .filter(|s| s.status != crate::game::PlayerStatus::Eliminated)
            .map(|s| s.seat)
            .collect();
        Some(Self {
            stage: view.stage,
            position: position_bucket(me.seat, view.dealer, &dealt),
            hole: me.hole_cards?,
            board: view.community_cards.clone(),
            pot: view.pot,
            to_call: legal.call_amount.unwrap_or(0),
            current_bet: view.current_bet,
            min_raise_to: legal.min_raise_to,
            max_raise_to: legal.max_raise_to,
            stack: me.stack,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PositionBucket {
    HeadsUp,
    Button,
    SmallBlind,
    BigBlind,
    Early,
    Middle,
    Late,
}

/// Seats are counted clockwise from the button among those dealt in.
fn position_bucket(seat: usize, dealer: usize, dealt: &[usize]) -> PositionBucket {
    let n = dealt.len();
    if n <= 2 {
        return PositionBucket::HeadsUp;
    }
    let Some(me) = dealt.iter().position(|&s| s == seat) else {
        return PositionBucket::Late;
    };
    let button = dealt.iter().position(|&s| s == dealer).unwrap_or(0);
    match (me + n - button) % n {
        0 => PositionBucket::Button,
        1 => PositionBucket::SmallBlind,
        2 => PositionBucket::BigBlind,
        dist => {
            let others = n - 3;
            let rel = dist - 3;
            if others <= 1 || rel >= (2 * others) / 3 {
                PositionBucket::Late
            } else if rel < others / 3 {
                PositionBucket::Early
            } else {
                PositionBucket::Middle
            }
        }
    }
}

fn difficulty_modifiers(difficulty: Difficulty) -> (f64, f64) {
    match difficulty {
        Difficulty::Easy => (0.28, -0.1),
        Difficulty::Medium => (0.14, 0.0),
        Difficulty::Hard => (0.08, 0.05),
        Difficulty::Expert => (0.04, 0.09),
    }
}

/// A heuristic bot: hand strength plus position, pot odds and some noise.
pub struct BotAgent {
    profile: BotProfile,
    rng: StdRng,
}

impl BotAgent {
    pub fn new(profile: BotProfile) -> Self {
        let rng = match profile.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_rng(&mut rand::rng()),
        };
        Self { profile, rng }
    }

    fn think(&mut self) {
        let min = self.profile.min_delay_ms;
        let max = self.profile.max_delay_ms.max(min);
        let ms = if max == min { min } else { self.rng.random_range(min..=max) };
        if ms > 0 {
            std::thread::sleep(Duration::from_millis(ms));
        }
    }

    fn choose(&mut self, ctx: &BotContext) -> Action {
        let strength = estimate_strength(ctx);
        let pot_odds = if ctx.to_call == 0 {
            0.0
        } else {
            ctx.to_call as f64 / (ctx.pot + ctx.to_call) as f64
        };
        let (mistake_rate, diff_bias) = difficulty_modifiers(self.profile.difficulty);
        let position_bias = match ctx.position {
            PositionBucket::Button | PositionBucket::Late => 0.08,
            PositionBucket::Early => -0.08,
            _ => 0.0,
        };
        let tilt = self.rng.random_range(-1.0..=1.0) * self.profile.tilt * 0.05;
        let tightness = (self.profile.tightness + diff_bias - position_bias).clamp(0.05, 0.95);
        let aggression =
            (self.profile.aggression + diff_bias + position_bias + tilt).clamp(0.05, 0.95);
        let bluff = (self.profile.bluff + diff_bias * 0.5).clamp(0.0, 0.5);

        let noise = self.rng.random_range(-1.0..=1.0) * mistake_rate * 0.18;
        let adjusted = (strength + noise).clamp(0.0, 1.0);
        let fold_below = (0.35 + tightness * 0.3 - pot_odds * 0.25).clamp(0.1, 0.9);
        let raise_above = (0.68 - aggression * 0.25).clamp(0.15, 0.9);

        let wants_raise = adjusted > raise_above && self.rng.random::<f64>() < aggression;
        let bluffs = adjusted < fold_below && self.rng.random::<f64>() < bluff;

        if ctx.to_call > 0 {
            if wants_raise {
                if let Some(to) = raise_target(ctx, aggression, adjusted) {
                    return Action::BetOrRaise(to);
                }
            }
            // heads-up preflop the small blind completes rather than folding
            let completing = ctx.stage == Stage::Preflop
                && ctx.position == PositionBucket::HeadsUp
                && ctx.current_bet <= ctx.to_call * 2;
            if adjusted < fold_below && !completing {
                return Action::Fold;
            }
            return Action::Call;
        }

        if wants_raise || bluffs {
            if let Some(to) = raise_target(ctx, aggression, adjusted) {
                return Action::BetOrRaise(to);
            }
        }
        Action::Check
    }
}

impl PlayerAgent for BotAgent {
    fn kind(&self) -> AgentKind {
        AgentKind::Bot
    }

    fn decide(&mut self, view: &PublicView) -> Action {
        self.think();
        match BotContext::from_view(view) {
            Some(ctx) => self.choose(&ctx),
            None => super::safe_default(view.legal_actions.as_ref()),
        }
    }
}

/// Pot-scaled bet or raise target, clamped to the legal range.
fn raise_target(ctx: &BotContext, aggression: f64, strength: f64) -> Option<Chips> {
    let (min_to, max_to) = (ctx.min_raise_to?, ctx.max_raise_to?);
    if strength > 0.88 && ctx.stack <= ctx.pot.saturating_add(ctx.to_call) {
        return Some(max_to);
    }
    let factor = if strength > 0.85 {
        1.0
    } else if strength > 0.65 {
        0.7
    } else {
        0.45
    };
    let scale = 0.85 + aggression * 0.35;
    let sized = ((ctx.pot.max(ctx.current_bet) as f64) * factor * scale).round() as Chips;
    Some(ctx.current_bet.saturating_add(sized).clamp(min_to, max_to))
}

fn estimate_strength(ctx: &BotContext) -> f64 {
    if ctx.board.len() < 3 {
        return preflop_strength_with_position(&ctx.hole, ctx.position);
    }
    let mut cards = Vec::with_capacity(2 + ctx.board.len());
    cards.extend_from_slice(&ctx.hole.as_array());
    cards.extend_from_slice(&ctx.board);
    let Ok(eval) = best_of(&cards) else {
        return preflop_strength_with_position(&ctx.hole, ctx.position);
    };
    let base = eval.category.ordinal() as f64 / 8.0;
    let high = eval.best_five[0].rank().value() as f64 / 14.0;
    let mut strength = base * 0.85 + high * 0.15;
    if ctx.board.len() < 5 {
        strength += draw_bonus(&ctx.hole, &cards);
    }
    strength.clamp(0.0, 1.0)
}

fn preflop_strength(hole: &HoleCards) -> f64 {
    let a = hole.first().rank().value() as i32;
    let b = hole.second().rank().value() as i32;
    let high = a.max(b) as f64;
    let low = a.min(b) as f64;
    let suited = hole.first().suit() == hole.second().suit();

    let mut score = (high / 14.0) * 0.5 + (low / 14.0) * 0.1;
    if a == b {
        score += 0.3 + (high / 14.0) * 0.1;
    }
    if suited {
        score += 0.05;
    }
    score += match (a - b).abs() {
        1 => 0.05,
        2 => 0.02,
        0 | 3 | 4 => 0.0,
        _ => -0.05,
    };
    score.clamp(0.0, 1.0)
}

fn preflop_strength_with_position(hole: &HoleCards, position: PositionBucket) -> f64 {
    let base = preflop_strength(hole);
    let (bonus, penalty) = match position {
        PositionBucket::HeadsUp => (0.12, 0.04),
        PositionBucket::Button | PositionBucket::Late => (0.1, 0.06),
        PositionBucket::Middle => (0.08, 0.08),
        PositionBucket::Early => (0.06, 0.1),
        PositionBucket::SmallBlind | PositionBucket::BigBlind => (0.07, 0.07),
    };
    if preflop_in_range(hole, position) {
        (base + bonus).min(1.0)
    } else {
        (base - penalty).max(0.0)
    }
}

fn preflop_in_range(hole: &HoleCards, position: PositionBucket) -> bool {
    let a = hole.first().rank().value() as i32;
    let b = hole.second().rank().value() as i32;
    let (high, low) = (a.max(b), a.min(b));
    let suited = hole.first().suit() == hole.second().suit();
    let pair = a == b;
    let gap = high - low;
    let broadway = low >= 10;

    match position {
        PositionBucket::HeadsUp => pair || suited || high >= 10,
        PositionBucket::Early => {
            if pair {
                return high >= 7;
            }
            // AKs/AQs/AJs/KQs, AKo/AQo/KQo
            (suited && ((high == 14 && low >= 11) || (high == 13 && low >= 12)))
                || (!suited && high >= 13 && low >= 12)
                || (suited && gap == 1 && high >= 9)
        }
        PositionBucket::Middle => {
            if pair {
                return high >= 5;
            }
            (suited && ((high == 14 && low >= 10) || broadway))
                || (!suited && high >= 13 && low >= 11)
                || (suited && gap == 1 && high >= 8)
        }
        PositionBucket::Late | PositionBucket::Button => {
            pair || (suited && (high == 14 || broadway))
                || (!suited && ((high == 14 && low >= 10) || (high >= 11 && low >= 10)))
                || (suited && ((gap == 1 && high >= 7) || (gap == 2 && high >= 10)))
        }
        PositionBucket::SmallBlind | PositionBucket::BigBlind => {
            pair || (suited && high == 14)
                || (!suited && ((high == 14 && low >= 9) || broadway))
                || (suited && ((gap == 1 && high >= 6) || (gap == 2 && high >= 9)))
        }
    }
}

/// Flush and open-ended straight draws.
fn draw_bonus(hole: &HoleCards, cards: &[Card]) -> f64 {
    let mut suits = [0u8; 4];
    for c in cards {
        suits[c.suit().index()] += 1;
    }
    let hole_suits: [Suit; 2] = [hole.first().suit(), hole.second().suit()];
    let mut bonus = 0.0;
    if suits
        .iter()
        .enumerate()
        .any(|(i, &n)| n == 4 && hole_suits.iter().any(|s| s.index() == i))
    {
        bonus += 0.07;
    }

    let mut ranks: Vec<i32> = cards.iter().map(|c| c.rank().value() as i32).collect();
    ranks.sort_unstable();
    ranks.dedup();
    if ranks.contains(&14) {
        ranks.insert(0, 1);
    }
    if ranks.windows(4).any(|w| w[3] - w[0] == 3) {
        bonus += 0.06;
    } else if ranks.windows(4).any(|w| w[3] - w[0] == 4) {
        bonus += 0.03;
    }
    bonus
}
